use super::raster::RasterCanvas;
use crate::platform::Canvas;
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};
use std::io::{self, Write};

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '▀';

type Rgb = (u8, u8, u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    top: Rgb,
    bottom: Rgb,
}

/// A raster downsampled to terminal cells, two pixels per cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    columns: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Frame {
    /// Sample `canvas` onto a `columns` x `rows` grid, nearest neighbour
    pub fn sample(canvas: &RasterCanvas, columns: u16, rows: u16) -> Self {
        let (width, height) = (canvas.width(), canvas.height());
        let pixel_rows = u32::from(rows) * 2;
        let source = |x: u16, y: u32| {
            let sx = (u64::from(x) * u64::from(width) / u64::from(columns.max(1))) as u32;
            let sy = (u64::from(y) * u64::from(height) / u64::from(pixel_rows.max(1))) as u32;
            canvas.pixel(sx, sy).to_rgb8()
        };

        let mut cells = Vec::with_capacity(usize::from(columns) * usize::from(rows));
        for row in 0..rows {
            let y = u32::from(row) * 2;
            for column in 0..columns {
                cells.push(Cell { top: source(column, y), bottom: source(column, y + 1) });
            }
        }
        Self { columns, rows, cells }
    }

    fn cell(&self, column: u16, row: u16) -> Cell {
        self.cells[usize::from(row) * usize::from(self.columns) + usize::from(column)]
    }
}

fn color((r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Writes frames to the terminal, redrawing only the cells that changed.
#[derive(Debug, Default)]
pub struct Presenter {
    previous: Option<Frame>,
}

impl Presenter {
    pub fn present<W: Write>(&mut self, frame: Frame, out: &mut W) -> io::Result<()> {
        let previous = self
            .previous
            .take()
            .filter(|previous| previous.columns == frame.columns && previous.rows == frame.rows);
        let mut last_fg = None;
        let mut last_bg = None;

        queue!(out, BeginSynchronizedUpdate)?;
        for row in 0..frame.rows {
            let mut cursor_at = None;
            for column in 0..frame.columns {
                let cell = frame.cell(column, row);
                if previous.as_ref().is_some_and(|previous| previous.cell(column, row) == cell) {
                    continue;
                }
                if cursor_at != Some(column) {
                    queue!(out, cursor::MoveTo(column, row))?;
                }
                if last_fg != Some(cell.top) {
                    queue!(out, SetForegroundColor(color(cell.top)))?;
                    last_fg = Some(cell.top);
                }
                if last_bg != Some(cell.bottom) {
                    queue!(out, SetBackgroundColor(color(cell.bottom)))?;
                    last_bg = Some(cell.bottom);
                }
                queue!(out, Print(HALF_BLOCK))?;
                cursor_at = Some(column + 1);
            }
        }
        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;

        self.previous = Some(frame);
        Ok(())
    }

    /// Forget the last frame so the next one is drawn in full
    pub fn invalidate(&mut self) {
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Rect, RenderingContext, StrokeStyle};

    fn striped_canvas() -> RasterCanvas {
        let canvas = RasterCanvas::new(Rect::sized(4.0, 4.0));
        let mut context = canvas.context_2d().unwrap();
        context.set_stroke_style(StrokeStyle::Color("rgb(255,0,0)"));
        context.begin_path();
        context.move_to(0.5, 0.5);
        context.line_to(3.5, 0.5);
        context.stroke();
        canvas
    }

    fn half_blocks(output: &[u8]) -> usize {
        String::from_utf8_lossy(output).matches(HALF_BLOCK).count()
    }

    #[test]
    fn samples_two_pixels_per_cell() {
        let frame = Frame::sample(&striped_canvas(), 4, 2);
        assert_eq!(frame.cell(0, 0), Cell { top: (255, 0, 0), bottom: (0, 0, 0) });
        assert_eq!(frame.cell(3, 1), Cell { top: (0, 0, 0), bottom: (0, 0, 0) });
    }

    #[test]
    fn downsamples_larger_backing_store() {
        let mut canvas = striped_canvas();
        canvas.set_width(8);
        canvas.set_height(8);
        let mut context = canvas.context_2d().unwrap();
        context.set_stroke_style(StrokeStyle::Color("rgb(0,0,255)"));
        context.begin_path();
        context.move_to(0.5, 0.5);
        context.line_to(7.5, 0.5);
        context.stroke();

        let frame = Frame::sample(&canvas, 4, 2);
        assert_eq!(frame.cells.len(), 8);
        for column in 0..4 {
            assert_eq!(frame.cell(column, 0), Cell { top: (0, 0, 255), bottom: (0, 0, 0) });
            assert_eq!(frame.cell(column, 1).top, (0, 0, 0));
        }
    }

    #[test]
    fn redraws_only_changed_cells() {
        let canvas = striped_canvas();
        let mut presenter = Presenter::default();

        let mut first = Vec::new();
        presenter.present(Frame::sample(&canvas, 4, 2), &mut first).unwrap();
        assert_eq!(half_blocks(&first), 8);

        let mut second = Vec::new();
        presenter.present(Frame::sample(&canvas, 4, 2), &mut second).unwrap();
        assert_eq!(half_blocks(&second), 0);

        let mut resized = Vec::new();
        presenter.present(Frame::sample(&canvas, 2, 1), &mut resized).unwrap();
        assert_eq!(half_blocks(&resized), 2);

        presenter.invalidate();
        let mut full = Vec::new();
        presenter.present(Frame::sample(&canvas, 2, 1), &mut full).unwrap();
        assert_eq!(half_blocks(&full), 2);
    }
}
