//! A terminal host for the generator.
//!
//! Each terminal cell shows two vertically stacked pixels of a [`RasterCanvas`], so a terminal of
//! `columns` x `rows` cells is a `columns` x `rows * 2` logical surface. The run loop plays the
//! part of a browser's frame scheduler: it delivers scheduled frames at a fixed rate and turns
//! terminal input into [`InputEvent`]s.

mod platform;
mod present;
mod raster;

pub use platform::TerminalPlatform;
pub use present::{Frame, Presenter};
pub use raster::{parse_color, RasterCanvas, RasterContext, RasterGradient, Rgba};

use crate::config::SceneConfig;
use crate::generator::{Generator, GeneratorError};
use crate::platform::{CanvasTarget, InputEvent, Rect};
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    style::ResetColor,
    terminal::{self, DisableLineWrap, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use std::io;
use std::time::{Duration, Instant};

/// Frame rate used when none is given
pub const DEFAULT_FPS: u32 = 60;

/// Errors that can occur while running in the terminal
#[derive(thiserror::Error, Debug)]
pub enum TerminalError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// What happened during a run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub waves: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn average_fps(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 { self.frames as f64 / seconds } else { 0.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Action {
    Quit,
    Layout { columns: u16, rows: u16 },
    Input(InputEvent),
}

/// Logical layout of a terminal of `columns` x `rows` cells
fn layout(columns: u16, rows: u16) -> Rect {
    Rect::sized(f64::from(columns), f64::from(rows) * 2.0)
}

fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn translate(event: Event) -> Vec<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press && is_quit(&key) => vec![Action::Quit],
        Event::Resize(columns, rows) => {
            vec![Action::Layout { columns, rows }, Action::Input(InputEvent::Resize)]
        }
        Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
            // center of the cell
            let client_y = f64::from(mouse.row) * 2.0 + 1.0;
            vec![Action::Input(InputEvent::PointerMove { client_y })]
        }
        _ => Vec::new(),
    }
}

fn enter_screen() -> io::Result<()> {
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture, DisableLineWrap, cursor::Hide)
}

fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        ResetColor,
        cursor::Show,
        EnableLineWrap,
        DisableMouseCapture,
        LeaveAlternateScreen
    );
}

/// Raw mode and the alternate screen, restored on drop
struct ScreenGuard {
    restore: fn(),
}

impl ScreenGuard {
    fn enter() -> io::Result<Self> {
        Self::enter_with(terminal::enable_raw_mode, enter_screen, restore_terminal)
    }

    /// The guard exists as soon as raw mode is on, so a failing `setup` is still undone
    fn enter_with(
        raw_mode: impl FnOnce() -> io::Result<()>,
        setup: impl FnOnce() -> io::Result<()>,
        restore: fn(),
    ) -> io::Result<Self> {
        raw_mode()?;
        let guard = Self { restore };
        setup()?;
        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        (self.restore)();
    }
}

/// Animate `scene` in the terminal until the user quits with `q`, `Esc` or `Ctrl-C`.
pub fn run(scene: SceneConfig, fps: u32) -> Result<RunSummary, TerminalError> {
    let (columns, rows) = terminal::size()?;
    let canvas = RasterCanvas::new(layout(columns, rows));
    let platform = TerminalPlatform::new(canvas.clone());
    let options = scene.into_options(CanvasTarget::selector(TerminalPlatform::SELECTOR));
    let mut generator = Generator::new(platform, options)?;
    let waves = generator.waves().len();
    debug!("running {waves} wave(s) on a {columns}x{rows} terminal at {fps} fps");

    let _guard = ScreenGuard::enter()?;
    let mut out = io::stdout();
    let mut presenter = Presenter::default();
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    let clock = Instant::now();
    let mut frames = 0;

    generator.start();
    'running: loop {
        let deadline = Instant::now() + frame_interval;

        if generator.platform_mut().take_pending_frame().is_some() {
            let timestamp = clock.elapsed().as_secs_f64() * 1000.0;
            generator.on_animation_frame(Some(timestamp));
            let (columns, rows) = terminal::size()?;
            presenter.present(Frame::sample(&canvas, columns, rows), &mut out)?;
            frames += 1;
        }

        while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
            if !event::poll(timeout)? {
                break;
            }
            for action in translate(event::read()?) {
                match action {
                    Action::Quit => break 'running,
                    Action::Layout { columns, rows } => {
                        canvas.set_layout(layout(columns, rows));
                        presenter.invalidate();
                    }
                    Action::Input(input) => {
                        if generator.platform().is_listening(input.listener()) {
                            generator.handle_event(input);
                        }
                    }
                }
            }
        }
    }
    generator.stop();

    Ok(RunSummary { frames, waves, elapsed: clock.elapsed() })
}
