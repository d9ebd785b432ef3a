use crate::platform::{Canvas, Rect, RenderingContext, Size, StrokeStyle};
use std::cell::RefCell;
use std::rc::Rc;

/// A color with channels in `0..=255` and alpha in `0..=1`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let mix = |from: f64, to: f64| from + (to - from) * t;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Composite `source` over this opaque color
    fn blend(self, source: Rgba) -> Rgba {
        let alpha = source.a.clamp(0.0, 1.0);
        let mix = |dest: f64, src: f64| dest * (1.0 - alpha) + src * alpha;
        Rgba::new(mix(self.r, source.r), mix(self.g, source.g), mix(self.b, source.b), 1.0)
    }

    /// Channels as bytes, ignoring alpha
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let byte = |value: f64| value.round().clamp(0.0, 255.0) as u8;
        (byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Parse `rgba(r,g,b,a)`, `rgb(r,g,b)` or `#rrggbb`
pub fn parse_color(value: &str) -> Option<Rgba> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel =
            |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok().map(f64::from);
        return Some(Rgba::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0));
    }

    let (inner, has_alpha) = if let Some(rest) = value.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = value.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };
    let parts =
        inner.split(',').map(|part| part.trim().parse::<f64>().ok()).collect::<Option<Vec<_>>>()?;
    match (parts.as_slice(), has_alpha) {
        ([r, g, b, a], true) => Some(Rgba::new(*r, *g, *b, *a)),
        ([r, g, b], false) => Some(Rgba::new(*r, *g, *b, 1.0)),
        _ => None,
    }
}

/// Parametric range `[t0, t1]` of the segment `from + t * delta` that lies inside `bounds`
/// (Liang-Barsky), `None` when it misses them entirely
fn clip_segment(from: (f64, f64), delta: (f64, f64), bounds: ((f64, f64), (f64, f64))) -> Option<(f64, f64)> {
    let ((min_x, min_y), (max_x, max_y)) = bounds;
    let edges = [
        (-delta.0, from.0 - min_x),
        (delta.0, max_x - from.0),
        (-delta.1, from.1 - min_y),
        (delta.1, max_y - from.1),
    ];
    let (mut start, mut end) = (0.0_f64, 1.0_f64);
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            start = start.max(r);
        } else {
            end = end.min(r);
        }
        if start > end {
            return None;
        }
    }
    Some((start, end))
}

/// 2D affine transform `[a c e; b d f]`
#[derive(Clone, Copy, Debug, PartialEq)]
struct Transform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Transform {
    const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.e += self.a * x + self.c * y;
        self.f += self.b * x + self.d * y;
    }

    fn rotate(&mut self, angle: f64) {
        let (sin, cos) = angle.sin_cos();
        let Transform { a, b, c, d, .. } = *self;
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    fn scale_factor(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Linear gradient in user space
#[derive(Clone, Debug, PartialEq)]
pub struct RasterGradient {
    start: (f64, f64),
    end: (f64, f64),
    stops: Vec<(f64, Rgba)>,
}

impl RasterGradient {
    /// Color at a user-space point, projected onto the gradient axis
    pub fn color_at(&self, x: f64, y: f64) -> Rgba {
        let Some(first) = self.stops.first() else {
            return Rgba::new(0.0, 0.0, 0.0, 0.0);
        };
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let length = dx * dx + dy * dy;
        let t = if length > 0.0 {
            ((x - self.start.0) * dx + (y - self.start.1) * dy) / length
        } else {
            0.0
        };

        let mut previous = *first;
        if t <= previous.0 {
            return previous.1;
        }
        for stop in &self.stops[1..] {
            if t <= stop.0 {
                let span = stop.0 - previous.0;
                let local = if span > 0.0 { (t - previous.0) / span } else { 1.0 };
                return previous.1.lerp(stop.1, local);
            }
            previous = *stop;
        }
        previous.1
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Paint {
    Solid(Rgba),
    Gradient(RasterGradient),
}

impl Paint {
    fn color_at(&self, x: f64, y: f64) -> Rgba {
        match self {
            Paint::Solid(color) => *color,
            Paint::Gradient(gradient) => gradient.color_at(x, y),
        }
    }
}

#[derive(Clone, Debug)]
struct DrawState {
    transform: Transform,
    paint: Paint,
    line_width: f64,
}

impl Default for DrawState {
    fn default() -> Self {
        Self { transform: Transform::IDENTITY, paint: Paint::Solid(Rgba::BLACK), line_width: 1.0 }
    }
}

/// A path vertex in both user space (for gradients) and device space (for plotting)
#[derive(Clone, Copy, Debug)]
struct Vertex {
    user: (f64, f64),
    device: (f64, f64),
}

#[derive(Debug)]
struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
    layout: Rect,
    state: DrawState,
    saved: Vec<DrawState>,
    subpaths: Vec<Vec<Vertex>>,
}

impl Raster {
    fn reset(&mut self) {
        self.pixels = vec![Rgba::BLACK; self.width as usize * self.height as usize];
        // resizing a canvas resets its drawing state
        self.state = DrawState::default();
        self.saved.clear();
        self.subpaths.clear();
    }

    fn plot(&mut self, x: f64, y: f64, color: Rgba, brush: i64) {
        let half = brush / 2;
        let (cx, cy) = (x.floor() as i64, y.floor() as i64);
        for py in (cy - half)..(cy - half + brush) {
            for px in (cx - half)..(cx - half + brush) {
                if px < 0 || py < 0 || px >= i64::from(self.width) || py >= i64::from(self.height) {
                    continue;
                }
                let index = py as usize * self.width as usize + px as usize;
                self.pixels[index] = self.pixels[index].blend(color);
            }
        }
    }

    fn stroke(&mut self) {
        let extent = f64::from(self.width.max(self.height)) + 1.0;
        let brush = (self.state.line_width * self.state.transform.scale_factor()).round().clamp(1.0, extent) as i64;
        let margin = brush as f64;
        let bounds = ((-margin, -margin), (f64::from(self.width) + margin, f64::from(self.height) + margin));
        let paint = self.state.paint.clone();
        let subpaths = std::mem::take(&mut self.subpaths);
        for subpath in &subpaths {
            for segment in subpath.windows(2) {
                let (from, to) = (segment[0], segment[1]);
                let (dx, dy) = (to.device.0 - from.device.0, to.device.1 - from.device.1);
                if !(dx.is_finite() && dy.is_finite() && from.device.0.is_finite() && from.device.1.is_finite()) {
                    continue;
                }
                let Some((start, end)) = clip_segment(from.device, (dx, dy), bounds) else {
                    continue;
                };

                // one plot per device pixel of the visible part
                let visible = dx.abs().max(dy.abs()) * (end - start);
                let steps = visible.ceil().clamp(1.0, 4.0 * extent + 4.0) as usize;
                for step in 0..=steps {
                    let t = start + (end - start) * (step as f64 / steps as f64);
                    let user = (
                        from.user.0 + (to.user.0 - from.user.0) * t,
                        from.user.1 + (to.user.1 - from.user.1) * t,
                    );
                    let color = paint.color_at(user.0, user.1);
                    self.plot(from.device.0 + dx * t, from.device.1 + dy * t, color, brush);
                }
            }
        }
        self.subpaths = subpaths;
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let corners = [(x, y), (x + width, y), (x, y + height), (x + width, y + height)]
            .map(|(cx, cy)| self.state.transform.apply(cx, cy));
        let low = |axis: fn(&(f64, f64)) -> f64| corners.iter().map(axis).fold(f64::INFINITY, f64::min).max(0.0);
        let high = |axis: fn(&(f64, f64)) -> f64| corners.iter().map(axis).fold(f64::NEG_INFINITY, f64::max).ceil();
        let min_x = low(|c| c.0) as usize;
        let min_y = low(|c| c.1) as usize;
        let max_x = (high(|c| c.0).max(0.0) as usize).min(self.width as usize);
        let max_y = (high(|c| c.1).max(0.0) as usize).min(self.height as usize);
        for py in min_y..max_y {
            for px in min_x..max_x {
                self.pixels[py * self.width as usize + px] = Rgba::BLACK;
            }
        }
    }
}

/// A software canvas: an RGB backing store plus a logical layout box set by the host.
///
/// Clones share the same pixels, so the host can keep a handle to present frames while the
/// generator owns another.
#[derive(Clone, Debug)]
pub struct RasterCanvas {
    raster: Rc<RefCell<Raster>>,
}

impl RasterCanvas {
    /// A canvas laid out at `layout`, with a backing store of the same size
    pub fn new(layout: Rect) -> Self {
        let mut raster = Raster {
            width: layout.width.max(0.0) as u32,
            height: layout.height.max(0.0) as u32,
            pixels: Vec::new(),
            layout,
            state: DrawState::default(),
            saved: Vec::new(),
            subpaths: Vec::new(),
        };
        raster.reset();
        Self { raster: Rc::new(RefCell::new(raster)) }
    }

    /// Move or resize the layout box, as a host layout pass would
    pub fn set_layout(&self, layout: Rect) {
        self.raster.borrow_mut().layout = layout;
    }

    /// Backing-store pixel at `(x, y)`, black outside the store
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let raster = self.raster.borrow();
        if x >= raster.width || y >= raster.height {
            return Rgba::BLACK;
        }
        raster.pixels[y as usize * raster.width as usize + x as usize]
    }
}

impl Canvas for RasterCanvas {
    type Context = RasterContext;

    fn context_2d(&self) -> Option<RasterContext> {
        Some(RasterContext { raster: self.raster.clone() })
    }

    fn width(&self) -> u32 {
        self.raster.borrow().width
    }

    fn height(&self) -> u32 {
        self.raster.borrow().height
    }

    fn set_width(&mut self, width: u32) {
        let mut raster = self.raster.borrow_mut();
        raster.width = width;
        raster.reset();
    }

    fn set_height(&mut self, height: u32) {
        let mut raster = self.raster.borrow_mut();
        raster.height = height;
        raster.reset();
    }

    fn bounding_client_rect(&self) -> Rect {
        self.raster.borrow().layout
    }

    fn client_size(&self) -> Size {
        let layout = self.raster.borrow().layout;
        Size::new(layout.width, layout.height)
    }

    fn offset_size(&self) -> Size {
        self.client_size()
    }
}

/// 2D context drawing into a [`RasterCanvas`]
#[derive(Debug)]
pub struct RasterContext {
    raster: Rc<RefCell<Raster>>,
}

impl RenderingContext for RasterContext {
    type Gradient = RasterGradient;

    fn save(&mut self) {
        let mut raster = self.raster.borrow_mut();
        let state = raster.state.clone();
        raster.saved.push(state);
    }

    fn restore(&mut self) {
        let mut raster = self.raster.borrow_mut();
        if let Some(state) = raster.saved.pop() {
            raster.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.raster.borrow_mut().state.transform.translate(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        self.raster.borrow_mut().state.transform.rotate(angle);
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.raster.borrow_mut().state.transform = Transform { a, b, c, d, e, f };
    }

    fn begin_path(&mut self) {
        self.raster.borrow_mut().subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let mut raster = self.raster.borrow_mut();
        let device = raster.state.transform.apply(x, y);
        raster.subpaths.push(vec![Vertex { user: (x, y), device }]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let mut raster = self.raster.borrow_mut();
        let device = raster.state.transform.apply(x, y);
        let vertex = Vertex { user: (x, y), device };
        match raster.subpaths.last_mut() {
            Some(subpath) => subpath.push(vertex),
            None => raster.subpaths.push(vec![vertex]),
        }
    }

    fn stroke(&mut self) {
        self.raster.borrow_mut().stroke();
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.raster.borrow_mut().clear_rect(x, y, width, height);
    }

    fn create_linear_gradient(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> RasterGradient {
        RasterGradient { start: (x0, y0), end: (x1, y1), stops: Vec::new() }
    }

    fn add_color_stop(&mut self, gradient: &mut RasterGradient, offset: f64, color: &str) {
        let Some(color) = parse_color(color) else {
            return;
        };
        let offset = offset.clamp(0.0, 1.0);
        let position = gradient.stops.partition_point(|(existing, _)| *existing <= offset);
        gradient.stops.insert(position, (offset, color));
    }

    fn set_stroke_style(&mut self, style: StrokeStyle<'_, RasterGradient>) {
        let paint = match style {
            StrokeStyle::Color(color) => match parse_color(color) {
                Some(color) => Paint::Solid(color),
                // unparseable colors are ignored, like on an HTML canvas
                None => return,
            },
            StrokeStyle::Gradient(gradient) => Paint::Gradient(gradient.clone()),
        };
        self.raster.borrow_mut().state.paint = paint;
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.raster.borrow_mut().state.line_width = width;
        }
    }
}
