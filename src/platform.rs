//! Contracts for the host a [`Generator`](crate::Generator) draws on.
//!
//! The generator never talks to a concrete graphics API. It needs a 2D immediate-mode context
//! ([`RenderingContext`]), a drawing surface with a backing store and a layout box ([`Canvas`]),
//! and a handful of global services: frame scheduling, input listener registration, the device
//! pixel ratio and the viewport size ([`Platform`]).

/// Layout box of a surface, in logical (CSS) pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// A width/height pair, in logical pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// What a path is stroked with
#[derive(Debug, PartialEq)]
pub enum StrokeStyle<'a, G> {
    /// A color string such as `rgba(255,25,255,0.75)`
    Color(&'a str),
    /// A gradient created by the same context
    Gradient(&'a G),
}

/// A 2D immediate-mode drawing context.
pub trait RenderingContext {
    /// Gradient paint handle created by this context
    type Gradient;

    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    /// Rotate by `angle` radians
    fn rotate(&mut self, angle: f64);
    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn stroke(&mut self);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn create_linear_gradient(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self::Gradient;
    fn add_color_stop(&mut self, gradient: &mut Self::Gradient, offset: f64, color: &str);
    fn set_stroke_style(&mut self, style: StrokeStyle<'_, Self::Gradient>);
    fn set_line_width(&mut self, width: f64);
}

/// A drawing surface: a backing store in device pixels plus a layout box in logical pixels.
pub trait Canvas {
    type Context: RenderingContext;

    /// Acquire the persistent 2D context, if the surface can provide one
    fn context_2d(&self) -> Option<Self::Context>;

    /// Backing-store width in device pixels
    fn width(&self) -> u32;
    /// Backing-store height in device pixels
    fn height(&self) -> u32;
    fn set_width(&mut self, width: u32);
    fn set_height(&mut self, height: u32);

    /// Current layout box
    fn bounding_client_rect(&self) -> Rect;
    /// Content size, the first fallback when the layout box is empty
    fn client_size(&self) -> Size;
    /// Outer size, the second fallback
    fn offset_size(&self) -> Size;
}

/// Handle for a scheduled frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Input sources a generator listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Listener {
    /// Viewport resizes, only bound when auto-resize is enabled
    Resize,
    /// Pointer movement over the surface
    PointerMove,
    /// Touch movement over the surface
    TouchMove,
}

/// A single touch point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Touch {
    pub client_y: f64,
}

/// Input delivered by the host
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Resize,
    PointerMove { client_y: f64 },
    TouchMove { touches: Vec<Touch> },
}

impl InputEvent {
    /// The listener this event is delivered through
    pub fn listener(&self) -> Listener {
        match self {
            Self::Resize => Listener::Resize,
            Self::PointerMove { .. } => Listener::PointerMove,
            Self::TouchMove { .. } => Listener::TouchMove,
        }
    }
}

/// Global services of the host.
///
/// Frame scheduling is one-shot: after [`Platform::request_animation_frame`] the host calls
/// [`Generator::on_animation_frame`](crate::Generator::on_animation_frame) once on its next
/// refresh, unless the frame is cancelled first.
pub trait Platform {
    /// Anything a selector can resolve to
    type Element;
    type Canvas: Canvas;

    /// Look up an element by selector
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;
    /// Narrow an element down to a drawing surface, `None` if it is not one
    fn as_canvas(&self, element: Self::Element) -> Option<Self::Canvas>;

    /// Reported device pixel ratio, if the host knows it
    fn device_pixel_ratio(&self) -> Option<f64>;
    /// Viewport size, the last fallback when sizing a surface
    fn viewport_size(&self) -> Size;

    fn request_animation_frame(&mut self) -> FrameId;
    fn cancel_animation_frame(&mut self, id: FrameId);

    fn add_listener(&mut self, listener: Listener);
    fn remove_listener(&mut self, listener: Listener);
}

/// How a generator finds its drawing surface
pub enum CanvasTarget<P: Platform> {
    /// An already resolved surface
    Canvas(P::Canvas),
    /// An element that may or may not be a surface
    Element(P::Element),
    /// A selector resolved through the platform
    Selector(String),
}

impl<P: Platform> CanvasTarget<P> {
    pub fn selector<S: Into<String>>(selector: S) -> Self {
        Self::Selector(selector.into())
    }

    pub(crate) fn resolve(self, platform: &P) -> Option<P::Canvas> {
        match self {
            Self::Canvas(canvas) => Some(canvas),
            Self::Element(element) => platform.as_canvas(element),
            Self::Selector(selector) => {
                let element = platform.query_selector(&selector)?;
                platform.as_canvas(element)
            }
        }
    }
}
