//! Recording host used by the unit tests.

use crate::platform::{Canvas, FrameId, Listener, Platform, Rect, RenderingContext, Size, StrokeStyle};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Paint {
    Color(String),
    Gradient(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    SetTransform([f64; 6]),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
    ClearRect(f64, f64, f64, f64),
    CreateLinearGradient(f64, f64, f64, f64),
    AddColorStop(usize, f64, String),
    StrokeStyle(Paint),
    LineWidth(f64),
    RequestFrame(u64),
    CancelFrame(u64),
    AddListener(Listener),
    RemoveListener(Listener),
}

#[derive(Debug, PartialEq)]
pub(crate) struct MockGradient {
    pub(crate) id: usize,
}

#[derive(Debug)]
pub(crate) struct Recorder {
    pub(crate) calls: Vec<Call>,
    pub(crate) rect: Rect,
    pub(crate) client: Size,
    pub(crate) offset: Size,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) has_context: bool,
    pub(crate) device_pixel_ratio: Option<f64>,
    pub(crate) viewport: Size,
    next_frame: u64,
    next_gradient: usize,
}

impl Recorder {
    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub(crate) fn path_points(&self) -> Vec<(f64, f64)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::MoveTo(x, y) | Call::LineTo(x, y) => Some((*x, *y)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn last_stroke_style(&self) -> Option<Paint> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::StrokeStyle(paint) => Some(paint.clone()),
            _ => None,
        })
    }
}

pub(crate) type Shared = Rc<RefCell<Recorder>>;

pub(crate) fn recorder(rect: Rect) -> Shared {
    Rc::new(RefCell::new(Recorder {
        calls: Vec::new(),
        rect,
        client: Size::default(),
        offset: Size::default(),
        // Unsized canvases default to 300x150, like a fresh HTML canvas
        width: 300,
        height: 150,
        has_context: true,
        device_pixel_ratio: Some(1.0),
        viewport: Size::new(1024.0, 768.0),
        next_frame: 0,
        next_gradient: 0,
    }))
}

#[derive(Clone, Debug)]
pub(crate) struct MockCanvas {
    pub(crate) state: Shared,
}

pub(crate) struct MockContext {
    state: Shared,
}

impl MockContext {
    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl RenderingContext for MockContext {
    type Gradient = MockGradient;

    fn save(&mut self) {
        self.record(Call::Save);
    }

    fn restore(&mut self) {
        self.record(Call::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.record(Call::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.record(Call::Rotate(angle));
    }

    fn set_transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.record(Call::SetTransform([a, b, c, d, e, f]));
    }

    fn begin_path(&mut self) {
        self.record(Call::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.record(Call::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.record(Call::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.record(Call::Stroke);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.record(Call::ClearRect(x, y, width, height));
    }

    fn create_linear_gradient(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> MockGradient {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::CreateLinearGradient(x0, y0, x1, y1));
        state.next_gradient += 1;
        MockGradient { id: state.next_gradient }
    }

    fn add_color_stop(&mut self, gradient: &mut MockGradient, offset: f64, color: &str) {
        self.record(Call::AddColorStop(gradient.id, offset, color.to_string()));
    }

    fn set_stroke_style(&mut self, style: StrokeStyle<'_, MockGradient>) {
        let paint = match style {
            StrokeStyle::Color(color) => Paint::Color(color.to_string()),
            StrokeStyle::Gradient(gradient) => Paint::Gradient(gradient.id),
        };
        self.record(Call::StrokeStyle(paint));
    }

    fn set_line_width(&mut self, width: f64) {
        self.record(Call::LineWidth(width));
    }
}

impl Canvas for MockCanvas {
    type Context = MockContext;

    fn context_2d(&self) -> Option<MockContext> {
        self.state.borrow().has_context.then(|| MockContext { state: self.state.clone() })
    }

    fn width(&self) -> u32 {
        self.state.borrow().width
    }

    fn height(&self) -> u32 {
        self.state.borrow().height
    }

    fn set_width(&mut self, width: u32) {
        self.state.borrow_mut().width = width;
    }

    fn set_height(&mut self, height: u32) {
        self.state.borrow_mut().height = height;
    }

    fn bounding_client_rect(&self) -> Rect {
        self.state.borrow().rect
    }

    fn client_size(&self) -> Size {
        self.state.borrow().client
    }

    fn offset_size(&self) -> Size {
        self.state.borrow().offset
    }
}

pub(crate) enum MockElement {
    Canvas(MockCanvas),
    Div,
}

pub(crate) struct MockPlatform {
    pub(crate) state: Shared,
}

impl Platform for MockPlatform {
    type Element = MockElement;
    type Canvas = MockCanvas;

    fn query_selector(&self, selector: &str) -> Option<MockElement> {
        match selector {
            "#canvas" => Some(MockElement::Canvas(MockCanvas { state: self.state.clone() })),
            "#div" => Some(MockElement::Div),
            _ => None,
        }
    }

    fn as_canvas(&self, element: MockElement) -> Option<MockCanvas> {
        match element {
            MockElement::Canvas(canvas) => Some(canvas),
            MockElement::Div => None,
        }
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.state.borrow().device_pixel_ratio
    }

    fn viewport_size(&self) -> Size {
        self.state.borrow().viewport
    }

    fn request_animation_frame(&mut self) -> FrameId {
        let mut state = self.state.borrow_mut();
        state.next_frame += 1;
        let id = state.next_frame;
        state.calls.push(Call::RequestFrame(id));
        FrameId(id)
    }

    fn cancel_animation_frame(&mut self, id: FrameId) {
        self.record(Call::CancelFrame(id.0));
    }

    fn add_listener(&mut self, listener: Listener) {
        self.record(Call::AddListener(listener));
    }

    fn remove_listener(&mut self, listener: Listener) {
        self.record(Call::RemoveListener(listener));
    }
}

impl MockPlatform {
    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// A platform plus a canvas sharing one recorder
pub(crate) fn host(rect: Rect) -> (MockPlatform, MockCanvas, Shared) {
    let state = recorder(rect);
    (MockPlatform { state: state.clone() }, MockCanvas { state: state.clone() }, state)
}
