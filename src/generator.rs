use crate::ease::{Ease, SineInOut};
use crate::platform::{
    Canvas, CanvasTarget, FrameId, InputEvent, Listener, Platform, RenderingContext, StrokeStyle, Touch,
};
use crate::wave::{Wave, WaveConfig, WaveError};
use log::{debug, trace};
use std::f64::consts::TAU;

/// Maximum device pixel ratio used when none is configured
pub const DEFAULT_MAX_PIXEL_RATIO: f64 = 2.0;

/// Stroke width of every wave, in logical pixels
pub const LINE_WIDTH: f64 = 2.0;

/// Cap on the per-frame delta scale after a long stall
pub const MAX_DELTA_SCALE: f64 = 5.0;

/// Color stops of the default horizontal gradient
pub const GRADIENT_STOPS: [(f64, &str); 3] = [
    (0.0, "rgba(25,255,255,0)"),
    (0.5, "rgba(255,25,255,0.75)"),
    (1.0, "rgba(255,255,25,0)"),
];

type Context<P> = <<P as Platform>::Canvas as Canvas>::Context;
type Gradient<P> = <Context<P> as RenderingContext>::Gradient;

/// Errors returned by a [`Generator`]
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("SineWaveGenerator requires a valid canvas element.")]
    InvalidCanvas,

    #[error("SineWaveGenerator could not acquire a 2D rendering context.")]
    MissingContext,

    #[error("Invalid wave configuration provided.")]
    InvalidWaveConfig,

    #[error("Wave index out of bounds.")]
    IndexOutOfBounds,

    #[error(transparent)]
    Wave(#[from] WaveError),
}

/// Anything that can be added to a generator's wave collection
#[derive(Debug)]
pub enum WaveInput {
    /// An existing wave, moved in as is
    Wave(Wave),
    /// A configuration a new wave is built from
    Config(WaveConfig),
    /// No usable configuration at all
    Missing,
}

impl WaveInput {
    /// Turn the input into a wave, building it from its configuration if needed
    pub fn into_wave(self) -> Result<Wave, GeneratorError> {
        match self {
            Self::Wave(wave) => Ok(wave),
            Self::Config(config) => Ok(Wave::new(config)?),
            Self::Missing => Err(GeneratorError::InvalidWaveConfig),
        }
    }
}

impl From<Wave> for WaveInput {
    fn from(wave: Wave) -> Self {
        Self::Wave(wave)
    }
}

impl From<WaveConfig> for WaveInput {
    fn from(config: WaveConfig) -> Self {
        Self::Config(config)
    }
}

impl<T: Into<WaveInput>> From<Option<T>> for WaveInput {
    fn from(input: Option<T>) -> Self {
        input.map(Into::into).unwrap_or(Self::Missing)
    }
}

/// Construction options for a [`Generator`]
pub struct GeneratorOptions<P: Platform> {
    pub target: CanvasTarget<P>,
    pub waves: Vec<WaveInput>,
    /// Explicit pixel ratio; the platform's device pixel ratio is used otherwise
    pub pixel_ratio: Option<f64>,
    /// Upper bound on the pixel ratio used for the backing store
    pub max_pixel_ratio: Option<f64>,
    /// Whether to listen for viewport resizes
    pub auto_resize: bool,
}

impl<P: Platform> GeneratorOptions<P> {
    pub fn new(target: CanvasTarget<P>) -> Self {
        Self { target, waves: Vec::new(), pixel_ratio: None, max_pixel_ratio: None, auto_resize: true }
    }

    pub fn waves<I, W>(mut self, waves: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<WaveInput>,
    {
        self.waves = waves.into_iter().map(Into::into).collect();
        self
    }

    pub fn pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = Some(pixel_ratio);
        self
    }

    pub fn max_pixel_ratio(mut self, max_pixel_ratio: f64) -> Self {
        self.max_pixel_ratio = Some(max_pixel_ratio);
        self
    }

    pub fn auto_resize(mut self, auto_resize: bool) -> Self {
        self.auto_resize = auto_resize;
        self
    }
}

/// Animates a collection of waves on a drawing surface.
///
/// Waves are drawn in insertion order, so later waves sit on top. The generator owns its waves
/// and mutates them in place: the frame loop advances their phase and pointer input scrubs the
/// phase of all of them at once.
///
/// Everything runs on the host's single thread. The host delivers scheduled frames through
/// [`Generator::on_animation_frame`] and input through [`Generator::handle_event`].
pub struct Generator<P: Platform> {
    platform: P,
    canvas: P::Canvas,
    context: Context<P>,
    waves: Vec<Wave>,
    pixel_ratio: f64,
    max_pixel_ratio: f64,
    display_width: u32,
    display_height: u32,
    gradient: Option<Gradient<P>>,
    animation_frame_id: Option<FrameId>,
    last_frame_time: Option<f64>,
    events_bound: bool,
    auto_resize: bool,
}

impl<P: Platform> Generator<P> {
    /// Create a generator bound to the surface named by `options.target`.
    ///
    /// Input listeners are bound right away; the surface is sized on [`Generator::start`] or
    /// [`Generator::resize`].
    pub fn new(platform: P, options: GeneratorOptions<P>) -> Result<Self, GeneratorError> {
        let canvas = options.target.resolve(&platform).ok_or(GeneratorError::InvalidCanvas)?;
        let context = canvas.context_2d().ok_or(GeneratorError::MissingContext)?;
        let waves = options.waves.into_iter().map(WaveInput::into_wave).collect::<Result<Vec<_>, _>>()?;

        let pixel_ratio = match options.pixel_ratio {
            Some(ratio) if ratio.is_finite() => ratio,
            _ => platform.device_pixel_ratio().filter(|ratio| ratio.is_finite() && *ratio > 0.0).unwrap_or(1.0),
        };
        let max_pixel_ratio = match options.max_pixel_ratio {
            Some(ratio) if ratio.is_finite() => ratio.max(1.0),
            _ => DEFAULT_MAX_PIXEL_RATIO,
        };

        let mut generator = Self {
            platform,
            canvas,
            context,
            waves,
            pixel_ratio,
            max_pixel_ratio,
            display_width: 0,
            display_height: 0,
            gradient: None,
            animation_frame_id: None,
            last_frame_time: None,
            events_bound: false,
            auto_resize: options.auto_resize,
        };
        generator.bind_events();
        Ok(generator)
    }

    /// Attach input listeners. Does nothing if they are already attached.
    pub fn bind_events(&mut self) -> &mut Self {
        if self.events_bound {
            return self;
        }
        if self.auto_resize {
            self.platform.add_listener(Listener::Resize);
        }
        self.platform.add_listener(Listener::PointerMove);
        self.platform.add_listener(Listener::TouchMove);
        self.events_bound = true;
        self
    }

    /// Detach input listeners. Does nothing if they are not attached.
    pub fn unbind_events(&mut self) -> &mut Self {
        if !self.events_bound {
            return self;
        }
        if self.auto_resize {
            self.platform.remove_listener(Listener::Resize);
        }
        self.platform.remove_listener(Listener::PointerMove);
        self.platform.remove_listener(Listener::TouchMove);
        self.events_bound = false;
        self
    }

    fn listens_to(&self, listener: Listener) -> bool {
        self.events_bound && (listener != Listener::Resize || self.auto_resize)
    }

    /// Dispatch an input event delivered by the host. Events for listeners that are not bound
    /// are dropped.
    pub fn handle_event(&mut self, event: InputEvent) -> &mut Self {
        if !self.listens_to(event.listener()) {
            trace!("ignoring {} event, listener not bound", event.listener());
            return self;
        }
        match event {
            InputEvent::Resize => self.resize(),
            InputEvent::PointerMove { client_y } => self.on_pointer_move(client_y),
            InputEvent::TouchMove { touches } => self.on_touch_move(&touches),
        }
    }

    /// Scrub the phase of every wave from a pointer's vertical position.
    pub fn on_pointer_move(&mut self, client_y: f64) -> &mut Self {
        self.scrub_phase(client_y);
        self
    }

    /// Scrub the phase of every wave from the first touch point.
    pub fn on_touch_move(&mut self, touches: &[Touch]) -> &mut Self {
        if let Some(touch) = touches.first() {
            self.scrub_phase(touch.client_y);
        }
        self
    }

    fn scrub_phase(&mut self, client_y: f64) {
        if self.display_height == 0 {
            trace!("ignoring input before the surface is sized");
            return;
        }
        let rect = self.canvas.bounding_client_rect();
        let fraction = ((client_y - rect.top) / f64::from(self.display_height)).clamp(0.0, 1.0);
        let phase = fraction * TAU;
        for wave in &mut self.waves {
            wave.set_phase(phase);
        }
    }

    /// Measure the surface, resize its backing store if needed and rebuild the default gradient.
    ///
    /// The logical size comes from the first non-empty source among the layout box, the content
    /// size, the outer size and the viewport. If every source is empty the surface is not laid
    /// out yet and the logical size stays at zero.
    pub fn resize(&mut self) -> &mut Self {
        let rect = self.canvas.bounding_client_rect();
        let client = self.canvas.client_size();
        let offset = self.canvas.offset_size();
        let viewport = self.platform.viewport_size();

        let width = first_measured([rect.width, client.width, offset.width, viewport.width]);
        let height = first_measured([rect.height, client.height, offset.height, viewport.height]);
        match (width, height) {
            (Some(width), Some(height)) => {
                self.display_width = width;
                self.display_height = height;
                self.resize_backing_store();
            }
            _ => {
                trace!("surface has no measurable size yet");
                self.display_width = 0;
                self.display_height = 0;
            }
        }
        self.rebuild_gradient();
        self
    }

    fn resize_backing_store(&mut self) {
        let ratio = self.effective_pixel_ratio();
        let scaled = |logical: u32| {
            let device = (f64::from(logical) * ratio).floor();
            if device >= 1.0 { device as u32 } else { 1 }
        };
        let width = scaled(self.display_width);
        let height = scaled(self.display_height);
        if self.canvas.width() == width && self.canvas.height() == height {
            return;
        }
        debug!(
            "resizing backing store to {width}x{height} for {}x{} at ratio {ratio}",
            self.display_width, self.display_height
        );
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.context.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
    }

    fn rebuild_gradient(&mut self) {
        let mut gradient = self.context.create_linear_gradient(0.0, 0.0, f64::from(self.display_width), 0.0);
        for (offset, color) in GRADIENT_STOPS {
            self.context.add_color_stop(&mut gradient, offset, color);
        }
        self.gradient = Some(gradient);
    }

    /// Draw a single wave and advance its phase by `delta_scale` frames.
    pub fn draw_wave(&mut self, wave: &mut Wave, delta_scale: f64) -> &mut Self {
        let mut painter = WavePainter {
            context: &mut self.context,
            gradient: self.gradient.as_ref(),
            width: f64::from(self.display_width),
            height: f64::from(self.display_height),
        };
        painter.paint(wave, delta_scale);
        self
    }

    /// Draw the owned wave at `index` and advance its phase by `delta_scale` frames.
    pub fn draw_wave_at(&mut self, index: usize, delta_scale: f64) -> Result<&mut Self, GeneratorError> {
        let wave = self.waves.get_mut(index).ok_or(GeneratorError::IndexOutOfBounds)?;
        let mut painter = WavePainter {
            context: &mut self.context,
            gradient: self.gradient.as_ref(),
            width: f64::from(self.display_width),
            height: f64::from(self.display_height),
        };
        painter.paint(wave, delta_scale);
        Ok(self)
    }

    /// Start the animation loop. Calling this while running only re-measures the surface.
    pub fn start(&mut self) -> &mut Self {
        self.bind_events();
        self.resize();
        if self.animation_frame_id.is_none() {
            debug!("starting animation with {} wave(s)", self.waves.len());
            self.schedule_frame();
        }
        self
    }

    /// Stop the animation loop and detach input listeners. Safe to call when not running.
    pub fn stop(&mut self) -> &mut Self {
        if let Some(id) = self.animation_frame_id.take() {
            debug!("stopping animation");
            self.platform.cancel_animation_frame(id);
        }
        self.last_frame_time = None;
        self.unbind_events();
        self
    }

    fn schedule_frame(&mut self) {
        self.animation_frame_id = Some(self.platform.request_animation_frame());
    }

    /// Run one scheduled frame. `timestamp` is the host's monotonic clock in milliseconds.
    ///
    /// Frames delivered while nothing is scheduled are ignored.
    pub fn on_animation_frame(&mut self, timestamp: Option<f64>) -> &mut Self {
        if self.animation_frame_id.take().is_none() {
            trace!("ignoring frame delivered while stopped");
            return self;
        }

        if self.display_width == 0 || self.display_height == 0 {
            self.resize();
            if self.display_width == 0 || self.display_height == 0 {
                trace!("waiting for layout");
                self.schedule_frame();
                return self;
            }
        }

        let delta_scale = match (timestamp, self.last_frame_time) {
            (Some(now), Some(last)) if last > 0.0 => ((now - last) / 1000.0 * 60.0).clamp(0.0, MAX_DELTA_SCALE),
            _ => 1.0,
        };
        self.last_frame_time = Some(timestamp.unwrap_or(0.0));

        let width = f64::from(self.display_width);
        let height = f64::from(self.display_height);
        self.context.clear_rect(0.0, 0.0, width, height);
        let mut painter = WavePainter { context: &mut self.context, gradient: self.gradient.as_ref(), width, height };
        for wave in &mut self.waves {
            painter.paint(wave, delta_scale);
        }

        self.schedule_frame();
        self
    }

    /// Append a wave, drawn on top of the existing ones.
    pub fn add_wave<W: Into<WaveInput>>(&mut self, wave: W) -> Result<&mut Self, GeneratorError> {
        let wave = wave.into().into_wave()?;
        self.waves.push(wave);
        Ok(self)
    }

    /// Remove the wave at `index`, keeping the order of the others.
    pub fn remove_wave(&mut self, index: usize) -> Result<Wave, GeneratorError> {
        if index >= self.waves.len() {
            return Err(GeneratorError::IndexOutOfBounds);
        }
        Ok(self.waves.remove(index))
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn waves_mut(&mut self) -> &mut [Wave] {
        &mut self.waves
    }

    pub fn is_running(&self) -> bool {
        self.animation_frame_id.is_some()
    }

    pub fn animation_frame_id(&self) -> Option<FrameId> {
        self.animation_frame_id
    }

    pub fn events_bound(&self) -> bool {
        self.events_bound
    }

    pub fn auto_resize(&self) -> bool {
        self.auto_resize
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn max_pixel_ratio(&self) -> f64 {
        self.max_pixel_ratio
    }

    /// The pixel ratio actually applied to the backing store
    pub fn effective_pixel_ratio(&self) -> f64 {
        self.pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Logical size in CSS pixels, zero until the surface is measured
    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    pub fn gradient(&self) -> Option<&Gradient<P>> {
        self.gradient.as_ref()
    }

    pub fn last_frame_time(&self) -> Option<f64> {
        self.last_frame_time
    }

    pub fn canvas(&self) -> &P::Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut P::Canvas {
        &mut self.canvas
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

fn first_measured(candidates: [f64; 4]) -> Option<u32> {
    candidates
        .into_iter()
        .find(|value| value.is_finite() && *value > 0.0)
        .map(|value| (value.floor() as u32).max(1))
}

/// Strokes one wave across a surface of the given logical size
struct WavePainter<'a, C: RenderingContext> {
    context: &'a mut C,
    gradient: Option<&'a C::Gradient>,
    width: f64,
    height: f64,
}

impl<C: RenderingContext> WavePainter<'_, C> {
    fn paint(&mut self, wave: &mut Wave, delta_scale: f64) {
        let context = &mut *self.context;
        context.save();
        if wave.rotate() != 0.0 {
            // pivot around the center of the surface rather than its origin
            context.translate(self.width / 2.0, self.height / 2.0);
            context.rotate(wave.rotate().to_radians());
            context.translate(-self.width / 2.0, -self.height / 2.0);
        }

        let easing: &dyn Ease = match wave.easing() {
            Some(easing) => easing.as_ref(),
            None => &SineInOut,
        };
        let step = wave.segment_length().floor().max(1.0);
        let mid = self.height / 2.0;
        let amplitude = wave.amplitude();
        let phase = wave.phase();

        context.begin_path();
        let mut started = false;
        let mut x = 0.0;
        while x < self.width {
            let percent = x / self.width;
            let y = (percent * TAU + phase).sin() * easing.ease(percent, amplitude) + mid;
            if started {
                context.line_to(x, y);
            } else {
                context.move_to(x, y);
                started = true;
            }
            x += step;
        }

        // close the curve on the right edge whatever the step
        let y = (TAU + phase).sin() * easing.ease(1.0, amplitude) + mid;
        if started {
            context.line_to(self.width, y);
        } else {
            context.move_to(self.width, y);
        }

        match (wave.stroke_style(), self.gradient) {
            (Some(color), _) => context.set_stroke_style(StrokeStyle::Color(color)),
            (None, Some(gradient)) => context.set_stroke_style(StrokeStyle::Gradient(gradient)),
            (None, None) => (),
        }
        context.set_line_width(LINE_WIDTH);
        context.stroke();

        wave.advance(delta_scale);
        context.restore();
    }
}
