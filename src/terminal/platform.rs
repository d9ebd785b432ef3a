use super::raster::RasterCanvas;
use crate::platform::{Canvas, FrameId, Listener, Platform, Size};
use log::trace;
use std::collections::HashSet;

/// The terminal as a host: one raster surface, frames pumped by the run loop.
#[derive(Debug)]
pub struct TerminalPlatform {
    canvas: RasterCanvas,
    next_frame: u64,
    pending_frame: Option<FrameId>,
    listeners: HashSet<Listener>,
}

impl TerminalPlatform {
    /// Selector resolving to the terminal surface
    pub const SELECTOR: &'static str = "#terminal";

    pub fn new(canvas: RasterCanvas) -> Self {
        Self { canvas, next_frame: 0, pending_frame: None, listeners: HashSet::new() }
    }

    /// Consume the scheduled frame, if any
    pub fn take_pending_frame(&mut self) -> Option<FrameId> {
        self.pending_frame.take()
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    pub fn is_listening(&self, listener: Listener) -> bool {
        self.listeners.contains(&listener)
    }
}

impl Platform for TerminalPlatform {
    type Element = RasterCanvas;
    type Canvas = RasterCanvas;

    fn query_selector(&self, selector: &str) -> Option<RasterCanvas> {
        (selector == Self::SELECTOR).then(|| self.canvas.clone())
    }

    fn as_canvas(&self, element: RasterCanvas) -> Option<RasterCanvas> {
        Some(element)
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        Some(1.0)
    }

    fn viewport_size(&self) -> Size {
        match crossterm::terminal::size() {
            Ok((columns, rows)) => Size::new(f64::from(columns), f64::from(rows) * 2.0),
            Err(_) => self.canvas.client_size(),
        }
    }

    fn request_animation_frame(&mut self) -> FrameId {
        self.next_frame += 1;
        let id = FrameId(self.next_frame);
        self.pending_frame = Some(id);
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameId) {
        if self.pending_frame == Some(id) {
            self.pending_frame = None;
        }
    }

    fn add_listener(&mut self, listener: Listener) {
        trace!("listening to {listener}");
        self.listeners.insert(listener);
    }

    fn remove_listener(&mut self, listener: Listener) {
        trace!("no longer listening to {listener}");
        self.listeners.remove(&listener);
    }
}
