//! Animated sine waves on a 2D drawing surface.
//!
//! A [`Generator`] owns a set of [`Wave`]s and paints them on a [`Canvas`](platform::Canvas) once
//! per frame, advancing each wave's phase by its speed. Each wave's vertical displacement is
//! shaped by an [`Ease`] strategy so it tapers towards the edges of the surface. Pointer and touch
//! input scrub the phase of every wave.
//!
//! The generator is host agnostic: anything that implements the [`platform`] traits can drive it.
//! The [`terminal`] module provides such a host, rendering into a software raster shown with
//! half-block glyphs.

pub mod config;
pub mod ease;
pub mod generator;
pub mod platform;
pub mod terminal;
pub mod wave;

#[cfg(test)]
mod mock;

pub use config::{ConfigError, SceneConfig, WaveEntry};
pub use ease::{get_easing, Ease, EasedSine, Easing, EasingStyle, SineInOut};
pub use generator::{Generator, GeneratorError, GeneratorOptions, WaveInput};
pub use wave::{generate_random_config, Wave, WaveConfig, WaveError};
