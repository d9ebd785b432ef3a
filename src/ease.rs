use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// The golden ratio, used to carve the silent margins of [`EasedSine`].
pub const GOLDEN_RATIO: f64 = 1.618033988749895;

/// Fraction of the horizontal extent kept silent on each side by [`EasedSine`].
pub fn golden_section() -> f64 {
    (1.0 - 1.0 / GOLDEN_RATIO) / 2.0
}

/// An amplitude envelope across the horizontal extent of a wave.
///
/// `percent` is the normalized horizontal position in `[0, 1]` and `amplitude` the wave's peak
/// amplitude; the result is the amplitude to use at that position.
pub trait Ease: Send + Sync {
    fn ease(&self, percent: f64, amplitude: f64) -> f64;
}

impl<F> Ease for F
where
    F: Fn(f64, f64) -> f64 + Send + Sync,
{
    fn ease(&self, percent: f64, amplitude: f64) -> f64 {
        self(percent, amplitude)
    }
}

/// A shared easing strategy stored on a wave.
pub type Easing = Arc<dyn Ease>;

/// Symmetric bump: `amplitude * (sin(t * pi) + 1) / 2`.
pub fn sine_in_out(time: f64, amplitude: f64) -> f64 {
    amplitude * ((time * PI).sin() + 1.0) / 2.0
}

/// Single bump confined to the central golden-section span, silent at the edges.
pub fn eased_sine(percent: f64, amplitude: f64) -> f64 {
    let section = golden_section();
    if percent < section || percent > 1.0 - section {
        return 0.0;
    }
    let adjusted = (percent - section) / (1.0 - 2.0 * section);
    (adjusted * PI).sin() * amplitude
}

/// Smooth in-and-out envelope, the default for every wave
pub struct SineInOut;

impl Ease for SineInOut {
    fn ease(&self, percent: f64, amplitude: f64) -> f64 {
        sine_in_out(percent, amplitude)
    }
}

/// Pinched envelope that only moves inside the golden section
pub struct EasedSine;

impl Ease for EasedSine {
    fn ease(&self, percent: f64, amplitude: f64) -> f64 {
        eased_sine(percent, amplitude)
    }
}

/// Named easing strategies, selectable from scene files and the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[derive(strum::EnumString, strum::Display, strum::EnumIter, strum::IntoStaticStr)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EasingStyle {
    #[default]
    SineInOut,
    EasedSine,
}

/// Get the easing implementation for a given style
pub fn get_easing(style: EasingStyle) -> Easing {
    match style {
        EasingStyle::SineInOut => Arc::new(SineInOut),
        EasingStyle::EasedSine => Arc::new(EasedSine),
    }
}

/// The easing used when a wave has none of its own.
pub fn default_easing() -> Easing {
    get_easing(EasingStyle::default())
}

/// Debug helper for structs holding an [`Easing`].
pub(crate) struct EasingDebug<'a>(pub(crate) &'a Option<Easing>);

impl fmt::Debug for EasingDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Some(<easing>)"),
            None => f.write_str("None"),
        }
    }
}
