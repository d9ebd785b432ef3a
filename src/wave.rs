use crate::ease::{Easing, EasingDebug, SineInOut};
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_AMPLITUDE: f64 = 10.0;
pub const DEFAULT_WAVELENGTH: f64 = 100.0;
pub const DEFAULT_SEGMENT_LENGTH: f64 = 10.0;
pub const DEFAULT_ROTATE: f64 = 0.0;

/// Partial configuration for a [`Wave`].
///
/// Every field is optional: construction fills the gaps with defaults, while [`Wave::update`]
/// only overrides the fields that are present. `stroke_style` and `easing` are nullable on top of
/// that: `Some(None)` clears the value on update.
#[derive(Clone, Default)]
pub struct WaveConfig {
    /// Phase in radians
    pub phase: Option<f64>,
    /// Radians-per-frame multiplier
    pub speed: Option<f64>,
    /// Peak amplitude in pixels
    pub amplitude: Option<f64>,
    /// Distance between peaks in pixels
    pub wavelength: Option<f64>,
    /// Stroke color; waves without one are stroked with the generator's gradient
    pub stroke_style: Option<Option<String>>,
    /// Horizontal sampling step in pixels
    pub segment_length: Option<f64>,
    /// Amplitude envelope
    pub easing: Option<Option<Easing>>,
    /// Rotation in degrees, around the center of the surface
    pub rotate: Option<f64>,
}

impl WaveConfig {
    pub fn phase(mut self, phase: f64) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = Some(amplitude);
        self
    }

    pub fn wavelength(mut self, wavelength: f64) -> Self {
        self.wavelength = Some(wavelength);
        self
    }

    pub fn stroke_style<S: Into<String>>(mut self, stroke_style: S) -> Self {
        self.stroke_style = Some(Some(stroke_style.into()));
        self
    }

    /// Drop the stroke color so the wave falls back to the gradient
    pub fn clear_stroke_style(mut self) -> Self {
        self.stroke_style = Some(None);
        self
    }

    pub fn segment_length(mut self, segment_length: f64) -> Self {
        self.segment_length = Some(segment_length);
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(Some(easing));
        self
    }

    pub fn clear_easing(mut self) -> Self {
        self.easing = Some(None);
        self
    }

    pub fn rotate(mut self, rotate: f64) -> Self {
        self.rotate = Some(rotate);
        self
    }
}

impl fmt::Debug for WaveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaveConfig")
            .field("phase", &self.phase)
            .field("speed", &self.speed)
            .field("amplitude", &self.amplitude)
            .field("wavelength", &self.wavelength)
            .field("stroke_style", &self.stroke_style)
            .field("segment_length", &self.segment_length)
            .field("easing", &self.easing.as_ref().map(EasingDebug))
            .field("rotate", &self.rotate)
            .finish()
    }
}

/// Errors produced when a wave configuration is rejected
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WaveError {
    #[error("Amplitude and wavelength must be finite numbers.")]
    NonFiniteShape,

    #[error("Segment length, speed, and rotate must be finite numbers.")]
    NonFiniteMotion,

    #[error("Wave configuration values must be positive.")]
    Negative,

    #[error("Rotate value must be between 0 and 360 degrees.")]
    RotateOutOfRange,
}

/// Validate the present fields of a configuration.
///
/// Finiteness is checked before ranges, so a config that is both non-finite and negative
/// reports the finiteness error.
pub fn validate_config(config: &WaveConfig) -> Result<(), WaveError> {
    let finite = |value: Option<f64>| value.map_or(true, f64::is_finite);
    if !finite(config.amplitude) || !finite(config.wavelength) {
        return Err(WaveError::NonFiniteShape);
    }
    if !finite(config.segment_length) || !finite(config.speed) || !finite(config.rotate) {
        return Err(WaveError::NonFiniteMotion);
    }

    let at_least_zero = |value: Option<f64>| value.map_or(true, |v| v >= 0.0);
    let positive = config.segment_length.map_or(true, |v| v > 0.0);
    if !at_least_zero(config.amplitude)
        || !at_least_zero(config.wavelength)
        || !at_least_zero(config.speed)
        || !positive
    {
        return Err(WaveError::Negative);
    }
    if config.rotate.is_some_and(|rotate| !(0.0..360.0).contains(&rotate)) {
        return Err(WaveError::RotateOutOfRange);
    }
    Ok(())
}

/// One oscillating curve: validated parameters plus its running phase.
///
/// The phase accumulates without wrapping. Rendering only ever feeds it through `sin`, so large
/// magnitudes after long runs are harmless.
#[derive(Clone)]
pub struct Wave {
    phase: f64,
    speed: f64,
    amplitude: f64,
    wavelength: f64,
    stroke_style: Option<String>,
    segment_length: f64,
    easing: Option<Easing>,
    rotate: f64,
}

impl Wave {
    /// Create a wave, filling unset fields with defaults. Nothing is built if validation fails.
    pub fn new(config: WaveConfig) -> Result<Self, WaveError> {
        Self::with_rng(config, &mut fastrand::Rng::new())
    }

    /// Like [`Wave::new`], drawing the default phase and speed from `rng`.
    pub fn with_rng(config: WaveConfig, rng: &mut fastrand::Rng) -> Result<Self, WaveError> {
        let full = WaveConfig {
            phase: Some(config.phase.unwrap_or_else(|| random_phase(rng))),
            speed: Some(config.speed.unwrap_or_else(|| random_speed(rng))),
            amplitude: Some(config.amplitude.unwrap_or(DEFAULT_AMPLITUDE)),
            wavelength: Some(config.wavelength.unwrap_or(DEFAULT_WAVELENGTH)),
            stroke_style: Some(config.stroke_style.flatten()),
            segment_length: Some(config.segment_length.unwrap_or(DEFAULT_SEGMENT_LENGTH)),
            easing: Some(Some(config.easing.flatten().unwrap_or_else(|| Arc::new(SineInOut)))),
            rotate: Some(config.rotate.unwrap_or(DEFAULT_ROTATE)),
        };
        validate_config(&full)?;
        Ok(Self::from_complete(full))
    }

    fn from_complete(config: WaveConfig) -> Self {
        Self {
            phase: config.phase.unwrap_or_default(),
            speed: config.speed.unwrap_or_default(),
            amplitude: config.amplitude.unwrap_or(DEFAULT_AMPLITUDE),
            wavelength: config.wavelength.unwrap_or(DEFAULT_WAVELENGTH),
            stroke_style: config.stroke_style.flatten(),
            segment_length: config.segment_length.unwrap_or(DEFAULT_SEGMENT_LENGTH),
            easing: config.easing.flatten(),
            rotate: config.rotate.unwrap_or(DEFAULT_ROTATE),
        }
    }

    /// Merge `config` over the current state. The merged result is validated as a whole and
    /// the wave is left untouched if it is rejected.
    pub fn update(&mut self, config: WaveConfig) -> Result<&mut Self, WaveError> {
        let merged = WaveConfig {
            phase: Some(config.phase.unwrap_or(self.phase)),
            speed: Some(config.speed.unwrap_or(self.speed)),
            amplitude: Some(config.amplitude.unwrap_or(self.amplitude)),
            wavelength: Some(config.wavelength.unwrap_or(self.wavelength)),
            stroke_style: Some(config.stroke_style.unwrap_or_else(|| self.stroke_style.clone())),
            segment_length: Some(config.segment_length.unwrap_or(self.segment_length)),
            easing: Some(config.easing.unwrap_or_else(|| self.easing.clone())),
            rotate: Some(config.rotate.unwrap_or(self.rotate)),
        };
        validate_config(&merged)?;
        *self = Self::from_complete(merged);
        Ok(self)
    }

    /// Snapshot of the current state as a full configuration
    pub fn config(&self) -> WaveConfig {
        WaveConfig {
            phase: Some(self.phase),
            speed: Some(self.speed),
            amplitude: Some(self.amplitude),
            wavelength: Some(self.wavelength),
            stroke_style: Some(self.stroke_style.clone()),
            segment_length: Some(self.segment_length),
            easing: Some(self.easing.clone()),
            rotate: Some(self.rotate),
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Set the phase directly. Any real value is accepted.
    pub fn set_phase(&mut self, phase: f64) {
        self.phase = phase;
    }

    pub(crate) fn advance(&mut self, delta_scale: f64) {
        self.phase += self.speed * TAU * delta_scale;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Stored and validated, but not consumed when rendering.
    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn stroke_style(&self) -> Option<&str> {
        self.stroke_style.as_deref()
    }

    /// Replace the stroke color; `None` falls back to the generator's gradient.
    pub fn set_stroke_style(&mut self, stroke_style: Option<String>) {
        self.stroke_style = stroke_style;
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    pub fn easing(&self) -> Option<&Easing> {
        self.easing.as_ref()
    }

    /// Replace the easing; `None` renders with the default easing.
    pub fn set_easing(&mut self, easing: Option<Easing>) {
        self.easing = easing;
    }

    pub fn rotate(&self) -> f64 {
        self.rotate
    }
}

impl fmt::Debug for Wave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wave")
            .field("phase", &self.phase)
            .field("speed", &self.speed)
            .field("amplitude", &self.amplitude)
            .field("wavelength", &self.wavelength)
            .field("stroke_style", &self.stroke_style)
            .field("segment_length", &self.segment_length)
            .field("easing", &EasingDebug(&self.easing))
            .field("rotate", &self.rotate)
            .finish()
    }
}

fn random_phase(rng: &mut fastrand::Rng) -> f64 {
    rng.f64() * TAU
}

fn random_speed(rng: &mut fastrand::Rng) -> f64 {
    rng.f64() * 0.5 + 0.5
}

/// Generate a fully populated random configuration.
pub fn generate_random_config() -> WaveConfig {
    generate_random_config_with(&mut fastrand::Rng::new())
}

/// Generate a fully populated random configuration from `rng`.
///
/// Every range stays inside what [`validate_config`] accepts.
pub fn generate_random_config_with(rng: &mut fastrand::Rng) -> WaveConfig {
    let phase = random_phase(rng);
    let speed = random_speed(rng);
    let amplitude = rng.f64() * 20.0 + 5.0;
    let wavelength = rng.f64() * 200.0 + 50.0;
    let stroke_style = format!("rgba({},{},{},{:.1})", rng.u8(..255), rng.u8(..255), rng.u8(..255), rng.f64());
    let segment_length = rng.f64() * 20.0 + 5.0;
    let rotate = rng.f64() * 360.0;
    WaveConfig {
        phase: Some(phase),
        speed: Some(speed),
        amplitude: Some(amplitude),
        wavelength: Some(wavelength),
        stroke_style: Some(Some(stroke_style)),
        segment_length: Some(segment_length),
        easing: Some(Some(Arc::new(SineInOut))),
        rotate: Some(rotate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> WaveConfig {
        WaveConfig::default().amplitude(10.0).wavelength(100.0).segment_length(10.0)
    }

    #[test]
    fn uses_default_values() {
        let wave = Wave::new(WaveConfig::default()).expect("defaults are valid");
        assert_eq!(wave.amplitude(), 10.0);
        assert_eq!(wave.wavelength(), 100.0);
        assert_eq!(wave.segment_length(), 10.0);
        assert_eq!(wave.rotate(), 0.0);
        assert!(wave.stroke_style().is_none());
        assert!(wave.easing().is_some());
        assert!((0.0..TAU).contains(&wave.phase()));
        assert!((0.5..1.0).contains(&wave.speed()));
    }

    #[rstest]
    #[case(base().amplitude(f64::NAN), WaveError::NonFiniteShape)]
    #[case(base().wavelength(f64::INFINITY), WaveError::NonFiniteShape)]
    #[case(base().segment_length(f64::NAN), WaveError::NonFiniteMotion)]
    #[case(base().speed(f64::NEG_INFINITY), WaveError::NonFiniteMotion)]
    #[case(base().rotate(f64::NAN), WaveError::NonFiniteMotion)]
    #[case(base().amplitude(-1.0), WaveError::Negative)]
    #[case(base().wavelength(-0.5), WaveError::Negative)]
    #[case(base().speed(-0.1), WaveError::Negative)]
    #[case(base().segment_length(0.0), WaveError::Negative)]
    #[case(base().rotate(-1.0), WaveError::RotateOutOfRange)]
    #[case(base().rotate(360.0), WaveError::RotateOutOfRange)]
    #[case(base().amplitude(f64::NAN).segment_length(-1.0), WaveError::NonFiniteShape)]
    #[case(base().amplitude(-1.0).rotate(f64::NAN), WaveError::NonFiniteMotion)]
    #[case(base().amplitude(-1.0).rotate(400.0), WaveError::Negative)]
    fn rejects_invalid_configs(#[case] config: WaveConfig, #[case] expected: WaveError) {
        let err = Wave::new(config).unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn error_messages() {
        let message = |config: WaveConfig| Wave::new(config).unwrap_err().to_string();
        assert_eq!(message(base().amplitude(f64::NAN)), "Amplitude and wavelength must be finite numbers.");
        assert_eq!(
            message(base().segment_length(f64::NAN)),
            "Segment length, speed, and rotate must be finite numbers."
        );
        assert_eq!(message(base().amplitude(-1.0)), "Wave configuration values must be positive.");
        assert_eq!(message(base().segment_length(0.0)), "Wave configuration values must be positive.");
        assert_eq!(message(base().rotate(360.0)), "Rotate value must be between 0 and 360 degrees.");
    }

    #[rstest]
    #[case(base())]
    #[case(base().amplitude(0.0).wavelength(0.0).speed(0.0))]
    #[case(base().segment_length(0.001))]
    #[case(base().rotate(359.999))]
    #[case(base().phase(-1e9))]
    fn accepts_valid_configs(#[case] config: WaveConfig) {
        assert!(validate_config(&config).is_ok());
        assert!(Wave::new(config).is_ok());
    }

    #[test]
    fn update_merges_and_chains() {
        let mut wave = Wave::new(base()).unwrap();
        let amplitude = wave.update(WaveConfig::default().amplitude(20.0)).unwrap().amplitude();
        assert_eq!(amplitude, 20.0);

        wave.update(WaveConfig::default().wavelength(200.0).speed(0.8).rotate(90.0)).unwrap();
        assert_eq!(wave.wavelength(), 200.0);
        assert_eq!(wave.speed(), 0.8);
        assert_eq!(wave.rotate(), 90.0);
        assert_eq!(wave.amplitude(), 20.0);
    }

    #[test]
    fn rejected_update_leaves_wave_untouched() {
        let mut wave = Wave::new(base().phase(1.0).speed(0.6).stroke_style("red")).unwrap();
        let before = format!("{wave:?}");

        let err = wave.update(WaveConfig::default().amplitude(50.0).segment_length(0.0)).unwrap_err();
        assert_eq!(err, WaveError::Negative);
        assert_eq!(format!("{wave:?}"), before);

        assert!(wave.update(WaveConfig::default().rotate(720.0)).is_err());
        assert_eq!(format!("{wave:?}"), before);
    }

    #[test]
    fn update_keeps_cleared_easing_cleared() {
        let mut wave = Wave::new(base()).unwrap();
        wave.set_easing(None);
        wave.update(WaveConfig::default().amplitude(3.0)).unwrap();
        assert!(wave.easing().is_none());
    }

    #[test]
    fn update_distinguishes_unset_from_cleared() {
        let mut wave = Wave::new(base().stroke_style("rgba(1,2,3,0.5)")).unwrap();

        wave.update(WaveConfig::default().amplitude(4.0)).unwrap();
        assert_eq!(wave.stroke_style(), Some("rgba(1,2,3,0.5)"));
        assert!(wave.easing().is_some());

        wave.update(WaveConfig::default().clear_stroke_style().clear_easing()).unwrap();
        assert_eq!(wave.stroke_style(), None);
        assert!(wave.easing().is_none());
        assert_eq!(wave.amplitude(), 4.0);

        wave.update(WaveConfig::default().stroke_style("red")).unwrap();
        assert_eq!(wave.stroke_style(), Some("red"));
    }

    #[test]
    fn construction_treats_cleared_as_default() {
        let wave = Wave::new(base().clear_stroke_style().clear_easing()).unwrap();
        assert_eq!(wave.stroke_style(), None);
        assert!(wave.easing().is_some());
    }

    #[test]
    fn snapshot_round_trips_through_update() {
        let mut wave = Wave::new(base().phase(0.5).speed(0.7)).unwrap();
        let snapshot = wave.config();
        assert!(matches!(snapshot.stroke_style, Some(None)));
        wave.update(snapshot).unwrap();
        assert_eq!(wave.phase(), 0.5);
        assert_eq!(wave.speed(), 0.7);
    }

    #[test]
    fn advance_accumulates_without_wrapping() {
        let mut wave = Wave::new(base().phase(0.0).speed(0.5)).unwrap();
        for _ in 0..10 {
            wave.advance(1.0);
        }
        assert!((wave.phase() - 10.0 * std::f64::consts::PI).abs() < 1e-9);
    }

    fn is_rgba(value: &str) -> bool {
        let Some(inner) = value.strip_prefix("rgba(").and_then(|rest| rest.strip_suffix(')')) else {
            return false;
        };
        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() != 4 {
            return false;
        }
        let channels_ok = parts[..3].iter().all(|part| part.parse::<u8>().is_ok());
        let alpha_ok = parts[3].parse::<f64>().is_ok_and(|alpha| (0.0..=1.0).contains(&alpha));
        channels_ok && alpha_ok
    }

    #[test]
    fn random_configs_are_valid() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let config = generate_random_config_with(&mut rng);
            let rotate = config.rotate.unwrap();
            assert!((0.0..360.0).contains(&rotate));
            assert!(config.stroke_style.clone().flatten().is_some_and(|stroke| is_rgba(&stroke)));
            assert!(validate_config(&config).is_ok());
            assert!(matches!(config.easing, Some(Some(_))));
        }
        assert!(Wave::new(generate_random_config()).is_ok());
    }
}
