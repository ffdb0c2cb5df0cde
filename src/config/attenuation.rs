use crate::error::{Result, SpatialSoundError};

/// Distance falloff applied to emitter gain.
///
/// Every curve is continuous and non-increasing in distance, so moving a
/// source never produces an audible jump in level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FalloffCurve {
    /// Gain falls linearly from 1.0 at `min_distance` to 0.0 at `max_distance`
    Linear,
    /// `min_distance / distance`, clamped to `[min_distance, max_distance]`
    #[default]
    Inverse,
    /// Smoothstep from 1.0 at `min_distance` to 0.0 at `max_distance`
    Smooth,
}

impl FalloffCurve {
    /// Gain multiplier in `[0.0, 1.0]` for a source `distance` units away.
    pub fn gain(self, distance: f32, min_distance: f32, max_distance: f32) -> f32 {
        let t = normalized_distance(distance, min_distance, max_distance);
        match self {
            Self::Linear => 1.0 - t,
            Self::Inverse => min_distance / distance.clamp(min_distance, max_distance),
            Self::Smooth => 1.0 - t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Position of `distance` within `[min_distance, max_distance]`, mapped to `[0.0, 1.0]`.
pub(crate) fn normalized_distance(distance: f32, min_distance: f32, max_distance: f32) -> f32 {
    let span = max_distance - min_distance;
    if span <= f32::EPSILON {
        return if distance > min_distance { 1.0 } else { 0.0 };
    }
    ((distance - min_distance) / span).clamp(0.0, 1.0)
}

/// Policy mapping listener-relative position to attenuation.
#[derive(Debug, Clone, PartialEq)]
pub struct AttenuationConfig {
    /// Distance falloff curve
    pub curve: FalloffCurve,
    /// Distance (world units) inside which no distance attenuation is applied.
    /// Directional terms also fade in over this radius.
    pub min_distance: f32,
    /// Distance (world units) at which the falloff curve bottoms out
    pub max_distance: f32,
    /// How much quieter a source directly behind the listener is (0.0 = none, 1.0 = silent)
    pub directional_bias: f32,
    /// How much extra muffling distance adds at `max_distance` (0.0 - 1.0)
    pub air_absorption: f32,
    /// Maximum cut of the low band in dB (positive number)
    pub low_cut_db: f32,
    /// Maximum cut of the mid band in dB (positive number)
    pub mid_cut_db: f32,
    /// Maximum cut of the high band in dB (positive number)
    pub high_cut_db: f32,
}

impl Default for AttenuationConfig {
    fn default() -> Self {
        Self {
            curve: FalloffCurve::Inverse,
            min_distance: 1.0,
            max_distance: 100.0,
            directional_bias: 0.35,
            air_absorption: 0.25,
            low_cut_db: 0.0,
            mid_cut_db: 10.0,
            high_cut_db: 30.0,
        }
    }
}

impl AttenuationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn curve(mut self, curve: FalloffCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn distance_range(mut self, min_distance: f32, max_distance: f32) -> Self {
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self
    }

    pub fn directional_bias(mut self, bias: f32) -> Self {
        self.directional_bias = bias;
        self
    }

    pub fn air_absorption(mut self, absorption: f32) -> Self {
        self.air_absorption = absorption;
        self
    }

    pub fn band_cuts_db(mut self, low: f32, mid: f32, high: f32) -> Self {
        self.low_cut_db = low;
        self.mid_cut_db = mid;
        self.high_cut_db = high;
        self
    }

    /// Checks the ranges the attenuation math relies on to stay monotonic.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_distance.is_finite() && self.min_distance > 0.0) {
            return Err(SpatialSoundError::Configuration(format!(
                "min_distance must be a positive number, got {}",
                self.min_distance
            )));
        }
        if !(self.max_distance.is_finite() && self.max_distance >= self.min_distance) {
            return Err(SpatialSoundError::Configuration(format!(
                "max_distance must be >= min_distance ({}), got {}",
                self.min_distance, self.max_distance
            )));
        }
        for (name, value) in [
            ("directional_bias", self.directional_bias),
            ("air_absorption", self.air_absorption),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SpatialSoundError::Configuration(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("low_cut_db", self.low_cut_db),
            ("mid_cut_db", self.mid_cut_db),
            ("high_cut_db", self.high_cut_db),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SpatialSoundError::Configuration(format!(
                    "{} must be a non-negative number of dB, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
