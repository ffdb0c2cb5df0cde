//! Listener-relative attenuation.
//!
//! Each frame an emitter's position is turned into an [`Attenuation`]:
//!
//! - **gain**: distance falloff from the configured [`FalloffCurve`](crate::config::FalloffCurve),
//!   scaled down further for sources behind the listener
//! - **pan**: projection of the source direction onto the listener's right vector
//! - **muffle**: how much the high and mid bands are cut, driven by how far
//!   behind the listener the source is and by distance (air absorption)
//!
//! Direction-dependent terms fade in over `min_distance`, so a source passing
//! through the listener's head changes smoothly.

use crate::config::AttenuationConfig;
use crate::config::attenuation::normalized_distance;
use crate::math::{Pose, Vec3};

/// Three-band equalizer gains in dB (0.0 = unchanged, negative = cut).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Equalizer {
    pub low_db: f32,
    pub mid_db: f32,
    pub high_db: f32,
}

impl Equalizer {
    pub const FLAT: Self = Self {
        low_db: 0.0,
        mid_db: 0.0,
        high_db: 0.0,
    };
}

/// Attenuation parameter set pushed into a sound's effect chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Linear gain multiplier (0.0 = silent, 1.0 = unchanged)
    pub gain: f32,
    /// Stereo balance (-1.0 = full left, 0.0 = center, 1.0 = full right)
    pub pan: f32,
    /// Muffling amount (0.0 = none, 1.0 = full configured band cuts)
    pub muffle: f32,
    /// Per-band gains derived from `muffle`
    pub equalizer: Equalizer,
}

impl Attenuation {
    /// No attenuation at all.
    pub const UNITY: Self = Self {
        gain: 1.0,
        pan: 0.0,
        muffle: 0.0,
        equalizer: Equalizer::FLAT,
    };

    /// Gain expressed as attenuation in dB (positive = quieter).
    pub fn attenuation_db(&self) -> f32 {
        -20.0 * self.gain.max(1e-5).log10()
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Self::UNITY
    }
}

/// Computes the attenuation for a source at `source` heard from `listener`.
///
/// Pure: the same listener pose and source position always give the same result.
pub fn compute_attenuation(
    config: &AttenuationConfig,
    listener: &Pose,
    source: Vec3,
) -> Attenuation {
    let offset = source - listener.position;
    let distance = offset.length();

    let falloff = config
        .curve
        .gain(distance, config.min_distance, config.max_distance);
    let proximity = (distance / config.min_distance).min(1.0);

    let (behind, pan) = match offset.try_normalize() {
        Some(direction) => {
            let facing = listener.forward().dot(direction).clamp(-1.0, 1.0);
            let side = listener.right().dot(direction).clamp(-1.0, 1.0);
            ((1.0 - facing) * 0.5 * proximity, side * proximity)
        }
        None => (0.0, 0.0),
    };

    // 1.0 in front of the listener, 1.0 - bias directly behind
    let directional = 1.0 - config.directional_bias * behind;
    let distant = 1.0
        - config.air_absorption
            * normalized_distance(distance, config.min_distance, config.max_distance);

    let gain = (falloff * directional).clamp(0.0, 1.0);
    let muffle = (1.0 - directional * distant).clamp(0.0, 1.0);

    Attenuation {
        gain,
        pan,
        muffle,
        equalizer: Equalizer {
            low_db: -config.low_cut_db * muffle,
            mid_db: -config.mid_cut_db * muffle,
            high_db: -config.high_cut_db * muffle,
        },
    }
}
