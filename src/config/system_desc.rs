use super::AttenuationConfig;
use crate::error::{Result, SpatialSoundError};

/// Configuration descriptor for a spatial sound system
#[derive(Debug, Clone)]
pub struct SpatialSoundDesc {
    /// Attenuation policy shared by every emitter
    pub attenuation: AttenuationConfig,
    /// Maximum number of emitters registered at once (pending registrations included)
    pub max_emitters: usize,
    /// URI scheme prepended to bare numeric asset ids (`"123"` becomes `"asset://123"`)
    pub asset_scheme: String,
    /// Start created sounds as soon as they are constructed
    pub autoplay: bool,
}

impl Default for SpatialSoundDesc {
    fn default() -> Self {
        Self {
            attenuation: AttenuationConfig::default(),
            max_emitters: 256,
            asset_scheme: "asset".to_string(),
            autoplay: true,
        }
    }
}

impl SpatialSoundDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attenuation(mut self, attenuation: AttenuationConfig) -> Self {
        self.attenuation = attenuation;
        self
    }

    pub fn max_emitters(mut self, max: usize) -> Self {
        self.max_emitters = max;
        self
    }

    pub fn asset_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.asset_scheme = scheme.into();
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.attenuation.validate()?;
        if self.max_emitters == 0 {
            return Err(SpatialSoundError::Configuration(
                "max_emitters must be at least 1".into(),
            ));
        }
        if self.asset_scheme.is_empty()
            || !self
                .asset_scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(SpatialSoundError::Configuration(format!(
                "asset_scheme {:?} is not a valid URI scheme",
                self.asset_scheme
            )));
        }
        Ok(())
    }
}
