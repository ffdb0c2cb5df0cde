pub(crate) mod attenuation;
mod system_desc;

pub use attenuation::{AttenuationConfig, FalloffCurve};
pub use system_desc::SpatialSoundDesc;
