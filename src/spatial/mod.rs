pub mod attenuation;

pub use attenuation::{Attenuation, Equalizer, compute_attenuation};
