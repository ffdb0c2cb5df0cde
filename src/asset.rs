//! Asset identifiers handed to the audio backend.

use crate::error::{Result, SpatialSoundError};

/// Validated, normalized sound asset identifier.
///
/// Accepts either a bare numeric id (`"123456789"`), which is prefixed with the
/// configured scheme, or a full URI (`"rbxassetid://123456789"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetId(String);

impl AssetId {
    pub fn parse(raw: &str, default_scheme: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SpatialSoundError::InvalidAsset("asset id is empty".into()));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SpatialSoundError::InvalidAsset(format!(
                "asset id {:?} contains whitespace or control characters",
                raw
            )));
        }

        if let Some((scheme, rest)) = raw.split_once("://") {
            let scheme_ok = !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !scheme_ok || rest.is_empty() {
                return Err(SpatialSoundError::InvalidAsset(format!(
                    "asset uri {:?} is malformed",
                    raw
                )));
            }
            return Ok(Self(raw.to_string()));
        }

        if raw.chars().all(|c| c.is_ascii_digit()) {
            return Ok(Self(format!("{}://{}", default_scheme, raw)));
        }

        Err(SpatialSoundError::InvalidAsset(format!(
            "asset id {:?} is neither numeric nor a uri",
            raw
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_gets_scheme() {
        let id = AssetId::parse("123456789", "asset").unwrap();
        assert_eq!(id.as_str(), "asset://123456789");
    }

    #[test]
    fn test_uri_is_kept() {
        let id = AssetId::parse("  rbxassetid://42 ", "asset").unwrap();
        assert_eq!(id.to_string(), "rbxassetid://42");
    }

    #[test]
    fn test_rejects_empty_and_malformed() {
        for raw in ["", "   ", "12 34", "abc", "://5", "asset://", "bad scheme://1"] {
            assert!(
                matches!(
                    AssetId::parse(raw, "asset"),
                    Err(SpatialSoundError::InvalidAsset(_))
                ),
                "{:?} should be rejected",
                raw
            );
        }
    }
}
