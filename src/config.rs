//! Engine configuration
//!
//! Tunable weights and policies, persisted as JSON. Missing fields fall back to
//! their defaults so a config file only needs to name what it changes.

use crate::compatibility::CompatibilityPolicy;
use crate::elements::ElementWeights;
use crate::error::ChartError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Weights for the five-elements analysis
    pub element_weights: ElementWeights,
    /// Feed secondary and tertiary hidden stems to the five-elements analysis
    pub include_minor_hidden_stems: bool,
    pub compatibility: CompatibilityPolicy,
}

impl EngineConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ChartError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        tracing::debug!("loaded engine config: {:?}", config);
        Ok(config)
    }

    /// Serialize config to JSON
    pub fn to_json(&self) -> Result<String, ChartError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        self.element_weights.validate()?;
        self.compatibility.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{"include_minor_hidden_stems": true}"#).unwrap();
        assert!(config.include_minor_hidden_stems);
        assert_eq!(config.element_weights, ElementWeights::default());
        assert_eq!(config.compatibility, CompatibilityPolicy::default());
    }

    #[test]
    fn test_nested_partial_json() {
        let config =
            EngineConfig::from_json(r#"{"element_weights": {"branch": 0.5}}"#).unwrap();
        assert_eq!(config.element_weights.branch, 0.5);
        assert_eq!(config.element_weights.stem, 1.0);
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig {
            include_minor_hidden_stems: true,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = EngineConfig::from_json(r#"{"compatibility": {"stem_combination": 40}}"#)
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidConfig(_)));

        let err = EngineConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ChartError::JsonError(_)));
    }
}
