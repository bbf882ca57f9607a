//! Error types for the sanmei engine

use thiserror::Error;

/// Errors that can occur while building a chart or its annotations
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid hour: {0} (expected 0-23)")]
    InvalidHour(u32),

    #[error("Invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("Invalid age range: {start}..={end}")]
    InvalidAgeRange { start: u32, end: u32 },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Invalid pillar: {0}")]
    InvalidPillar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ChartError {
    /// True for malformed caller input (bad calendar values, unparseable
    /// symbols, impossible stem/branch pairs).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            ChartError::InvalidMonth(_)
                | ChartError::InvalidHour(_)
                | ChartError::InvalidDate { .. }
                | ChartError::InvalidAgeRange { .. }
                | ChartError::UnknownSymbol(_)
                | ChartError::InvalidPillar(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(ChartError::InvalidHour(24).is_invalid_input());
        assert!(ChartError::InvalidDate {
            year: 2023,
            month: 2,
            day: 29
        }
        .is_invalid_input());
        assert!(!ChartError::InvalidConfig("weights".to_string()).is_invalid_input());
    }

    #[test]
    fn test_error_messages() {
        let err = ChartError::InvalidDate {
            year: 2023,
            month: 2,
            day: 30,
        };
        assert_eq!(err.to_string(), "Invalid date: 2023-02-30");
        assert_eq!(
            ChartError::InvalidMonth(13).to_string(),
            "Invalid month: 13 (expected 1-12)"
        );
    }
}
