//! Pipeline orchestration
//!
//! This module provides the public API for Sanmei Core.
//! It validates raw calendar input, builds the chart and derives the luck
//! tables, relations and compatibility from it.

use crate::calendar::BirthMoment;
use crate::chart::Chart;
use crate::compatibility::{self, CompatibilityResult, PersonPillars};
use crate::config::EngineConfig;
use crate::encoder::ChartEncoder;
use crate::error::ChartError;
use crate::luck::{self, GreatLuck, LuckRow};
use crate::relations::{self, PhaseRelationLabel};
use crate::types::{Gender, Pillar};

/// Build a natal chart with the default configuration.
///
/// # Arguments
/// * `year`, `month`, `day` - Gregorian birth date
/// * `hour` - Hour of birth (0-23)
/// * `gender` - Decides the great-luck direction
///
/// # Example
/// ```
/// use sanmei_core::{compute_chart, Gender};
///
/// let chart = compute_chart(1983, 8, 11, 12, Gender::Male).unwrap();
/// assert_eq!(chart.day.pillar.to_string(), "辛未");
/// ```
pub fn compute_chart(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    gender: Gender,
) -> Result<Chart, ChartError> {
    SanmeiEngine::new().chart(year, month, day, hour, gender)
}

/// Ten decades of great luck for a chart
pub fn compute_great_luck(chart: &Chart) -> GreatLuck {
    luck::great_luck(chart)
}

/// Annual luck for every age in `start_age..=end_age`
pub fn compute_annual_luck(
    chart: &Chart,
    start_age: u32,
    end_age: u32,
) -> Result<Vec<LuckRow>, ChartError> {
    luck::annual_luck(chart, start_age, end_age)
}

/// Relations of a moving pillar against a fixed one
pub fn classify_phase_relation(moving: Pillar, fixed: Pillar) -> Vec<PhaseRelationLabel> {
    relations::classify(moving, fixed)
}

/// Compatibility under the default policy
pub fn score_compatibility(first: &PersonPillars, second: &PersonPillars) -> CompatibilityResult {
    SanmeiEngine::new().compatibility(first, second)
}

/// Engine holding a configuration.
///
/// Use this when weights or the compatibility policy differ from the defaults.
/// The engine never mutates between calls, so one instance can serve any
/// number of threads.
#[derive(Debug, Clone, Default)]
pub struct SanmeiEngine {
    config: EngineConfig,
}

impl SanmeiEngine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Replace the configuration from JSON
    pub fn load_config(&mut self, json: &str) -> Result<(), ChartError> {
        self.config = EngineConfig::from_json(json)?;
        Ok(())
    }

    /// Save the configuration to JSON
    pub fn save_config(&self) -> Result<String, ChartError> {
        self.config.to_json()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate input and build a chart
    pub fn chart(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        gender: Gender,
    ) -> Result<Chart, ChartError> {
        tracing::debug!(
            "computing chart for {}-{:02}-{:02} {}:00 {}",
            year,
            month,
            day,
            hour,
            gender.as_str()
        );
        let birth = BirthMoment::new(year, month, day, hour)?;
        Ok(Chart::build(birth, gender, &self.config))
    }

    pub fn compatibility(
        &self,
        first: &PersonPillars,
        second: &PersonPillars,
    ) -> CompatibilityResult {
        compatibility::score(first, second, &self.config.compatibility)
    }

    /// Chart, great luck and annual luck encoded as one JSON report
    pub fn report_json(
        &self,
        chart: &Chart,
        annual_range: Option<(u32, u32)>,
        pretty: bool,
    ) -> Result<String, ChartError> {
        let great = luck::great_luck(chart);
        let annual = annual_range
            .map(|(start, end)| luck::annual_luck(chart, start, end))
            .transpose()?;

        let encoder = if pretty {
            ChartEncoder::pretty()
        } else {
            ChartEncoder::new()
        };
        encoder.encode_chart(chart, Some(&great), annual.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::PhaseRelation;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compute_chart_scenarios() {
        let chart = compute_chart(1983, 8, 11, 12, Gender::Male).unwrap();
        assert_eq!(chart.year.pillar.to_string(), "癸亥");
        assert_eq!(chart.month.pillar.to_string(), "庚申");
        assert_eq!(chart.day.pillar.to_string(), "辛未");

        let chart = compute_chart(1984, 12, 2, 12, Gender::Male).unwrap();
        assert_eq!(chart.year.pillar.to_string(), "甲子");
        assert_eq!(chart.month.pillar.to_string(), "乙亥");
        assert_eq!(chart.day.pillar.to_string(), "庚午");
    }

    #[test]
    fn test_invalid_input() {
        for (month, day, hour) in [(13, 1, 0), (0, 1, 0), (2, 30, 0), (4, 31, 0), (1, 1, 24)] {
            let err = compute_chart(2000, month, day, hour, Gender::Female).unwrap_err();
            assert!(err.is_invalid_input(), "{month}-{day} {hour}h");
        }
    }

    #[test]
    fn test_idempotent_json() {
        let engine = SanmeiEngine::new();
        let render = || {
            let chart = engine.chart(1990, 3, 2, 7, Gender::Female).unwrap();
            engine.report_json(&chart, Some((0, 10)), false).unwrap()
        };
        let first = render();
        let second = render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_rejects_bad_range() {
        let engine = SanmeiEngine::new();
        let chart = engine.chart(1990, 3, 2, 7, Gender::Male).unwrap();
        let result = engine.report_json(&chart, Some((10, 0)), true);
        assert!(matches!(result, Err(ChartError::InvalidAgeRange { .. })));
    }

    #[test]
    fn test_luck_entry_points() {
        let chart = compute_chart(1984, 12, 2, 12, Gender::Male).unwrap();
        assert_eq!(compute_great_luck(&chart).rows.len(), 10);
        assert_eq!(compute_annual_luck(&chart, 20, 29).unwrap().len(), 10);
    }

    #[test]
    fn test_classify_phase_relation() {
        let labels = classify_phase_relation("甲子".parse().unwrap(), "丙午".parse().unwrap());
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].relation, PhaseRelation::Opposition);
    }

    #[test]
    fn test_engine_config_round_trip() {
        let mut engine = SanmeiEngine::new();
        engine
            .load_config(r#"{"include_minor_hidden_stems": true}"#)
            .unwrap();
        assert!(engine.config().include_minor_hidden_stems);

        let saved = engine.save_config().unwrap();
        let mut other = SanmeiEngine::new();
        other.load_config(&saved).unwrap();
        assert_eq!(other.config(), engine.config());

        assert!(engine.load_config(r#"{"element_weights": {"stem": -1}}"#).is_err());
    }

    #[test]
    fn test_with_config_validates() {
        let mut config = EngineConfig::default();
        config.compatibility.variety_rich = 11;
        assert!(SanmeiEngine::with_config(config).is_err());
    }

    #[test]
    fn test_compatibility_from_charts() {
        let a = compute_chart(1983, 8, 11, 12, Gender::Male).unwrap();
        let b = compute_chart(1984, 12, 2, 12, Gender::Female).unwrap();
        let result = score_compatibility(&PersonPillars::from(&a), &PersonPillars::from(&b));
        assert!(result.score <= 100);
        assert_eq!(result.score, result.breakdown.total());
    }
}
