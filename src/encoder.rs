//! Report encoding
//!
//! This module packages a chart and its luck tables into a versioned report
//! and serializes it to JSON. Reports carry no timestamps or random ids, so
//! the same input always encodes to the same bytes.

use crate::chart::Chart;
use crate::error::ChartError;
use crate::luck::{GreatLuck, LuckRow};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use serde::{Deserialize, Serialize};

/// Current report format version
pub const REPORT_VERSION: &str = "1.0.0";

/// Who produced a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
}

/// A chart with optional luck tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub chart: Chart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub great_luck: Option<GreatLuck>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_luck: Option<Vec<LuckRow>>,
}

/// Encoder for chart reports
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartEncoder {
    pretty: bool,
}

impl ChartEncoder {
    /// Compact JSON encoder
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Pretty-printed JSON encoder
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Assemble a report
    pub fn report(
        &self,
        chart: &Chart,
        great_luck: Option<&GreatLuck>,
        annual_luck: Option<&[LuckRow]>,
    ) -> ChartReport {
        ChartReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
            },
            chart: chart.clone(),
            great_luck: great_luck.cloned(),
            annual_luck: annual_luck.map(|rows| rows.to_vec()),
        }
    }

    /// Encode a report to JSON
    pub fn encode_report(&self, report: &ChartReport) -> Result<String, ChartError> {
        self.encode(report)
    }

    /// Encode any serializable value with this encoder's formatting
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, ChartError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// Assemble and encode in one step
    pub fn encode_chart(
        &self,
        chart: &Chart,
        great_luck: Option<&GreatLuck>,
        annual_luck: Option<&[LuckRow]>,
    ) -> Result<String, ChartError> {
        self.encode_report(&self.report(chart, great_luck, annual_luck))
    }
}
