//! Sanmei Core - deterministic sexagenary chart engine
//!
//! Turns a Gregorian birth moment into a Four Pillars chart through a fixed
//! pipeline: solar-month calendar → sexagenary pillars → hidden stems →
//! deity, vitality and void annotations → luck cycles and phase relations.
//!
//! ## Modules
//!
//! - **Chart**: pillars, hidden stems, the star chart and element balance
//! - **Luck**: great-luck decades and annual luck, annotated against the chart
//! - **Relations**: phase relations between pillars and compatibility scoring

pub mod calendar;
pub mod chart;
pub mod compatibility;
pub mod config;
pub mod deities;
pub mod elements;
pub mod encoder;
pub mod energy;
pub mod error;
pub mod hidden_stems;
pub mod luck;
pub mod pipeline;
pub mod relations;
pub mod sexagenary;
pub mod types;
pub mod vitality;
pub mod void_group;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use calendar::BirthMoment;
pub use chart::{Chart, ChartPillar, PillarPosition, StarChart};
pub use compatibility::{CompatibilityPolicy, CompatibilityResult, PersonPillars, Rating};
pub use config::EngineConfig;
pub use deities::TenDeity;
pub use error::ChartError;
pub use luck::{GreatLuck, LuckRow};
pub use pipeline::{
    classify_phase_relation, compute_annual_luck, compute_chart, compute_great_luck,
    score_compatibility, SanmeiEngine,
};
pub use relations::{PhaseRelation, PhaseRelationLabel};
pub use types::{Branch, Element, Gender, Pillar, Polarity, Stem};
pub use vitality::TwelveStage;
pub use void_group::VoidGroup;

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "sanmei-core";
