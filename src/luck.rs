//! Great-luck and annual-luck cycles
//!
//! Great luck walks the sexagenary cycle from the month pillar, one pillar per
//! decade, forward or backward depending on year-stem polarity and gender.
//! Annual luck lists the year pillar of each calendar year in an age range.
//! Both annotate every row the same way against the natal chart.

use crate::calendar;
use crate::chart::Chart;
use crate::deities::TenDeity;
use crate::error::ChartError;
use crate::relations::{self, PhaseRelationLabel};
use crate::sexagenary;
use crate::types::{Gender, Pillar, Polarity};
use crate::vitality::TwelveStage;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Decades generated for great luck
pub const GREAT_LUCK_DECADES: usize = 10;

/// Highest age accepted for annual luck
pub const MAX_AGE: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Forward for yang-year men and yin-year women
    pub fn for_subject(year_polarity: Polarity, gender: Gender) -> Self {
        match (year_polarity, gender) {
            (Polarity::Yang, Gender::Male) | (Polarity::Yin, Gender::Female) => Direction::Forward,
            _ => Direction::Backward,
        }
    }

    pub const fn step(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Days from birth to the next boundary (forward) or back to the previous one
/// (backward)
pub fn days_to_boundary(date: NaiveDate, direction: Direction) -> u32 {
    match direction {
        Direction::Forward => calendar::days_until_boundary(date),
        Direction::Backward => calendar::days_since_boundary(date),
    }
}

/// `ceil(days / 3)` clamped to 1-10
pub fn starting_age(days_to_boundary: u32) -> u32 {
    ((days_to_boundary + 2) / 3).clamp(1, 10)
}

/// One luck pillar annotated against the natal chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuckRow {
    pub age: u32,
    /// Gregorian year in which the row starts
    pub year: i32,
    pub pillar: Pillar,
    pub ten_deity: TenDeity,
    pub twelve_stage: TwelveStage,
    pub against_day: Vec<PhaseRelationLabel>,
    pub against_month: Vec<PhaseRelationLabel>,
    pub against_year: Vec<PhaseRelationLabel>,
    /// The branch falls in the subject's own void group
    pub in_void: bool,
}

impl LuckRow {
    fn annotate(chart: &Chart, age: u32, pillar: Pillar) -> Self {
        let day_stem = chart.day_stem();
        Self {
            age,
            year: chart.birth.year() + age as i32,
            pillar,
            ten_deity: TenDeity::of(day_stem, pillar.stem()),
            twelve_stage: TwelveStage::of(day_stem, pillar.branch()),
            against_day: relations::classify(pillar, chart.day.pillar),
            against_month: relations::classify(pillar, chart.month.pillar),
            against_year: relations::classify(pillar, chart.year.pillar),
            in_void: chart.own_void.contains(pillar.branch()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreatLuck {
    pub direction: Direction,
    pub days_to_boundary: u32,
    pub starting_age: u32,
    pub rows: Vec<LuckRow>,
}

/// Ten decade pillars starting one step from the month pillar
pub fn great_luck(chart: &Chart) -> GreatLuck {
    let direction = Direction::for_subject(chart.year.pillar.stem().polarity(), chart.gender);
    let days = days_to_boundary(chart.birth.date, direction);
    let start = starting_age(days);

    tracing::debug!(
        "great luck: {:?}, {} days to boundary, starting age {}",
        direction,
        days,
        start
    );

    let rows = (0..GREAT_LUCK_DECADES)
        .map(|i| {
            let pillar = chart.month.pillar.offset(direction.step() * (i as i64 + 1));
            LuckRow::annotate(chart, i as u32 * 10 + start, pillar)
        })
        .collect();

    GreatLuck {
        direction,
        days_to_boundary: days,
        starting_age: start,
        rows,
    }
}

/// Year pillars for each age in `start_age..=end_age`
pub fn annual_luck(chart: &Chart, start_age: u32, end_age: u32) -> Result<Vec<LuckRow>, ChartError> {
    if start_age > end_age || end_age > MAX_AGE {
        return Err(ChartError::InvalidAgeRange {
            start: start_age,
            end: end_age,
        });
    }

    Ok((start_age..=end_age)
        .map(|age| {
            let pillar = sexagenary::year_pillar(chart.birth.year() + age as i32);
            LuckRow::annotate(chart, age, pillar)
        })
        .collect())
}
