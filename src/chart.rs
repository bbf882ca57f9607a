//! Natal chart construction
//!
//! A [`Chart`] is built once from a validated birth moment and never changes
//! afterwards. It holds the four pillars with their annotations, the star
//! chart, the five-elements balance, the energy reading and both void groups.

use crate::calendar::{self, BirthMoment, SolarMonth};
use crate::config::EngineConfig;
use crate::deities::TenDeity;
use crate::elements::{self, FiveElementsBalance, HiddenStemWeighting, WeightedPillar};
use crate::energy::{self, EnergyReading};
use crate::hidden_stems::{self, HiddenStems};
use crate::sexagenary;
use crate::types::{Gender, Pillar, Stem};
use crate::vitality::TwelveStage;
use crate::void_group::VoidGroup;
use serde::{Deserialize, Serialize};

/// Position of a pillar in the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarPosition {
    Year,
    Month,
    Day,
    Hour,
}

/// A natal pillar with its annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPillar {
    pub pillar: Pillar,
    /// Hidden stem active at birth, picked by days since the boundary
    pub hidden_stem: Stem,
    pub hidden_candidates: HiddenStems,
    /// Ten Deity of the visible stem against the day stem
    pub stem_deity: TenDeity,
    /// Ten Deity of the active hidden stem against the day stem
    pub hidden_deity: TenDeity,
    /// Twelve Stage of the branch against the day stem
    pub stage: TwelveStage,
}

impl ChartPillar {
    fn annotate(pillar: Pillar, day_stem: Stem, elapsed_days: u32) -> Self {
        let hidden_stem = hidden_stems::resolve(pillar.branch(), elapsed_days);
        Self {
            pillar,
            hidden_stem,
            hidden_candidates: HiddenStems::of(pillar.branch()),
            stem_deity: TenDeity::of(day_stem, pillar.stem()),
            hidden_deity: TenDeity::of(day_stem, hidden_stem),
            stage: TwelveStage::of(day_stem, pillar.branch()),
        }
    }
}

/// Main stars on the five body positions and subsidiary stars on three
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarChart {
    pub north: TenDeity,
    pub south: TenDeity,
    pub east: TenDeity,
    pub west: TenDeity,
    pub center: TenDeity,
    pub start: TwelveStage,
    pub middle: TwelveStage,
    pub end: TwelveStage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub birth: BirthMoment,
    pub gender: Gender,
    pub solar_month: SolarMonth,
    /// Boundary day of the birth's Gregorian month
    pub boundary_day: u32,
    pub days_since_boundary: u32,
    pub year: ChartPillar,
    pub month: ChartPillar,
    pub day: ChartPillar,
    pub hour: ChartPillar,
    pub star_chart: StarChart,
    pub five_elements: FiveElementsBalance,
    pub energy: EnergyReading,
    /// Void group of the day pillar (the subject's own)
    pub own_void: VoidGroup,
    /// Void group of the year pillar
    pub year_void: VoidGroup,
}

impl Chart {
    pub fn build(birth: BirthMoment, gender: Gender, config: &EngineConfig) -> Self {
        let solar_month = SolarMonth::of(birth.date);
        let elapsed = calendar::days_since_boundary(birth.date);

        let year = sexagenary::year_pillar(solar_month.year);
        let month = sexagenary::month_pillar(year.stem(), solar_month);
        let day = sexagenary::day_pillar(birth.date);
        let hour = sexagenary::hour_pillar(day.stem(), birth.hour);
        let day_stem = day.stem();

        tracing::debug!(
            "chart pillars for {} {}:00: {} {} {} {}",
            birth.date,
            birth.hour,
            year,
            month,
            day,
            hour
        );

        let year = ChartPillar::annotate(year, day_stem, elapsed);
        let month = ChartPillar::annotate(month, day_stem, elapsed);
        let day = ChartPillar::annotate(day, day_stem, elapsed);
        let hour = ChartPillar::annotate(hour, day_stem, elapsed);

        let star_chart = StarChart {
            north: year.stem_deity,
            south: month.stem_deity,
            east: year.hidden_deity,
            west: day.hidden_deity,
            center: month.hidden_deity,
            start: year.stage,
            middle: month.stage,
            end: day.stage,
        };

        let weighted: Vec<WeightedPillar> = [&year, &month, &day, &hour]
            .iter()
            .map(|p| WeightedPillar {
                stem: p.pillar.stem(),
                branch: p.pillar.branch(),
                hidden: HiddenStemWeighting::for_branch(
                    p.pillar.branch(),
                    config.include_minor_hidden_stems,
                ),
            })
            .collect();
        let five_elements = elements::analyze(&weighted, &config.element_weights);

        Self {
            birth,
            gender,
            solar_month,
            boundary_day: calendar::boundary_day(birth.month()),
            days_since_boundary: elapsed,
            star_chart,
            five_elements,
            energy: energy::compute(year.pillar, month.pillar, day.pillar),
            own_void: VoidGroup::for_pillar(day.pillar),
            year_void: VoidGroup::for_pillar(year.pillar),
            year,
            month,
            day,
            hour,
        }
    }

    pub fn day_stem(&self) -> Stem {
        self.day.pillar.stem()
    }

    /// Pillars in year, month, day, hour order
    pub fn pillars(&self) -> [Pillar; 4] {
        [
            self.year.pillar,
            self.month.pillar,
            self.day.pillar,
            self.hour.pillar,
        ]
    }

    pub fn pillar(&self, position: PillarPosition) -> &ChartPillar {
        match position {
            PillarPosition::Year => &self.year,
            PillarPosition::Month => &self.month,
            PillarPosition::Day => &self.day,
            PillarPosition::Hour => &self.hour,
        }
    }
}
