//! Compatibility scoring between two people
//!
//! The score is the sum of five capped sub-scores:
//!
//! | sub-score            | cap |
//! |----------------------|-----|
//! | day-stem elements    | 30  |
//! | stem combination     | 20  |
//! | day branch           | 25  |
//! | year pillar harmony  | 15  |
//! | element variety      | 10  |
//!
//! Point values come from a [`CompatibilityPolicy`]; validation keeps every
//! value inside its cap, so the total never leaves 0-100.

use crate::chart::Chart;
use crate::error::ChartError;
use crate::relations;
use crate::types::{Element, ElementRelation, Pillar};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

pub const DAY_STEM_CAP: u32 = 30;
pub const COMBINATION_CAP: u32 = 20;
pub const DAY_BRANCH_CAP: u32 = 25;
pub const YEAR_HARMONY_CAP: u32 = 15;
pub const VARIETY_CAP: u32 = 10;

/// Points awarded by each rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatibilityPolicy {
    pub day_stem_generates: u32,
    pub day_stem_generated_by: u32,
    pub day_stem_same: u32,
    pub day_stem_controlled_by: u32,
    pub day_stem_controls: u32,
    pub stem_combination: u32,
    pub day_branch_harmony: u32,
    pub day_branch_semi_triad: u32,
    pub day_branch_neutral: u32,
    pub day_branch_clash: u32,
    pub year_stem_combination: u32,
    pub year_branch_harmony: u32,
    /// Both people show at least four elements
    pub variety_rich: u32,
    /// Both people show at least three elements
    pub variety_moderate: u32,
    pub variety_poor: u32,
}

impl Default for CompatibilityPolicy {
    fn default() -> Self {
        Self {
            day_stem_generates: 30,
            day_stem_generated_by: 25,
            day_stem_same: 20,
            day_stem_controlled_by: 10,
            day_stem_controls: 5,
            stem_combination: 20,
            day_branch_harmony: 25,
            day_branch_semi_triad: 15,
            day_branch_neutral: 10,
            day_branch_clash: 0,
            year_stem_combination: 10,
            year_branch_harmony: 5,
            variety_rich: 10,
            variety_moderate: 8,
            variety_poor: 2,
        }
    }
}

impl CompatibilityPolicy {
    /// Every point value must fit its sub-score cap
    pub fn validate(&self) -> Result<(), ChartError> {
        let checks = [
            ("day_stem_generates", self.day_stem_generates, DAY_STEM_CAP),
            ("day_stem_generated_by", self.day_stem_generated_by, DAY_STEM_CAP),
            ("day_stem_same", self.day_stem_same, DAY_STEM_CAP),
            ("day_stem_controlled_by", self.day_stem_controlled_by, DAY_STEM_CAP),
            ("day_stem_controls", self.day_stem_controls, DAY_STEM_CAP),
            ("stem_combination", self.stem_combination, COMBINATION_CAP),
            ("day_branch_harmony", self.day_branch_harmony, DAY_BRANCH_CAP),
            ("day_branch_semi_triad", self.day_branch_semi_triad, DAY_BRANCH_CAP),
            ("day_branch_neutral", self.day_branch_neutral, DAY_BRANCH_CAP),
            ("day_branch_clash", self.day_branch_clash, DAY_BRANCH_CAP),
            (
                "year_stem_combination + year_branch_harmony",
                self.year_stem_combination.saturating_add(self.year_branch_harmony),
                YEAR_HARMONY_CAP,
            ),
            ("variety_rich", self.variety_rich, VARIETY_CAP),
            ("variety_moderate", self.variety_moderate, VARIETY_CAP),
            ("variety_poor", self.variety_poor, VARIETY_CAP),
        ];

        for (name, value, cap) in checks {
            if value > cap {
                return Err(ChartError::InvalidConfig(format!(
                    "compatibility '{name}' is {value}, above its cap of {cap}"
                )));
            }
        }
        Ok(())
    }
}

/// Pillars of one person, as needed for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Option<Pillar>,
}

impl PersonPillars {
    /// Parse glyph ("甲子") or romanized ("jia-zi") pillars
    pub fn parse(
        year: &str,
        month: &str,
        day: &str,
        hour: Option<&str>,
    ) -> Result<Self, ChartError> {
        Ok(Self {
            year: year.parse()?,
            month: month.parse()?,
            day: day.parse()?,
            hour: hour.map(|h| h.parse::<Pillar>()).transpose()?,
        })
    }

    fn pillars(&self, with_hour: bool) -> Vec<Pillar> {
        let mut pillars = vec![self.year, self.month, self.day];
        if with_hour {
            pillars.extend(self.hour);
        }
        pillars
    }

    /// Distinct elements across stems and branches
    fn element_variety(&self, with_hour: bool) -> usize {
        self.pillars(with_hour)
            .iter()
            .flat_map(|p| [p.stem().element(), p.branch().element()])
            .collect::<BTreeSet<Element>>()
            .len()
    }
}

impl FromStr for PersonPillars {
    type Err = ChartError;

    /// Whitespace-separated year, month, day and optional hour pillars,
    /// e.g. "癸亥 庚申 辛未 甲午"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [year, month, day] => Self::parse(year, month, day, None),
            [year, month, day, hour] => Self::parse(year, month, day, Some(*hour)),
            _ => Err(ChartError::UnknownSymbol(format!(
                "expected 3 or 4 pillars, got '{s}'"
            ))),
        }
    }
}

impl From<&Chart> for PersonPillars {
    fn from(chart: &Chart) -> Self {
        Self {
            year: chart.year.pillar,
            month: chart.month.pillar,
            day: chart.day.pillar,
            hour: Some(chart.hour.pillar),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    Good,
    Normal,
    Poor,
    Incompatible,
}

impl Rating {
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Rating::Excellent,
            70..=89 => Rating::Good,
            50..=69 => Rating::Normal,
            30..=49 => Rating::Poor,
            _ => Rating::Incompatible,
        }
    }
}

/// What contributed to the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityFinding {
    /// Element relation of the second day stem as seen from the first
    DayStemRelation(ElementRelation),
    /// Day stems combine into this element
    StemCombination(Element),
    DayBranchHarmony,
    DayBranchSemiTriad,
    DayBranchClash,
    YearStemCombination,
    YearBranchHarmony,
    ElementVariety { first: usize, second: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityBreakdown {
    pub day_stem_relation: u32,
    pub stem_combination: u32,
    pub day_branch: u32,
    pub year_harmony: u32,
    pub element_variety: u32,
}

impl CompatibilityBreakdown {
    pub fn total(&self) -> u32 {
        self.day_stem_relation
            + self.stem_combination
            + self.day_branch
            + self.year_harmony
            + self.element_variety
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    /// 0-100
    pub score: u32,
    pub rating: Rating,
    pub breakdown: CompatibilityBreakdown,
    pub findings: Vec<CompatibilityFinding>,
}

/// Score two people under a policy
pub fn score(
    first: &PersonPillars,
    second: &PersonPillars,
    policy: &CompatibilityPolicy,
) -> CompatibilityResult {
    let mut breakdown = CompatibilityBreakdown::default();
    let mut findings = Vec::new();

    let (a, b) = (first.day.stem(), second.day.stem());
    let relation = a.element().relation_to(b.element());
    breakdown.day_stem_relation = match relation {
        ElementRelation::Generates => policy.day_stem_generates,
        ElementRelation::GeneratedBy => policy.day_stem_generated_by,
        ElementRelation::Same => policy.day_stem_same,
        ElementRelation::ControlledBy => policy.day_stem_controlled_by,
        ElementRelation::Controls => policy.day_stem_controls,
    };
    findings.push(CompatibilityFinding::DayStemRelation(relation));

    if let Some(element) = relations::stem_combination_element(a, b) {
        breakdown.stem_combination = policy.stem_combination;
        findings.push(CompatibilityFinding::StemCombination(element));
    }

    let (p, q) = (first.day.branch(), second.day.branch());
    breakdown.day_branch = if relations::is_harmony(p, q) {
        findings.push(CompatibilityFinding::DayBranchHarmony);
        policy.day_branch_harmony
    } else if relations::is_semi_triad(p, q) {
        findings.push(CompatibilityFinding::DayBranchSemiTriad);
        policy.day_branch_semi_triad
    } else if relations::is_clash(p, q) {
        findings.push(CompatibilityFinding::DayBranchClash);
        policy.day_branch_clash
    } else {
        policy.day_branch_neutral
    };

    if relations::is_stem_combination(first.year.stem(), second.year.stem()) {
        breakdown.year_harmony += policy.year_stem_combination;
        findings.push(CompatibilityFinding::YearStemCombination);
    }
    if relations::is_harmony(first.year.branch(), second.year.branch()) {
        breakdown.year_harmony += policy.year_branch_harmony;
        findings.push(CompatibilityFinding::YearBranchHarmony);
    }

    let with_hour = first.hour.is_some() && second.hour.is_some();
    let (va, vb) = (
        first.element_variety(with_hour),
        second.element_variety(with_hour),
    );
    breakdown.element_variety = if va >= 4 && vb >= 4 {
        policy.variety_rich
    } else if va >= 3 && vb >= 3 {
        policy.variety_moderate
    } else {
        policy.variety_poor
    };
    findings.push(CompatibilityFinding::ElementVariety {
        first: va,
        second: vb,
    });

    let score = breakdown.total().min(100);

    CompatibilityResult {
        score,
        rating: Rating::from_score(score),
        breakdown,
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn person(year: &str, month: &str, day: &str) -> PersonPillars {
        PersonPillars::parse(year, month, day, None).unwrap()
    }

    #[test]
    fn test_breakdown_for_combining_day_stems() {
        // 甲子 and 己丑 day pillars: wood controls earth, 甲己 combine, 子丑 harmonize
        let first = person("甲子", "丙寅", "甲子");
        let second = person("乙丑", "戊寅", "己丑");
        let result = score(&first, &second, &CompatibilityPolicy::default());

        assert_eq!(result.breakdown.day_stem_relation, 5);
        assert_eq!(result.breakdown.stem_combination, 20);
        assert_eq!(result.breakdown.day_branch, 25);
        // Year 子丑 harmony without stem combination
        assert_eq!(result.breakdown.year_harmony, 5);
        assert!(result
            .findings
            .contains(&CompatibilityFinding::StemCombination(Element::Earth)));
        assert_eq!(result.score, result.breakdown.total());
    }

    #[test]
    fn test_clash_scores_zero_day_branch() {
        let first = person("甲子", "丙寅", "甲子");
        let second = person("甲子", "丙寅", "丙午");
        let result = score(&first, &second, &CompatibilityPolicy::default());
        assert_eq!(result.breakdown.day_branch, 0);
        assert_eq!(result.breakdown.day_stem_relation, 30);
        assert!(result.findings.contains(&CompatibilityFinding::DayBranchClash));
    }

    #[test]
    fn test_variety_uses_hour_only_when_both_have_it() {
        let mut first = person("甲子", "甲子", "甲子");
        let second = person("甲子", "甲子", "甲子");
        first.hour = Some("丙午".parse().unwrap());
        let result = score(&first, &second, &CompatibilityPolicy::default());
        assert!(result.findings.contains(&CompatibilityFinding::ElementVariety {
            first: 2,
            second: 2,
        }));
        assert_eq!(result.breakdown.element_variety, 2);
    }

    #[test]
    fn test_score_stays_in_range() {
        let policy = CompatibilityPolicy::default();
        let pillars: Vec<Pillar> = (0..60).step_by(7).map(Pillar::from_cycle_index).collect();
        for a in &pillars {
            for b in &pillars {
                let first = PersonPillars { year: *a, month: *b, day: *a, hour: None };
                let second = PersonPillars { year: *b, month: *a, day: *b, hour: None };
                let result = score(&first, &second, &policy);
                assert!(result.score <= 100);
                assert_eq!(result.rating, Rating::from_score(result.score));
            }
        }
    }

    #[test]
    fn test_ratings() {
        assert_eq!(Rating::from_score(100), Rating::Excellent);
        assert_eq!(Rating::from_score(90), Rating::Excellent);
        assert_eq!(Rating::from_score(89), Rating::Good);
        assert_eq!(Rating::from_score(50), Rating::Normal);
        assert_eq!(Rating::from_score(30), Rating::Poor);
        assert_eq!(Rating::from_score(29), Rating::Incompatible);
    }

    #[test]
    fn test_policy_validation() {
        assert!(CompatibilityPolicy::default().validate().is_ok());
        let policy = CompatibilityPolicy {
            day_branch_harmony: 26,
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(ChartError::InvalidConfig(_))));
        let policy = CompatibilityPolicy {
            year_stem_combination: 12,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_from_str() {
        let person: PersonPillars = "癸亥 庚申 辛未 甲午".parse().unwrap();
        assert_eq!(person.day.to_string(), "辛未");
        assert_eq!(person.hour.map(|p| p.to_string()), Some("甲午".to_string()));
        let person: PersonPillars = "jia-zi bing-yin jia-zi".parse().unwrap();
        assert_eq!(person.hour, None);
        assert!("甲子 丙寅".parse::<PersonPillars>().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_pillars() {
        assert!(PersonPillars::parse("甲子", "甲丑", "甲子", None).is_err());
        assert!(PersonPillars::parse("甲子", "丙寅", "甲子", Some("xx")).is_err());
    }
}
