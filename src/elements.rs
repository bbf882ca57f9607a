//! Five-elements balance analysis
//!
//! Each pillar contributes its stem, its branch and its hidden stems to the
//! element totals, weighted by position. The balance score measures how far
//! the percentages stray from an even 20% split.

use crate::error::ChartError;
use crate::hidden_stems::HiddenStems;
use crate::types::{Branch, Element, ElementMap, Stem};
use serde::{Deserialize, Serialize};

/// Weight per position in a pillar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementWeights {
    pub stem: f64,
    pub branch: f64,
    pub main_hidden: f64,
    pub secondary_hidden: f64,
    pub tertiary_hidden: f64,
}

impl Default for ElementWeights {
    fn default() -> Self {
        Self {
            stem: 1.0,
            branch: 0.8,
            main_hidden: 1.0,
            secondary_hidden: 0.5,
            tertiary_hidden: 0.3,
        }
    }
}

impl ElementWeights {
    pub fn validate(&self) -> Result<(), ChartError> {
        let fields = [
            ("stem", self.stem),
            ("branch", self.branch),
            ("main_hidden", self.main_hidden),
            ("secondary_hidden", self.secondary_hidden),
            ("tertiary_hidden", self.tertiary_hidden),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ChartError::InvalidConfig(format!(
                    "element weight '{name}' must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Hidden stems fed to the analyzer for one branch.
///
/// The minor stems are explicitly optional: `None` means "not weighted", which
/// is what most charts use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenStemWeighting {
    pub main: Stem,
    pub secondary: Option<Stem>,
    pub tertiary: Option<Stem>,
}

impl HiddenStemWeighting {
    /// Only the main stem
    pub fn main_only(branch: Branch) -> Self {
        Self {
            main: HiddenStems::of(branch).main,
            secondary: None,
            tertiary: None,
        }
    }

    /// Main stem plus the minor ones: the middle stem is secondary and the
    /// initial stem tertiary; a branch without a middle stem promotes its
    /// initial stem to secondary.
    pub fn with_minor(branch: Branch) -> Self {
        let hidden = HiddenStems::of(branch);
        match hidden.middle {
            Some(middle) => Self {
                main: hidden.main,
                secondary: Some(middle),
                tertiary: Some(hidden.initial),
            },
            None => Self {
                main: hidden.main,
                secondary: Some(hidden.initial),
                tertiary: None,
            },
        }
    }

    pub fn for_branch(branch: Branch, include_minor: bool) -> Self {
        if include_minor {
            Self::with_minor(branch)
        } else {
            Self::main_only(branch)
        }
    }
}

/// One pillar's contribution to the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPillar {
    pub stem: Stem,
    pub branch: Branch,
    pub hidden: HiddenStemWeighting,
}

/// Result of the five-elements analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveElementsBalance {
    pub totals: ElementMap<f64>,
    /// Share of the grand total per element (0-100)
    pub percentages: ElementMap<f64>,
    pub dominant: Element,
    pub weakest: Element,
    /// 100 for a perfectly even split, lower as the split skews
    pub balance_score: f64,
}

/// Weight every position of the given pillars and summarize
pub fn analyze(pillars: &[WeightedPillar], weights: &ElementWeights) -> FiveElementsBalance {
    let mut totals = ElementMap::<f64>::default();

    for pillar in pillars {
        *totals.get_mut(pillar.stem.element()) += weights.stem;
        *totals.get_mut(pillar.branch.element()) += weights.branch;
        *totals.get_mut(pillar.hidden.main.element()) += weights.main_hidden;
        if let Some(stem) = pillar.hidden.secondary {
            *totals.get_mut(stem.element()) += weights.secondary_hidden;
        }
        if let Some(stem) = pillar.hidden.tertiary {
            *totals.get_mut(stem.element()) += weights.tertiary_hidden;
        }
    }

    summarize(totals)
}

/// Percentages, extremes and balance score for raw element totals
pub fn summarize(totals: ElementMap<f64>) -> FiveElementsBalance {
    let grand_total: f64 = totals.iter().map(|(_, v)| *v).sum();

    let mut percentages = ElementMap::<f64>::default();
    if grand_total > 0.0 {
        for (element, value) in totals.iter() {
            *percentages.get_mut(element) = value * 100.0 / grand_total;
        }
    }

    // Strict comparisons keep the earliest element on ties
    let mut dominant = Element::Wood;
    let mut weakest = Element::Wood;
    for (element, value) in totals.iter() {
        if *value > *totals.get(dominant) {
            dominant = element;
        }
        if *value < *totals.get(weakest) {
            weakest = element;
        }
    }

    FiveElementsBalance {
        totals,
        percentages,
        dominant,
        weakest,
        balance_score: balance_score(&percentages),
    }
}

/// `max(0, 100 - 2 * stddev)` of the percentages around the ideal 20%
pub fn balance_score(percentages: &ElementMap<f64>) -> f64 {
    let variance = percentages
        .iter()
        .map(|(_, pct)| (pct - 20.0).powi(2))
        .sum::<f64>()
        / 5.0;

    (100.0 - 2.0 * variance.sqrt()).max(0.0)
}
