//! Numerical energy reading
//!
//! Every stem present in the year, month and day pillars (visible stems plus
//! the energy stems of their branches) is scored by its twelve-stage score
//! against each of the three branches. A stem's score is multiplied by how
//! many times it appears, then totals are grouped by element.
//!
//! The energy stems differ from the hidden-stem spans: 子 卯 酉 contribute
//! only their main stem and 午 contributes 己 and 丁.

use crate::types::{Branch, Element, ElementMap, Pillar, Stem};
use crate::vitality::TwelveStage;
use serde::{Deserialize, Serialize};

/// Stems each branch contributes to the count, in branch order (子 .. 亥)
const ENERGY_STEMS: [&[Stem]; 12] = [
    &[Stem::Gui],
    &[Stem::Gui, Stem::Xin, Stem::Ji],
    &[Stem::Wu, Stem::Bing, Stem::Jia],
    &[Stem::Yi],
    &[Stem::Yi, Stem::Gui, Stem::Wu],
    &[Stem::Wu, Stem::Geng, Stem::Bing],
    &[Stem::Ji, Stem::Ding],
    &[Stem::Ding, Stem::Yi, Stem::Ji],
    &[Stem::Wu, Stem::Ren, Stem::Geng],
    &[Stem::Xin],
    &[Stem::Xin, Stem::Ding, Stem::Wu],
    &[Stem::Jia, Stem::Ren],
];

pub fn energy_stems(branch: Branch) -> &'static [Stem] {
    ENERGY_STEMS[branch.index() as usize]
}

/// Score of one distinct stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemEnergy {
    pub stem: Stem,
    pub element: Element,
    pub count: u32,
    /// Sum of stage scores over the three branches
    pub base: u32,
    /// `base * count`
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    /// Ordered by stem index
    pub stems: Vec<StemEnergy>,
    pub by_element: ElementMap<u32>,
    pub total: u32,
}

/// Energy of the year, month and day pillars
pub fn compute(year: Pillar, month: Pillar, day: Pillar) -> EnergyReading {
    let pillars = [year, month, day];

    let mut counts = [0u32; 10];
    for pillar in pillars {
        counts[pillar.stem().index() as usize] += 1;
        for stem in energy_stems(pillar.branch()) {
            counts[stem.index() as usize] += 1;
        }
    }

    let mut stems = Vec::new();
    let mut by_element = ElementMap::<u32>::default();
    for (stem, count) in Stem::ALL.into_iter().zip(counts) {
        if count == 0 {
            continue;
        }
        let base: u32 = pillars
            .iter()
            .map(|p| TwelveStage::of(stem, p.branch()).score())
            .sum();
        let score = base * count;
        *by_element.get_mut(stem.element()) += score;
        stems.push(StemEnergy {
            stem,
            element: stem.element(),
            count,
            base,
            score,
        });
    }

    let total = by_element.iter().map(|(_, v)| *v).sum();

    EnergyReading {
        stems,
        by_element,
        total,
    }
}
