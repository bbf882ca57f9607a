//! Hidden stem resolution
//!
//! Each branch carries up to three hidden stems, each active for a span of days
//! after the solar-term boundary. Spans sum to 31 days for every branch; the
//! last entry is the branch's main stem and also covers any days past the end
//! of the table.

use crate::types::{Branch, Stem};
use serde::{Deserialize, Serialize};

/// A hidden stem and the number of days it governs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiddenStemSpan {
    pub stem: Stem,
    pub days: u32,
}

const fn span(stem: Stem, days: u32) -> HiddenStemSpan {
    HiddenStemSpan { stem, days }
}

/// Hidden stem spans per branch, in branch order (子 .. 亥)
pub static HIDDEN_STEM_TABLE: [&[HiddenStemSpan]; 12] = [
    &[span(Stem::Ren, 10), span(Stem::Gui, 21)],
    &[span(Stem::Gui, 9), span(Stem::Xin, 3), span(Stem::Ji, 19)],
    &[span(Stem::Wu, 7), span(Stem::Bing, 7), span(Stem::Jia, 17)],
    &[span(Stem::Jia, 10), span(Stem::Yi, 21)],
    &[span(Stem::Yi, 9), span(Stem::Gui, 3), span(Stem::Wu, 19)],
    &[span(Stem::Wu, 5), span(Stem::Geng, 9), span(Stem::Bing, 17)],
    &[span(Stem::Bing, 10), span(Stem::Ding, 9), span(Stem::Ji, 12)],
    &[span(Stem::Ding, 9), span(Stem::Yi, 3), span(Stem::Ji, 19)],
    &[span(Stem::Wu, 7), span(Stem::Ren, 7), span(Stem::Geng, 17)],
    &[span(Stem::Geng, 10), span(Stem::Xin, 21)],
    &[span(Stem::Xin, 9), span(Stem::Ding, 3), span(Stem::Wu, 19)],
    &[span(Stem::Jia, 7), span(Stem::Ren, 24)],
];

/// Spans for a branch in activation order
pub fn spans(branch: Branch) -> &'static [HiddenStemSpan] {
    HIDDEN_STEM_TABLE[branch.index() as usize]
}

/// Hidden stem governing `branch` after `elapsed_days` since the boundary.
///
/// Scans cumulative thresholds in order; when `elapsed_days` reaches past the
/// last threshold the main stem applies.
pub fn resolve(branch: Branch, elapsed_days: u32) -> Stem {
    let table = spans(branch);
    let mut threshold = 0;

    for entry in table {
        threshold += entry.days;
        if elapsed_days < threshold {
            return entry.stem;
        }
    }

    main_stem(branch)
}

/// The branch's main stem (last table entry)
pub fn main_stem(branch: Branch) -> Stem {
    let table = spans(branch);
    table[table.len() - 1].stem
}

/// All hidden stems of a branch, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenStems {
    pub initial: Stem,
    /// Only branches with three hidden stems have a middle one
    pub middle: Option<Stem>,
    pub main: Stem,
}

impl HiddenStems {
    pub fn of(branch: Branch) -> Self {
        match spans(branch) {
            [initial, middle, main] => Self {
                initial: initial.stem,
                middle: Some(middle.stem),
                main: main.stem,
            },
            [initial, main] => Self {
                initial: initial.stem,
                middle: None,
                main: main.stem,
            },
            other => unreachable!("hidden stem table has {} entries", other.len()),
        }
    }

    /// Stems in activation order
    pub fn iter(&self) -> impl Iterator<Item = Stem> {
        [Some(self.initial), self.middle, Some(self.main)]
            .into_iter()
            .flatten()
    }
}
