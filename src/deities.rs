//! Ten Deities (day-master relations)
//!
//! Any stem is classified relative to the day stem by where its element sits
//! on the generating ring and whether the polarities match.

use crate::types::Stem;
use serde::{Deserialize, Serialize};

/// Elemental role a deity plays for the day stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeityGroup {
    /// Same element
    Companion,
    /// Element the day stem generates
    Output,
    /// Element the day stem controls
    Wealth,
    /// Element that controls the day stem
    Officer,
    /// Element that generates the day stem
    Resource,
}

/// The ten main stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenDeity {
    Kansaku,
    Sekimon,
    Hokaku,
    Chojo,
    Rokuzon,
    Shiroku,
    Shaki,
    Kengyu,
    Ryuko,
    Gyokudo,
}

impl TenDeity {
    /// Ordered by (ring distance, opposite polarity)
    pub const ALL: [TenDeity; 10] = [
        TenDeity::Kansaku,
        TenDeity::Sekimon,
        TenDeity::Hokaku,
        TenDeity::Chojo,
        TenDeity::Rokuzon,
        TenDeity::Shiroku,
        TenDeity::Shaki,
        TenDeity::Kengyu,
        TenDeity::Ryuko,
        TenDeity::Gyokudo,
    ];

    /// Classify `target` relative to `day_stem`
    pub const fn of(day_stem: Stem, target: Stem) -> TenDeity {
        let distance =
            (target.element().index() as i64 - day_stem.element().index() as i64).rem_euclid(5);
        let opposite = day_stem.index() % 2 != target.index() % 2;

        Self::ALL[distance as usize * 2 + opposite as usize]
    }

    pub const fn group(self) -> DeityGroup {
        match self {
            TenDeity::Kansaku | TenDeity::Sekimon => DeityGroup::Companion,
            TenDeity::Hokaku | TenDeity::Chojo => DeityGroup::Output,
            TenDeity::Rokuzon | TenDeity::Shiroku => DeityGroup::Wealth,
            TenDeity::Shaki | TenDeity::Kengyu => DeityGroup::Officer,
            TenDeity::Ryuko | TenDeity::Gyokudo => DeityGroup::Resource,
        }
    }

    /// True when the target shares the day stem's polarity
    pub const fn same_polarity(self) -> bool {
        (self as usize) % 2 == 0
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            TenDeity::Kansaku => "貫索星",
            TenDeity::Sekimon => "石門星",
            TenDeity::Hokaku => "鳳閣星",
            TenDeity::Chojo => "調舒星",
            TenDeity::Rokuzon => "禄存星",
            TenDeity::Shiroku => "司禄星",
            TenDeity::Shaki => "車騎星",
            TenDeity::Kengyu => "牽牛星",
            TenDeity::Ryuko => "龍高星",
            TenDeity::Gyokudo => "玉堂星",
        }
    }
}
