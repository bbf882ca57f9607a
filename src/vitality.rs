//! Twelve-stage vitality
//!
//! A branch's life-cycle stage relative to a stem. Every stem has an embryo
//! branch (stage 0); yang stems walk forward around the branch ring, yin stems
//! walk backward.

use crate::types::{Branch, Polarity, Stem};
use serde::{Deserialize, Serialize};

/// Embryo branch index per stem (甲 .. 癸)
const EMBRYO_BRANCH: [u8; 10] = [9, 8, 0, 11, 0, 11, 3, 2, 6, 5];

/// The twelve stages in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwelveStage {
    Embryo,
    Nurture,
    Birth,
    Bathing,
    CapBelt,
    PeakApproach,
    Peak,
    Decline,
    Sickness,
    Death,
    Tomb,
    AbsoluteEnd,
}

impl TwelveStage {
    pub const ALL: [TwelveStage; 12] = [
        TwelveStage::Embryo,
        TwelveStage::Nurture,
        TwelveStage::Birth,
        TwelveStage::Bathing,
        TwelveStage::CapBelt,
        TwelveStage::PeakApproach,
        TwelveStage::Peak,
        TwelveStage::Decline,
        TwelveStage::Sickness,
        TwelveStage::Death,
        TwelveStage::Tomb,
        TwelveStage::AbsoluteEnd,
    ];

    /// Stage of `branch` as seen from `stem`
    pub const fn of(stem: Stem, branch: Branch) -> TwelveStage {
        let embryo = EMBRYO_BRANCH[stem.index() as usize] as i64;
        let target = branch.index() as i64;
        let distance = match stem.polarity() {
            Polarity::Yang => (target - embryo).rem_euclid(12),
            Polarity::Yin => (embryo - target).rem_euclid(12),
        };

        Self::ALL[distance as usize]
    }

    /// Energy score (1-12)
    pub const fn score(self) -> u32 {
        match self {
            TwelveStage::Embryo => 3,
            TwelveStage::Nurture => 6,
            TwelveStage::Birth => 9,
            TwelveStage::Bathing => 7,
            TwelveStage::CapBelt => 10,
            TwelveStage::PeakApproach => 11,
            TwelveStage::Peak => 12,
            TwelveStage::Decline => 8,
            TwelveStage::Sickness => 4,
            TwelveStage::Death => 2,
            TwelveStage::Tomb => 5,
            TwelveStage::AbsoluteEnd => 1,
        }
    }

    /// Traditional stage name
    pub const fn symbol(self) -> &'static str {
        match self {
            TwelveStage::Embryo => "胎",
            TwelveStage::Nurture => "養",
            TwelveStage::Birth => "長生",
            TwelveStage::Bathing => "沐浴",
            TwelveStage::CapBelt => "冠帯",
            TwelveStage::PeakApproach => "建禄",
            TwelveStage::Peak => "帝旺",
            TwelveStage::Decline => "衰",
            TwelveStage::Sickness => "病",
            TwelveStage::Death => "死",
            TwelveStage::Tomb => "墓",
            TwelveStage::AbsoluteEnd => "絶",
        }
    }

    /// Subsidiary star attached to the stage
    pub const fn star(self) -> &'static str {
        match self {
            TwelveStage::Embryo => "天報星",
            TwelveStage::Nurture => "天印星",
            TwelveStage::Birth => "天貴星",
            TwelveStage::Bathing => "天恍星",
            TwelveStage::CapBelt => "天南星",
            TwelveStage::PeakApproach => "天禄星",
            TwelveStage::Peak => "天将星",
            TwelveStage::Decline => "天堂星",
            TwelveStage::Sickness => "天胡星",
            TwelveStage::Death => "天極星",
            TwelveStage::Tomb => "天庫星",
            TwelveStage::AbsoluteEnd => "天馳星",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_stem_visits_every_stage_once() {
        for stem in Stem::ALL {
            let mut stages: Vec<TwelveStage> =
                Branch::ALL.iter().map(|b| TwelveStage::of(stem, *b)).collect();
            stages.sort_by_key(|s| *s as u8);
            stages.dedup();
            assert_eq!(stages.len(), 12, "stem {stem}");
        }
    }

    #[test]
    fn test_embryo_positions() {
        assert_eq!(TwelveStage::of(Stem::Jia, Branch::You), TwelveStage::Embryo);
        assert_eq!(TwelveStage::of(Stem::Bing, Branch::Zi), TwelveStage::Embryo);
        assert_eq!(TwelveStage::of(Stem::Gui, Branch::Si), TwelveStage::Embryo);
    }

    #[test]
    fn test_direction_by_polarity() {
        // 甲 is yang: 亥 is two steps forward from 酉
        assert_eq!(TwelveStage::of(Stem::Jia, Branch::Hai), TwelveStage::Birth);
        assert_eq!(TwelveStage::of(Stem::Jia, Branch::Mao), TwelveStage::Peak);
        // 乙 is yin: 午 is two steps backward from 申
        assert_eq!(TwelveStage::of(Stem::Yi, Branch::Wu), TwelveStage::Birth);
        assert_eq!(TwelveStage::of(Stem::Yi, Branch::Yin), TwelveStage::Peak);
    }

    #[test]
    fn test_scores_are_a_permutation() {
        let mut scores: Vec<u32> = TwelveStage::ALL.iter().map(|s| s.score()).collect();
        scores.sort_unstable();
        assert_eq!(scores, (1..=12).collect::<Vec<_>>());
        assert_eq!(TwelveStage::of(Stem::Jia, Branch::Mao).score(), 12);
    }
}
