//! Void groups (tenchusatsu)
//!
//! The sixty pillars fall into six runs of ten. Each run leaves two branches
//! unpaired with a stem; those two branches are void for anyone whose pillar
//! sits in that run.

use crate::types::{Branch, Pillar};
use serde::{Deserialize, Serialize};

/// One of the six void branch pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoidGroup {
    /// 戌亥
    XuHai,
    /// 子丑
    ZiChou,
    /// 寅卯
    YinMao,
    /// 辰巳
    ChenSi,
    /// 午未
    WuWei,
    /// 申酉
    ShenYou,
}

impl VoidGroup {
    pub const ALL: [VoidGroup; 6] = [
        VoidGroup::XuHai,
        VoidGroup::ZiChou,
        VoidGroup::YinMao,
        VoidGroup::ChenSi,
        VoidGroup::WuWei,
        VoidGroup::ShenYou,
    ];

    /// Group of a pillar: `(branch - stem) mod 12` is even for every valid
    /// pillar, and each even value names one group
    pub const fn for_pillar(pillar: Pillar) -> VoidGroup {
        let diff = (pillar.branch().index() as i64 - pillar.stem().index() as i64).rem_euclid(12);
        debug_assert!(diff % 2 == 0);

        Self::ALL[(diff / 2) as usize]
    }

    /// The two void branches
    pub const fn branches(self) -> [Branch; 2] {
        match self {
            VoidGroup::XuHai => [Branch::Xu, Branch::Hai],
            VoidGroup::ZiChou => [Branch::Zi, Branch::Chou],
            VoidGroup::YinMao => [Branch::Yin, Branch::Mao],
            VoidGroup::ChenSi => [Branch::Chen, Branch::Si],
            VoidGroup::WuWei => [Branch::Wu, Branch::Wei],
            VoidGroup::ShenYou => [Branch::Shen, Branch::You],
        }
    }

    pub fn contains(self, branch: Branch) -> bool {
        self.branches().contains(&branch)
    }

    /// Conventional label, e.g. "戌亥天中殺"
    pub fn label(self) -> String {
        let [first, second] = self.branches();
        format!("{first}{second}天中殺")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pillar_has_one_group() {
        let mut counts = [0usize; 6];
        for index in 0..60 {
            let group = VoidGroup::for_pillar(Pillar::from_cycle_index(index));
            let slot = VoidGroup::ALL.iter().position(|g| *g == group).unwrap();
            counts[slot] += 1;
        }
        // Ten pillars per group
        assert_eq!(counts, [10; 6]);
    }

    #[test]
    fn test_group_boundaries() {
        // 甲子 .. 癸酉 leave 戌亥 void
        assert_eq!(VoidGroup::for_pillar("甲子".parse().unwrap()), VoidGroup::XuHai);
        assert_eq!(VoidGroup::for_pillar("癸酉".parse().unwrap()), VoidGroup::XuHai);
        assert_eq!(VoidGroup::for_pillar("甲戌".parse().unwrap()), VoidGroup::ShenYou);
        assert_eq!(VoidGroup::for_pillar("乙亥".parse().unwrap()), VoidGroup::ShenYou);
        assert_eq!(VoidGroup::for_pillar("庚午".parse().unwrap()), VoidGroup::XuHai);
        assert_eq!(VoidGroup::for_pillar("甲寅".parse().unwrap()), VoidGroup::ZiChou);
    }

    #[test]
    fn test_contains_and_label() {
        assert!(VoidGroup::WuWei.contains(Branch::Wei));
        assert!(!VoidGroup::WuWei.contains(Branch::Shen));
        assert_eq!(VoidGroup::XuHai.label(), "戌亥天中殺");
    }
}
