//! Phase relations between two pillars
//!
//! A moving pillar (luck decade, year, partner) is compared against a fixed
//! one. The checks run in a fixed order and a combined label replaces the
//! plain label it contains, so "Combo+Harmony" never also reports "Harmony".
//!
//! Symmetric branch tables store each pair once with the lower branch first;
//! lookups sort the pair before searching.

use crate::types::{Branch, Element, Pillar, Stem};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad reading of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationCategory {
    /// Binding relations
    Fusion,
    /// Splitting relations
    Separation,
    Special,
    /// Punishment, harm and break
    Caution,
}

/// Punishment subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentKind {
    /// 寅巳申 among each other
    LifeNoble,
    /// 丑戌未 among each other
    Storehouse,
    /// 子 and 卯
    Peak,
    /// 辰午酉亥 against themselves
    SelfPunishment,
}

impl PunishmentKind {
    pub const fn symbol(self) -> &'static str {
        match self {
            PunishmentKind::LifeNoble => "生貴刑",
            PunishmentKind::Storehouse => "庫気刑",
            PunishmentKind::Peak => "旺気刑",
            PunishmentKind::SelfPunishment => "自刑",
        }
    }
}

/// A named relation between two pillars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseRelation {
    /// Seven-killing stems over clashing branches
    HeavenPunishEarthClash,
    /// Clashing branches
    Opposition,
    /// Same stem over clashing branches
    ResonantTone,
    /// Identical pillars
    Unison,
    ComboHarmony,
    ComboHarm,
    StemCombo,
    Harmony,
    Punishment(PunishmentKind),
    Harm,
    Break,
    /// Two members of the same three-branch group
    SemiTriad,
}

impl PhaseRelation {
    pub const fn category(self) -> RelationCategory {
        match self {
            PhaseRelation::Harmony
            | PhaseRelation::SemiTriad
            | PhaseRelation::StemCombo
            | PhaseRelation::ComboHarmony => RelationCategory::Fusion,
            PhaseRelation::Opposition | PhaseRelation::HeavenPunishEarthClash => {
                RelationCategory::Separation
            }
            PhaseRelation::ResonantTone | PhaseRelation::Unison | PhaseRelation::ComboHarm => {
                RelationCategory::Special
            }
            PhaseRelation::Punishment(_) | PhaseRelation::Harm | PhaseRelation::Break => {
                RelationCategory::Caution
            }
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            PhaseRelation::HeavenPunishEarthClash => "天剋地冲",
            PhaseRelation::Opposition => "対冲",
            PhaseRelation::ResonantTone => "納音",
            PhaseRelation::Unison => "律音",
            PhaseRelation::ComboHarmony => "干合支合",
            PhaseRelation::ComboHarm => "干合支害",
            PhaseRelation::StemCombo => "干合",
            PhaseRelation::Harmony => "支合",
            PhaseRelation::Punishment(kind) => kind.symbol(),
            PhaseRelation::Harm => "害",
            PhaseRelation::Break => "破",
            PhaseRelation::SemiTriad => "半会",
        }
    }
}

impl fmt::Display for PhaseRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A relation tagged with its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseRelationLabel {
    pub relation: PhaseRelation,
    pub category: RelationCategory,
}

impl From<PhaseRelation> for PhaseRelationLabel {
    fn from(relation: PhaseRelation) -> Self {
        Self {
            relation,
            category: relation.category(),
        }
    }
}

const HARMONY: [(Branch, Branch); 6] = [
    (Branch::Zi, Branch::Chou),
    (Branch::Yin, Branch::Hai),
    (Branch::Mao, Branch::Xu),
    (Branch::Chen, Branch::You),
    (Branch::Si, Branch::Shen),
    (Branch::Wu, Branch::Wei),
];

/// Element produced by each harmony pair, parallel to `HARMONY`
const HARMONY_ELEMENTS: [Element; 6] = [
    Element::Earth,
    Element::Wood,
    Element::Fire,
    Element::Metal,
    Element::Water,
    Element::Fire,
];

const HARM: [(Branch, Branch); 6] = [
    (Branch::Zi, Branch::Wei),
    (Branch::Chou, Branch::Wu),
    (Branch::Yin, Branch::Si),
    (Branch::Mao, Branch::Chen),
    (Branch::Shen, Branch::Hai),
    (Branch::You, Branch::Xu),
];

const BREAK: [(Branch, Branch); 6] = [
    (Branch::Zi, Branch::You),
    (Branch::Chou, Branch::Chen),
    (Branch::Yin, Branch::Hai),
    (Branch::Mao, Branch::Wu),
    (Branch::Si, Branch::Shen),
    (Branch::Wei, Branch::Xu),
];

const TRIADS: [[Branch; 3]; 4] = [
    [Branch::Yin, Branch::Wu, Branch::Xu],
    [Branch::Si, Branch::You, Branch::Chou],
    [Branch::Shen, Branch::Zi, Branch::Chen],
    [Branch::Hai, Branch::Mao, Branch::Wei],
];

fn sorted(p: Branch, q: Branch) -> (Branch, Branch) {
    if p <= q {
        (p, q)
    } else {
        (q, p)
    }
}

fn in_table(table: &[(Branch, Branch)], p: Branch, q: Branch) -> bool {
    table.contains(&sorted(p, q))
}

pub fn is_clash(p: Branch, q: Branch) -> bool {
    p.opposite() == q
}

pub fn is_harmony(p: Branch, q: Branch) -> bool {
    in_table(&HARMONY, p, q)
}

pub fn is_harm(p: Branch, q: Branch) -> bool {
    in_table(&HARM, p, q)
}

pub fn is_break(p: Branch, q: Branch) -> bool {
    in_table(&BREAK, p, q)
}

/// Two different branches from the same three-branch group
pub fn is_semi_triad(p: Branch, q: Branch) -> bool {
    p != q
        && TRIADS
            .iter()
            .any(|group| group.contains(&p) && group.contains(&q))
}

/// Punishment subtype `q` triggers when seen from `p`
pub fn punishment(p: Branch, q: Branch) -> Option<PunishmentKind> {
    use Branch::*;

    match (p, q) {
        (Zi, Mao) | (Mao, Zi) => Some(PunishmentKind::Peak),
        (Yin, Si) | (Yin, Shen) | (Si, Yin) | (Si, Shen) | (Shen, Yin) | (Shen, Si) => {
            Some(PunishmentKind::LifeNoble)
        }
        (Chou, Xu) | (Chou, Wei) | (Xu, Chou) | (Xu, Wei) | (Wei, Chou) | (Wei, Xu) => {
            Some(PunishmentKind::Storehouse)
        }
        (Chen, Chen) | (Wu, Wu) | (You, You) | (Hai, Hai) => Some(PunishmentKind::SelfPunishment),
        _ => None,
    }
}

fn stem_distance(a: Stem, b: Stem) -> u8 {
    a.index().abs_diff(b.index())
}

pub fn is_stem_combination(a: Stem, b: Stem) -> bool {
    stem_distance(a, b) == 5
}

/// Same polarity, controlling elements
pub fn is_seven_killing(a: Stem, b: Stem) -> bool {
    matches!(stem_distance(a, b), 4 | 6)
}

/// Element a stem combination transforms into (甲己 earth, 乙庚 metal, ...)
pub fn stem_combination_element(a: Stem, b: Stem) -> Option<Element> {
    if !is_stem_combination(a, b) {
        return None;
    }
    let lower = a.index().min(b.index()) as i64;
    Some(Element::from_offset(lower + 2))
}

/// Element a branch harmony pair transforms into
pub fn branch_harmony_element(p: Branch, q: Branch) -> Option<Element> {
    let key = sorted(p, q);
    HARMONY
        .iter()
        .position(|pair| *pair == key)
        .map(|i| HARMONY_ELEMENTS[i])
}

/// Elemental relation between two heavenly stems alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemRelation {
    Combination,
    SameElement,
    Generating,
    Controlling,
}

pub fn stem_relation(a: Stem, b: Stem) -> StemRelation {
    if is_stem_combination(a, b) {
        return StemRelation::Combination;
    }
    let (x, y) = (a.element(), b.element());
    if x == y {
        StemRelation::SameElement
    } else if x.generates() == y || y.generates() == x {
        StemRelation::Generating
    } else {
        StemRelation::Controlling
    }
}

/// Classify every relation between a moving pillar and a fixed pillar
pub fn classify(moving: Pillar, fixed: Pillar) -> Vec<PhaseRelationLabel> {
    let (a, p) = (moving.stem(), moving.branch());
    let (b, q) = (fixed.stem(), fixed.branch());

    let clash = is_clash(p, q);
    let same_stem = a == b;
    let mut found: Vec<PhaseRelation> = Vec::new();

    if clash && is_seven_killing(a, b) {
        found.push(PhaseRelation::HeavenPunishEarthClash);
    } else if clash {
        found.push(PhaseRelation::Opposition);
    }

    if same_stem && clash {
        found.push(PhaseRelation::ResonantTone);
    }
    if same_stem && p == q {
        found.push(PhaseRelation::Unison);
    }

    let harmony = is_harmony(p, q);
    let harm = is_harm(p, q);
    if is_stem_combination(a, b) {
        found.push(if harmony {
            PhaseRelation::ComboHarmony
        } else if harm {
            PhaseRelation::ComboHarm
        } else {
            PhaseRelation::StemCombo
        });
    }

    if harmony && !found.contains(&PhaseRelation::ComboHarmony) {
        found.push(PhaseRelation::Harmony);
    }

    if let Some(kind) = punishment(p, q) {
        found.push(PhaseRelation::Punishment(kind));
    }

    if harm && !found.contains(&PhaseRelation::ComboHarm) {
        found.push(PhaseRelation::Harm);
    }

    if is_break(p, q) && !clash {
        found.push(PhaseRelation::Break);
    }

    if is_semi_triad(p, q) {
        found.push(PhaseRelation::SemiTriad);
    }

    found.into_iter().map(PhaseRelationLabel::from).collect()
}

/// Join label symbols for display; a dash when nothing applies
pub fn describe_labels(labels: &[PhaseRelationLabel]) -> String {
    if labels.is_empty() {
        return "―".to_string();
    }
    labels
        .iter()
        .map(|label| label.relation.symbol())
        .collect::<Vec<_>>()
        .join("・")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pillar(s: &str) -> Pillar {
        s.parse().unwrap()
    }

    fn relations(a: &str, b: &str) -> Vec<PhaseRelation> {
        classify(pillar(a), pillar(b))
            .into_iter()
            .map(|label| label.relation)
            .collect()
    }

    #[test]
    fn test_zi_wu_is_always_opposition_never_break() {
        for moving in (0..60).map(Pillar::from_cycle_index) {
            for fixed in (0..60).map(Pillar::from_cycle_index) {
                let pair = (moving.branch(), fixed.branch());
                if pair != (Branch::Zi, Branch::Wu) && pair != (Branch::Wu, Branch::Zi) {
                    continue;
                }
                let found: Vec<_> = classify(moving, fixed).into_iter().map(|l| l.relation).collect();
                assert!(
                    found.contains(&PhaseRelation::Opposition)
                        || found.contains(&PhaseRelation::HeavenPunishEarthClash),
                    "{moving} vs {fixed}"
                );
                assert!(!found.contains(&PhaseRelation::Break));
            }
        }
    }

    #[test]
    fn test_plain_opposition() {
        // 甲 vs 丙 is neither seven-killing nor combination
        assert_eq!(relations("甲子", "丙午"), vec![PhaseRelation::Opposition]);
    }

    #[test]
    fn test_heaven_punish_earth_clash() {
        // 甲 vs 庚: distance 6
        assert_eq!(
            relations("甲子", "庚午"),
            vec![PhaseRelation::HeavenPunishEarthClash]
        );
    }

    #[test]
    fn test_resonant_tone_and_unison() {
        assert_eq!(
            relations("甲子", "甲午"),
            vec![PhaseRelation::Opposition, PhaseRelation::ResonantTone]
        );
        assert_eq!(relations("丙午", "丙午"), vec![
            PhaseRelation::Unison,
            PhaseRelation::Punishment(PunishmentKind::SelfPunishment),
        ]);
    }

    #[test]
    fn test_combo_supersedes_plain_labels() {
        // 甲 and 己 combine; 子丑 is a harmony pair
        assert_eq!(relations("甲子", "己丑"), vec![PhaseRelation::ComboHarmony]);
        // 甲 and 己 combine; 子未 is a harm pair
        assert_eq!(relations("甲子", "己未"), vec![PhaseRelation::ComboHarm]);
        assert_eq!(relations("甲子", "己卯"), vec![
            PhaseRelation::StemCombo,
            PhaseRelation::Punishment(PunishmentKind::Peak),
        ]);
    }

    #[test]
    fn test_harmony_without_combo() {
        assert_eq!(relations("丙寅", "丁亥"), vec![
            PhaseRelation::Harmony,
            PhaseRelation::Break,
        ]);
    }

    #[test]
    fn test_punishment_is_directional_table() {
        assert_eq!(punishment(Branch::Yin, Branch::Si), Some(PunishmentKind::LifeNoble));
        assert_eq!(punishment(Branch::Wei, Branch::Chou), Some(PunishmentKind::Storehouse));
        assert_eq!(punishment(Branch::Zi, Branch::Zi), None);
        assert_eq!(punishment(Branch::Hai, Branch::Hai), Some(PunishmentKind::SelfPunishment));
    }

    #[test]
    fn test_semi_triad() {
        assert!(is_semi_triad(Branch::Yin, Branch::Wu));
        assert!(is_semi_triad(Branch::Chou, Branch::You));
        assert!(!is_semi_triad(Branch::Wu, Branch::Wu));
        assert!(!is_semi_triad(Branch::Zi, Branch::Wu));
        assert_eq!(relations("甲申", "丙子"), vec![PhaseRelation::SemiTriad]);
    }

    #[test]
    fn test_pair_lookups_are_symmetric() {
        for p in Branch::ALL {
            for q in Branch::ALL {
                assert_eq!(is_harmony(p, q), is_harmony(q, p));
                assert_eq!(is_harm(p, q), is_harm(q, p));
                assert_eq!(is_break(p, q), is_break(q, p));
                assert_eq!(is_clash(p, q), is_clash(q, p));
            }
        }
    }

    #[test]
    fn test_combination_elements() {
        assert_eq!(stem_combination_element(Stem::Jia, Stem::Ji), Some(Element::Earth));
        assert_eq!(stem_combination_element(Stem::Geng, Stem::Yi), Some(Element::Metal));
        assert_eq!(stem_combination_element(Stem::Bing, Stem::Xin), Some(Element::Water));
        assert_eq!(stem_combination_element(Stem::Ding, Stem::Ren), Some(Element::Wood));
        assert_eq!(stem_combination_element(Stem::Gui, Stem::Wu), Some(Element::Fire));
        assert_eq!(stem_combination_element(Stem::Jia, Stem::Yi), None);

        assert_eq!(branch_harmony_element(Branch::Hai, Branch::Yin), Some(Element::Wood));
        assert_eq!(branch_harmony_element(Branch::Wei, Branch::Wu), Some(Element::Fire));
        assert_eq!(branch_harmony_element(Branch::Zi, Branch::Wu), None);
    }

    #[test]
    fn test_stem_relation() {
        assert_eq!(stem_relation(Stem::Jia, Stem::Ji), StemRelation::Combination);
        assert_eq!(stem_relation(Stem::Jia, Stem::Yi), StemRelation::SameElement);
        assert_eq!(stem_relation(Stem::Ren, Stem::Jia), StemRelation::Generating);
        assert_eq!(stem_relation(Stem::Jia, Stem::Wu), StemRelation::Controlling);
    }

    #[test]
    fn test_categories_and_description() {
        let labels = classify(pillar("甲子"), pillar("己丑"));
        assert_eq!(labels[0].category, RelationCategory::Fusion);
        assert_eq!(describe_labels(&labels), "干合支合");
        assert_eq!(describe_labels(&[]), "―");

        let labels = classify(pillar("丙寅"), pillar("丁亥"));
        assert_eq!(describe_labels(&labels), "支合・破");
        assert_eq!(labels[1].category, RelationCategory::Caution);
    }
}
