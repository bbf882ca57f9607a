//! Core types for the sanmei engine
//!
//! This module defines the closed enumerations every calculation is built on:
//! the five elements, the ten heavenly stems, the twelve earthly branches, and
//! the sexagenary pillar pairing a stem with a branch of the same polarity.
//! All fixed tables elsewhere in the crate are indexed by these types, so a
//! lookup can never fall outside its table.

use crate::error::ChartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five elements, in generating-cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// All elements in declaration order (wood → fire → earth → metal → water)
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Element at `offset` steps around the generating ring (wraps in both directions)
    pub const fn from_offset(offset: i64) -> Element {
        Self::ALL[offset.rem_euclid(5) as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// The element this one generates (wood → fire → earth → metal → water → wood)
    pub const fn generates(self) -> Element {
        Self::from_offset(self as i64 + 1)
    }

    /// The element this one controls (wood → earth → water → fire → metal → wood)
    pub const fn controls(self) -> Element {
        Self::from_offset(self as i64 + 2)
    }

    /// Relationship of `other` as seen from `self`
    pub const fn relation_to(self, other: Element) -> ElementRelation {
        match (other as i64 - self as i64).rem_euclid(5) {
            0 => ElementRelation::Same,
            1 => ElementRelation::Generates,
            2 => ElementRelation::Controls,
            3 => ElementRelation::ControlledBy,
            _ => ElementRelation::GeneratedBy,
        }
    }
}

/// Relationship between two elements along the generating and controlling cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRelation {
    /// Both sides share the element
    Same,
    /// The subject generates the other
    Generates,
    /// The other generates the subject
    GeneratedBy,
    /// The subject controls the other
    Controls,
    /// The other controls the subject
    ControlledBy,
}

/// Yin/yang polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    const fn from_parity(index: u8) -> Polarity {
        if index % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

/// Subject gender, which only influences the great-luck direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(ChartError::UnknownSymbol(format!("gender '{other}'"))),
        }
    }
}

const STEM_SYMBOLS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
const STEM_NAMES: [&str; 10] = [
    "jia", "yi", "bing", "ding", "wu", "ji", "geng", "xin", "ren", "gui",
];

/// The ten heavenly stems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

impl Stem {
    /// All stems in cycle order (甲 = 0 .. 癸 = 9)
    pub const ALL: [Stem; 10] = [
        Stem::Jia,
        Stem::Yi,
        Stem::Bing,
        Stem::Ding,
        Stem::Wu,
        Stem::Ji,
        Stem::Geng,
        Stem::Xin,
        Stem::Ren,
        Stem::Gui,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Stem at `offset` positions from 甲, wrapping in both directions
    pub const fn from_offset(offset: i64) -> Stem {
        Self::ALL[offset.rem_euclid(10) as usize]
    }

    /// Consecutive stem pairs share an element: 甲乙 wood, 丙丁 fire, ...
    pub const fn element(self) -> Element {
        Element::ALL[self as usize / 2]
    }

    pub const fn polarity(self) -> Polarity {
        Polarity::from_parity(self as u8)
    }

    pub const fn symbol(self) -> &'static str {
        STEM_SYMBOLS[self as usize]
    }

    pub const fn name(self) -> &'static str {
        STEM_NAMES[self as usize]
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Stem {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Stem::ALL
            .iter()
            .copied()
            .find(|stem| stem.symbol() == s || stem.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ChartError::UnknownSymbol(format!("stem '{s}'")))
    }
}

const BRANCH_SYMBOLS: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];
const BRANCH_NAMES: [&str; 12] = [
    "zi", "chou", "yin", "mao", "chen", "si", "wu", "wei", "shen", "you", "xu", "hai",
];
const BRANCH_ELEMENTS: [Element; 12] = [
    Element::Water,
    Element::Earth,
    Element::Wood,
    Element::Wood,
    Element::Earth,
    Element::Fire,
    Element::Fire,
    Element::Earth,
    Element::Metal,
    Element::Metal,
    Element::Earth,
    Element::Water,
];

/// The twelve earthly branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

impl Branch {
    /// All branches in cycle order (子 = 0 .. 亥 = 11)
    pub const ALL: [Branch; 12] = [
        Branch::Zi,
        Branch::Chou,
        Branch::Yin,
        Branch::Mao,
        Branch::Chen,
        Branch::Si,
        Branch::Wu,
        Branch::Wei,
        Branch::Shen,
        Branch::You,
        Branch::Xu,
        Branch::Hai,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Branch at `offset` positions from 子, wrapping in both directions
    pub const fn from_offset(offset: i64) -> Branch {
        Self::ALL[offset.rem_euclid(12) as usize]
    }

    pub const fn element(self) -> Element {
        BRANCH_ELEMENTS[self as usize]
    }

    pub const fn polarity(self) -> Polarity {
        Polarity::from_parity(self as u8)
    }

    /// The branch directly across the twelve-branch ring
    pub const fn opposite(self) -> Branch {
        Self::from_offset(self as i64 + 6)
    }

    pub const fn symbol(self) -> &'static str {
        BRANCH_SYMBOLS[self as usize]
    }

    pub const fn name(self) -> &'static str {
        BRANCH_NAMES[self as usize]
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Branch {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Branch::ALL
            .iter()
            .copied()
            .find(|branch| branch.symbol() == s || branch.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ChartError::UnknownSymbol(format!("branch '{s}'")))
    }
}

/// A sexagenary stem/branch pair.
///
/// Only the 60 pairs whose stem and branch share polarity exist; the fields are
/// private so every constructed value upholds that invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPillar")]
pub struct Pillar {
    stem: Stem,
    branch: Branch,
}

#[derive(Deserialize)]
struct RawPillar {
    stem: Stem,
    branch: Branch,
}

impl TryFrom<RawPillar> for Pillar {
    type Error = ChartError;

    fn try_from(raw: RawPillar) -> Result<Self, Self::Error> {
        Pillar::new(raw.stem, raw.branch)
    }
}

impl Pillar {
    /// Pair a stem with a branch, rejecting mixed-polarity combinations
    pub fn new(stem: Stem, branch: Branch) -> Result<Self, ChartError> {
        if stem.index() % 2 != branch.index() % 2 {
            return Err(ChartError::InvalidPillar(format!(
                "{}{} mixes yang and yin",
                stem.symbol(),
                branch.symbol()
            )));
        }
        Ok(Self { stem, branch })
    }

    /// Pillar at `offset` positions from 甲子 in the sexagenary cycle
    pub const fn from_cycle_index(offset: i64) -> Self {
        let index = offset.rem_euclid(60);
        Self {
            stem: Stem::from_offset(index),
            branch: Branch::from_offset(index),
        }
    }

    /// Position in the sexagenary cycle (甲子 = 0 .. 癸亥 = 59)
    pub const fn cycle_index(self) -> u8 {
        (6 * self.stem as i64 - 5 * self.branch as i64).rem_euclid(60) as u8
    }

    /// Step through the cycle; both indices move together, preserving parity
    pub const fn offset(self, steps: i64) -> Self {
        Self::from_cycle_index(self.cycle_index() as i64 + steps)
    }

    pub const fn next(self) -> Self {
        self.offset(1)
    }

    pub const fn prev(self) -> Self {
        self.offset(-1)
    }

    pub const fn stem(self) -> Stem {
        self.stem
    }

    pub const fn branch(self) -> Branch {
        self.branch
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem.symbol(), self.branch.symbol())
    }
}

impl FromStr for Pillar {
    type Err = ChartError;

    /// Accepts two glyphs ("甲子") or romanized names joined by '-' ("jia-zi")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (stem, branch) = match s.split_once('-') {
            Some((stem, branch)) => (stem, branch),
            None => {
                let mut chars = s.char_indices();
                match (chars.next(), chars.next()) {
                    (Some(_), Some((split, _))) => s.split_at(split),
                    _ => return Err(ChartError::UnknownSymbol(format!("pillar '{s}'"))),
                }
            }
        };
        Pillar::new(stem.parse()?, branch.parse()?)
    }
}

/// One value per element, iterated in declaration order
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMap<T> {
    pub wood: T,
    pub fire: T,
    pub earth: T,
    pub metal: T,
    pub water: T,
}

impl<T> ElementMap<T> {
    pub fn get(&self, element: Element) -> &T {
        match element {
            Element::Wood => &self.wood,
            Element::Fire => &self.fire,
            Element::Earth => &self.earth,
            Element::Metal => &self.metal,
            Element::Water => &self.water,
        }
    }

    pub fn get_mut(&mut self, element: Element) -> &mut T {
        match element {
            Element::Wood => &mut self.wood,
            Element::Fire => &mut self.fire,
            Element::Earth => &mut self.earth,
            Element::Metal => &mut self.metal,
            Element::Water => &mut self.water,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Element, &T)> + '_ {
        Element::ALL.into_iter().map(move |element| (element, self.get(element)))
    }
}
