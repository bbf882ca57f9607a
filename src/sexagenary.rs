//! Sexagenary cycle resolution
//!
//! Year, month, day and hour pillars are derived with epoch-anchored modular
//! arithmetic:
//! - year: 1924 is 甲子
//! - month: the tiger month's stem follows from the year stem
//! - day: 1900-01-01 sits at cycle offset 10 (甲戌)
//! - hour: two-hour branches starting at 23:00, stem following from the day stem

use crate::calendar::SolarMonth;
use crate::types::{Branch, Pillar, Stem};
use chrono::{Datelike, NaiveDate};

/// Astrological year whose pillar is 甲子
pub const YEAR_EPOCH: i64 = 1924;

/// Cycle offset of the day epoch below
pub const DAY_EPOCH_OFFSET: i64 = 10;

/// Year pillar for an astrological year
pub fn year_pillar(astro_year: i32) -> Pillar {
    Pillar::from_cycle_index(astro_year as i64 - YEAR_EPOCH)
}

/// Month pillar for a solar month, given that year's stem
pub fn month_pillar(year_stem: Stem, month: SolarMonth) -> Pillar {
    let offset = month.offset_from_tiger() as i64;
    let tiger_stem = (year_stem.index() as i64 % 5) * 2 + 2;

    pillar_from_parts(
        Stem::from_offset(tiger_stem + offset),
        Branch::from_offset(offset + 2),
    )
}

/// Day pillar by whole days elapsed since 1900-01-01
pub fn day_pillar(date: NaiveDate) -> Pillar {
    Pillar::from_cycle_index(DAY_EPOCH_OFFSET + days_since_epoch(date))
}

/// Hour pillar for an hour of day (0-23), given the day stem
pub fn hour_pillar(day_stem: Stem, hour: u32) -> Pillar {
    let branch = hour_branch(hour);
    let zi_stem = (day_stem.index() as i64 % 5) * 2;

    pillar_from_parts(
        Stem::from_offset(zi_stem + branch.index() as i64),
        branch,
    )
}

/// Two-hour branch: 23:00-00:59 is 子, 01:00-02:59 is 丑, ...
pub fn hour_branch(hour: u32) -> Branch {
    Branch::from_offset(((hour as i64 + 1) / 2) % 12)
}

/// 1900-01-01 counted from 0001-01-01 = day 1 (proleptic Gregorian)
const DAY_EPOCH_FROM_CE: i64 = 693_596;

fn days_since_epoch(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - DAY_EPOCH_FROM_CE
}

/// Both start stems are yang and both offsets move stem and branch together,
/// so the parity always matches.
fn pillar_from_parts(stem: Stem, branch: Branch) -> Pillar {
    match Pillar::new(stem, branch) {
        Ok(pillar) => pillar,
        Err(e) => unreachable!("sexagenary arithmetic produced {e}"),
    }
}
