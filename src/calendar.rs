//! Calendar normalization
//!
//! This module maps Gregorian dates onto solar months. A solar month starts on
//! the day its solar term begins; dates before that day still belong to the
//! previous month.
//!
//! The boundary days come from a fixed table (one day per Gregorian month, the
//! same for every year). Real solar-term boundaries drift by about a day from
//! year to year, so births within a day of a boundary can land in the
//! neighbouring month. This is an accepted precision limit of the engine and is
//! never reported as an error.

use crate::error::ChartError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of the month on which each Gregorian month's solar term begins (Jan..Dec)
pub const SOLAR_TERM_BOUNDARY_DAYS: [u32; 12] = [6, 4, 6, 5, 6, 6, 7, 8, 8, 9, 8, 7];

/// Solar-term boundary day for a Gregorian month, the same in every year
/// (accurate to about one day)
pub fn boundary_day(month: u32) -> u32 {
    SOLAR_TERM_BOUNDARY_DAYS[((month + 11) % 12) as usize]
}

/// A validated birth date and hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBirthMoment")]
pub struct BirthMoment {
    /// Calendar date (no time zone; all day arithmetic is on plain dates)
    pub date: NaiveDate,
    /// Hour of day (0-23)
    pub hour: u32,
}

#[derive(Deserialize)]
struct RawBirthMoment {
    date: NaiveDate,
    hour: u32,
}

impl TryFrom<RawBirthMoment> for BirthMoment {
    type Error = ChartError;

    fn try_from(raw: RawBirthMoment) -> Result<Self, Self::Error> {
        Self::new(raw.date.year(), raw.date.month(), raw.date.day(), raw.hour)
    }
}

impl BirthMoment {
    /// Validate raw calendar input
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Result<Self, ChartError> {
        if !(1..=12).contains(&month) {
            return Err(ChartError::InvalidMonth(month));
        }
        if hour > 23 {
            return Err(ChartError::InvalidHour(hour));
        }
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(ChartError::InvalidDate { year, month, day })?;

        Ok(Self { date, hour })
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// The solar month governing a date.
///
/// `month` keeps Gregorian numbering of the month whose boundary opened it, so
/// February (the tiger month) is 2 and a date on January 3rd belongs to
/// `{ year: previous, month: 12 }`. `year` is the astrological year used for
/// the year pillar: it only rolls back for dates before January's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolarMonth {
    pub year: i32,
    pub month: u32,
}

impl SolarMonth {
    /// Normalize a date: before the month's boundary day, roll back one month
    /// (and one year when rolling back from January)
    pub fn of(date: NaiveDate) -> Self {
        let (year, month, day) = (date.year(), date.month(), date.day());
        if day < boundary_day(month) {
            let (year, month) = previous_month(year, month);
            Self { year, month }
        } else {
            Self { year, month }
        }
    }

    /// Months elapsed since the tiger month (tiger = 0 .. ox = 11)
    pub const fn offset_from_tiger(self) -> u32 {
        (self.month + 10) % 12
    }

    /// Astrological month number (tiger = 1 .. ox = 12)
    pub const fn ordinal(self) -> u32 {
        self.offset_from_tiger() + 1
    }
}

/// Number of days in a Gregorian month
pub fn month_length(year: i32, month: u32) -> u32 {
    match month {
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Days elapsed since the most recent solar-term boundary (0 on the boundary day)
pub fn days_since_boundary(date: NaiveDate) -> u32 {
    let (year, month, day) = (date.year(), date.month(), date.day());
    let boundary = boundary_day(month);

    if day >= boundary {
        day - boundary
    } else {
        let (prev_year, prev_month) = previous_month(year, month);
        month_length(prev_year, prev_month) - boundary_day(prev_month) + day
    }
}

/// Days remaining until the next solar-term boundary
pub fn days_until_boundary(date: NaiveDate) -> u32 {
    let (year, month, day) = (date.year(), date.month(), date.day());
    let boundary = boundary_day(month);

    if day >= boundary {
        let (next_year, next_month) = next_month(year, month);
        month_length(year, month) - day + boundary_day(next_month)
    } else {
        boundary - day
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_birth_moment_validation() {
        assert!(BirthMoment::new(1983, 8, 11, 12).is_ok());
        assert!(matches!(
            BirthMoment::new(1983, 13, 1, 0),
            Err(ChartError::InvalidMonth(13))
        ));
        assert!(matches!(
            BirthMoment::new(1983, 8, 11, 24),
            Err(ChartError::InvalidHour(24))
        ));
        assert!(matches!(
            BirthMoment::new(2023, 2, 29, 0),
            Err(ChartError::InvalidDate { .. })
        ));
        assert!(BirthMoment::new(2024, 2, 29, 0).is_ok());
    }

    #[test]
    fn test_birth_moment_deserialize_validates_hour() {
        let parsed: BirthMoment =
            serde_json::from_str(r#"{"date":"1990-03-02","hour":7}"#).unwrap();
        assert_eq!(parsed, BirthMoment::new(1990, 3, 2, 7).unwrap());

        let err = serde_json::from_str::<BirthMoment>(r#"{"date":"1990-03-02","hour":99}"#)
            .unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_boundary_day_ignores_year() {
        assert_eq!(boundary_day(1), 6);
        assert_eq!(boundary_day(2), 4);
        assert_eq!(boundary_day(8), 8);
        assert_eq!(boundary_day(12), 7);
    }

    #[test]
    fn test_solar_month_on_and_before_boundary() {
        // August boundary is the 8th
        assert_eq!(SolarMonth::of(date(1983, 8, 8)), SolarMonth { year: 1983, month: 8 });
        assert_eq!(SolarMonth::of(date(1983, 8, 7)), SolarMonth { year: 1983, month: 7 });
    }

    #[test]
    fn test_january_rolls_back_year() {
        let month = SolarMonth::of(date(2024, 1, 3));
        assert_eq!(month, SolarMonth { year: 2023, month: 12 });
        assert_eq!(month.ordinal(), 11);
    }

    #[test]
    fn test_ox_month_keeps_gregorian_year() {
        let month = SolarMonth::of(date(2024, 1, 20));
        assert_eq!(month, SolarMonth { year: 2024, month: 1 });
        assert_eq!(month.ordinal(), 12);

        let boundary = SolarMonth::of(date(2024, 1, 6));
        assert_eq!(boundary, SolarMonth { year: 2024, month: 1 });

        let feb = SolarMonth::of(date(2024, 2, 4));
        assert_eq!(feb, SolarMonth { year: 2024, month: 2 });
        assert_eq!(feb.ordinal(), 1);
        assert_eq!(feb.offset_from_tiger(), 0);
    }

    #[test]
    fn test_month_length() {
        assert_eq!(month_length(2024, 2), 29);
        assert_eq!(month_length(1900, 2), 28);
        assert_eq!(month_length(2000, 2), 29);
        assert_eq!(month_length(1983, 9), 30);
        assert_eq!(month_length(1983, 12), 31);
    }

    #[test]
    fn test_days_since_boundary() {
        assert_eq!(days_since_boundary(date(1983, 8, 11)), 3);
        assert_eq!(days_since_boundary(date(1983, 8, 8)), 0);
        // Dec 2 is before the Dec 7 boundary: (30 - 8) + 2 days since Nov 8
        assert_eq!(days_since_boundary(date(1984, 12, 2)), 24);
        // Jan 2 reaches back into December of the previous year: (31 - 7) + 2
        assert_eq!(days_since_boundary(date(1990, 1, 2)), 26);
    }

    #[test]
    fn test_days_until_boundary() {
        assert_eq!(days_until_boundary(date(1984, 12, 2)), 5);
        // Aug 11 -> Sep 8: (31 - 11) + 8
        assert_eq!(days_until_boundary(date(1983, 8, 11)), 28);
        // Dec 20 -> Jan 6 of the next year
        assert_eq!(days_until_boundary(date(1983, 12, 20)), 17);
    }
}
