//! Calendar-aware day counting and CF time decoding.
//!
//! Downscaled GCM output is commonly stored on a 365-day ("noleap") calendar,
//! while the observational datasets use the standard calendar. Day counts and
//! time-offset arithmetic have to honor whichever calendar the file declares.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

// Cumulative days before each month in a 365-day year.
const NOLEAP_CUMDAYS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    #[default]
    Standard,
    Noleap,
}

impl Calendar {
    /// Maps a CF `calendar` attribute to a calendar, if recognised.
    pub fn from_attr(attr: &str) -> Option<Calendar> {
        match attr.trim().to_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Some(Calendar::Standard),
            "noleap" | "365_day" => Some(Calendar::Noleap),
            _ => None,
        }
    }

    pub fn is_leap(&self, year: i32) -> bool {
        match self {
            Calendar::Standard => year % 4 == 0 && (year % 100 != 0 || year % 400 == 0),
            Calendar::Noleap => false,
        }
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        let base = DAYS_IN_MONTH[(month - 1) as usize];
        if month == 2 && self.is_leap(year) {
            base + 1
        } else {
            base
        }
    }

    pub fn days_in_year(&self, year: i32) -> u32 {
        if self.is_leap(year) {
            366
        } else {
            365
        }
    }
}

/// Decodes a CF time coordinate (`<unit> since <date>`) into dates.
///
/// Supports `days` and `hours` offsets on the standard and noleap calendars.
/// Sub-day precision is discarded.
pub fn decode_time(units: &str, calendar: Calendar, offsets: &[f64]) -> Result<Vec<NaiveDate>> {
    let (unit, base) = parse_time_units(units)?;

    let to_days = |v: f64| -> i64 {
        match unit {
            TimeUnit::Days => v.floor() as i64,
            TimeUnit::Hours => (v / 24.0).floor() as i64,
        }
    };

    offsets
        .iter()
        .map(|&v| add_days(base, to_days(v), calendar).ok_or_else(|| {
            Error::TimeDecode(format!("offset {} out of range for `{}`", v, units))
        }))
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum TimeUnit {
    Days,
    Hours,
}

fn parse_time_units(units: &str) -> Result<(TimeUnit, NaiveDate)> {
    let mut parts = units.split_whitespace();

    let unit = match parts.next() {
        Some("days") | Some("day") | Some("d") => TimeUnit::Days,
        Some("hours") | Some("hour") | Some("h") => TimeUnit::Hours,
        other => {
            return Err(Error::TimeDecode(format!(
                "unsupported time unit in `{}` ({:?})",
                units, other
            )))
        }
    };

    if parts.next() != Some("since") {
        return Err(Error::TimeDecode(format!("expected `since` in `{}`", units)));
    }

    let date = parts
        .next()
        .ok_or_else(|| Error::TimeDecode(format!("missing base date in `{}`", units)))?;
    let base = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| Error::TimeDecode(format!("bad base date in `{}`: {}", units, e)))?;

    Ok((unit, base))
}

/// Adds whole days to a date on the given calendar.
///
/// On the noleap calendar February 29 does not exist, so offsets advance
/// through a 365-day year.
pub fn add_days(base: NaiveDate, days: i64, calendar: Calendar) -> Option<NaiveDate> {
    match calendar {
        Calendar::Standard => base.checked_add_signed(Duration::days(days)),
        Calendar::Noleap => {
            let doy = NOLEAP_CUMDAYS[base.month0() as usize] + (base.day0() as i64);
            let total = doy + days;
            let year = base.year() + total.div_euclid(365) as i32;
            let rem = total.rem_euclid(365);

            let month = NOLEAP_CUMDAYS.iter().rposition(|&c| c <= rem)?;
            let day = (rem - NOLEAP_CUMDAYS[month]) as u32 + 1;
            NaiveDate::from_ymd_opt(year, month as u32 + 1, day)
        }
    }
}

/// Days in the month of each timestamp.
pub fn days_per_month(times: &[NaiveDate], calendar: Calendar) -> Vec<f64> {
    times
        .iter()
        .map(|t| calendar.days_in_month(t.year(), t.month()) as f64)
        .collect()
}

/// Days in the year of each timestamp.
pub fn days_per_year(times: &[NaiveDate], calendar: Calendar) -> Vec<f64> {
    times
        .iter()
        .map(|t| calendar.days_in_year(t.year()) as f64)
        .collect()
}

// -- Tests -------------------------------------------------------------------
