//! Home-zone "today" resolution and the greeting date line.
//!
//! All daily selection keys off a single fixed home timezone so the page shows
//! the same day no matter where the viewer happens to be. The display string
//! combines the Gregorian date, the weekday, and the lunisolar terms from
//! [`crate::lunar`].

use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use thiserror::Error;

use crate::lunar::{self, LunarDate};

const WEEKDAY_CN: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

/// Unexpected date/weekday values in the calendar formatter. Reported loudly
/// instead of indexing out of bounds; the page degrades to a plain date line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("date {0} is outside the 1900-2100 lunar table")]
    OutOfRange(i32),
    #[error("bad home timezone offset {0:?}, expected ±HH:MM")]
    BadOffset(String),
    #[error("weekday index {0} out of range 0..=6")]
    Weekday(usize),
}

/// Clock pinned to the fixed home timezone. Injected wherever "today" matters
/// so tests can substitute explicit dates.
#[derive(Debug, Clone, Copy)]
pub struct HomeClock {
    offset: FixedOffset,
}

impl HomeClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse a `±HH:MM` offset string such as `+08:00`.
    pub fn from_offset_str(raw: &str) -> Result<Self, FormatError> {
        let bad = || FormatError::BadOffset(raw.to_string());
        let s = raw.trim();
        let (sign, rest) = match s.split_at_checked(1) {
            Some(("+", rest)) => (1i32, rest),
            Some(("-", rest)) => (-1i32, rest),
            _ => return Err(bad()),
        };
        let (h, m) = rest.split_once(':').ok_or_else(bad)?;
        let hours: i32 = h.parse().map_err(|_| bad())?;
        let minutes: i32 = m.parse().map_err(|_| bad())?;
        if hours > 23 || minutes > 59 {
            return Err(bad());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::new)
            .ok_or_else(bad)
    }

    /// Calendar date "now" in the home zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// Canonical `YYYY-MM-DD` key used by every daily selection rule.
    pub fn today_iso(&self) -> String {
        self.today().format("%Y-%m-%d").to_string()
    }
}

impl Default for HomeClock {
    // +08:00, the home zone the content is written in.
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(8 * 3600).unwrap())
    }
}

/// Greeting line for the page header, e.g.
/// `今天是2026年2月9日，星期一，农历腊月廿二`.
pub fn format_display_date(date: NaiveDate) -> Result<String, FormatError> {
    let week_idx = date.weekday().num_days_from_sunday() as usize;
    let weekday = WEEKDAY_CN
        .get(week_idx)
        .ok_or(FormatError::Weekday(week_idx))?;

    let lunar = LunarDate::from_solar(date)?;
    let special = match lunar.day {
        1 => "（初一）",
        15 => "（十五）",
        _ => "",
    };
    let term = lunar::solar_term(date)
        .map(|t| format!("，节气{t}"))
        .unwrap_or_default();

    Ok(format!(
        "今天是{}年{}月{}日，星期{}，农历{}月{}{}{}",
        date.year(),
        date.month(),
        date.day(),
        weekday,
        lunar.month_in_chinese(),
        lunar.day_in_chinese(),
        special,
        term,
    ))
}

/// Fallback header line when the lunisolar formatter fails: Gregorian only.
pub fn format_solar_only(date: NaiveDate) -> String {
    let week_idx = date.weekday().num_days_from_sunday() as usize;
    let weekday = WEEKDAY_CN.get(week_idx).copied().unwrap_or("");
    format!(
        "今天是{}年{}月{}日，星期{}",
        date.year(),
        date.month(),
        date.day(),
        weekday,
    )
}
