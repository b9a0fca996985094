use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Weekday labels indexed from Sunday. Sunday/Saturday and Tuesday/Thursday share a letter.
const WEEKDAY_LETTERS: [char; 7] = ['S', 'M', 'T', 'W', 'T', 'F', 'S'];

/// A local calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed day key: {0:?}")]
pub struct ParseDayKeyError(pub String);

impl DayKey {
    pub fn pred(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    pub fn offset_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn day_number(self) -> u32 {
        self.0.day()
    }

    pub fn weekday_letter(self) -> char {
        WEEKDAY_LETTERS[self.0.weekday().num_days_from_sunday() as usize]
    }

    pub fn week_start(self) -> Self {
        Self(self.0 - Duration::days(self.0.weekday().num_days_from_monday() as i64))
    }
}

/// Projects an instant onto the calendar day of its own timezone.
pub fn key_of<Tz: TimeZone>(instant: &DateTime<Tz>) -> DayKey {
    DayKey(instant.date_naive())
}

pub fn weekday_letter_of<Tz: TimeZone>(instant: &DateTime<Tz>) -> char {
    key_of(instant).weekday_letter()
}

/// Monday of the ISO week containing `instant`.
pub fn week_starting_monday<Tz: TimeZone>(instant: &DateTime<Tz>) -> DayKey {
    key_of(instant).week_start()
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = ParseDayKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // chrono accepts unpadded fields; only the canonical width is a key.
        if trimmed.len() != 10 {
            return Err(ParseDayKeyError(s.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, KEY_FORMAT)
            .map(Self)
            .map_err(|_| ParseDayKeyError(s.to_string()))
    }
}

impl TryFrom<String> for DayKey {
    type Error = ParseDayKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.to_string()
    }
}
