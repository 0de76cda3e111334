use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::ser::{Serialize, SerializeStruct, Serializer};

const MIN_YEAR: i16 = 1;
const MAX_YEAR: i16 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),
    #[error("year must be between 1 and 9999, got {0}")]
    YearOutOfRange(i64),
    #[error("expected a month as YYYY-MM, got '{0}'")]
    Malformed(String),
}

/// A calendar month with no day component. Payoff dates are reported at
/// this granularity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CalendarMonth {
    year: i16,
    month: i8,
}

impl CalendarMonth {
    pub fn new(year: i64, month: i64) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::MonthOutOfRange(month));
        }
        if !(i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(&year) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        Ok(Self {
            year: year as i16,
            month: month as i8,
        })
    }

    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year().clamp(MIN_YEAR, MAX_YEAR),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(jiff::Zoned::now().date())
    }

    pub fn year(self) -> i16 {
        self.year
    }

    pub fn month(self) -> i8 {
        self.month
    }

    /// Saturates at December of the last supported year.
    pub fn plus_months(self, months: u32) -> Self {
        let max_index = i64::from(MAX_YEAR) * 12 + 11;
        let index = (self.month_index() + i64::from(months)).min(max_index);
        Self {
            year: index.div_euclid(12) as i16,
            month: (index.rem_euclid(12) + 1) as i8,
        }
    }

    pub fn label(self) -> String {
        match Date::new(self.year, self.month, 1) {
            Ok(date) => date.strftime("%B %Y").to_string(),
            Err(_) => format!("{:04}-{:02}", self.year, self.month),
        }
    }

    fn month_index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CalendarMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || CalendarError::Malformed(trimmed.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(malformed)?;
        let year = year.parse::<i64>().map_err(|_| malformed())?;
        let month = month.parse::<i64>().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl Serialize for CalendarMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CalendarMonth", 3)?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("month", &self.month)?;
        state.serialize_field("label", &self.label())?;
        state.end()
    }
}
