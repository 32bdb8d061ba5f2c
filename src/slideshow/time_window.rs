//! Cron-style time windows that gate the slideshow.
//!
//! An expression has the five classic fields `minute hour day-of-month month
//! day-of-week`. A window matches a point in time when that minute is selected
//! by the expression, so `"* 8-22 * * *"` enables the slideshow from 08:00 to
//! 22:59 every day.

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeWindowError {
    #[error("Expected 5 fields in time window '{0}'")]
    FieldCount(String),

    #[error("Invalid {field} field '{value}' in time window '{expression}'")]
    InvalidField {
        field: &'static str,
        value: String,
        expression: String,
    },
}

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Allowed values of one field, as a bit set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSet {
    bits: u64,
    /// False when the field starts with `*`
    restricted: bool,
}

impl FieldSet {
    fn contains(&self, value: u32) -> bool {
        value < 64 && self.bits & (1u64 << value) != 0
    }
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    /// Offset added to the index of a name (months are 1-based)
    name_base: u32,
}

const MINUTE: FieldSpec = FieldSpec { name: "minute", min: 0, max: 59, names: &[], name_base: 0 };
const HOUR: FieldSpec = FieldSpec { name: "hour", min: 0, max: 23, names: &[], name_base: 0 };
const DAY_OF_MONTH: FieldSpec = FieldSpec { name: "day-of-month", min: 1, max: 31, names: &[], name_base: 0 };
const MONTH: FieldSpec = FieldSpec { name: "month", min: 1, max: 12, names: &MONTH_NAMES, name_base: 1 };
// 7 is accepted as an alias for Sunday and folded onto 0 after parsing
const DAY_OF_WEEK: FieldSpec = FieldSpec { name: "day-of-week", min: 0, max: 7, names: &DAY_NAMES, name_base: 0 };

impl FieldSpec {
    fn value(&self, token: &str) -> Option<u32> {
        if let Ok(n) = token.parse::<u32>() {
            return (self.min..=self.max).contains(&n).then_some(n);
        }
        let lower = token.to_ascii_lowercase();
        self.names
            .iter()
            .position(|n| *n == lower)
            .map(|i| i as u32 + self.name_base)
    }

    fn parse(&self, field: &str, expression: &str) -> Result<FieldSet, TimeWindowError> {
        let invalid = || TimeWindowError::InvalidField {
            field: self.name,
            value: field.to_string(),
            expression: expression.to_string(),
        };

        let mut bits = 0u64;
        for part in field.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step = step.parse::<u32>().map_err(|_| invalid())?;
                    if step == 0 || step > self.max {
                        return Err(invalid());
                    }
                    (range, step)
                }
                None => (part, 1),
            };

            let (start, end) = if range == "*" {
                (self.min, self.max)
            } else if let Some((a, b)) = range.split_once('-') {
                let a = self.value(a).ok_or_else(invalid)?;
                let b = self.value(b).ok_or_else(invalid)?;
                if a > b {
                    return Err(invalid());
                }
                (a, b)
            } else {
                let a = self.value(range).ok_or_else(invalid)?;
                // "5/15" means every 15 starting at 5
                if step > 1 { (a, self.max) } else { (a, a) }
            };

            let mut v = start;
            while v <= end {
                bits |= 1u64 << v;
                match v.checked_add(step) {
                    Some(next) => v = next,
                    None => break,
                }
            }
        }

        Ok(FieldSet { bits, restricted: !field.starts_with('*') })
    }
}

/// One parsed time window expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    expression: String,
    minutes: FieldSet,
    hours: FieldSet,
    days_of_month: FieldSet,
    months: FieldSet,
    days_of_week: FieldSet,
}

impl TimeWindow {
    pub fn parse(expression: &str) -> Result<Self, TimeWindowError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(TimeWindowError::FieldCount(expression.to_string()));
        }

        let mut days_of_week = DAY_OF_WEEK.parse(fields[4], expression)?;
        if days_of_week.contains(7) {
            days_of_week.bits = (days_of_week.bits & !(1u64 << 7)) | 1;
        }

        Ok(TimeWindow {
            expression: expression.to_string(),
            minutes: MINUTE.parse(fields[0], expression)?,
            hours: HOUR.parse(fields[1], expression)?,
            days_of_month: DAY_OF_MONTH.parse(fields[2], expression)?,
            months: MONTH.parse(fields[3], expression)?,
            days_of_week,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether the minute containing `at` is selected by this window
    pub fn matches<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        if !self.minutes.contains(at.minute())
            || !self.hours.contains(at.hour())
            || !self.months.contains(at.month())
        {
            return false;
        }

        let dom = self.days_of_month.contains(at.day());
        let dow = self.days_of_week.contains(at.weekday().num_days_from_sunday());

        // Standard cron rule: when both day fields are restricted either one may match
        match (self.days_of_month.restricted, self.days_of_week.restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }
}

impl FromStr for TimeWindow {
    type Err = TimeWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::parse(s)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}
