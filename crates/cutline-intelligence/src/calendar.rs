// ABOUTME: Workday calendars consulted by the seasonality model for day-type decisions
// ABOUTME: Explicit holiday / make-up workday sets loadable from JSON, plus a plain weekend rule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! Workday calendars.
//!
//! A calendar answers "is this date a working day?" only when it knows
//! better than the plain Monday..Friday rule. `None` defers to that rule.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date-level workday oracle
pub trait WorkdayCalendar: Send + Sync {
    /// `Some(true)` for a working day, `Some(false)` for a day off, `None` when unknown
    fn is_workday(&self, date: NaiveDate) -> Option<bool>;
}

/// Calendar without exceptions; every answer defers to the weekday rule
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendRule;

impl WorkdayCalendar for WeekendRule {
    fn is_workday(&self, _date: NaiveDate) -> Option<bool> {
        None
    }
}

/// Failure loading a holiday calendar
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Malformed calendar document
    #[error("Invalid holiday calendar: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Explicit public holidays and make-up working days.
///
/// JSON form: `{"holidays": ["2024-10-01", ...], "workdays": ["2024-10-12", ...]}`.
/// A date listed in both sets counts as a holiday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    #[serde(default)]
    holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    workdays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Calendar from explicit date sets
    #[must_use]
    pub fn new(
        holidays: impl IntoIterator<Item = NaiveDate>,
        workdays: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
            workdays: workdays.into_iter().collect(),
        }
    }

    /// Parse the JSON form
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Parse`] when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, CalendarError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of listed dates
    #[must_use]
    pub fn len(&self) -> usize {
        self.holidays.len() + self.workdays.len()
    }

    /// Whether no date is listed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty() && self.workdays.is_empty()
    }
}

impl WorkdayCalendar for HolidayCalendar {
    fn is_workday(&self, date: NaiveDate) -> Option<bool> {
        if self.holidays.contains(&date) {
            Some(false)
        } else if self.workdays.contains(&date) {
            Some(true)
        } else {
            None
        }
    }
}
