use chrono::{Months, NaiveDate};

use crate::error::ConfigError;
use crate::models::ClassifiedEntry;

/// Trailing window of whole calendar months ending at the run date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    months: u32,
}

impl TimeWindow {
    pub fn new(months: i64) -> Result<Self, ConfigError> {
        u32::try_from(months)
            .ok()
            .filter(|m| *m > 0)
            .map(|months| Self { months })
            .ok_or(ConfigError::InvalidMonths(months))
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    /// `today` minus the window. Month-end days clamp (Mar 31 - 1 month = Feb 28/29).
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_months(Months::new(self.months))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Keeps entries dated on or after the cutoff, preserving order
    pub fn filter(&self, entries: Vec<ClassifiedEntry>, today: NaiveDate) -> Vec<ClassifiedEntry> {
        let cutoff = self.cutoff(today);
        entries
            .into_iter()
            .filter(|entry| entry.date >= cutoff)
            .collect()
    }
}
