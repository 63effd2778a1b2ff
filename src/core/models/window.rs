use crate::core::errors::BillsplitError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Calendar month used to scope bill listings and balances by due date.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct MonthWindow {
    pub month: u32,
    pub year: i32,
}

impl MonthWindow {
    pub fn new(month: u32, year: i32) -> Result<Self, BillsplitError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(BillsplitError::validation(
                "month",
                "Invalid Month",
                format!("{}/{} is not a valid month", month, year),
            ));
        }
        Ok(MonthWindow { month, year })
    }

    /// A window only applies when both parts are given; a lone month or year
    /// leaves the query unrestricted.
    pub fn from_parts(month: Option<u32>, year: Option<i32>) -> Result<Option<Self>, BillsplitError> {
        match (month, year) {
            (Some(month), Some(year)) => Self::new(month, year).map(Some),
            _ => Ok(None),
        }
    }

    /// Half-open `[first day of month, first day of next month)`.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        // both dates were validated in `new`
        let from = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN);
        let to = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap_or(NaiveDate::MAX);
        (from, to)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let (from, to) = self.bounds();
        date >= from && date < to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let window = MonthWindow::new(12, 2024).unwrap();
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()));
    }

    #[test]
    fn partial_window_is_unrestricted() {
        assert_eq!(MonthWindow::from_parts(Some(3), None).unwrap(), None);
        assert!(MonthWindow::from_parts(Some(13), Some(2024)).is_err());
    }
}
