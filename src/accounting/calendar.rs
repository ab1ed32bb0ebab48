use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrackerError};

/// a calendar month being displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(TrackerError::InvalidField {
            field: "month",
            message: format!("{year}-{month} is not a valid calendar month"),
        })?;
        Ok(Self::containing(first))
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// every date in the month, in order
    pub fn days(&self) -> Vec<NaiveDate> {
        let Some(first) = self.first_day() else {
            return Vec::new();
        };

        first
            .iter_days()
            .take_while(|d| d.month() == self.month)
            .collect()
    }
}

/// how a single day is marked on a loan's calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayMark {
    /// a payment was registered that day
    Paid,
    /// an installment was expected and the day has passed
    Missed,
    /// an installment is expected today or later
    Upcoming,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub mark: DayMark,
}

/// month grid for a loan, sunday-first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub month: CalendarMonth,
    /// empty cells before day 1 when weeks start on sunday
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

impl MonthCalendar {
    pub fn count(&self, mark: DayMark) -> usize {
        self.days.iter().filter(|d| d.mark == mark).count()
    }
}

/// Build the calendar for `month`, marking payment days and expected installment days.
pub fn month_calendar(
    month: CalendarMonth,
    expected_dates: &[NaiveDate],
    payment_dates: &[NaiveDate],
    today: NaiveDate,
) -> MonthCalendar {
    let expected: BTreeSet<NaiveDate> = expected_dates.iter().copied().collect();
    let paid: BTreeSet<NaiveDate> = payment_dates.iter().copied().collect();

    let leading_blanks = month
        .first_day()
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0);

    let days = month
        .days()
        .into_iter()
        .map(|date| {
            let mark = if paid.contains(&date) {
                DayMark::Paid
            } else if expected.contains(&date) {
                if date < today {
                    DayMark::Missed
                } else {
                    DayMark::Upcoming
                }
            } else {
                DayMark::None
            };
            CalendarDay { date, mark }
        })
        .collect();

    MonthCalendar {
        month,
        leading_blanks,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_navigation() {
        let dec = CalendarMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), CalendarMonth { year: 2025, month: 1 });
        assert_eq!(dec.next().previous(), dec);
        assert_eq!(
            CalendarMonth::new(2024, 1).unwrap().previous(),
            CalendarMonth { year: 2023, month: 12 }
        );
        assert!(CalendarMonth::new(2024, 13).is_err());
    }

    #[test]
    fn test_month_shape() {
        // february 2024 starts on a thursday and has 29 days
        let calendar = month_calendar(CalendarMonth::new(2024, 2).unwrap(), &[], &[], date(2024, 2, 1));
        assert_eq!(calendar.leading_blanks, 4);
        assert_eq!(calendar.days.len(), 29);
        assert_eq!(calendar.count(DayMark::None), 29);
    }

    #[test]
    fn test_day_marks() {
        let expected = [date(2024, 3, 1), date(2024, 3, 8), date(2024, 3, 15), date(2024, 3, 22)];
        let payments = [date(2024, 3, 1), date(2024, 3, 9)];
        let today = date(2024, 3, 15);

        let calendar = month_calendar(CalendarMonth::new(2024, 3).unwrap(), &expected, &payments, today);
        let mark_of = |d: u32| calendar.days[(d - 1) as usize].mark;

        assert_eq!(mark_of(1), DayMark::Paid);
        assert_eq!(mark_of(8), DayMark::Missed);
        assert_eq!(mark_of(9), DayMark::Paid);
        assert_eq!(mark_of(15), DayMark::Upcoming);
        assert_eq!(mark_of(22), DayMark::Upcoming);
        assert_eq!(mark_of(2), DayMark::None);
    }
}
