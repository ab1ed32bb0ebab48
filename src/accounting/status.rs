use chrono::NaiveDate;

use crate::accounting::arithmetic::total_obligation;
use crate::decimal::{Money, Rate};
use crate::types::LoanStatus;

/// everything status derivation needs to know about a loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusInputs {
    pub principal: Money,
    pub rate: Rate,
    pub cumulative_paid: Money,
    pub due_date: NaiveDate,
}

impl StatusInputs {
    pub fn is_paid(&self) -> bool {
        self.cumulative_paid >= total_obligation(self.principal, self.rate)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today
    }
}

/// Derive a loan's lifecycle status as of `today`.
///
/// The paid check wins over the overdue check, so a loan settled after its
/// due date reads as Paid.
pub fn derive_status(inputs: &StatusInputs, today: NaiveDate) -> LoanStatus {
    if inputs.is_paid() {
        LoanStatus::Paid
    } else if inputs.is_overdue(today) {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    }
}

/// status transition observed by a refresh pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: LoanStatus,
    pub to: LoanStatus,
}

impl StatusChange {
    /// `None` when derivation leaves the status untouched
    pub fn between(from: LoanStatus, to: LoanStatus) -> Option<Self> {
        (from != to).then_some(Self { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs(paid: i64) -> StatusInputs {
        StatusInputs {
            principal: Money::from_major(1_000),
            rate: Rate::from_percentage(dec!(10)),
            cumulative_paid: Money::from_major(paid),
            due_date: date(2024, 3, 1),
        }
    }

    #[test]
    fn test_active_before_due_date() {
        assert_eq!(derive_status(&inputs(0), date(2024, 2, 1)), LoanStatus::Active);
        // due date itself is not yet overdue
        assert_eq!(derive_status(&inputs(500), date(2024, 3, 1)), LoanStatus::Active);
    }

    #[test]
    fn test_overdue_after_due_date() {
        assert_eq!(derive_status(&inputs(1_099), date(2024, 3, 2)), LoanStatus::Overdue);
    }

    #[test]
    fn test_paid_wins_over_overdue() {
        assert_eq!(derive_status(&inputs(1_100), date(2024, 2, 1)), LoanStatus::Paid);
        assert_eq!(derive_status(&inputs(1_100), date(2025, 1, 1)), LoanStatus::Paid);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let today = date(2024, 4, 1);
        let first = derive_status(&inputs(300), today);
        let second = derive_status(&inputs(300), today);
        assert_eq!(first, second);
    }

    #[test]
    fn test_status_change() {
        assert_eq!(StatusChange::between(LoanStatus::Active, LoanStatus::Active), None);
        assert_eq!(
            StatusChange::between(LoanStatus::Overdue, LoanStatus::Paid),
            Some(StatusChange { from: LoanStatus::Overdue, to: LoanStatus::Paid })
        );
    }
}
