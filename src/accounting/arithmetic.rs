use chrono::{Days, NaiveDate};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, TrackerError};
use crate::types::PaymentFrequency;

/// principal plus flat (non-compounding) interest on principal
pub fn total_obligation(principal: Money, rate: Rate) -> Money {
    principal + principal.percentage(rate)
}

/// like [`total_obligation`] but `None` when the amount cannot be represented
pub fn checked_total_obligation(principal: Money, rate: Rate) -> Option<Money> {
    principal.checked_percentage(rate)?.checked_add(principal)
}

pub fn outstanding_balance(total_obligation: Money, cumulative_paid: Money) -> Money {
    total_obligation - cumulative_paid
}

/// share of installments covered by the number of payments, rounded half up.
///
/// Returns `None` when the loan has no installments.
pub fn progress_percent(payments_count: u32, installments_count: u32) -> Option<u32> {
    if installments_count == 0 {
        return None;
    }

    let payments = payments_count as u64;
    let installments = installments_count as u64;
    Some(((200 * payments + installments) / (2 * installments)) as u32)
}

/// progress shown for a loan: count based, but 100 only once the obligation is covered
pub fn loan_progress(
    payments_count: u32,
    installments_count: u32,
    cumulative_paid: Money,
    total_obligation: Money,
) -> u32 {
    if cumulative_paid >= total_obligation {
        return 100;
    }

    progress_percent(payments_count, installments_count)
        .unwrap_or(0)
        .min(99)
}

/// due date stored at origination: start + days(frequency) * installments
pub fn due_date(
    start_date: NaiveDate,
    frequency: PaymentFrequency,
    installments_count: u32,
) -> Result<NaiveDate> {
    let days = frequency.days_per_installment() as u64 * installments_count as u64;
    start_date
        .checked_add_days(Days::new(days))
        .ok_or(TrackerError::InvalidField {
            field: "installment_count",
            message: format!("due date out of range ({days} days after {start_date})"),
        })
}

/// expected installment dates; the first coincides with the start date
pub fn expected_due_dates(
    start_date: NaiveDate,
    frequency: PaymentFrequency,
    installments_count: u32,
) -> Vec<NaiveDate> {
    let step = frequency.days_per_installment() as u64;

    (0..installments_count as u64)
        .map_while(|i| start_date.checked_add_days(Days::new(i * step)))
        .collect()
}
