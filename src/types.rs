use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// unique identifier for a client
pub type ClientId = Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// loan lifecycle status, derived from dates and totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// performing, not yet past its due date
    Active,
    /// cumulative payments cover the total obligation
    Paid,
    /// past its due date with an outstanding balance
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::Paid => "Paid",
            LoanStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(LoanStatus::Active),
            "Paid" => Ok(LoanStatus::Paid),
            "Overdue" => Ok(LoanStatus::Overdue),
            other => Err(format!("unknown loan status: {other}")),
        }
    }
}

/// installment frequency; each maps to a fixed day count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Biweekly,
    /// flat 30-day month, not calendar accurate
    Monthly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 4] = [
        PaymentFrequency::Daily,
        PaymentFrequency::Weekly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Monthly,
    ];

    pub fn days_per_installment(&self) -> u32 {
        match self {
            PaymentFrequency::Daily => 1,
            PaymentFrequency::Weekly => 7,
            PaymentFrequency::Biweekly => 15,
            PaymentFrequency::Monthly => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Daily => "Daily",
            PaymentFrequency::Weekly => "Weekly",
            PaymentFrequency::Biweekly => "Biweekly",
            PaymentFrequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(PaymentFrequency::Daily),
            "Weekly" => Ok(PaymentFrequency::Weekly),
            "Biweekly" => Ok(PaymentFrequency::Biweekly),
            "Monthly" => Ok(PaymentFrequency::Monthly),
            other => Err(format!("unknown payment frequency: {other}")),
        }
    }
}

/// status filter used by the loan listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Overdue,
    Paid,
}

impl StatusFilter {
    pub fn matches(&self, status: LoanStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == LoanStatus::Active,
            StatusFilter::Overdue => status == LoanStatus::Overdue,
            StatusFilter::Paid => status == LoanStatus::Paid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_day_counts() {
        let days: Vec<u32> = PaymentFrequency::ALL
            .iter()
            .map(|f| f.days_per_installment())
            .collect();
        assert_eq!(days, vec![1, 7, 15, 30]);
    }

    #[test]
    fn test_string_forms() {
        for frequency in PaymentFrequency::ALL {
            assert_eq!(frequency.as_str().parse::<PaymentFrequency>(), Ok(frequency));
        }
        assert_eq!("Overdue".parse::<LoanStatus>(), Ok(LoanStatus::Overdue));
        assert!("Vencido".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn test_status_filter() {
        assert!(StatusFilter::All.matches(LoanStatus::Paid));
        assert!(StatusFilter::Overdue.matches(LoanStatus::Overdue));
        assert!(!StatusFilter::Active.matches(LoanStatus::Overdue));
    }
}
