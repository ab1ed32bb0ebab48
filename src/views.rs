//! Read-side views handed to the ui layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::records::{Client, Loan, Payment};
use crate::types::{LoanId, LoanStatus, StatusFilter};

/// case-insensitive substring match used by the search boxes
fn name_matches(search: Option<&str>, name: &str) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// filter for the client listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientQuery {
    pub search: Option<String>,
}

impl ClientQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
        }
    }

    pub fn matches(&self, client: &Client) -> bool {
        name_matches(self.search.as_deref(), &client.name)
    }
}

/// filter for the loan listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanQuery {
    /// matched against the client's name
    pub search: Option<String>,
    pub status: StatusFilter,
}

impl LoanQuery {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            search: None,
            status,
        }
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn matches(&self, loan: &LoanWithTotals) -> bool {
        self.status.matches(loan.loan.status)
            && name_matches(self.search.as_deref(), &loan.client_name)
    }
}

/// a loan plus the figures derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanWithTotals {
    pub loan: Loan,
    pub client_name: String,
    pub total_obligation: Money,
    pub outstanding: Money,
    pub payments_count: u32,
    pub progress: u32,
}

impl LoanWithTotals {
    pub fn new(loan: Loan, client_name: String, payments_count: u32) -> Self {
        Self {
            total_obligation: loan.total_obligation(),
            outstanding: loan.outstanding(),
            progress: loan.progress(payments_count),
            payments_count,
            client_name,
            loan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientWithTotals {
    pub client: Client,
    pub loan_count: u32,
    /// loans not yet paid off
    pub open_loans: u32,
    /// sum of loan balances
    pub debt: Money,
    /// sum of amounts paid across loans
    pub paid: Money,
}

impl ClientWithTotals {
    pub fn new(client: Client, loans: &[&Loan]) -> Self {
        Self {
            client,
            loan_count: loans.len() as u32,
            open_loans: loans.iter().filter(|l| l.status != LoanStatus::Paid).count() as u32,
            debt: loans.iter().map(|l| l.balance).sum(),
            paid: loans.iter().map(|l| l.cumulative_paid).sum(),
        }
    }
}

/// header figures of the client listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub total_clients: u32,
    pub clients_with_loans: u32,
    pub open_loans: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientListing {
    pub clients: Vec<ClientWithTotals>,
    /// computed over every client, not only the ones matching the search
    pub summary: ClientSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDetail {
    pub client: Client,
    /// most recent start date first
    pub loans: Vec<LoanWithTotals>,
    pub active_loans: u32,
    pub total_balance: Money,
    pub total_paid: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetail {
    pub loan: Loan,
    pub client_name: String,
    pub total_obligation: Money,
    pub outstanding: Money,
    /// oldest first
    pub payments: Vec<Payment>,
    pub expected_due_dates: Vec<NaiveDate>,
    pub progress: u32,
}

/// unpaid loan whose due date falls inside the dashboard window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComingDue {
    pub loan_id: LoanId,
    pub client_name: String,
    pub outstanding: Money,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardTotals {
    /// sum of principals
    pub total_lent: Money,
    /// sum of payments received
    pub total_collected: Money,
    pub total_outstanding: Money,
    pub active_loans: u32,
    pub overdue_loans: u32,
    pub paid_loans: u32,
    pub total_clients: u32,
    pub clients_with_loans: u32,
    /// soonest first
    pub coming_due: Vec<ComingDue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::records::{NewClient, NewLoan};
    use crate::types::PaymentFrequency;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(principal: i64, paid: i64, status: LoanStatus) -> Loan {
        let mut loan = NewLoan {
            client_id: uuid::Uuid::new_v4(),
            principal: Money::from_major(principal),
            rate: Rate::from_percentage(dec!(10)),
            start_date: date(2024, 1, 1),
            frequency: PaymentFrequency::Weekly,
            installment_count: 4,
        }
        .into_loan()
        .unwrap();
        loan.apply_payment(Money::from_major(paid));
        loan.status = status;
        loan
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let client = NewClient::new("María González", "1").into_client(date(2024, 1, 1)).unwrap();
        assert!(ClientQuery::search("maría").matches(&client));
        assert!(ClientQuery::search("  ").matches(&client));
        assert!(ClientQuery::default().matches(&client));
        assert!(!ClientQuery::search("pérez").matches(&client));
    }

    #[test]
    fn test_loan_query() {
        let row = LoanWithTotals::new(loan(1_000, 0, LoanStatus::Overdue), "Ana Torres".into(), 0);
        assert!(LoanQuery::default().matches(&row));
        assert!(LoanQuery::status(StatusFilter::Overdue).with_search("ana").matches(&row));
        assert!(!LoanQuery::status(StatusFilter::Paid).matches(&row));
        assert!(!LoanQuery::default().with_search("luis").matches(&row));
    }

    #[test]
    fn test_client_totals() {
        let client = NewClient::new("Ana", "1").into_client(date(2024, 1, 1)).unwrap();
        let open = loan(1_000, 100, LoanStatus::Active);
        let closed = loan(500, 550, LoanStatus::Paid);

        let totals = ClientWithTotals::new(client, &[&open, &closed]);
        assert_eq!(totals.loan_count, 2);
        assert_eq!(totals.open_loans, 1);
        assert_eq!(totals.debt, Money::from_major(1_000));
        assert_eq!(totals.paid, Money::from_major(650));
    }

    #[test]
    fn test_loan_with_totals() {
        let row = LoanWithTotals::new(loan(1_000, 550, LoanStatus::Active), "Ana".into(), 2);
        assert_eq!(row.total_obligation, Money::from_major(1_100));
        assert_eq!(row.outstanding, Money::from_major(550));
        assert_eq!(row.progress, 50);
    }
}
