use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounting::{self, StatusInputs};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, TrackerError};
use crate::types::{ClientId, LoanId, LoanStatus, PaymentFrequency, PaymentId};

/// a person money is lent to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub note: Option<String>,
    pub registration_date: NaiveDate,
}

/// input for registering a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub note: Option<String>,
    /// defaults to today
    pub registration_date: Option<NaiveDate>,
}

/// full replacement of a client's editable fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub note: Option<String>,
    pub registration_date: NaiveDate,
}

impl NewClient {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn registered_on(mut self, date: NaiveDate) -> Self {
        self.registration_date = Some(date);
        self
    }

    /// validate and build the record to persist
    pub fn into_client(self, today: NaiveDate) -> Result<Client> {
        Ok(Client {
            id: Uuid::new_v4(),
            name: required_text("name", &self.name)?,
            phone: required_text("phone", &self.phone)?,
            address: optional_text(self.address),
            note: optional_text(self.note),
            registration_date: self.registration_date.unwrap_or(today),
        })
    }
}

impl ClientUpdate {
    pub fn from_client(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            note: client.note.clone(),
            registration_date: client.registration_date,
        }
    }

    pub fn apply_to(self, client: &mut Client) -> Result<()> {
        client.name = required_text("name", &self.name)?;
        client.phone = required_text("phone", &self.phone)?;
        client.address = optional_text(self.address);
        client.note = optional_text(self.note);
        client.registration_date = self.registration_date;
        Ok(())
    }
}

/// a lending agreement with flat interest and an installment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub client_id: ClientId,
    pub principal: Money,
    /// cached projection of `total_obligation - cumulative_paid`
    pub balance: Money,
    pub cumulative_paid: Money,
    pub rate: Rate,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub frequency: PaymentFrequency,
    pub installment_count: u32,
    pub status: LoanStatus,
}

impl Loan {
    pub fn total_obligation(&self) -> Money {
        accounting::total_obligation(self.principal, self.rate)
    }

    pub fn outstanding(&self) -> Money {
        accounting::outstanding_balance(self.total_obligation(), self.cumulative_paid)
    }

    pub fn status_inputs(&self) -> StatusInputs {
        StatusInputs {
            principal: self.principal,
            rate: self.rate,
            cumulative_paid: self.cumulative_paid,
            due_date: self.due_date,
        }
    }

    pub fn expected_due_dates(&self) -> Vec<NaiveDate> {
        accounting::expected_due_dates(self.start_date, self.frequency, self.installment_count)
    }

    pub fn progress(&self, payments_count: u32) -> u32 {
        accounting::loan_progress(
            payments_count,
            self.installment_count,
            self.cumulative_paid,
            self.total_obligation(),
        )
    }

    /// reject non-positive amounts and anything above the outstanding balance
    pub fn validate_payment(&self, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(TrackerError::InvalidPaymentAmount { amount });
        }

        let outstanding = self.outstanding();
        if amount > outstanding {
            return Err(TrackerError::PaymentExceedsBalance {
                outstanding,
                requested: amount,
            });
        }

        Ok(())
    }

    /// record a validated payment against the running totals
    pub fn apply_payment(&mut self, amount: Money) {
        self.cumulative_paid += amount;
        self.balance = self.outstanding();
    }
}

/// input for originating a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub client_id: ClientId,
    pub principal: Money,
    pub rate: Rate,
    pub start_date: NaiveDate,
    pub frequency: PaymentFrequency,
    pub installment_count: u32,
}

impl NewLoan {
    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(TrackerError::InvalidField {
                field: "principal",
                message: format!("must be positive, got {}", self.principal),
            });
        }

        if self.principal > Money::MAX {
            return Err(TrackerError::InvalidField {
                field: "principal",
                message: format!("must not exceed {}", Money::MAX),
            });
        }

        if self.rate.is_negative() {
            return Err(TrackerError::InvalidField {
                field: "rate",
                message: "must not be negative".to_string(),
            });
        }

        match accounting::checked_total_obligation(self.principal, self.rate) {
            Some(total) if total <= Money::MAX => {}
            _ => {
                return Err(TrackerError::InvalidField {
                    field: "rate",
                    message: format!("total to repay must not exceed {}", Money::MAX),
                })
            }
        }

        if self.installment_count == 0 {
            return Err(TrackerError::InvalidField {
                field: "installment_count",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// validate and build an Active loan with its derived due date
    pub fn into_loan(self) -> Result<Loan> {
        self.validate()?;

        let due_date =
            accounting::due_date(self.start_date, self.frequency, self.installment_count)?;
        let balance = accounting::total_obligation(self.principal, self.rate);

        Ok(Loan {
            id: Uuid::new_v4(),
            client_id: self.client_id,
            principal: self.principal,
            balance,
            cumulative_paid: Money::ZERO,
            rate: self.rate,
            start_date: self.start_date,
            due_date,
            frequency: self.frequency,
            installment_count: self.installment_count,
            status: LoanStatus::Active,
        })
    }
}

/// a registered repayment; never edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub date: NaiveDate,
    pub amount: Money,
    pub note: Option<String>,
}

/// input for registering a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub loan_id: LoanId,
    pub amount: Money,
    pub note: Option<String>,
}

impl NewPayment {
    pub fn new(loan_id: LoanId, amount: Money) -> Self {
        Self {
            loan_id,
            amount,
            note: None,
        }
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

fn required_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
