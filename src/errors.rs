use thiserror::Error;

use crate::decimal::Money;
use crate::types::{ClientId, LoanId};

/// broad failure categories surfaced to the ui layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// input rejected before any mutation
    Validation,
    /// referenced client or loan does not exist
    NotFound,
    /// delete blocked by existing dependents
    Constraint,
    /// underlying persistence failure
    Storage,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("missing required field: {field}")]
    MissingField {
        field: &'static str,
    },

    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("invalid payment amount: {amount}")]
    InvalidPaymentAmount {
        amount: Money,
    },

    #[error("payment exceeds outstanding balance: outstanding {outstanding}, requested {requested}")]
    PaymentExceedsBalance {
        outstanding: Money,
        requested: Money,
    },

    #[error("client not found: {id}")]
    ClientNotFound {
        id: ClientId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("client {id} still has {loan_count} loan(s) registered")]
    ClientHasLoans {
        id: ClientId,
        loan_count: u32,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("invalid configuration: {message}")]
    Config {
        message: String,
    },
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::MissingField { .. }
            | TrackerError::InvalidField { .. }
            | TrackerError::InvalidPaymentAmount { .. }
            | TrackerError::PaymentExceedsBalance { .. } => ErrorKind::Validation,
            TrackerError::ClientNotFound { .. } | TrackerError::LoanNotFound { .. } => {
                ErrorKind::NotFound
            }
            TrackerError::ClientHasLoans { .. } => ErrorKind::Constraint,
            TrackerError::Storage(_) | TrackerError::Config { .. } => ErrorKind::Storage,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
