use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ClientId, LoanId, LoanStatus, PaymentId};

/// all events that can be emitted by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // client events
    ClientRegistered {
        client_id: ClientId,
        name: String,
        date: NaiveDate,
    },
    ClientUpdated {
        client_id: ClientId,
    },
    ClientDeleted {
        client_id: ClientId,
    },

    // loan events
    LoanOriginated {
        loan_id: LoanId,
        client_id: ClientId,
        principal: Money,
        total_obligation: Money,
        due_date: NaiveDate,
    },
    LoanDeleted {
        loan_id: LoanId,
        payments_removed: u32,
    },

    // payment events
    PaymentRegistered {
        loan_id: LoanId,
        payment_id: PaymentId,
        amount: Money,
        new_balance: Money,
        date: NaiveDate,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        as_of: NaiveDate,
    },
}

/// buffer of events emitted by tracker mutations, drained by the caller
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}
