use std::collections::{HashMap, HashSet};

use chrono::{Days, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::accounting::{derive_status, month_calendar, CalendarMonth, MonthCalendar, StatusChange};
use crate::config::TrackerConfig;
use crate::errors::{Result, TrackerError};
use crate::events::{Event, EventStore};
use crate::records::{optional_text, Client, ClientUpdate, Loan, NewClient, NewLoan, NewPayment, Payment};
use crate::store::{clients, loans, payments, Store};
use crate::types::{ClientId, LoanId, LoanStatus};
use crate::views::{
    ClientDetail, ClientListing, ClientQuery, ClientSummary, ClientWithTotals, ComingDue,
    DashboardTotals, LoanDetail, LoanQuery, LoanWithTotals,
};

/// the loan accounting service the ui layer talks to
pub struct LoanTracker {
    store: Store,
    time: SafeTimeProvider,
    config: TrackerConfig,
    events: EventStore,
}

impl LoanTracker {
    pub fn new(store: Store, time: SafeTimeProvider, config: TrackerConfig) -> Self {
        Self {
            store,
            time,
            config,
            events: EventStore::new(),
        }
    }

    /// open the store described by `config`
    pub fn open(config: TrackerConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        let store = Store::open_with_config(&config.database)?;
        Ok(Self::new(store, time, config))
    }

    /// open with system time
    pub fn open_now(config: TrackerConfig) -> Result<Self> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        Self::open(config, time)
    }

    pub fn in_memory(time: SafeTimeProvider) -> Result<Self> {
        Self::open(TrackerConfig::in_memory(), time)
    }

    /// the as-of date every derivation uses
    pub fn today(&self) -> NaiveDate {
        self.time.now().date_naive()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    // clients

    pub fn create_client(&mut self, new_client: NewClient) -> Result<Client> {
        let client = new_client.into_client(self.today())?;
        clients::insert(self.store.connection(), &client)?;

        info!(client_id = %client.id, name = %client.name, "client registered");
        self.events.emit(Event::ClientRegistered {
            client_id: client.id,
            name: client.name.clone(),
            date: client.registration_date,
        });

        Ok(client)
    }

    pub fn update_client(&mut self, id: ClientId, update: ClientUpdate) -> Result<Client> {
        let conn = self.store.connection();
        let mut client = clients::get(conn, id)?.ok_or(TrackerError::ClientNotFound { id })?;
        update.apply_to(&mut client)?;

        if !clients::update(conn, &client)? {
            return Err(TrackerError::ClientNotFound { id });
        }

        info!(client_id = %id, "client updated");
        self.events.emit(Event::ClientUpdated { client_id: id });
        Ok(client)
    }

    /// Deletes a client that has no loans.
    pub fn delete_client(&mut self, id: ClientId) -> Result<()> {
        let tx = self.store.transaction()?;

        if clients::get(&tx, id)?.is_none() {
            return Err(TrackerError::ClientNotFound { id });
        }

        let loan_count = loans::count_for_client(&tx, id)?;
        if loan_count > 0 {
            warn!(client_id = %id, loan_count, "refusing to delete client with loans");
            return Err(TrackerError::ClientHasLoans { id, loan_count });
        }

        clients::delete(&tx, id)?;
        tx.commit()?;

        info!(client_id = %id, "client deleted");
        self.events.emit(Event::ClientDeleted { client_id: id });
        Ok(())
    }

    pub fn get_client_detail(&self, id: ClientId) -> Result<ClientDetail> {
        let conn = self.store.connection();
        let client = clients::get(conn, id)?.ok_or(TrackerError::ClientNotFound { id })?;
        let counts = payments::counts_by_loan(conn)?;

        let loans: Vec<LoanWithTotals> = loans::list_for_client(conn, id)?
            .into_iter()
            .map(|loan| {
                let count = counts.get(&loan.id).copied().unwrap_or(0);
                LoanWithTotals::new(loan, client.name.clone(), count)
            })
            .collect();

        Ok(ClientDetail {
            active_loans: loans
                .iter()
                .filter(|l| l.loan.status == LoanStatus::Active)
                .count() as u32,
            total_balance: loans.iter().map(|l| l.loan.balance).sum(),
            total_paid: loans.iter().map(|l| l.loan.cumulative_paid).sum(),
            client,
            loans,
        })
    }

    pub fn list_clients_with_totals(&self, query: &ClientQuery) -> Result<ClientListing> {
        let conn = self.store.connection();
        let all_clients = clients::list(conn)?;
        let all_loans = loans::list_all(conn)?;

        let mut by_client: HashMap<ClientId, Vec<&Loan>> = HashMap::new();
        for loan in &all_loans {
            by_client.entry(loan.client_id).or_default().push(loan);
        }

        let summary = ClientSummary {
            total_clients: all_clients.len() as u32,
            clients_with_loans: by_client.len() as u32,
            open_loans: all_loans
                .iter()
                .filter(|l| l.status != LoanStatus::Paid)
                .count() as u32,
        };

        let clients = all_clients
            .into_iter()
            .filter(|c| query.matches(c))
            .map(|client| {
                let loans = by_client.get(&client.id).map(Vec::as_slice).unwrap_or(&[]);
                ClientWithTotals::new(client, loans)
            })
            .collect();

        Ok(ClientListing { clients, summary })
    }

    // loans

    pub fn create_loan(&mut self, new_loan: NewLoan) -> Result<Loan> {
        let loan = new_loan.into_loan()?;
        let tx = self.store.transaction()?;

        if clients::get(&tx, loan.client_id)?.is_none() {
            return Err(TrackerError::ClientNotFound { id: loan.client_id });
        }
        loans::insert(&tx, &loan)?;
        tx.commit()?;

        info!(
            loan_id = %loan.id,
            client_id = %loan.client_id,
            principal = %loan.principal,
            due_date = %loan.due_date,
            "loan originated"
        );
        self.events.emit(Event::LoanOriginated {
            loan_id: loan.id,
            client_id: loan.client_id,
            principal: loan.principal,
            total_obligation: loan.total_obligation(),
            due_date: loan.due_date,
        });

        Ok(loan)
    }

    /// Deletes a loan and its payments, returning how many payments went with it.
    pub fn delete_loan(&mut self, id: LoanId) -> Result<u32> {
        let tx = self.store.transaction()?;

        if loans::get(&tx, id)?.is_none() {
            return Err(TrackerError::LoanNotFound { id });
        }

        let payments_removed = payments::delete_for_loan(&tx, id)?;
        loans::delete(&tx, id)?;
        tx.commit()?;

        info!(loan_id = %id, payments_removed, "loan deleted");
        self.events.emit(Event::LoanDeleted {
            loan_id: id,
            payments_removed,
        });
        Ok(payments_removed)
    }

    /// Loans with derived totals, after bringing statuses up to date.
    pub fn list_loans_with_totals(&mut self, query: &LoanQuery) -> Result<Vec<LoanWithTotals>> {
        self.refresh_statuses()?;

        let conn = self.store.connection();
        let counts = payments::counts_by_loan(conn)?;

        let loans = loans::list_with_client_names(conn)?
            .into_iter()
            .map(|(loan, client_name)| {
                let count = counts.get(&loan.id).copied().unwrap_or(0);
                LoanWithTotals::new(loan, client_name, count)
            })
            .filter(|row| query.matches(row))
            .collect();

        Ok(loans)
    }

    pub fn get_loan_detail(&self, id: LoanId) -> Result<LoanDetail> {
        let conn = self.store.connection();
        let (loan, client_name) =
            loans::get_with_client_name(conn, id)?.ok_or(TrackerError::LoanNotFound { id })?;
        let payments = payments::list_for_loan(conn, id)?;

        Ok(LoanDetail {
            total_obligation: loan.total_obligation(),
            outstanding: loan.outstanding(),
            expected_due_dates: loan.expected_due_dates(),
            progress: loan.progress(payments.len() as u32),
            client_name,
            payments,
            loan,
        })
    }

    /// calendar of one month for a loan, marking payments and expected installments
    pub fn loan_calendar(&self, id: LoanId, month: CalendarMonth) -> Result<MonthCalendar> {
        let conn = self.store.connection();
        let loan = loans::get(conn, id)?.ok_or(TrackerError::LoanNotFound { id })?;
        let paid_on: Vec<NaiveDate> = payments::list_for_loan(conn, id)?
            .iter()
            .map(|p| p.date)
            .collect();

        Ok(month_calendar(
            month,
            &loan.expected_due_dates(),
            &paid_on,
            self.today(),
        ))
    }

    // payments

    /// Records a payment and updates the loan's totals and status atomically.
    pub fn register_payment(&mut self, new_payment: NewPayment) -> Result<Payment> {
        let NewPayment {
            loan_id,
            amount,
            note,
        } = new_payment;

        if !amount.is_positive() {
            warn!(loan_id = %loan_id, amount = %amount, "rejected non-positive payment");
            return Err(TrackerError::InvalidPaymentAmount { amount });
        }

        let today = self.today();
        let tx = self.store.transaction()?;

        // fresh read inside the transaction, never stale caller state
        let mut loan = loans::get(&tx, loan_id)?.ok_or(TrackerError::LoanNotFound { id: loan_id })?;
        if let Err(err) = loan.validate_payment(amount) {
            warn!(loan_id = %loan_id, amount = %amount, outstanding = %loan.outstanding(), "rejected payment");
            return Err(err);
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            loan_id,
            date: today,
            amount,
            note: optional_text(note),
        };
        payments::insert(&tx, &payment)?;

        loan.apply_payment(amount);
        loans::update_totals(&tx, loan.id, loan.balance, loan.cumulative_paid)?;

        let old_status = loan.status;
        let new_status = derive_status(&loan.status_inputs(), today);
        loans::update_status(&tx, loan.id, new_status)?;

        tx.commit()?;

        info!(
            loan_id = %loan_id,
            payment_id = %payment.id,
            amount = %amount,
            balance = %loan.balance,
            status = %new_status,
            "payment registered"
        );
        self.events.emit(Event::PaymentRegistered {
            loan_id,
            payment_id: payment.id,
            amount,
            new_balance: loan.balance,
            date: today,
        });
        if let Some(change) = StatusChange::between(old_status, new_status) {
            self.emit_status_change(loan_id, change, today);
        }

        Ok(payment)
    }

    // status & dashboard

    /// Re-derives and rewrites the status of every loan not yet paid.
    ///
    /// Returns the number of loans rewritten.
    pub fn refresh_statuses(&mut self) -> Result<usize> {
        let today = self.today();
        let tx = self.store.transaction()?;

        let unpaid = loans::list_unpaid(&tx)?;
        let mut changes = Vec::new();
        for loan in &unpaid {
            let status = derive_status(&loan.status_inputs(), today);
            loans::update_status(&tx, loan.id, status)?;
            if let Some(change) = StatusChange::between(loan.status, status) {
                changes.push((loan.id, change));
            }
        }

        tx.commit()?;

        debug!(rewritten = unpaid.len(), changed = changes.len(), as_of = %today, "statuses refreshed");
        for (loan_id, change) in changes {
            self.emit_status_change(loan_id, change, today);
        }

        Ok(unpaid.len())
    }

    pub fn get_dashboard_totals(&mut self) -> Result<DashboardTotals> {
        self.refresh_statuses()?;

        let today = self.today();
        let horizon = today
            .checked_add_days(Days::new(self.config.upcoming_window_days as u64))
            .unwrap_or(NaiveDate::MAX);

        let conn = self.store.connection();
        let all_loans = loans::list_with_client_names(conn)?;
        let mut totals = DashboardTotals {
            total_clients: clients::count(conn)?,
            ..DashboardTotals::default()
        };

        let mut borrowers = HashSet::new();
        for (loan, client_name) in &all_loans {
            borrowers.insert(loan.client_id);
            totals.total_lent += loan.principal;
            totals.total_collected += loan.cumulative_paid;
            totals.total_outstanding += loan.outstanding();

            match loan.status {
                LoanStatus::Active => totals.active_loans += 1,
                LoanStatus::Overdue => totals.overdue_loans += 1,
                LoanStatus::Paid => totals.paid_loans += 1,
            }

            if loan.status != LoanStatus::Paid && loan.due_date >= today && loan.due_date <= horizon {
                totals.coming_due.push(ComingDue {
                    loan_id: loan.id,
                    client_name: client_name.clone(),
                    outstanding: loan.outstanding(),
                    due_date: loan.due_date,
                });
            }
        }
        totals.clients_with_loans = borrowers.len() as u32;
        totals.coming_due.sort_by_key(|c| c.due_date);

        Ok(totals)
    }

    fn emit_status_change(&mut self, loan_id: LoanId, change: StatusChange, as_of: NaiveDate) {
        info!(loan_id = %loan_id, from = %change.from, to = %change.to, "loan status changed");
        self.events.emit(Event::StatusChanged {
            loan_id,
            old_status: change.from,
            new_status: change.to,
            as_of,
        });
    }
}
