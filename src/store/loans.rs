use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::decimal::Money;
use crate::errors::Result;
use crate::records::Loan;
use crate::store::id_column;
use crate::types::{ClientId, LoanId, LoanStatus};

const COLUMNS: &str = "l.id, l.client_id, l.principal, l.balance, l.cumulative_paid, l.rate, \
                       l.start_date, l.due_date, l.frequency, l.installment_count, l.status";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: id_column(row, 0)?,
        client_id: id_column(row, 1)?,
        principal: row.get(2)?,
        balance: row.get(3)?,
        cumulative_paid: row.get(4)?,
        rate: row.get(5)?,
        start_date: row.get(6)?,
        due_date: row.get(7)?,
        frequency: row.get(8)?,
        installment_count: row.get(9)?,
        status: row.get(10)?,
    })
}

pub fn insert(conn: &Connection, loan: &Loan) -> Result<()> {
    conn.execute(
        "INSERT INTO loans (id, client_id, principal, balance, cumulative_paid, rate,
                            start_date, due_date, frequency, installment_count, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            loan.id.to_string(),
            loan.client_id.to_string(),
            loan.principal,
            loan.balance,
            loan.cumulative_paid,
            loan.rate,
            loan.start_date,
            loan.due_date,
            loan.frequency,
            loan.installment_count,
            loan.status,
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: LoanId) -> Result<Option<Loan>> {
    let loan = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM loans l WHERE l.id = ?1"),
            [id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(loan)
}

/// loan together with its client's name
pub fn get_with_client_name(conn: &Connection, id: LoanId) -> Result<Option<(Loan, String)>> {
    let loan = conn
        .query_row(
            &format!(
                "SELECT {COLUMNS}, c.name FROM loans l
                 JOIN clients c ON c.id = l.client_id
                 WHERE l.id = ?1"
            ),
            [id.to_string()],
            |row| Ok((from_row(row)?, row.get(11)?)),
        )
        .optional()?;
    Ok(loan)
}

/// every loan with its client's name, soonest due date first
pub fn list_with_client_names(conn: &Connection) -> Result<Vec<(Loan, String)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS}, c.name FROM loans l
         JOIN clients c ON c.id = l.client_id
         ORDER BY l.due_date ASC, c.name COLLATE NOCASE ASC"
    ))?;
    let loans = stmt
        .query_map([], |row| Ok((from_row(row)?, row.get(11)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(loans)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM loans l ORDER BY l.due_date ASC"
    ))?;
    let loans = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(loans)
}

/// loans that can still change status
pub fn list_unpaid(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM loans l WHERE l.status <> ?1 ORDER BY l.due_date ASC"
    ))?;
    let loans = stmt
        .query_map([LoanStatus::Paid], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(loans)
}

/// a client's loans, most recent start date first
pub fn list_for_client(conn: &Connection, client_id: ClientId) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM loans l WHERE l.client_id = ?1 ORDER BY l.start_date DESC"
    ))?;
    let loans = stmt
        .query_map([client_id.to_string()], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(loans)
}

pub fn count_for_client(conn: &Connection, client_id: ClientId) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM loans WHERE client_id = ?1",
        [client_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// persist the running totals after a payment
pub fn update_totals(
    conn: &Connection,
    id: LoanId,
    balance: Money,
    cumulative_paid: Money,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE loans SET balance = ?2, cumulative_paid = ?3 WHERE id = ?1",
        params![id.to_string(), balance, cumulative_paid],
    )?;
    Ok(changed > 0)
}

pub fn update_status(conn: &Connection, id: LoanId, status: LoanStatus) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE loans SET status = ?2 WHERE id = ?1",
        params![id.to_string(), status],
    )?;
    Ok(changed > 0)
}

/// Deletes the loan row only; payments must be removed first.
pub fn delete(conn: &Connection, id: LoanId) -> Result<bool> {
    let removed = conn.execute("DELETE FROM loans WHERE id = ?1", [id.to_string()])?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::records::{NewClient, NewLoan};
    use crate::store::{clients, Store};
    use crate::types::PaymentFrequency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_client(conn: &Connection, name: &str) -> ClientId {
        let client = NewClient::new(name, "0412").into_client(date(2024, 1, 1)).unwrap();
        clients::insert(conn, &client).unwrap();
        client.id
    }

    fn new_loan(client_id: ClientId, start: NaiveDate) -> Loan {
        NewLoan {
            client_id,
            principal: Money::from_major(5_000),
            rate: Rate::from_percentage(dec!(15)),
            start_date: start,
            frequency: PaymentFrequency::Monthly,
            installment_count: 6,
        }
        .into_loan()
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();
        let client_id = seed_client(conn, "María González");

        let loan = new_loan(client_id, date(2024, 1, 14));
        insert(conn, &loan).unwrap();

        let loaded = get(conn, loan.id).unwrap().unwrap();
        assert_eq!(loaded, loan);
        assert_eq!(loaded.total_obligation(), Money::from_major(5_750));

        let (_, name) = get_with_client_name(conn, loan.id).unwrap().unwrap();
        assert_eq!(name, "María González");
    }

    #[test]
    fn test_foreign_key_rejects_unknown_client() {
        let store = Store::in_memory().unwrap();
        let loan = new_loan(Uuid::new_v4(), date(2024, 1, 14));
        assert!(insert(store.connection(), &loan).is_err());
    }

    #[test]
    fn test_updates() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();
        let client_id = seed_client(conn, "Carlos Pérez");
        let loan = new_loan(client_id, date(2024, 1, 14));
        insert(conn, &loan).unwrap();

        assert!(update_totals(conn, loan.id, Money::from_major(5_250), Money::from_major(500)).unwrap());
        assert!(update_status(conn, loan.id, LoanStatus::Overdue).unwrap());

        let loaded = get(conn, loan.id).unwrap().unwrap();
        assert_eq!(loaded.balance, Money::from_major(5_250));
        assert_eq!(loaded.cumulative_paid, Money::from_major(500));
        assert_eq!(loaded.status, LoanStatus::Overdue);

        assert!(!update_status(conn, Uuid::new_v4(), LoanStatus::Paid).unwrap());
    }

    #[test]
    fn test_listing_and_counts() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();
        let ana = seed_client(conn, "Ana");
        let luis = seed_client(conn, "Luis");

        let older = new_loan(ana, date(2024, 1, 1));
        let newer = new_loan(ana, date(2024, 3, 1));
        let other = new_loan(luis, date(2024, 2, 1));
        for loan in [&older, &newer, &other] {
            insert(conn, loan).unwrap();
        }
        update_status(conn, other.id, LoanStatus::Paid).unwrap();

        let for_ana: Vec<LoanId> = list_for_client(conn, ana).unwrap().iter().map(|l| l.id).collect();
        assert_eq!(for_ana, vec![newer.id, older.id]);
        assert_eq!(count_for_client(conn, ana).unwrap(), 2);
        assert_eq!(count_for_client(conn, luis).unwrap(), 1);

        assert_eq!(list_all(conn).unwrap().len(), 3);
        assert_eq!(list_unpaid(conn).unwrap().len(), 2);

        let names: Vec<String> = list_with_client_names(conn)
            .unwrap()
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert_eq!(names, vec!["Ana", "Luis", "Ana"]);

        assert!(delete(conn, other.id).unwrap());
        assert_eq!(count_for_client(conn, luis).unwrap(), 0);
    }
}
