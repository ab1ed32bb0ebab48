use std::collections::HashMap;

use rusqlite::{params, Connection, Row};

use crate::errors::Result;
use crate::records::Payment;
use crate::store::id_column;
use crate::types::LoanId;

const COLUMNS: &str = "id, loan_id, date, amount, note";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: id_column(row, 0)?,
        loan_id: id_column(row, 1)?,
        date: row.get(2)?,
        amount: row.get(3)?,
        note: row.get(4)?,
    })
}

pub fn insert(conn: &Connection, payment: &Payment) -> Result<()> {
    conn.execute(
        "INSERT INTO payments (id, loan_id, date, amount, note) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            payment.id.to_string(),
            payment.loan_id.to_string(),
            payment.date,
            payment.amount,
            payment.note,
        ],
    )?;
    Ok(())
}

/// a loan's payments in the order they were made
pub fn list_for_loan(conn: &Connection, loan_id: LoanId) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM payments WHERE loan_id = ?1 ORDER BY date ASC, rowid ASC"
    ))?;
    let payments = stmt
        .query_map([loan_id.to_string()], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(payments)
}

/// payment counts keyed by loan; loans without payments are absent
pub fn counts_by_loan(conn: &Connection) -> Result<HashMap<LoanId, u32>> {
    let mut stmt = conn.prepare("SELECT loan_id, COUNT(*) FROM payments GROUP BY loan_id")?;
    let counts = stmt
        .query_map([], |row| Ok((id_column(row, 0)?, row.get::<_, u32>(1)?)))?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;
    Ok(counts)
}

/// Removes every payment of a loan, returning how many were deleted.
pub fn delete_for_loan(conn: &Connection, loan_id: LoanId) -> Result<u32> {
    let removed = conn.execute(
        "DELETE FROM payments WHERE loan_id = ?1",
        [loan_id.to_string()],
    )?;
    Ok(removed as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::records::{NewClient, NewLoan};
    use crate::store::{clients, loans, Store};
    use crate::types::PaymentFrequency;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed_loan(conn: &Connection) -> LoanId {
        let client = NewClient::new("Ana", "0424").into_client(date(2024, 1, 1)).unwrap();
        clients::insert(conn, &client).unwrap();
        let loan = NewLoan {
            client_id: client.id,
            principal: Money::from_major(1_000),
            rate: Rate::ZERO,
            start_date: date(2024, 1, 1),
            frequency: PaymentFrequency::Weekly,
            installment_count: 4,
        }
        .into_loan()
        .unwrap();
        loans::insert(conn, &loan).unwrap();
        loan.id
    }

    fn payment(loan_id: LoanId, on: NaiveDate, amount: i64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            loan_id,
            date: on,
            amount: Money::from_major(amount),
            note: None,
        }
    }

    #[test]
    fn test_payments_ordered_by_date() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();
        let loan_id = seed_loan(conn);

        insert(conn, &payment(loan_id, date(2024, 1, 15), 200)).unwrap();
        insert(conn, &payment(loan_id, date(2024, 1, 8), 100)).unwrap();

        let amounts: Vec<Money> = list_for_loan(conn, loan_id)
            .unwrap()
            .into_iter()
            .map(|p| p.amount)
            .collect();
        assert_eq!(amounts, vec![Money::from_major(100), Money::from_major(200)]);
        assert_eq!(counts_by_loan(conn).unwrap().get(&loan_id), Some(&2));
    }

    #[test]
    fn test_payment_requires_existing_loan() {
        let store = Store::in_memory().unwrap();
        let orphan = payment(Uuid::new_v4(), date(2024, 1, 1), 10);
        assert!(insert(store.connection(), &orphan).is_err());
    }

    #[test]
    fn test_delete_for_loan() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();
        let loan_id = seed_loan(conn);

        for day in 1..=3 {
            insert(conn, &payment(loan_id, date(2024, 2, day), 50)).unwrap();
        }

        // loan row is still referenced
        assert!(loans::delete(conn, loan_id).is_err());

        assert_eq!(delete_for_loan(conn, loan_id).unwrap(), 3);
        assert!(loans::delete(conn, loan_id).unwrap());
        assert!(counts_by_loan(conn).unwrap().is_empty());
    }
}
