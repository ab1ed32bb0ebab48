use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::Result;
use crate::records::Client;
use crate::store::id_column;
use crate::types::ClientId;

const COLUMNS: &str = "id, registration_date, name, phone, address, note";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: id_column(row, 0)?,
        registration_date: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        note: row.get(5)?,
    })
}

pub fn insert(conn: &Connection, client: &Client) -> Result<()> {
    conn.execute(
        "INSERT INTO clients (id, registration_date, name, phone, address, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            client.id.to_string(),
            client.registration_date,
            client.name,
            client.phone,
            client.address,
            client.note,
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: ClientId) -> Result<Option<Client>> {
    let client = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM clients WHERE id = ?1"),
            [id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(client)
}

/// all clients ordered by name
pub fn list(conn: &Connection) -> Result<Vec<Client>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM clients ORDER BY name COLLATE NOCASE ASC, registration_date ASC"
    ))?;
    let clients = stmt
        .query_map([], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(clients)
}

/// Rewrites the editable fields. Returns false when no such client exists.
pub fn update(conn: &Connection, client: &Client) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE clients
         SET registration_date = ?2, name = ?3, phone = ?4, address = ?5, note = ?6
         WHERE id = ?1",
        params![
            client.id.to_string(),
            client.registration_date,
            client.name,
            client.phone,
            client.address,
            client.note,
        ],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: ClientId) -> Result<bool> {
    let removed = conn.execute("DELETE FROM clients WHERE id = ?1", [id.to_string()])?;
    Ok(removed > 0)
}

pub fn count(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::NewClient;
    use crate::store::Store;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_insert_get_update_delete() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();

        let mut client = NewClient::new("Ana Torres", "0424-5556677")
            .address("Sector El Sol")
            .into_client(today())
            .unwrap();
        insert(conn, &client).unwrap();

        let loaded = get(conn, client.id).unwrap().unwrap();
        assert_eq!(loaded, client);

        client.phone = "0424-0000000".to_string();
        client.note = Some("new number".to_string());
        assert!(update(conn, &client).unwrap());
        assert_eq!(get(conn, client.id).unwrap().unwrap().phone, "0424-0000000");

        assert!(delete(conn, client.id).unwrap());
        assert!(get(conn, client.id).unwrap().is_none());
        assert!(!delete(conn, client.id).unwrap());
    }

    #[test]
    fn test_missing_client() {
        let store = Store::in_memory().unwrap();
        assert!(get(store.connection(), Uuid::new_v4()).unwrap().is_none());

        let ghost = NewClient::new("Nobody", "000").into_client(today()).unwrap();
        assert!(!update(store.connection(), &ghost).unwrap());
    }

    #[test]
    fn test_list_sorted_by_name() {
        let store = Store::in_memory().unwrap();
        let conn = store.connection();

        for name in ["luis", "Carlos", "ana"] {
            insert(conn, &NewClient::new(name, "1").into_client(today()).unwrap()).unwrap();
        }

        let names: Vec<String> = list(conn).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["ana", "Carlos", "luis"]);
        assert_eq!(count(conn).unwrap(), 3);
    }
}
