//! Persisted per-client last-submit timestamps
//!
//! The rate limiter needs the last accepted submission time to survive app
//! restarts, otherwise a relaunch grants a free double-tap. `SqliteSubmitLog`
//! is the production store; `MemorySubmitLog` backs tests.

use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait SubmitLog: Send + Sync {
    /// Unix milliseconds of the client's last accepted submission.
    fn last_submit_ms(
        &self,
        client_key: &str,
    ) -> Result<Option<i64>, Box<dyn std::error::Error + Send + Sync>>;

    /// Record an accepted submission. Called before the network write so a
    /// rapid second tap sees the updated timestamp.
    fn record(
        &self,
        client_key: &str,
        now_ms: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub struct SqliteSubmitLog {
    conn: Mutex<Connection>,
}

impl SqliteSubmitLog {
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS submit_log (
                client_key TEXT PRIMARY KEY,
                last_sent_ms INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SubmitLog for SqliteSubmitLog {
    fn last_submit_ms(
        &self,
        client_key: &str,
    ) -> Result<Option<i64>, Box<dyn std::error::Error + Send + Sync>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT last_sent_ms FROM submit_log WHERE client_key = ?1")?;
        let mut rows = stmt.query([client_key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn record(
        &self,
        client_key: &str,
        now_ms: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO submit_log (client_key, last_sent_ms) VALUES (?1, ?2)
             ON CONFLICT(client_key) DO UPDATE SET last_sent_ms = excluded.last_sent_ms",
            rusqlite::params![client_key, now_ms],
        )?;
        Ok(())
    }
}

/// In-memory store for tests and single-session use.
#[derive(Default)]
pub struct MemorySubmitLog {
    entries: Mutex<HashMap<String, i64>>,
}

impl MemorySubmitLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmitLog for MemorySubmitLog {
    fn last_submit_ms(
        &self,
        client_key: &str,
    ) -> Result<Option<i64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.entries.lock().unwrap().get(client_key).copied())
    }

    fn record(
        &self,
        client_key: &str,
        now_ms: i64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.entries
            .lock()
            .unwrap()
            .insert(client_key.to_string(), now_ms);
        Ok(())
    }
}
