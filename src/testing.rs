// ABOUTME: In-memory data-access double used by unit tests
// ABOUTME: Serves fixed rows per table and records connects, queries and closes

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ConnectionProfile;
use crate::db::{Connector, DataAccess, DbError, DbResult};
use crate::models::{Row, RowLimit, Table};

/// The only password the memory server accepts
pub(crate) const PASSWORD: &str = "secret";

const NO_LIMIT: u32 = u32::MAX;

/// Counters and switches shared between a connector, its sessions and the test
#[derive(Debug)]
pub(crate) struct Stats {
    connects: AtomicUsize,
    queries: AtomicUsize,
    closes: AtomicUsize,
    last_limit: AtomicU32,
    fail_queries: AtomicBool,
    fail_close: AtomicBool,
    drop_connection: AtomicBool,
}

impl Stats {
    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn last_limit(&self) -> Option<u32> {
        match self.last_limit.load(Ordering::SeqCst) {
            NO_LIMIT => None,
            limit => Some(limit),
        }
    }

    pub(crate) fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    /// Make the server drop the open session at the next query
    pub(crate) fn drop_connection(&self) {
        self.drop_connection.store(true, Ordering::SeqCst);
    }
}

pub(crate) fn names_row(first: &str, last: &str) -> Row {
    vec![Some(first.to_string()), Some(last.to_string())]
}

fn full_b_row(first: &str, last: &str, email: Option<&str>) -> Row {
    let mut row = names_row(first, last);
    row.push(email.map(str::to_string));
    row.push(Some("web".to_string()));
    row.push(Some("crm".to_string()));
    row
}

fn a_row(id: u32) -> Row {
    (1..=6)
        .map(|c| if c == 4 { None } else { Some(format!("{}-{}", id, c)) })
        .collect()
}

pub(crate) struct MemoryConnector {
    tables: Arc<HashMap<Table, Vec<Row>>>,
    stats: Arc<Stats>,
}

impl MemoryConnector {
    pub(crate) fn new(tables: HashMap<Table, Vec<Row>>) -> Self {
        Self {
            tables: Arc::new(tables),
            stats: Arc::new(Stats {
                connects: AtomicUsize::new(0),
                queries: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                last_limit: AtomicU32::new(NO_LIMIT),
                fail_queries: AtomicBool::new(false),
                fail_close: AtomicBool::new(false),
                drop_connection: AtomicBool::new(false),
            }),
        }
    }

    /// Three rows in `in450a` and `in450b`, `in450c` empty
    pub(crate) fn sample() -> Self {
        let mut tables = HashMap::new();
        tables.insert(Table::In450a, (1..=3).map(a_row).collect());
        tables.insert(
            Table::In450b,
            vec![
                full_b_row("Jane", "Doe", Some("jane@example.com")),
                full_b_row("Al", "Lee", None),
                full_b_row("Mo", "Khan", Some("mo@example.com")),
            ],
        );
        tables.insert(Table::In450c, Vec::new());
        Self::new(tables)
    }

    pub(crate) fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }
}

impl Connector for MemoryConnector {
    type Session = MemorySession;

    fn session(&self, profile: ConnectionProfile) -> MemorySession {
        MemorySession {
            profile,
            open: false,
            tables: Arc::clone(&self.tables),
            stats: Arc::clone(&self.stats),
        }
    }
}

pub(crate) struct MemorySession {
    profile: ConnectionProfile,
    open: bool,
    tables: Arc<HashMap<Table, Vec<Row>>>,
    stats: Arc<Stats>,
}

impl MemorySession {
    fn start_query(&mut self) -> DbResult<()> {
        self.stats.queries.fetch_add(1, Ordering::SeqCst);
        if self.stats.drop_connection.swap(false, Ordering::SeqCst) {
            self.open = false;
            return Err(DbError::Connection(
                "server closed the connection unexpectedly".to_string(),
            ));
        }
        if self.stats.fail_queries.load(Ordering::SeqCst) {
            return Err(DbError::DataAccess("relation does not exist".to_string()));
        }
        Ok(())
    }

    fn rows(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[async_trait]
impl DataAccess for MemorySession {
    async fn connect(&mut self) -> DbResult<()> {
        if self.open {
            return Ok(());
        }
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        if self.profile.host == "unreachable" {
            return Err(DbError::Connection("connection refused".to_string()));
        }
        if self.profile.password != PASSWORD {
            return Err(DbError::Connection(format!(
                "password authentication failed for user \"{}\"",
                self.profile.username
            )));
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> DbResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        if self.stats.fail_close.load(Ordering::SeqCst) {
            return Err(DbError::Connection("close failed: broken pipe".to_string()));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn count(&mut self, table: Table) -> DbResult<i64> {
        self.connect().await?;
        self.start_query()?;
        Ok(self.rows(table).len() as i64)
    }

    async fn fetch_rows(
        &mut self,
        table: Table,
        limit: RowLimit,
        columns: &[&str],
    ) -> DbResult<Vec<Row>> {
        let mut indices = Vec::with_capacity(columns.len());
        for column in columns {
            let index = table
                .columns()
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| DbError::DataAccess(format!("unknown column '{}'", column)))?;
            indices.push(index);
        }

        self.connect().await?;
        self.start_query()?;
        self.stats.last_limit.store(limit.get(), Ordering::SeqCst);

        Ok(self
            .rows(table)
            .iter()
            .take(limit.get() as usize)
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_session_honours_limit_and_column_order() {
        let connector = MemoryConnector::sample();
        let mut session = connector.session(ConnectionProfile {
            password: PASSWORD.to_string(),
            ..ConnectionProfile::default()
        });

        for limit in 0..5u64 {
            let rows = session
                .fetch_rows(Table::In450b, RowLimit::clamped(limit), &["last_name", "first_name"])
                .await
                .unwrap();
            assert!(rows.len() as u64 <= limit);
            if let Some(first) = rows.first() {
                assert_eq!(first, &names_row("Doe", "Jane"));
            }
        }
        let rows = session.in450b_names(RowLimit::clamped(1)).await.unwrap();
        assert_eq!(rows, vec![names_row("Jane", "Doe")]);

        session.close().await.unwrap();
        assert!(!session.is_open());
        session.close().await.unwrap();
        assert_eq!(connector.stats().closes(), 1);
    }
}
