// ABOUTME: Data-access traits shared by the PostgreSQL session and test doubles
// ABOUTME: A Connector builds sessions; a session owns one connection and serves reads

use async_trait::async_trait;

use crate::config::ConnectionProfile;
use crate::db::error::DbResult;
use crate::models::{Row, RowLimit, Table};

/// Columns returned by the "names" view of `in450b`
pub const NAME_COLUMNS: &[&str] = &["first_name", "last_name"];

/// One database session with an explicit open/close lifecycle.
///
/// Every read opens the connection first if needed, so callers never see a
/// "not connected" state; a failed reopen surfaces as a connection error.
#[async_trait]
pub trait DataAccess: Send {
    /// Open the connection. No-op when already open.
    async fn connect(&mut self) -> DbResult<()>;

    /// Release the connection. The handle is dropped even when the close
    /// handshake fails; calling this on a closed session returns `Ok`.
    async fn close(&mut self) -> DbResult<()>;

    fn is_open(&self) -> bool;

    /// `SELECT COUNT(*)` on `table`
    async fn count(&mut self, table: Table) -> DbResult<i64>;

    /// Up to `limit` rows of `columns`, values in the order the columns are given
    async fn fetch_rows(
        &mut self,
        table: Table,
        limit: RowLimit,
        columns: &[&str],
    ) -> DbResult<Vec<Row>>;

    /// `(first_name, last_name)` pairs from `in450b`
    async fn in450b_names(&mut self, limit: RowLimit) -> DbResult<Vec<Row>> {
        self.fetch_rows(Table::In450b, limit, NAME_COLUMNS).await
    }
}

/// Builds unopened sessions from a connection profile
pub trait Connector: Send + Sync {
    type Session: DataAccess;

    fn session(&self, profile: ConnectionProfile) -> Self::Session;
}
