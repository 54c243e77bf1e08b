// ABOUTME: PostgreSQL session management using sqlx
// ABOUTME: Owns a single connection and runs the fixed read queries against the app schema

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Row as _};

use crate::config::ConnectionProfile;
use crate::db::error::{DbError, DbResult};
use crate::db::traits::{Connector, DataAccess};
use crate::models::{Row, RowLimit, Table};

/// Builds [`PgSession`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl Connector for PgConnector {
    type Session = PgSession;

    fn session(&self, profile: ConnectionProfile) -> PgSession {
        PgSession::new(profile)
    }
}

/// One connection to the viewer database plus the credentials used to open it.
/// No pooling and no transactions: every statement is a plain read.
pub struct PgSession {
    profile: ConnectionProfile,
    conn: Option<PgConnection>,
}

impl PgSession {
    pub fn new(profile: ConnectionProfile) -> Self {
        Self {
            profile,
            conn: None,
        }
    }

    pub fn profile(&self) -> &ConnectionProfile {
        &self.profile
    }

    fn connection(&mut self) -> DbResult<&mut PgConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| DbError::Connection("connection is not open".to_string()))
    }

    /// Classify a query failure. A connection-level failure means the server
    /// has dropped the session, so the handle is discarded and the next
    /// `connect()` opens a fresh one.
    fn settle<T>(&mut self, result: Result<T, sqlx::Error>) -> DbResult<T> {
        result.map_err(|e| {
            let err = DbError::from(e);
            if err.is_connection() && self.conn.take().is_some() {
                log::warn!(
                    "Discarding broken connection to {}: {}",
                    self.profile.display_target(),
                    err
                );
            }
            err
        })
    }
}

fn connect_options(profile: &ConnectionProfile) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&profile.host)
        .port(profile.port)
        .database(&profile.database)
        .username(&profile.username)
        .password(&profile.password)
}

/// `SELECT COUNT(*)` for a table
pub(crate) fn count_sql(table: Table) -> String {
    format!("SELECT COUNT(*) FROM {}", table.qualified_name())
}

/// Build the row query for `columns`. Only declared column names are accepted,
/// so the statement text always comes from the table's static column list.
/// Values are cast to text so every column type renders the same way.
pub(crate) fn select_sql(table: Table, columns: &[&str]) -> DbResult<String> {
    if columns.is_empty() {
        return Err(DbError::DataAccess(format!(
            "no columns requested from {}",
            table
        )));
    }

    let mut select_list = Vec::with_capacity(columns.len());
    for column in columns {
        if !table.has_column(column) {
            return Err(DbError::DataAccess(format!(
                "unknown column '{}' for {}",
                column, table
            )));
        }
        select_list.push(format!("{col}::text AS {col}", col = column));
    }

    Ok(format!(
        "SELECT {} FROM {} LIMIT $1",
        select_list.join(", "),
        table.qualified_name()
    ))
}

#[async_trait]
impl DataAccess for PgSession {
    async fn connect(&mut self) -> DbResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        log::info!("Connecting to {}", self.profile.display_target());
        let conn = PgConnection::connect_with(&connect_options(&self.profile))
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;
        self.conn = Some(conn);
        Ok(())
    }

    async fn close(&mut self) -> DbResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };

        log::info!("Closing connection to {}", self.profile.display_target());
        conn.close()
            .await
            .map_err(|e| DbError::Connection(format!("close failed: {}", e)))
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    async fn count(&mut self, table: Table) -> DbResult<i64> {
        let sql = count_sql(table);
        self.connect().await?;
        log::debug!("{}", sql);

        let conn = self.connection()?;
        let result = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *conn)
            .await;
        self.settle(result)
    }

    async fn fetch_rows(
        &mut self,
        table: Table,
        limit: RowLimit,
        columns: &[&str],
    ) -> DbResult<Vec<Row>> {
        let sql = select_sql(table, columns)?;
        self.connect().await?;
        log::debug!("{} [limit = {}]", sql, limit);

        let conn = self.connection()?;
        let result = sqlx::query(&sql)
            .bind(limit.as_i64())
            .fetch_all(&mut *conn)
            .await;
        let rows = self.settle(result)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                values.push(row.try_get::<Option<String>, _>(index)?);
            }
            out.push(values);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sql() {
        assert_eq!(count_sql(Table::In450a), "SELECT COUNT(*) FROM app.in450a");
        assert_eq!(count_sql(Table::In450c), "SELECT COUNT(*) FROM app.in450c");
    }

    #[test]
    fn test_select_sql_names() {
        let sql = select_sql(Table::In450b, &["first_name", "last_name"]).unwrap();
        assert_eq!(
            sql,
            "SELECT first_name::text AS first_name, last_name::text AS last_name \
             FROM app.in450b LIMIT $1"
        );
    }

    #[test]
    fn test_select_sql_keeps_declared_order() {
        let sql = select_sql(Table::In450c, Table::In450c.columns()).unwrap();
        let app_id = sql.find("AppID::text").unwrap();
        let dig_sig = sql.find("DigSig::text").unwrap();
        assert!(app_id < dig_sig);
        assert!(sql.ends_with("FROM app.in450c LIMIT $1"));
    }

    #[test]
    fn test_select_sql_rejects_undeclared_columns() {
        let err = select_sql(Table::In450a, &["col1", "col1; DROP TABLE x"]).unwrap_err();
        assert!(matches!(err, DbError::DataAccess(_)));

        let err = select_sql(Table::In450a, &[]).unwrap_err();
        assert!(!err.is_connection());
    }

    #[tokio::test]
    async fn test_close_without_connect_is_noop() {
        let mut session = PgConnector.session(ConnectionProfile::default());
        assert!(!session.is_open());
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(!session.is_open());
        assert_eq!(session.profile().port, 5432);
    }

    #[test]
    fn test_settle_classifies_query_failures() {
        let mut session = PgSession::new(ConnectionProfile::default());

        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "got 0 bytes at EOF");
        let err = session.settle::<i64>(Err(sqlx::Error::Io(io))).unwrap_err();
        assert!(err.is_connection());
        assert!(!session.is_open());

        let err = session
            .settle::<i64>(Err(sqlx::Error::RowNotFound))
            .unwrap_err();
        assert!(matches!(err, DbError::DataAccess(_)));
        assert_eq!(session.settle(Ok(7)).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_unknown_column_fails_before_connecting() {
        // No server is needed: validation happens before the connection is opened.
        let mut session = PgSession::new(ConnectionProfile::default());
        let err = session
            .fetch_rows(Table::In450b, RowLimit::default(), &["AppID"])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DataAccess(_)));
        assert!(!session.is_open());
    }
}
