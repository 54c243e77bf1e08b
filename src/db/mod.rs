// ABOUTME: Database module exports for the IN450 viewer
// ABOUTME: Contains the data-access traits, their errors and the PostgreSQL session

pub mod error;
pub mod postgres;
pub mod traits;

pub use error::{DbError, DbResult};
pub use postgres::{PgConnector, PgSession};
pub use traits::{Connector, DataAccess, NAME_COLUMNS};
