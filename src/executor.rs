//! The remote execution seam.
//!
//! The provider never opens a database connection. Every statement is handed
//! to a [`StatementExecutor`] together with [`ConnectionCoordinates`] — the
//! opaque identifiers a stateless SQL-over-HTTP service (the AWS RDS Data
//! API) needs to route the statement. The client for that service lives
//! outside this crate; anything that can run `(coordinates, sql) -> rows`
//! plugs in behind the trait, which is also what makes the reconcilers
//! testable without a database (see [`crate::testing`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifiers the remote execution service needs to reach the database.
///
/// The core passes these through without interpreting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCoordinates {
    /// ARN of the Aurora cluster to execute against.
    pub resource_arn: String,
    /// ARN of the secret holding the credentials to execute with.
    pub secret_arn: String,
    /// Database to execute in. `None` runs in the connection default,
    /// which is where cluster-wide role DDL belongs.
    pub database: Option<String>,
}

impl ConnectionCoordinates {
    /// Coordinates for cluster-level statements (no database selected).
    pub fn cluster(resource_arn: impl Into<String>, secret_arn: impl Into<String>) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: None,
        }
    }

    /// Coordinates for statements scoped to one database.
    pub fn database(
        resource_arn: impl Into<String>,
        secret_arn: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            secret_arn: secret_arn.into(),
            database: Some(database.into()),
        }
    }
}

/// A single result cell, typed as the field kinds the core consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// SQL NULL.
    Null,
    /// A boolean column.
    Bool(bool),
    /// An integral column.
    Long(i64),
    /// A floating-point column.
    Double(f64),
    /// A text column.
    String(String),
}

impl CellValue {
    /// The cell as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The cell as a boolean.
    ///
    /// Accepts native booleans and the textual forms PostgreSQL catalogs
    /// render booleans as (`t`/`f`/`true`/`false`).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => match s.as_str() {
                "t" | "true" => Some(true),
                "f" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// An ordered row of cells.
pub type Row = Vec<CellValue>;

/// The tabular result of one statement execution.
///
/// The core only ever inspects the row count and, for read-back queries,
/// the positional cells of a single row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The rows returned by the statement, in order.
    pub rows: Vec<Row>,
}

impl ExecutionResult {
    /// A result with no rows (what DDL/DML statements return).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A result with the given rows.
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The only row, if exactly one came back.
    pub fn single_row(&self) -> Option<&Row> {
        match self.rows.as_slice() {
            [row] => Some(row),
            _ => None,
        }
    }
}

/// A failure reported by the remote execution service.
///
/// The service's errors (network, auth, SQL syntax, permissions) arrive as
/// one opaque message; the reconcilers attach the operation context.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExecutionError {
    message: String,
}

impl ExecutionError {
    /// Wrap a message from the execution service.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Executes SQL statements against a remote database.
///
/// Implementations are expected to be stateless between calls; the provider
/// issues no transaction control and assumes none.
#[async_trait::async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Execute one SQL statement and return its tabular result.
    async fn execute(
        &self,
        coordinates: &ConnectionCoordinates,
        sql: &str,
    ) -> Result<ExecutionResult, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_as_bool() {
        assert_eq!(CellValue::Bool(true).as_bool(), Some(true));
        assert_eq!(CellValue::String("t".into()).as_bool(), Some(true));
        assert_eq!(CellValue::String("false".into()).as_bool(), Some(false));
        assert_eq!(CellValue::String("yes".into()).as_bool(), None);
        assert_eq!(CellValue::Null.as_bool(), None);
        assert_eq!(CellValue::Long(1).as_bool(), None);
    }

    #[test]
    fn test_single_row() {
        let empty = ExecutionResult::empty();
        assert_eq!(empty.row_count(), 0);
        assert!(empty.single_row().is_none());

        let one = ExecutionResult::with_rows(vec![vec![CellValue::String("a".into())]]);
        assert_eq!(one.row_count(), 1);
        assert!(one.single_row().is_some());

        let two = ExecutionResult::with_rows(vec![vec![], vec![]]);
        assert!(two.single_row().is_none());
    }

    #[test]
    fn test_coordinates_constructors() {
        let cluster = ConnectionCoordinates::cluster("arn:cluster", "arn:secret");
        assert_eq!(cluster.database, None);

        let scoped = ConnectionCoordinates::database("arn:cluster", "arn:secret", "core");
        assert_eq!(scoped.database.as_deref(), Some("core"));
    }
}
