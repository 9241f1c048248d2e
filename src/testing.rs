//! Testing utilities for the provider core.
//!
//! [`ScriptedExecutor`] stands in for the remote execution service: it
//! records every statement it is handed and replays a scripted queue of
//! results, so reconciler behavior — statement text, ordering, fail-fast
//! sequencing — can be asserted without a database.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rdsdata_postgres_provider::executor::ExecutionResult;
//! use rdsdata_postgres_provider::testing::ScriptedExecutor;
//!
//! # async fn example() {
//! let exec = Arc::new(
//!     ScriptedExecutor::new()
//!         .respond_ok(ExecutionResult::empty())
//!         .respond_err("permission denied"),
//! );
//! // hand `exec` to a RoleResource / SchemaResource, run an operation,
//! // then assert on what was executed:
//! assert!(exec.statements().is_empty());
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::executor::{
    CellValue, ConnectionCoordinates, ExecutionError, ExecutionResult, Row, StatementExecutor,
};

/// One statement as the executor received it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    /// The coordinates the statement was executed with.
    pub coordinates: ConnectionCoordinates,
    /// The SQL text.
    pub sql: String,
}

enum Scripted {
    Ok(ExecutionResult),
    Err(String),
}

/// A [`StatementExecutor`] that replays scripted results.
///
/// Responses are consumed in order; once the script is exhausted every
/// further statement succeeds with an empty result, so tests only script
/// the interesting steps.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Scripted>>,
    log: Mutex<Vec<ExecutedStatement>>,
}

impl ScriptedExecutor {
    /// An executor whose every statement succeeds with an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result.
    pub fn respond_ok(self, result: ExecutionResult) -> Self {
        self.responses.lock().unwrap().push_back(Scripted::Ok(result));
        self
    }

    /// Queue a successful result carrying the given rows.
    pub fn respond_rows(self, rows: Vec<Row>) -> Self {
        self.respond_ok(ExecutionResult::with_rows(rows))
    }

    /// Queue a failure with the given message.
    pub fn respond_err(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Err(message.into()));
        self
    }

    /// Everything executed so far, in order.
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.log.lock().unwrap().clone()
    }

    /// The SQL texts executed so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|s| s.sql.clone()).collect()
    }
}

#[async_trait::async_trait]
impl StatementExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        coordinates: &ConnectionCoordinates,
        sql: &str,
    ) -> Result<ExecutionResult, ExecutionError> {
        self.log.lock().unwrap().push(ExecutedStatement {
            coordinates: coordinates.clone(),
            sql: sql.to_string(),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Scripted::Ok(result)) => Ok(result),
            Some(Scripted::Err(message)) => Err(ExecutionError::new(message)),
            None => Ok(ExecutionResult::empty()),
        }
    }
}

/// A `pg_roles` read-back row in the column order the role resource reads.
pub fn role_catalog_row(
    name: &str,
    superuser: bool,
    inherit: bool,
    create_role: bool,
    create_database: bool,
    login: bool,
) -> Row {
    vec![
        CellValue::String(name.to_string()),
        CellValue::Bool(superuser),
        CellValue::Bool(inherit),
        CellValue::Bool(create_role),
        CellValue::Bool(create_database),
        CellValue::Bool(login),
    ]
}

/// A `pg_namespace` read-back row in the column order the schema resource
/// reads.
pub fn schema_catalog_row(name: &str, owner: &str) -> Row {
    vec![
        CellValue::String(name.to_string()),
        CellValue::String(owner.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_script_defaults_to_empty_success() {
        let exec = ScriptedExecutor::new();
        let coordinates = ConnectionCoordinates::cluster("arn:cluster", "arn:secret");

        let result = tokio_test::block_on(exec.execute(&coordinates, "SELECT 1;")).unwrap();
        assert_eq!(result.row_count(), 0);
        assert_eq!(exec.statements(), vec!["SELECT 1;".to_string()]);
    }

    #[test]
    fn test_scripted_responses_are_consumed_in_order() {
        let exec = ScriptedExecutor::new()
            .respond_rows(vec![vec![CellValue::Bool(true)]])
            .respond_err("boom");
        let coordinates = ConnectionCoordinates::cluster("arn:cluster", "arn:secret");

        let first = tokio_test::block_on(exec.execute(&coordinates, "one")).unwrap();
        assert_eq!(first.row_count(), 1);

        let second = tokio_test::block_on(exec.execute(&coordinates, "two"));
        assert_eq!(second.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_executed_records_coordinates() {
        let exec = ScriptedExecutor::new();
        let coordinates = ConnectionCoordinates::database("arn:cluster", "arn:secret", "core");

        tokio_test::block_on(exec.execute(&coordinates, "stmt")).unwrap();
        let executed = exec.executed();
        assert_eq!(executed[0].coordinates, coordinates);
    }

    #[test]
    fn test_catalog_row_helpers() {
        let row = role_catalog_row("app_user", false, true, false, false, true);
        assert_eq!(row.len(), 6);
        assert_eq!(row[0].as_str(), Some("app_user"));
        assert_eq!(row[5].as_bool(), Some(true));

        let row = schema_catalog_row("billing", "app_user");
        assert_eq!(row.len(), 2);
        assert_eq!(row[1].as_str(), Some("app_user"));
    }
}
