//! Error types for the provider core.

use thiserror::Error;

use crate::executor::ExecutionError;

/// Errors that can occur while reconciling roles and schemas.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A remote SQL execution failed. `operation` names the step that was
    /// being attempted (e.g. "creating role \"app_user\"") so a failure in
    /// a multi-statement sequence can be pinned to the statement that broke.
    #[error("error {operation}: {source}")]
    Execution {
        /// The step being attempted when the executor failed.
        operation: String,
        /// The underlying executor error.
        #[source]
        source: ExecutionError,
    },

    /// Invalid input detected locally, before any statement was issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// A catalog query expected at most one row for a unique name but got
    /// several. Reported as an error rather than "absent": the catalog is
    /// in a state this provider cannot reconcile against.
    #[error("ambiguous catalog state for {kind} {name:?}: {rows} rows matched")]
    AmbiguousCatalog {
        /// The kind of object queried ("role" or "schema").
        kind: &'static str,
        /// The name that matched more than once.
        name: String,
        /// How many rows came back.
        rows: usize,
    },

    /// A read-back row did not have the expected column layout.
    #[error("unexpected catalog row for {kind} {name:?}: {detail}")]
    MalformedRow {
        /// The kind of object queried ("role" or "schema").
        kind: &'static str,
        /// The name the row was read for.
        name: String,
        /// What was wrong with the row.
        detail: String,
    },

    /// A state value could not be decoded into or encoded from a spec.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested resource type is not one this provider manages.
    #[error("unknown resource type: {0}")]
    UnknownResource(String),
}

impl ProviderError {
    /// Wrap an executor failure with the step it interrupted.
    pub fn execution(operation: impl Into<String>, source: ExecutionError) -> Self {
        Self::Execution {
            operation: operation.into(),
            source,
        }
    }
}
