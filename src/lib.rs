//! PostgreSQL roles and schemas over the AWS RDS Data API.
//!
//! This crate is the core of an infrastructure-as-code provider: it turns
//! declared desired state for PostgreSQL **roles** and **schemas** into SQL
//! statements executed through a remote data-API (a stateless SQL-over-HTTP
//! execution service), and reads state back from the catalogs for drift
//! detection.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Statement builder**: pure construction of every DDL/DML statement,
//!   with identifier quoting and literal escaping ([`statement`])
//! - **Reconcilers**: create/read/update/delete/exists for each resource,
//!   on top of an injected executor ([`postgres_role`], [`postgres_schema`])
//! - **Executor seam**: the trait the AWS Data API client (or any other
//!   SQL execution service) plugs in behind ([`executor`])
//! - **Schema types**: declared attribute schemas with required/optional/
//!   default/sensitive markers ([`schema`], validated by [`validation`])
//! - **Provider adapter**: the string-keyed, JSON-typed surface a plugin
//!   host drives ([`provider`])
//! - **Error types** and **logging** helpers ([`error`], [`logging`])
//! - **Testing utilities**: a scripted executor for exercising the
//!   reconcilers without a database ([`testing`])
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use rdsdata_postgres_provider::{init_logging, DataApiProvider, ROLE_RESOURCE};
//! use serde_json::json;
//!
//! # async fn run(executor: Arc<dyn rdsdata_postgres_provider::executor::StatementExecutor>) {
//! init_logging();
//!
//! let provider = DataApiProvider::new(executor);
//! let state = provider
//!     .create(ROLE_RESOURCE, json!({
//!         "name": "app_user",
//!         "login": true,
//!         "resource_arn": "arn:aws:rds:eu-west-1:123456789012:cluster:core",
//!         "secret_arn": "arn:aws:secretsmanager:eu-west-1:123456789012:secret:dba",
//!     }))
//!     .await
//!     .unwrap();
//! assert_eq!(state["id"], "app_user");
//! # }
//! ```
//!
//! # Execution model
//!
//! Every lifecycle call is self-contained: one or more SQL statements sent
//! through the executor, fail-fast, with no retries and no transaction
//! wrapping. A failure mid-sequence (role deletion runs three statements,
//! updates run one per changed attribute) leaves the backing objects in a
//! partially-modified state that the next read or existence probe reports
//! accurately. Not-found is never an error: reads return an absent marker
//! and existence probes return `false`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod executor;
pub mod logging;
pub mod postgres_role;
pub mod postgres_schema;
pub mod provider;
pub mod schema;
pub mod statement;
pub mod testing;
pub mod validation;

// Re-export main types at crate root
pub use error::ProviderError;
pub use executor::{
    CellValue, ConnectionCoordinates, ExecutionError, ExecutionResult, StatementExecutor,
};
pub use logging::{init_logging, try_init_logging};
pub use postgres_role::{RoleResource, RoleSpec};
pub use postgres_schema::{SchemaResource, SchemaSpec};
pub use provider::{DataApiProvider, ROLE_RESOURCE, SCHEMA_RESOURCE};
pub use schema::ProviderSchema;
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for executor implementations
pub use async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
