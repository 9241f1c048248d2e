//! The PostgreSQL schema resource.
//!
//! Schemas are per-database namespaces, so unlike role DDL every statement
//! here is executed with the owning database selected in the connection
//! coordinates — including the existence probe and the read-back query.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::executor::{ConnectionCoordinates, ExecutionResult, Row, StatementExecutor};
use crate::statement;

/// Declared state of a PostgreSQL schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSpec {
    /// Schema name; the resource identifier, unique within the database.
    pub name: String,
    /// Database the schema lives in.
    pub database: String,
    /// Owning role. When set, creation uses `AUTHORIZATION` and ownership
    /// changes are applied with `ALTER SCHEMA ... OWNER TO`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Cluster ARN for the remote executor.
    pub resource_arn: String,
    /// Credentials secret ARN for the remote executor.
    pub secret_arn: String,
}

impl SchemaSpec {
    /// Coordinates for this schema's statements, scoped to its database.
    pub fn connection(&self) -> ConnectionCoordinates {
        ConnectionCoordinates::database(&self.resource_arn, &self.secret_arn, &self.database)
    }

    /// Overwrite the catalog-backed fields from a read-back row.
    ///
    /// Column order matches [`statement::read_schema`]: nspname, owner name.
    pub(crate) fn apply_catalog_row(&mut self, row: &Row) -> Result<(), ProviderError> {
        if row.len() != 2 {
            return Err(malformed(
                &self.name,
                format!("expected 2 columns, got {}", row.len()),
            ));
        }
        let name = row[0]
            .as_str()
            .ok_or_else(|| malformed(&self.name, "nspname is not a string".to_string()))?
            .to_string();
        let owner = row[1]
            .as_str()
            .ok_or_else(|| malformed(&self.name, "owner is not a string".to_string()))?
            .to_string();

        self.name = name;
        self.owner = Some(owner);
        Ok(())
    }
}

fn malformed(name: &str, detail: String) -> ProviderError {
    ProviderError::MalformedRow {
        kind: "schema",
        name: name.to_string(),
        detail,
    }
}

/// Lifecycle operations for the schema resource.
pub struct SchemaResource {
    executor: Arc<dyn StatementExecutor>,
}

impl SchemaResource {
    /// Build a reconciler on top of the given executor.
    pub fn new(executor: Arc<dyn StatementExecutor>) -> Self {
        Self { executor }
    }

    async fn run(
        &self,
        coordinates: &ConnectionCoordinates,
        sql: &str,
        operation: String,
    ) -> Result<ExecutionResult, ProviderError> {
        debug!(sql = %sql, "executing statement");
        self.executor
            .execute(coordinates, sql)
            .await
            .map_err(|e| ProviderError::execution(operation, e))
    }

    /// Create the schema, with `AUTHORIZATION` when an owner is configured.
    ///
    /// Returns the identifier (the schema name).
    pub async fn create(&self, spec: &SchemaSpec) -> Result<String, ProviderError> {
        if spec.name.is_empty() {
            return Err(ProviderError::Validation(
                "schema name must not be empty".to_string(),
            ));
        }
        self.run(
            &spec.connection(),
            &statement::create_schema(spec),
            format!("creating schema {:?}", spec.name),
        )
        .await?;

        info!(schema = %spec.name, database = %spec.database, "created schema");
        Ok(spec.name.clone())
    }

    /// Probe the catalog for the schema in its database. Exactly one row
    /// means it exists; zero means it does not; more than one is an error.
    pub async fn exists(&self, spec: &SchemaSpec) -> Result<bool, ProviderError> {
        let result = self
            .run(
                &spec.connection(),
                &statement::schema_exists(&spec.name),
                format!("checking schema {:?} exists", spec.name),
            )
            .await?;
        match result.row_count() {
            0 => Ok(false),
            1 => Ok(true),
            rows => Err(ProviderError::AmbiguousCatalog {
                kind: "schema",
                name: spec.name.clone(),
                rows,
            }),
        }
    }

    /// Refresh the spec from the catalog, including the owner.
    ///
    /// `Ok(None)` means the schema was dropped out-of-band; the caller must
    /// clear the identifier.
    pub async fn read(&self, spec: &SchemaSpec) -> Result<Option<SchemaSpec>, ProviderError> {
        let result = self
            .run(
                &spec.connection(),
                &statement::read_schema(&spec.name),
                format!("reading schema {:?}", spec.name),
            )
            .await?;

        let row = match result.rows.as_slice() {
            [] => {
                debug!(schema = %spec.name, "schema not found in catalog");
                return Ok(None);
            }
            [row] => row,
            rows => {
                return Err(ProviderError::AmbiguousCatalog {
                    kind: "schema",
                    name: spec.name.clone(),
                    rows: rows.len(),
                })
            }
        };

        let mut refreshed = spec.clone();
        refreshed.apply_catalog_row(row)?;
        Ok(Some(refreshed))
    }

    /// Apply in-place changes: a rename when the name differs, an ownership
    /// change when the owner differs. Independent statements, no rollback.
    ///
    /// Returns the current identifier (the new name after a rename).
    pub async fn update(
        &self,
        prior: &SchemaSpec,
        desired: &SchemaSpec,
    ) -> Result<String, ProviderError> {
        if desired.name.is_empty() {
            return Err(ProviderError::Validation(
                "cannot set schema name to an empty string".to_string(),
            ));
        }
        let conn = desired.connection();
        let mut current_name = prior.name.clone();

        if desired.name != prior.name {
            self.run(
                &conn,
                &statement::alter_schema_rename(&prior.name, &desired.name),
                format!("renaming schema {:?} to {:?}", prior.name, desired.name),
            )
            .await?;
            current_name = desired.name.clone();
            info!(schema = %current_name, "renamed schema");
        }

        if desired.owner != prior.owner {
            if let Some(owner) = &desired.owner {
                self.run(
                    &conn,
                    &statement::alter_schema_owner(&current_name, owner),
                    format!("changing owner of schema {:?} to {:?}", current_name, owner),
                )
                .await?;
                info!(schema = %current_name, owner = %owner, "changed schema owner");
            }
        }

        Ok(current_name)
    }

    /// Drop the schema.
    pub async fn delete(&self, spec: &SchemaSpec) -> Result<(), ProviderError> {
        self.run(
            &spec.connection(),
            &statement::drop_schema(&spec.name),
            format!("dropping schema {:?}", spec.name),
        )
        .await?;

        info!(schema = %spec.name, database = %spec.database, "deleted schema");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::CellValue;
    use crate::testing::{schema_catalog_row, ScriptedExecutor};

    fn spec(name: &str) -> SchemaSpec {
        SchemaSpec {
            name: name.to_string(),
            database: "core".to_string(),
            owner: Some("app_user".to_string()),
            resource_arn: "arn:cluster".to_string(),
            secret_arn: "arn:secret".to_string(),
        }
    }

    fn resource(executor: &Arc<ScriptedExecutor>) -> SchemaResource {
        SchemaResource::new(Arc::clone(executor) as Arc<dyn StatementExecutor>)
    }

    #[tokio::test]
    async fn test_create_with_authorization_in_owning_database() {
        let exec = Arc::new(ScriptedExecutor::new());
        let id = resource(&exec).create(&spec("billing")).await.unwrap();

        assert_eq!(id, "billing");
        let executed = exec.executed();
        assert_eq!(executed.len(), 1);
        assert_eq!(
            executed[0].sql,
            "CREATE SCHEMA \"billing\" AUTHORIZATION \"app_user\";"
        );
        assert_eq!(executed[0].coordinates.database.as_deref(), Some("core"));
    }

    #[tokio::test]
    async fn test_create_without_owner_has_no_authorization() {
        let exec = Arc::new(ScriptedExecutor::new());
        let mut schema = spec("billing");
        schema.owner = None;
        resource(&exec).create(&schema).await.unwrap();

        assert_eq!(exec.statements(), vec!["CREATE SCHEMA \"billing\";".to_string()]);
    }

    #[tokio::test]
    async fn test_create_empty_name_fails_locally() {
        let exec = Arc::new(ScriptedExecutor::new());
        let err = resource(&exec).create(&spec("")).await.unwrap_err();

        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(exec.statements().is_empty());
    }

    #[tokio::test]
    async fn test_exists_probe_runs_in_owning_database() {
        let exec = Arc::new(
            ScriptedExecutor::new().respond_rows(vec![vec![CellValue::String("billing".into())]]),
        );
        assert!(resource(&exec).exists(&spec("billing")).await.unwrap());

        let executed = exec.executed();
        assert_eq!(executed[0].coordinates.database.as_deref(), Some("core"));
    }

    #[tokio::test]
    async fn test_read_refreshes_owner() {
        let exec = Arc::new(
            ScriptedExecutor::new().respond_rows(vec![schema_catalog_row("billing", "finance")]),
        );
        let refreshed = resource(&exec).read(&spec("billing")).await.unwrap().unwrap();

        assert_eq!(refreshed.name, "billing");
        assert_eq!(refreshed.owner.as_deref(), Some("finance"));
        assert_eq!(refreshed.database, "core");
    }

    #[tokio::test]
    async fn test_read_absent_schema_is_none() {
        let exec = Arc::new(ScriptedExecutor::new().respond_rows(vec![]));
        assert!(resource(&exec).read(&spec("gone")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_multiple_rows_is_an_error() {
        let exec = Arc::new(ScriptedExecutor::new().respond_rows(vec![
            schema_catalog_row("billing", "a"),
            schema_catalog_row("billing", "b"),
        ]));
        let err = resource(&exec).read(&spec("billing")).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::AmbiguousCatalog { kind: "schema", rows: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_update_rename_and_reowner() {
        let exec = Arc::new(ScriptedExecutor::new());
        let prior = spec("billing");
        let mut desired = spec("invoicing");
        desired.owner = Some("finance".to_string());

        let id = resource(&exec).update(&prior, &desired).await.unwrap();
        assert_eq!(id, "invoicing");
        assert_eq!(
            exec.statements(),
            vec![
                "ALTER SCHEMA \"billing\" RENAME TO \"invoicing\";".to_string(),
                "ALTER SCHEMA \"invoicing\" OWNER TO \"finance\";".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_update_rename_failure_skips_owner_change() {
        let exec = Arc::new(ScriptedExecutor::new().respond_err("schema in use"));
        let prior = spec("billing");
        let mut desired = spec("invoicing");
        desired.owner = Some("finance".to_string());

        let err = resource(&exec).update(&prior, &desired).await.unwrap_err();
        assert!(err.to_string().contains("renaming schema"));
        assert_eq!(exec.statements().len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_empty_name_fails_before_any_statement() {
        let exec = Arc::new(ScriptedExecutor::new());
        let err = resource(&exec)
            .update(&spec("billing"), &spec(""))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Validation(_)));
        assert!(exec.statements().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_a_single_drop() {
        let exec = Arc::new(ScriptedExecutor::new());
        resource(&exec).delete(&spec("billing")).await.unwrap();

        assert_eq!(exec.statements(), vec!["DROP SCHEMA \"billing\";".to_string()]);
        assert_eq!(
            exec.executed()[0].coordinates.database.as_deref(),
            Some("core")
        );
    }

    #[test]
    fn test_spec_decodes_without_owner() {
        let spec: SchemaSpec = serde_json::from_value(serde_json::json!({
            "name": "billing",
            "database": "core",
            "resource_arn": "arn:cluster",
            "secret_arn": "arn:secret"
        }))
        .unwrap();
        assert!(spec.owner.is_none());
    }
}
