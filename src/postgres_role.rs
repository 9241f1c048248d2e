//! The PostgreSQL role resource.
//!
//! A [`RoleSpec`] is the declared desired state of one role;
//! [`RoleResource`] turns lifecycle calls on that spec into SQL executed
//! through the remote seam. Each call is self-contained: no state is shared
//! between invocations beyond what the host persists.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::executor::{
    CellValue, ConnectionCoordinates, ExecutionResult, Row, StatementExecutor,
};
use crate::statement::{self, ADMIN_ROLE};

fn default_inherit() -> bool {
    true
}

/// Declared state of a PostgreSQL role.
///
/// Field names double as the declared attribute names of the
/// `rdsdata_postgres_role` resource. `password` is write-only: it is sent on
/// create, never read back, and [`RoleResource::read`] leaves whatever the
/// stored state carries untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Role name; the resource identifier, unique within the cluster.
    pub name: String,
    /// Whether the role may log in.
    #[serde(default)]
    pub login: bool,
    /// Whether the role inherits privileges of roles it is a member of.
    #[serde(default = "default_inherit")]
    pub inherit: bool,
    /// Whether the role may create databases.
    #[serde(default)]
    pub create_database: bool,
    /// Whether the role may create other roles.
    #[serde(default)]
    pub create_role: bool,
    /// Login password, sensitive and write-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Roles granted to this role after creation.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub roles: BTreeSet<String>,
    /// Role the new role is granted to; defaults to the administrative role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolename: Option<String>,
    /// Whether the role is a superuser.
    #[serde(default)]
    pub superuser: bool,
    /// Cluster ARN for the remote executor.
    pub resource_arn: String,
    /// Credentials secret ARN for the remote executor.
    pub secret_arn: String,
}

impl RoleSpec {
    /// Coordinates for this role's statements. Role DDL is cluster-wide, so
    /// no database is selected.
    pub fn connection(&self) -> ConnectionCoordinates {
        ConnectionCoordinates::cluster(&self.resource_arn, &self.secret_arn)
    }

    /// The role this role is granted to after creation.
    pub fn grant_target(&self) -> &str {
        self.rolename.as_deref().unwrap_or(ADMIN_ROLE)
    }

    /// Overwrite the catalog-backed fields from a read-back row.
    ///
    /// Column order matches [`statement::read_role`]: rolname, rolsuper,
    /// rolinherit, rolcreaterole, rolcreatedb, rolcanlogin.
    pub(crate) fn apply_catalog_row(&mut self, row: &Row) -> Result<(), ProviderError> {
        if row.len() != 6 {
            return Err(malformed(
                &self.name,
                format!("expected 6 columns, got {}", row.len()),
            ));
        }
        let name = row[0]
            .as_str()
            .ok_or_else(|| malformed(&self.name, "rolname is not a string".to_string()))?
            .to_string();
        let superuser = bool_column(&self.name, &row[1], "rolsuper")?;
        let inherit = bool_column(&self.name, &row[2], "rolinherit")?;
        let create_role = bool_column(&self.name, &row[3], "rolcreaterole")?;
        let create_database = bool_column(&self.name, &row[4], "rolcreatedb")?;
        let login = bool_column(&self.name, &row[5], "rolcanlogin")?;

        self.name = name;
        self.superuser = superuser;
        self.inherit = inherit;
        self.create_role = create_role;
        self.create_database = create_database;
        self.login = login;
        Ok(())
    }
}

fn malformed(name: &str, detail: String) -> ProviderError {
    ProviderError::MalformedRow {
        kind: "role",
        name: name.to_string(),
        detail,
    }
}

fn bool_column(name: &str, cell: &CellValue, column: &str) -> Result<bool, ProviderError> {
    cell.as_bool()
        .ok_or_else(|| malformed(name, format!("{} is not a boolean", column)))
}

/// Lifecycle operations for the role resource.
pub struct RoleResource {
    executor: Arc<dyn StatementExecutor>,
}

impl RoleResource {
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

    /// Create the role, grant it to its target role, then grant each
    /// configured member role to it. Fail-fast: a grant failure leaves the
    /// role created but the remaining grants unissued.
    ///
    /// Returns the identifier (the role name).
    pub async fn create(&self, spec: &RoleSpec) -> Result<String, ProviderError> {
        if spec.name.is_empty() {
            return Err(ProviderError::Validation(
                "role name must not be empty".to_string(),
            ));
        }
        let conn = spec.connection();

        self.run(
            &conn,
            &statement::create_role(spec),
            format!("creating role {:?}", spec.name),
        )
        .await?;

        let target = spec.grant_target();
        self.run(
            &conn,
            &statement::grant_role(&spec.name, target),
            format!("granting role {:?} to {:?}", spec.name, target),
        )
        .await?;

        for member_of in &spec.roles {
            self.run(
                &conn,
                &statement::grant_role(member_of, &spec.name),
                format!("granting role {:?} to {:?}", member_of, spec.name),
            )
            .await?;
        }

        info!(role = %spec.name, "created role");
        Ok(spec.name.clone())
    }

    /// Probe the catalog for the role. Exactly one matching row means it
    /// exists; zero means it does not; more than one is an error.
    pub async fn exists(&self, spec: &RoleSpec) -> Result<bool, ProviderError> {
        let result = self
            .run(
                &spec.connection(),
                &statement::role_exists(&spec.name),
                format!("checking role {:?} exists", spec.name),
            )
            .await?;
        match result.row_count() {
            0 => Ok(false),
            1 => Ok(true),
            rows => Err(ProviderError::AmbiguousCatalog {
                kind: "role",
                name: spec.name.clone(),
                rows,
            }),
        }
    }

    /// Refresh the spec from the catalog.
    ///
    /// `Ok(None)` means the role was deleted out-of-band; the caller must
    /// clear the identifier. The password is not read back.
    pub async fn read(&self, spec: &RoleSpec) -> Result<Option<RoleSpec>, ProviderError> {
        let result = self
            .run(
                &spec.connection(),
                &statement::read_role(&spec.name),
                format!("reading role {:?}", spec.name),
            )
            .await?;

        let row = match result.rows.as_slice() {
            [] => {
                debug!(role = %spec.name, "role not found in catalog");
                return Ok(None);
            }
            [row] => row,
            rows => {
                return Err(ProviderError::AmbiguousCatalog {
                    kind: "role",
                    name: spec.name.clone(),
                    rows: rows.len(),
                })
            }
        };

        let mut refreshed = spec.clone();
        refreshed.apply_catalog_row(row)?;
        Ok(Some(refreshed))
    }

    /// Apply in-place changes: a rename when the name differs, a login
    /// toggle when that differs. Independent statements, no rollback; a
    /// failure after the rename leaves the rename in place.
    ///
    /// Returns the current identifier (the new name after a rename).
    pub async fn update(
        &self,
        prior: &RoleSpec,
        desired: &RoleSpec,
    ) -> Result<String, ProviderError> {
        if desired.name.is_empty() {
            return Err(ProviderError::Validation(
                "cannot set role name to an empty string".to_string(),
            ));
        }
        let conn = desired.connection();
        let mut current_name = prior.name.clone();

        if desired.name != prior.name {
            self.run(
                &conn,
                &statement::alter_role_rename(&prior.name, &desired.name),
                format!("renaming role {:?} to {:?}", prior.name, desired.name),
            )
            .await?;
            current_name = desired.name.clone();
            info!(role = %current_name, "renamed role");
        }

        if desired.login != prior.login {
            self.run(
                &conn,
                &statement::alter_role_login(&current_name, desired.login),
                format!("updating login for role {:?}", current_name),
            )
            .await?;
            info!(role = %current_name, login = desired.login, "updated role login");
        }

        Ok(current_name)
    }

    /// Drop the role: reassign what it owns to the administrative role,
    /// drop what it still owns, then drop the role. Each step runs only if
    /// the previous one succeeded; a mid-sequence failure leaves the role
    /// present and partially cleaned up, observable by the next read.
    pub async fn delete(&self, spec: &RoleSpec) -> Result<(), ProviderError> {
        let conn = spec.connection();

        self.run(
            &conn,
            &statement::reassign_owned(&spec.name),
            format!("reassigning objects owned by role {:?}", spec.name),
        )
        .await?;

        self.run(
            &conn,
            &statement::drop_owned(&spec.name),
            format!("dropping objects owned by role {:?}", spec.name),
        )
        .await?;

        self.run(
            &conn,
            &statement::drop_role(&spec.name),
            format!("dropping role {:?}", spec.name),
        )
        .await?;

        info!(role = %spec.name, "deleted role");
        Ok(())
    }
}
