//! The host-facing provider surface.
//!
//! A plugin host drives resources through string-keyed resource types and
//! JSON state values. [`DataApiProvider`] sits between that surface and the
//! typed reconcilers: it declares the resource schemas, decodes states into
//! specs, dispatches the lifecycle call, and manages the `id` field the
//! host uses for state tracking.
//!
//! Identifier contract: `create` and `update` return the state with `id`
//! set to the role/schema name; `read` returns `Value::Null` when the
//! backing object no longer exists (the host must then forget the
//! resource); `delete` returns nothing and the host clears the identifier.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::executor::StatementExecutor;
use crate::postgres_role::{RoleResource, RoleSpec};
use crate::postgres_schema::{SchemaResource, SchemaSpec};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, ProviderSchema, Schema};
use crate::validation;

/// Resource type name for PostgreSQL roles.
pub const ROLE_RESOURCE: &str = "rdsdata_postgres_role";
/// Resource type name for PostgreSQL schemas.
pub const SCHEMA_RESOURCE: &str = "rdsdata_postgres_schema";

/// The provider: both resources behind one executor.
pub struct DataApiProvider {
    roles: RoleResource,
    schemas: SchemaResource,
}

impl DataApiProvider {
    /// Build the provider on top of a remote executor.
    pub fn new(executor: Arc<dyn StatementExecutor>) -> Self {
        Self {
            roles: RoleResource::new(Arc::clone(&executor)),
            schemas: SchemaResource::new(executor),
        }
    }

    /// The provider's declared schema: both resource types with their
    /// attribute markers. The provider itself takes no configuration; the
    /// connection coordinates are per-resource attributes.
    pub fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(Schema::v0())
            .with_resource(ROLE_RESOURCE, role_schema())
            .with_resource(SCHEMA_RESOURCE, schema_schema())
    }

    /// The resource type names this provider manages.
    pub fn resource_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.schema().resources.into_keys().collect();
        types.sort();
        types
    }

    /// Validate a resource configuration against its declared schema.
    pub fn validate_resource_config(
        &self,
        resource_type: &str,
        config: &Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self
            .schema()
            .resources
            .remove(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;
        Ok(validation::validate(&schema, config))
    }

    /// Create a resource from its planned state.
    ///
    /// Returns the state with `id` set to the new object's name.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        info!(resource_type = %resource_type, "create called");
        match resource_type {
            ROLE_RESOURCE => {
                let spec: RoleSpec = serde_json::from_value(planned_state)?;
                let id = self.roles.create(&spec).await?;
                state_with_id(serde_json::to_value(&spec)?, &id)
            }
            SCHEMA_RESOURCE => {
                let spec: SchemaSpec = serde_json::from_value(planned_state)?;
                let id = self.schemas.create(&spec).await?;
                state_with_id(serde_json::to_value(&spec)?, &id)
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Refresh a resource's state from the catalog.
    ///
    /// Returns `Value::Null` when the backing object was removed
    /// out-of-band; the host must treat the resource as gone.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Value, ProviderError> {
        debug!(resource_type = %resource_type, "read called");
        match resource_type {
            ROLE_RESOURCE => {
                let spec: RoleSpec = serde_json::from_value(current_state)?;
                match self.roles.read(&spec).await? {
                    Some(refreshed) => {
                        let id = refreshed.name.clone();
                        state_with_id(serde_json::to_value(&refreshed)?, &id)
                    }
                    None => Ok(Value::Null),
                }
            }
            SCHEMA_RESOURCE => {
                let spec: SchemaSpec = serde_json::from_value(current_state)?;
                match self.schemas.read(&spec).await? {
                    Some(refreshed) => {
                        let id = refreshed.name.clone();
                        state_with_id(serde_json::to_value(&refreshed)?, &id)
                    }
                    None => Ok(Value::Null),
                }
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Update a resource in place from its prior to its planned state.
    ///
    /// Returns the planned state with `id` set to the (possibly renamed)
    /// object's name.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        info!(resource_type = %resource_type, "update called");
        match resource_type {
            ROLE_RESOURCE => {
                let prior: RoleSpec = serde_json::from_value(prior_state)?;
                let desired: RoleSpec = serde_json::from_value(planned_state)?;
                let id = self.roles.update(&prior, &desired).await?;
                state_with_id(serde_json::to_value(&desired)?, &id)
            }
            SCHEMA_RESOURCE => {
                let prior: SchemaSpec = serde_json::from_value(prior_state)?;
                let desired: SchemaSpec = serde_json::from_value(planned_state)?;
                let id = self.schemas.update(&prior, &desired).await?;
                state_with_id(serde_json::to_value(&desired)?, &id)
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Delete a resource. On success the host clears the identifier.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        info!(resource_type = %resource_type, "delete called");
        match resource_type {
            ROLE_RESOURCE => {
                let spec: RoleSpec = serde_json::from_value(current_state)?;
                self.roles.delete(&spec).await
            }
            SCHEMA_RESOURCE => {
                let spec: SchemaSpec = serde_json::from_value(current_state)?;
                self.schemas.delete(&spec).await
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Check whether a resource's backing object exists in the catalog.
    pub async fn exists(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<bool, ProviderError> {
        debug!(resource_type = %resource_type, "exists called");
        match resource_type {
            ROLE_RESOURCE => {
                let spec: RoleSpec = serde_json::from_value(current_state)?;
                self.roles.exists(&spec).await
            }
            SCHEMA_RESOURCE => {
                let spec: SchemaSpec = serde_json::from_value(current_state)?;
                self.schemas.exists(&spec).await
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Import an existing object by identifier, passthrough-style: the
    /// returned state carries only `id` and `name`; the host's follow-up
    /// read (with connection coordinates merged from configuration) fills
    /// in the rest.
    pub fn import(&self, resource_type: &str, id: &str) -> Result<Value, ProviderError> {
        info!(resource_type = %resource_type, id = %id, "import called");
        match resource_type {
            ROLE_RESOURCE | SCHEMA_RESOURCE => Ok(serde_json::json!({
                "id": id,
                "name": id,
            })),
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}

fn state_with_id(mut state: Value, id: &str) -> Result<Value, ProviderError> {
    match &mut state {
        Value::Object(map) => {
            map.insert("id".to_string(), Value::String(id.to_string()));
            Ok(state)
        }
        _ => Err(ProviderError::Validation(
            "resource state must be an object".to_string(),
        )),
    }
}

fn role_schema() -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The PostgreSQL role name."),
        )
        .with_attribute(
            "login",
            Attribute::optional_bool()
                .with_default(serde_json::json!(false))
                .with_description("Determine whether the role is allowed to log in."),
        )
        .with_attribute(
            "inherit",
            Attribute::optional_bool()
                .with_default(serde_json::json!(true))
                .with_description(
                    "Determine whether the role inherits the privileges of roles it is a member of.",
                ),
        )
        .with_attribute(
            "create_database",
            Attribute::optional_bool()
                .with_default(serde_json::json!(false))
                .with_description("Define the role's ability to create databases."),
        )
        .with_attribute(
            "create_role",
            Attribute::optional_bool()
                .with_default(serde_json::json!(false))
                .with_description("Determine whether the role is permitted to create new roles."),
        )
        .with_attribute(
            "password",
            Attribute::optional_string()
                .sensitive()
                .with_description("Sets the role's password. Write-only; never read back."),
        )
        .with_attribute(
            "roles",
            Attribute::new(
                AttributeType::set(AttributeType::String),
                AttributeFlags::optional(),
            )
            .with_description("Role(s) to grant to this new role."),
        )
        .with_attribute(
            "rolename",
            Attribute::optional_string()
                .with_description("Role the new role is granted to. Defaults to the administrative role."),
        )
        .with_attribute(
            "superuser",
            Attribute::optional_bool()
                .with_default(serde_json::json!(false))
                .with_description("Determine whether the new role is a superuser."),
        )
        .with_attribute(
            "resource_arn",
            Attribute::required_string().with_description("ARN of the Aurora cluster."),
        )
        .with_attribute(
            "secret_arn",
            Attribute::required_string().with_description("ARN of the credentials secret."),
        )
}

fn schema_schema() -> Schema {
    Schema::v0()
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The schema name."),
        )
        .with_attribute(
            "database",
            Attribute::required_string()
                .with_force_new()
                .with_description("Database the schema lives in."),
        )
        .with_attribute(
            "owner",
            Attribute::optional_string().with_description("Role that owns the schema."),
        )
        .with_attribute(
            "resource_arn",
            Attribute::required_string().with_description("ARN of the Aurora cluster."),
        )
        .with_attribute(
            "secret_arn",
            Attribute::required_string().with_description("ARN of the credentials secret."),
        )
}
