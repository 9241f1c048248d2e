//! SQL statement construction.
//!
//! Every statement the provider issues is built here, as a pure function
//! from typed attribute values to a SQL string. No I/O happens in this
//! module.
//!
//! Identifiers are double-quoted via [`quote_ident`] and string values are
//! single-quoted via [`quote_literal`], so attribute values can never
//! terminate or extend a statement. The DDL vocabulary and clause ordering
//! match what existing deployments were provisioned with, including the
//! lowercase `to` in `GRANT ... to ...;`.

use crate::postgres_role::RoleSpec;
use crate::postgres_schema::SchemaSpec;

/// The administrative role that receives grants and reassigned objects when
/// no explicit target is configured.
pub const ADMIN_ROLE: &str = "root";

/// Quote a SQL identifier. Embedded double quotes are doubled.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL string literal. Embedded single quotes are doubled.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn flag(value: bool, on: &'static str, off: &'static str) -> &'static str {
    if value {
        on
    } else {
        off
    }
}

/// `CREATE ROLE` with the full attribute clause set.
///
/// Every boolean attribute emits either its positive or negative keyword;
/// the password clause appears only when a password is configured.
pub fn create_role(spec: &RoleSpec) -> String {
    let mut clauses = vec![flag(spec.login, "LOGIN", "NOLOGIN").to_string()];
    if let Some(password) = &spec.password {
        clauses.push(format!("ENCRYPTED PASSWORD {}", quote_literal(password)));
    }
    clauses.push(flag(spec.superuser, "SUPERUSER", "NOSUPERUSER").to_string());
    clauses.push(flag(spec.create_role, "CREATEROLE", "NOCREATEROLE").to_string());
    clauses.push(flag(spec.create_database, "CREATEDB", "NOCREATEDB").to_string());
    clauses.push(flag(spec.inherit, "INHERIT", "NOINHERIT").to_string());

    format!(
        "CREATE ROLE {} WITH {};",
        quote_ident(&spec.name),
        clauses.join(" ")
    )
}

/// `GRANT <role> to <grantee>;`
pub fn grant_role(name: &str, grantee: &str) -> String {
    format!("GRANT {} to {};", quote_ident(name), quote_ident(grantee))
}

/// `ALTER ROLE ... RENAME TO ...;`
pub fn alter_role_rename(old: &str, new: &str) -> String {
    format!(
        "ALTER ROLE {} RENAME TO {};",
        quote_ident(old),
        quote_ident(new)
    )
}

/// `ALTER ROLE ... WITH LOGIN;` / `... WITH NOLOGIN;`
pub fn alter_role_login(name: &str, login: bool) -> String {
    format!(
        "ALTER ROLE {} WITH {};",
        quote_ident(name),
        flag(login, "LOGIN", "NOLOGIN")
    )
}

/// First step of role deletion: hand ownership to the administrative role.
pub fn reassign_owned(name: &str) -> String {
    format!(
        "REASSIGN OWNED BY {} TO {};",
        quote_ident(name),
        quote_ident(ADMIN_ROLE)
    )
}

/// Second step of role deletion: drop what the role still owns.
pub fn drop_owned(name: &str) -> String {
    format!("DROP OWNED BY {};", quote_ident(name))
}

/// Final step of role deletion.
pub fn drop_role(name: &str) -> String {
    format!("DROP ROLE {};", quote_ident(name))
}

/// Existence probe against the role catalog.
pub fn role_exists(name: &str) -> String {
    format!(
        "SELECT rolname FROM pg_catalog.pg_roles WHERE rolname = {};",
        quote_literal(name)
    )
}

/// Read-back query for a role. Column order is what
/// [`RoleSpec::apply_catalog_row`](crate::postgres_role::RoleSpec) expects.
pub fn read_role(name: &str) -> String {
    format!(
        "SELECT rolname, rolsuper, rolinherit, rolcreaterole, rolcreatedb, rolcanlogin \
         FROM pg_catalog.pg_roles WHERE rolname = {};",
        quote_literal(name)
    )
}

/// `CREATE SCHEMA`, with `AUTHORIZATION` when an owner is configured.
pub fn create_schema(spec: &SchemaSpec) -> String {
    match &spec.owner {
        Some(owner) => format!(
            "CREATE SCHEMA {} AUTHORIZATION {};",
            quote_ident(&spec.name),
            quote_ident(owner)
        ),
        None => format!("CREATE SCHEMA {};", quote_ident(&spec.name)),
    }
}

/// `ALTER SCHEMA ... RENAME TO ...;`
pub fn alter_schema_rename(old: &str, new: &str) -> String {
    format!(
        "ALTER SCHEMA {} RENAME TO {};",
        quote_ident(old),
        quote_ident(new)
    )
}

/// `ALTER SCHEMA ... OWNER TO ...;`
pub fn alter_schema_owner(name: &str, owner: &str) -> String {
    format!(
        "ALTER SCHEMA {} OWNER TO {};",
        quote_ident(name),
        quote_ident(owner)
    )
}

/// `DROP SCHEMA ...;`
pub fn drop_schema(name: &str) -> String {
    format!("DROP SCHEMA {};", quote_ident(name))
}

/// Existence probe against the namespace catalog.
pub fn schema_exists(name: &str) -> String {
    format!(
        "SELECT nspname FROM pg_catalog.pg_namespace WHERE nspname = {};",
        quote_literal(name)
    )
}

/// Read-back query for a schema: its name and its owner's role name.
pub fn read_schema(name: &str) -> String {
    format!(
        "SELECT nspname, pg_get_userbyid(nspowner) \
         FROM pg_catalog.pg_namespace WHERE nspname = {};",
        quote_literal(name)
    )
}
