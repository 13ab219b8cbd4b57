//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! Record keys are UUID strings and foreign keys are stored as plain
//! UUID strings. Cascading deletes are performed by the repositories
//! inside transactions.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD phone ON TABLE user TYPE option<string>;
DEFINE FIELD address ON TABLE user TYPE option<string>;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD is_staff ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Sessions
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token_hash ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Foundations
-- =======================================================================
DEFINE TABLE foundation SCHEMAFULL;
DEFINE FIELD name ON TABLE foundation TYPE string;
DEFINE FIELD address ON TABLE foundation TYPE string;
DEFINE FIELD phone ON TABLE foundation TYPE string;
DEFINE FIELD email ON TABLE foundation TYPE string;
DEFINE FIELD description ON TABLE foundation TYPE option<string>;
DEFINE FIELD capacity ON TABLE foundation TYPE int DEFAULT 0 \
    ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE foundation TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE foundation TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Pets (foundation scope)
-- =======================================================================
DEFINE TABLE pet SCHEMAFULL;
DEFINE FIELD name ON TABLE pet TYPE string;
DEFINE FIELD species ON TABLE pet TYPE string;
DEFINE FIELD age ON TABLE pet TYPE int ASSERT $value >= 0;
DEFINE FIELD photo ON TABLE pet TYPE option<string>;
DEFINE FIELD available ON TABLE pet TYPE bool DEFAULT true;
DEFINE FIELD foundation_id ON TABLE pet TYPE string;
DEFINE FIELD created_at ON TABLE pet TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE pet TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_pet_foundation ON TABLE pet COLUMNS foundation_id;
DEFINE INDEX idx_pet_available ON TABLE pet COLUMNS available;

-- =======================================================================
-- Adoptions (append-only, one per pet)
-- =======================================================================
DEFINE TABLE adoption SCHEMAFULL;
DEFINE FIELD pet_id ON TABLE adoption TYPE string;
DEFINE FIELD user_id ON TABLE adoption TYPE string;
DEFINE FIELD foundation_id ON TABLE adoption TYPE string;
DEFINE FIELD adopted_at ON TABLE adoption TYPE datetime \
    DEFAULT time::now() READONLY;
DEFINE INDEX idx_adoption_pet ON TABLE adoption COLUMNS pet_id UNIQUE;
DEFINE INDEX idx_adoption_user ON TABLE adoption COLUMNS user_id;
DEFINE INDEX idx_adoption_foundation ON TABLE adoption \
    COLUMNS foundation_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum, so
/// calling it on every startup is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
