//! SurrealDB implementation of [`FoundationRepository`].

use chrono::{DateTime, Utc};
use mascotas_core::error::MascotasResult;
use mascotas_core::models::foundation::{Foundation, FoundationInput};
use mascotas_core::repository::{CrudRepository, FoundationRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

const ENTITY: &str = "foundation";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct FoundationRow {
    name: String,
    address: String,
    phone: String,
    email: String,
    description: Option<String>,
    capacity: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct FoundationRowWithId {
    record_id: String,
    name: String,
    address: String,
    phone: String,
    email: String,
    description: Option<String>,
    capacity: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FoundationRow {
    fn into_foundation(self, id: Uuid) -> Foundation {
        Foundation {
            id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            email: self.email,
            description: self.description,
            capacity: self.capacity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl FoundationRowWithId {
    fn try_into_foundation(self) -> Result<Foundation, DbError> {
        let id = parse_uuid(&self.record_id, ENTITY)?;
        Ok(FoundationRow {
            name: self.name,
            address: self.address,
            phone: self.phone,
            email: self.email,
            description: self.description,
            capacity: self.capacity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_foundation(id))
    }
}

/// Blank optional text is stored as NONE.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// SurrealDB implementation of the Foundation repository.
#[derive(Clone)]
pub struct SurrealFoundationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealFoundationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealFoundationRepository<C> {
    type Record = Foundation;
    type Input = FoundationInput;

    const ENTITY: &'static str = ENTITY;

    async fn create(&self, input: FoundationInput) -> MascotasResult<Foundation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('foundation', $id) SET \
                 name = $name, address = $address, phone = $phone, \
                 email = $email, description = $description, \
                 capacity = $capacity",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("phone", input.phone))
            .bind(("email", input.email))
            .bind(("description", non_blank(input.description)))
            .bind(("capacity", input.capacity))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::statement(ENTITY, e))?;

        let rows: Vec<FoundationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_foundation(id))
    }

    async fn get_by_id(&self, id: Uuid) -> MascotasResult<Foundation> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('foundation', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FoundationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_foundation(id))
    }

    async fn update(&self, id: Uuid, input: FoundationInput) -> MascotasResult<Foundation> {
        self.get_by_id(id).await?;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('foundation', $id) SET \
                 name = $name, address = $address, phone = $phone, \
                 email = $email, description = $description, \
                 capacity = $capacity, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("phone", input.phone))
            .bind(("email", input.email))
            .bind(("description", non_blank(input.description)))
            .bind(("capacity", input.capacity))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::statement(ENTITY, e))?;

        let rows: Vec<FoundationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_foundation(id))
    }

    async fn delete(&self, id: Uuid) -> MascotasResult<()> {
        self.get_by_id(id).await?;

        // Adoptions may reference the foundation directly or through a
        // pet that has since moved to another foundation.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 LET $pets = (SELECT VALUE meta::id(id) FROM pet \
                     WHERE foundation_id = $id); \
                 DELETE adoption WHERE foundation_id = $id \
                     OR pet_id IN $pets; \
                 DELETE pet WHERE foundation_id = $id; \
                 DELETE type::record('foundation', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement(ENTITY, e))?;

        Ok(())
    }

    async fn list(&self) -> MascotasResult<Vec<Foundation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM foundation \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<FoundationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_foundation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}

impl<C: Connection> FoundationRepository for SurrealFoundationRepository<C> {}
