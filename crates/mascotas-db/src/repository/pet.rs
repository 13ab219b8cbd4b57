//! SurrealDB implementation of [`PetRepository`].

use chrono::{DateTime, Utc};
use mascotas_core::error::{MascotasError, MascotasResult};
use mascotas_core::models::pet::{Pet, PetInput};
use mascotas_core::repository::{CrudRepository, PetRepository};
use mascotas_core::validation::ValidationErrors;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::adoption::MAX_ATTEMPTS;
use super::foundation::non_blank;
use crate::error::{DbError, parse_uuid};

const ENTITY: &str = "pet";

pub const UNKNOWN_FOUNDATION: &str =
    "Escoja una opción válida. Esa fundación no existe.";

/// Adoption is irreversible: the availability flag is only honoured while
/// no adoption references the pet. The check and the write form a single
/// statement so a concurrent adoption cannot slip between them.
const UPDATE_PET: &str = "\
UPDATE type::record('pet', $id) SET \
    name = $name, species = $species, age = $age, \
    photo = $photo, foundation_id = $foundation_id, \
    available = ($available AND \
        (array::len((SELECT VALUE id FROM adoption WHERE pet_id = $id)) = 0)), \
    updated_at = time::now()";

#[derive(Debug, SurrealValue)]
struct PetRow {
    name: String,
    species: String,
    age: u32,
    photo: Option<String>,
    available: bool,
    foundation_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PetRowWithId {
    record_id: String,
    name: String,
    species: String,
    age: u32,
    photo: Option<String>,
    available: bool,
    foundation_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PetRow {
    fn into_pet(self, id: Uuid) -> Result<Pet, DbError> {
        Ok(Pet {
            id,
            foundation_id: parse_uuid(&self.foundation_id, "foundation")?,
            name: self.name,
            species: self.species,
            age: self.age,
            photo: self.photo,
            available: self.available,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PetRowWithId {
    fn try_into_pet(self) -> Result<Pet, DbError> {
        let id = parse_uuid(&self.record_id, ENTITY)?;
        PetRow {
            name: self.name,
            species: self.species,
            age: self.age,
            photo: self.photo,
            available: self.available,
            foundation_id: self.foundation_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_pet(id)
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Pet repository.
#[derive(Clone)]
pub struct SurrealPetRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPetRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// A pet must belong to an existing foundation.
    async fn ensure_foundation(&self, foundation_id: Uuid) -> MascotasResult<()> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM type::record('foundation', $id) \
                 GROUP ALL",
            )
            .bind(("id", foundation_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        if rows.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(MascotasError::Validation(ValidationErrors::single(
                "foundation_id",
                UNKNOWN_FOUNDATION,
            )));
        }
        Ok(())
    }

    async fn write_update(
        &self,
        id: &str,
        input: PetInput,
    ) -> Result<Vec<PetRow>, surrealdb::Error> {
        let response = self
            .db
            .query(UPDATE_PET)
            .bind(("id", id.to_owned()))
            .bind(("name", input.name))
            .bind(("species", input.species))
            .bind(("age", input.age))
            .bind(("photo", non_blank(input.photo)))
            .bind(("available", input.available))
            .bind(("foundation_id", input.foundation_id.to_string()))
            .await?;
        response.check()?.take(0)
    }

    async fn select_many(
        &self,
        query: &str,
        foundation_id: Option<Uuid>,
    ) -> MascotasResult<Vec<Pet>> {
        let mut builder = self.db.query(query);
        if let Some(foundation_id) = foundation_id {
            builder = builder.bind(("foundation_id", foundation_id.to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<PetRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_pet())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}

impl<C: Connection> CrudRepository for SurrealPetRepository<C> {
    type Record = Pet;
    type Input = PetInput;

    const ENTITY: &'static str = ENTITY;

    async fn create(&self, input: PetInput) -> MascotasResult<Pet> {
        self.ensure_foundation(input.foundation_id).await?;

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('pet', $id) SET \
                 name = $name, species = $species, age = $age, \
                 photo = $photo, available = $available, \
                 foundation_id = $foundation_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("species", input.species))
            .bind(("age", input.age))
            .bind(("photo", non_blank(input.photo)))
            .bind(("available", input.available))
            .bind(("foundation_id", input.foundation_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::statement(ENTITY, e))?;

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_pet(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MascotasResult<Pet> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('pet', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PetRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        Ok(row.into_pet(id)?)
    }

    async fn update(&self, id: Uuid, input: PetInput) -> MascotasResult<Pet> {
        // Resolve the pet first so an unknown id reports NotFound rather
        // than a foundation error.
        self.get_by_id(id).await?;
        self.ensure_foundation(input.foundation_id).await?;

        let id_str = id.to_string();
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.write_update(&id_str, input.clone()).await {
                Ok(rows) => {
                    let row = rows
                        .into_iter()
                        .next()
                        .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;
                    return Ok(row.into_pet(id)?);
                }
                Err(err) => {
                    debug!(pet_id = %id, attempt, error = %err, "Pet update rolled back");
                    last_error = Some(err);
                }
            }
        }

        let err = match last_error {
            Some(err) => DbError::statement(ENTITY, err),
            None => DbError::Query("pet update was not attempted".into()),
        };
        Err(err.into())
    }

    async fn delete(&self, id: Uuid) -> MascotasResult<()> {
        self.get_by_id(id).await?;

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE adoption WHERE pet_id = $id; \
                 DELETE type::record('pet', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::statement(ENTITY, e))?;

        Ok(())
    }

    async fn list(&self) -> MascotasResult<Vec<Pet>> {
        self.select_many(
            "SELECT meta::id(id) AS record_id, * FROM pet \
             ORDER BY created_at ASC",
            None,
        )
        .await
    }
}

impl<C: Connection> PetRepository for SurrealPetRepository<C> {
    async fn list_available(&self) -> MascotasResult<Vec<Pet>> {
        self.select_many(
            "SELECT meta::id(id) AS record_id, * FROM pet \
             WHERE available = true ORDER BY created_at ASC",
            None,
        )
        .await
    }

    async fn list_by_foundation(&self, foundation_id: Uuid) -> MascotasResult<Vec<Pet>> {
        self.select_many(
            "SELECT meta::id(id) AS record_id, * FROM pet \
             WHERE foundation_id = $foundation_id ORDER BY created_at ASC",
            Some(foundation_id),
        )
        .await
    }
}
