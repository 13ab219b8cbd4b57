//! SurrealDB implementation of [`AdoptionRepository`].
//!
//! The adoption write is a single transaction: a conditional update
//! claims the pet only while `available = true`, and the adoption insert
//! is additionally guarded by the UNIQUE index on `adoption.pet_id`. A
//! transaction that loses a race is rolled back; an existing adoption then
//! means the race was lost (`AlreadyAdopted`), anything else is a
//! transient conflict and is retried.

use chrono::{DateTime, Utc};
use mascotas_core::error::{MascotasError, MascotasResult};
use mascotas_core::models::adoption::Adoption;
use mascotas_core::repository::{AdoptionRepository, CrudRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::pet::SurrealPetRepository;
use crate::error::{DbError, parse_uuid};

const ENTITY: &str = "adoption";

/// Attempts before a write that keeps conflicting is reported as a
/// storage error.
pub(super) const MAX_ATTEMPTS: u32 = 3;

const ADOPT_TRANSACTION: &str = "\
BEGIN TRANSACTION;
LET $claimed = (UPDATE type::record('pet', $pet_id) \
    SET available = false, updated_at = time::now() \
    WHERE available = true RETURN AFTER);
IF array::len($claimed) = 0 { THROW 'pet is not available' };
CREATE type::record('adoption', $id) SET \
    pet_id = $pet_id, user_id = $user_id, \
    foundation_id = $claimed[0].foundation_id;
COMMIT TRANSACTION;
";

#[derive(Debug, SurrealValue)]
struct AdoptionRow {
    pet_id: String,
    user_id: String,
    foundation_id: String,
    adopted_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AdoptionRowWithId {
    record_id: String,
    pet_id: String,
    user_id: String,
    foundation_id: String,
    adopted_at: DateTime<Utc>,
}

fn row_to_adoption(row: AdoptionRow, id: Uuid) -> Result<Adoption, DbError> {
    Ok(Adoption {
        id,
        pet_id: parse_uuid(&row.pet_id, "pet")?,
        user_id: parse_uuid(&row.user_id, "user")?,
        foundation_id: parse_uuid(&row.foundation_id, "foundation")?,
        adopted_at: row.adopted_at,
    })
}

impl AdoptionRowWithId {
    fn try_into_adoption(self) -> Result<Adoption, DbError> {
        let id = parse_uuid(&self.record_id, ENTITY)?;
        row_to_adoption(
            AdoptionRow {
                pet_id: self.pet_id,
                user_id: self.user_id,
                foundation_id: self.foundation_id,
                adopted_at: self.adopted_at,
            },
            id,
        )
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Adoption repository.
#[derive(Clone)]
pub struct SurrealAdoptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAdoptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn run_adopt_transaction(
        &self,
        id: Uuid,
        user_id: Uuid,
        pet_id: Uuid,
    ) -> Result<(), surrealdb::Error> {
        let response = self
            .db
            .query(ADOPT_TRANSACTION)
            .bind(("id", id.to_string()))
            .bind(("pet_id", pet_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await?;
        response.check()?;
        Ok(())
    }
}

impl<C: Connection> AdoptionRepository for SurrealAdoptionRepository<C> {
    async fn adopt(&self, user_id: Uuid, pet_id: Uuid) -> MascotasResult<Adoption> {
        let pets = SurrealPetRepository::new(self.db.clone());
        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let pet = pets.get_by_id(pet_id).await?;
            if !pet.available {
                return Err(MascotasError::AlreadyAdopted {
                    pet_id,
                    pet_name: pet.name,
                });
            }

            let id = Uuid::new_v4();
            match self.run_adopt_transaction(id, user_id, pet_id).await {
                Ok(()) => return self.get_by_id(id).await,
                Err(err) => {
                    debug!(%pet_id, attempt, error = %err, "Adoption transaction rolled back");
                    if self.count_for_pet(pet_id).await? > 0 {
                        return Err(MascotasError::AlreadyAdopted {
                            pet_id,
                            pet_name: pet.name,
                        });
                    }
                    last_error = Some(err);
                }
            }
        }

        let message = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(DbError::Query(message).into())
    }

    async fn get_by_id(&self, id: Uuid) -> MascotasResult<Adoption> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('adoption', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdoptionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(ENTITY, &id_str))?;

        row_to_adoption(row, id).map_err(Into::into)
    }

    async fn list_by_user(&self, user_id: Uuid) -> MascotasResult<Vec<Adoption>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM adoption \
                 WHERE user_id = $user_id ORDER BY adopted_at DESC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdoptionRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_adoption())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn count_for_pet(&self, pet_id: Uuid) -> MascotasResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM adoption \
                 WHERE pet_id = $pet_id GROUP ALL",
            )
            .bind(("pet_id", pet_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
