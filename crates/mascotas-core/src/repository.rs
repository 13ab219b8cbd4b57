//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Foundations and pets share the
//! generic [`CrudRepository`] contract; the remaining entities expose only
//! the lookups the application needs.

use uuid::Uuid;

use crate::error::MascotasResult;
use crate::models::{
    adoption::Adoption,
    foundation::{Foundation, FoundationInput},
    pet::{Pet, PetInput},
    session::{CreateSession, Session},
    user::{CreateUser, User},
};

/// Create/read/update/delete over one record type.
///
/// `update` overwrites every field from the input. `get_by_id`, `update`
/// and `delete` fail with `NotFound` when the id does not resolve.
pub trait CrudRepository: Send + Sync {
    type Record: Send + Sync;
    type Input: Send + Sync;

    /// Entity name used in errors and log fields.
    const ENTITY: &'static str;

    fn create(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = MascotasResult<Self::Record>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MascotasResult<Self::Record>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: Self::Input,
    ) -> impl Future<Output = MascotasResult<Self::Record>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = MascotasResult<()>> + Send;
    /// Every record of this type, unfiltered.
    fn list(&self) -> impl Future<Output = MascotasResult<Vec<Self::Record>>> + Send;
}

// ---------------------------------------------------------------------------
// Shelters and animals
// ---------------------------------------------------------------------------

/// Deleting a foundation cascades to its pets and to every adoption that
/// references the foundation or one of its pets.
pub trait FoundationRepository:
    CrudRepository<Record = Foundation, Input = FoundationInput>
{
}

/// Deleting a pet cascades to the adoptions that reference it. Creating or
/// updating a pet whose `foundation_id` does not resolve fails with a
/// validation error on that field.
pub trait PetRepository: CrudRepository<Record = Pet, Input = PetInput> {
    fn list_available(&self) -> impl Future<Output = MascotasResult<Vec<Pet>>> + Send;
    fn list_by_foundation(
        &self,
        foundation_id: Uuid,
    ) -> impl Future<Output = MascotasResult<Vec<Pet>>> + Send;
}

// ---------------------------------------------------------------------------
// Adoptions
// ---------------------------------------------------------------------------

pub trait AdoptionRepository: Send + Sync {
    /// Atomically claim an available pet for `user_id`.
    ///
    /// Inside one storage transaction: flips the pet's availability from
    /// `true` to `false` and inserts an adoption carrying the pet's current
    /// foundation. Fails with `NotFound` for an unknown pet and with
    /// `AlreadyAdopted` when the pet is (or concurrently became)
    /// unavailable, in which case nothing is written.
    fn adopt(
        &self,
        user_id: Uuid,
        pet_id: Uuid,
    ) -> impl Future<Output = MascotasResult<Adoption>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MascotasResult<Adoption>> + Send;
    /// Adoptions made by one user, newest first.
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = MascotasResult<Vec<Adoption>>> + Send;
    fn count_for_pet(&self, pet_id: Uuid) -> impl Future<Output = MascotasResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the username or e-mail is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = MascotasResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MascotasResult<User>> + Send;
    fn get_by_username(&self, username: &str)
    -> impl Future<Output = MascotasResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = MascotasResult<User>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession)
    -> impl Future<Output = MascotasResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = MascotasResult<Session>> + Send;
    fn invalidate(&self, id: Uuid) -> impl Future<Output = MascotasResult<()>> + Send;
    /// Delete expired sessions and return how many were removed.
    fn cleanup_expired(&self) -> impl Future<Output = MascotasResult<u64>> + Send;
}
