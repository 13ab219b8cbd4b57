//! Generic validated CRUD over any [`CrudRepository`].
//!
//! One service type covers every entity; what differs per entity is the
//! repository and the validation function it is built with.

use uuid::Uuid;

use crate::error::{MascotasError, MascotasResult};
use crate::repository::CrudRepository;
use crate::validation::{self, ValidationErrors};

/// Validation function applied before every create and update.
pub type Validator<T> = fn(&T) -> Result<(), ValidationErrors>;

#[derive(Clone)]
pub struct CrudService<R: CrudRepository> {
    repo: R,
    validate: Validator<R::Input>,
}

impl<R: CrudRepository> CrudService<R> {
    pub fn new(repo: R, validate: Validator<R::Input>) -> Self {
        Self { repo, validate }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn list(&self) -> MascotasResult<Vec<R::Record>> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> MascotasResult<R::Record> {
        self.repo.get_by_id(id).await
    }

    /// Validate then persist. Nothing is written when validation fails.
    pub async fn create(&self, input: R::Input) -> MascotasResult<R::Record> {
        (self.validate)(&input).map_err(MascotasError::Validation)?;
        let record = self.repo.create(input).await?;
        tracing::info!(entity = R::ENTITY, "Record created");
        Ok(record)
    }

    /// Validate then overwrite the record located by `id`.
    pub async fn update(&self, id: Uuid, input: R::Input) -> MascotasResult<R::Record> {
        (self.validate)(&input).map_err(MascotasError::Validation)?;
        let record = self.repo.update(id, input).await?;
        tracing::info!(entity = R::ENTITY, %id, "Record updated");
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> MascotasResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(entity = R::ENTITY, %id, "Record deleted");
        Ok(())
    }
}

/// CRUD service for foundations.
pub fn foundations<R>(repo: R) -> CrudService<R>
where
    R: CrudRepository<Input = crate::models::foundation::FoundationInput>,
{
    CrudService::new(repo, validation::validate_foundation)
}

/// CRUD service for pets.
pub fn pets<R>(repo: R) -> CrudService<R>
where
    R: CrudRepository<Input = crate::models::pet::PetInput>,
{
    CrudService::new(repo, validation::validate_pet)
}
