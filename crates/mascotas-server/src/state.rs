//! Shared application state.

use std::sync::Arc;

use mascotas_auth::{AuthConfig, AuthService};
use mascotas_core::adoption::AdoptionService;
use mascotas_core::crud::{self, CrudService};
use mascotas_db::repository::{
    SurrealAdoptionRepository, SurrealFoundationRepository, SurrealPetRepository,
    SurrealSessionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type FoundationService = CrudService<SurrealFoundationRepository<Any>>;
pub type PetService = CrudService<SurrealPetRepository<Any>>;
pub type Auth = AuthService<SurrealUserRepository<Any>, SurrealSessionRepository<Any>>;
pub type Adoptions = AdoptionService<
    SurrealAdoptionRepository<Any>,
    SurrealPetRepository<Any>,
    SurrealFoundationRepository<Any>,
    SurrealUserRepository<Any>,
>;

#[derive(Clone)]
pub struct AppState {
    pub foundations: Arc<FoundationService>,
    pub pets: Arc<PetService>,
    pub auth: Arc<Auth>,
    pub adoptions: Arc<Adoptions>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig) -> Self {
        let pepper = auth_config.pepper.clone();
        let users = |db: Surreal<Any>| match &pepper {
            Some(pepper) => SurrealUserRepository::with_pepper(db, pepper.clone()),
            None => SurrealUserRepository::new(db),
        };

        Self {
            foundations: Arc::new(crud::foundations(SurrealFoundationRepository::new(
                db.clone(),
            ))),
            pets: Arc::new(crud::pets(SurrealPetRepository::new(db.clone()))),
            auth: Arc::new(AuthService::new(
                users(db.clone()),
                SurrealSessionRepository::new(db.clone()),
                auth_config,
            )),
            adoptions: Arc::new(AdoptionService::new(
                SurrealAdoptionRepository::new(db.clone()),
                SurrealPetRepository::new(db.clone()),
                SurrealFoundationRepository::new(db.clone()),
                users(db),
            )),
        }
    }

    pub fn session_cookie_name(&self) -> &str {
        &self.auth.config().session_cookie_name
    }
}
