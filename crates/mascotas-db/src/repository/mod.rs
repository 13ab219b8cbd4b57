//! SurrealDB repository implementations.

mod adoption;
mod foundation;
mod pet;
mod session;
mod user;

pub use adoption::SurrealAdoptionRepository;
pub use foundation::SurrealFoundationRepository;
pub use pet::{SurrealPetRepository, UNKNOWN_FOUNDATION};
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
