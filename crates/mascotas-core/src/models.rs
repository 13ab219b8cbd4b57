//! Domain models for Mascotas.

pub mod adoption;
pub mod foundation;
pub mod pet;
pub mod session;
pub mod user;
