//! Mascotas Core: domain models, validation rules, repository traits
//! and the adoption service shared by every other crate.

pub mod adoption;
pub mod crud;
pub mod error;
pub mod models;
pub mod repository;
pub mod validation;
