//! Pet domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    pub age: u32,
    /// Path or URL of the pet's photo.
    pub photo: Option<String>,
    /// Flips to `false` exactly once, when the pet is adopted.
    pub available: bool,
    pub foundation_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or overwriting a pet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetInput {
    pub name: String,
    pub species: String,
    pub age: u32,
    pub photo: Option<String>,
    pub available: bool,
    pub foundation_id: Uuid,
}
