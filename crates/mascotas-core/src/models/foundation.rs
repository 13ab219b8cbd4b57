//! Foundation domain model.
//!
//! Foundations are the shelters that own pets. Deleting one removes its
//! pets and every adoption that references it or its pets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Foundation {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    /// How many animals the shelter can house.
    pub capacity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or overwriting a foundation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoundationInput {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub description: Option<String>,
    pub capacity: u32,
}
