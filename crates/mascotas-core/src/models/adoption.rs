//! Adoption domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::foundation::Foundation;
use super::pet::Pet;

/// Links one user, one pet and the foundation that owned the pet when
/// it was adopted. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adoption {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub user_id: Uuid,
    pub foundation_id: Uuid,
    pub adopted_at: DateTime<Utc>,
}

impl Adoption {
    /// Calendar date of the adoption.
    pub fn adopted_on(&self) -> NaiveDate {
        self.adopted_at.date_naive()
    }
}

/// Contact details of the adopter, as printed on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adopter {
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Everything needed to render one adoption's invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub adoption: Adoption,
    pub pet: Pet,
    pub adopter: Adopter,
    pub foundation: Foundation,
}

/// One row of a user's adoption history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionSummary {
    pub adoption: Adoption,
    pub pet_name: String,
    pub species: String,
    pub foundation_name: String,
}
