//! Adoption service: the adoption transaction, invoice access control
//! and a user's adoption history.
//!
//! Generic over repository implementations so that the domain layer has
//! no dependency on the database crate.

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{MascotasError, MascotasResult};
use crate::models::adoption::{Adopter, Adoption, AdoptionSummary, Invoice};
use crate::models::user::Identity;
use crate::repository::{AdoptionRepository, FoundationRepository, PetRepository, UserRepository};

pub const INVOICE_DENIED: &str = "No tienes permiso para ver esta factura.";

/// Only the adopter may see an adoption's invoice.
pub fn authorize_invoice(adoption: &Adoption, requester: &Identity) -> MascotasResult<()> {
    if adoption.user_id == requester.user_id {
        Ok(())
    } else {
        Err(MascotasError::PermissionDenied {
            reason: INVOICE_DENIED.into(),
        })
    }
}

pub struct AdoptionService<A, P, F, U>
where
    A: AdoptionRepository,
    P: PetRepository,
    F: FoundationRepository,
    U: UserRepository,
{
    adoptions: A,
    pets: P,
    foundations: F,
    users: U,
}

impl<A, P, F, U> AdoptionService<A, P, F, U>
where
    A: AdoptionRepository,
    P: PetRepository,
    F: FoundationRepository,
    U: UserRepository,
{
    pub fn new(adoptions: A, pets: P, foundations: F, users: U) -> Self {
        Self {
            adoptions,
            pets,
            foundations,
            users,
        }
    }

    /// Adopt `pet_id` on behalf of `adopter`.
    ///
    /// Returns the new adoption; its id keys the invoice.
    pub async fn adopt(&self, adopter: &Identity, pet_id: Uuid) -> MascotasResult<Adoption> {
        match self.adoptions.adopt(adopter.user_id, pet_id).await {
            Ok(adoption) => {
                info!(
                    adoption_id = %adoption.id,
                    pet_id = %pet_id,
                    user = %adopter.username,
                    "Pet adopted"
                );
                Ok(adoption)
            }
            Err(err @ MascotasError::AlreadyAdopted { .. }) => {
                warn!(pet_id = %pet_id, user = %adopter.username, "Pet already adopted");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Invoice details for `adoption_id`, visible only to its adopter.
    pub async fn invoice(&self, requester: &Identity, adoption_id: Uuid) -> MascotasResult<Invoice> {
        let adoption = self.adoptions.get_by_id(adoption_id).await?;
        if let Err(err) = authorize_invoice(&adoption, requester) {
            warn!(
                adoption_id = %adoption_id,
                user = %requester.username,
                "Invoice access denied"
            );
            return Err(err);
        }

        let pet = self.pets.get_by_id(adoption.pet_id).await?;
        let foundation = self.foundations.get_by_id(adoption.foundation_id).await?;
        let user = self.users.get_by_id(adoption.user_id).await?;

        Ok(Invoice {
            adoption,
            pet,
            adopter: Adopter {
                username: user.username,
                email: user.email,
                phone: user.phone,
                address: user.address,
            },
            foundation,
        })
    }

    /// The requester's adoptions, newest first.
    pub async fn history(&self, requester: &Identity) -> MascotasResult<Vec<AdoptionSummary>> {
        let adoptions = self.adoptions.list_by_user(requester.user_id).await?;
        let mut summaries = Vec::with_capacity(adoptions.len());
        for adoption in adoptions {
            let pet = self.pets.get_by_id(adoption.pet_id).await?;
            let foundation = self.foundations.get_by_id(adoption.foundation_id).await?;
            summaries.push(AdoptionSummary {
                adoption,
                pet_name: pet.name,
                species: pet.species,
                foundation_name: foundation.name,
            });
        }
        Ok(summaries)
    }
}
