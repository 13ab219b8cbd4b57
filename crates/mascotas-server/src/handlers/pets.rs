//! Pet management pages.

use std::collections::HashMap;

use axum::response::{IntoResponse, Response};
use mascotas_core::crud::CrudService;
use mascotas_core::models::pet::{Pet, PetInput};
use mascotas_core::validation::{self, REQUIRED, ValidationErrors};
use mascotas_db::repository::{SurrealPetRepository, UNKNOWN_FOUNDATION};
use serde::Deserialize;
use surrealdb::engine::any::Any;
use uuid::Uuid;

use super::crud::{CrudPages, parse_count};
use crate::error::AppResult;
use crate::state::AppState;
use crate::templates::{HtmlTemplate, Layout, PetFormPage, PetListPage, PetListRow};

/// Submitted pet fields. An unchecked `available` box is simply absent.
#[derive(Debug, Clone, Deserialize)]
pub struct PetForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub available: Option<String>,
    #[serde(default)]
    pub foundation_id: String,
}

impl Default for PetForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            species: String::new(),
            age: String::new(),
            photo: String::new(),
            available: Some("on".into()),
            foundation_id: String::new(),
        }
    }
}

pub struct PetPages;

impl CrudPages for PetPages {
    type Repo = SurrealPetRepository<Any>;
    type Form = PetForm;

    const BASE: &'static str = "/mascotas";
    const LABEL: &'static str = "mascota";
    const NEW_HEADING: &'static str = "Nueva mascota";
    const EDIT_HEADING: &'static str = "Editar mascota";
    const CREATED: &'static str = "Mascota creada correctamente.";
    const UPDATED: &'static str = "Mascota actualizada correctamente.";
    const DELETED: &'static str = "Mascota eliminada correctamente.";

    fn service(state: &AppState) -> &CrudService<Self::Repo> {
        &state.pets
    }

    fn parse(form: &PetForm) -> Result<PetInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let age = parse_count(&mut errors, "age", &form.age);

        let raw_foundation = form.foundation_id.trim();
        let foundation_id = if raw_foundation.is_empty() {
            errors.add("foundation_id", REQUIRED);
            Uuid::nil()
        } else {
            Uuid::parse_str(raw_foundation).unwrap_or_else(|_| {
                errors.add("foundation_id", UNKNOWN_FOUNDATION);
                Uuid::nil()
            })
        };

        let photo = form.photo.trim();
        let input = PetInput {
            name: form.name.trim().to_owned(),
            species: form.species.trim().to_owned(),
            age,
            photo: (!photo.is_empty()).then(|| photo.to_owned()),
            available: form.available.is_some(),
            foundation_id,
        };

        if errors.is_empty() {
            return Ok(input);
        }
        if let Err(more) = validation::validate_pet(&input) {
            errors.merge(more);
        }
        Err(errors)
    }

    fn to_form(record: &Pet) -> PetForm {
        PetForm {
            name: record.name.clone(),
            species: record.species.clone(),
            age: record.age.to_string(),
            photo: record.photo.clone().unwrap_or_default(),
            available: record.available.then(|| "on".to_owned()),
            foundation_id: record.foundation_id.to_string(),
        }
    }

    fn display_name(record: &Pet) -> String {
        record.name.clone()
    }

    async fn render_list(state: &AppState, layout: Layout) -> AppResult<Response> {
        let names: HashMap<Uuid, String> = state
            .foundations
            .list()
            .await?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect();
        let rows = state
            .pets
            .list()
            .await?
            .into_iter()
            .map(|pet| PetListRow {
                foundation_name: names.get(&pet.foundation_id).cloned().unwrap_or_default(),
                pet,
            })
            .collect();

        Ok(HtmlTemplate(PetListPage { layout, rows }).into_response())
    }

    async fn render_form(
        state: &AppState,
        layout: Layout,
        heading: &'static str,
        action: String,
        form: PetForm,
        errors: ValidationErrors,
    ) -> AppResult<Response> {
        let foundations = state.foundations.list().await?;
        Ok(HtmlTemplate(PetFormPage {
            layout,
            heading,
            action,
            form,
            errors,
            foundations,
        })
        .into_response())
    }
}
