//! Foundation management pages.

use axum::response::{IntoResponse, Response};
use mascotas_core::crud::CrudService;
use mascotas_core::models::foundation::{Foundation, FoundationInput};
use mascotas_core::validation::{self, ValidationErrors};
use mascotas_db::repository::SurrealFoundationRepository;
use serde::Deserialize;
use surrealdb::engine::any::Any;

use super::crud::{CrudPages, parse_count};
use crate::error::AppResult;
use crate::state::AppState;
use crate::templates::{FoundationFormPage, FoundationListPage, HtmlTemplate, Layout};

#[derive(Debug, Clone, Deserialize)]
pub struct FoundationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capacity: String,
}

impl Default for FoundationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            description: String::new(),
            capacity: "0".into(),
        }
    }
}

pub struct FoundationPages;

impl CrudPages for FoundationPages {
    type Repo = SurrealFoundationRepository<Any>;
    type Form = FoundationForm;

    const BASE: &'static str = "/fundaciones";
    const LABEL: &'static str = "fundación";
    const NEW_HEADING: &'static str = "Nueva fundación";
    const EDIT_HEADING: &'static str = "Editar fundación";
    const CREATED: &'static str = "Fundación creada correctamente.";
    const UPDATED: &'static str = "Fundación actualizada correctamente.";
    const DELETED: &'static str = "Fundación eliminada correctamente.";

    fn service(state: &AppState) -> &CrudService<Self::Repo> {
        &state.foundations
    }

    fn parse(form: &FoundationForm) -> Result<FoundationInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let capacity = parse_count(&mut errors, "capacity", &form.capacity);
        let description = form.description.trim();

        let input = FoundationInput {
            name: form.name.trim().to_owned(),
            address: form.address.trim().to_owned(),
            phone: form.phone.trim().to_owned(),
            email: form.email.trim().to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
            capacity,
        };

        if errors.is_empty() {
            return Ok(input);
        }
        if let Err(more) = validation::validate_foundation(&input) {
            errors.merge(more);
        }
        Err(errors)
    }

    fn to_form(record: &Foundation) -> FoundationForm {
        FoundationForm {
            name: record.name.clone(),
            address: record.address.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            description: record.description.clone().unwrap_or_default(),
            capacity: record.capacity.to_string(),
        }
    }

    fn display_name(record: &Foundation) -> String {
        record.name.clone()
    }

    async fn render_list(state: &AppState, layout: Layout) -> AppResult<Response> {
        let foundations = state.foundations.list().await?;
        Ok(HtmlTemplate(FoundationListPage {
            layout,
            foundations,
        })
        .into_response())
    }

    async fn render_form(
        _state: &AppState,
        layout: Layout,
        heading: &'static str,
        action: String,
        form: FoundationForm,
        errors: ValidationErrors,
    ) -> AppResult<Response> {
        Ok(HtmlTemplate(FoundationFormPage {
            layout,
            heading,
            action,
            form,
            errors,
        })
        .into_response())
    }
}
