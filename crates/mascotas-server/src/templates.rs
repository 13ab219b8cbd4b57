//! Askama page templates and the response wrapper that renders them.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use mascotas_core::models::adoption::{AdoptionSummary, Invoice};
use mascotas_core::models::foundation::Foundation;
use mascotas_core::models::pet::Pet;
use mascotas_core::models::user::Identity;
use mascotas_core::validation::ValidationErrors;

use crate::flash::Flash;
use crate::handlers::accounts::RegisterForm;
use crate::handlers::foundations::FoundationForm;
use crate::handlers::pets::PetForm;

/// Renders a template into an HTML response.
pub struct HtmlTemplate<T>(pub T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Template render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor.").into_response()
            }
        }
    }
}

/// What every page needs for the navigation bar and message area.
pub struct Layout {
    pub user: Option<Identity>,
    pub flashes: Vec<Flash>,
}

impl Layout {
    pub fn new(user: Option<Identity>, flashes: Vec<Flash>) -> Self {
        Self { user, flashes }
    }

    pub fn anonymous() -> Self {
        Self::new(None, Vec::new())
    }

    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_staff)
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub email: String,
}

#[derive(Template)]
#[template(path = "registro.html")]
pub struct RegisterPage {
    pub layout: Layout,
    pub form: RegisterForm,
    pub errors: ValidationErrors,
}

#[derive(Template)]
#[template(path = "inicio.html")]
pub struct DashboardPage {
    pub layout: Layout,
    pub foundations: Vec<Foundation>,
    pub pets: Vec<Pet>,
}

#[derive(Template)]
#[template(path = "fundacion_detalle.html")]
pub struct FoundationDetailPage {
    pub layout: Layout,
    pub foundation: Foundation,
    pub pets: Vec<Pet>,
}

#[derive(Template)]
#[template(path = "factura.html")]
pub struct InvoicePage {
    pub layout: Layout,
    pub invoice: Invoice,
}

#[derive(Template)]
#[template(path = "mis_adopciones.html")]
pub struct MyAdoptionsPage {
    pub layout: Layout,
    pub adoptions: Vec<AdoptionSummary>,
}

#[derive(Template)]
#[template(path = "fundacion_list.html")]
pub struct FoundationListPage {
    pub layout: Layout,
    pub foundations: Vec<Foundation>,
}

#[derive(Template)]
#[template(path = "fundacion_form.html")]
pub struct FoundationFormPage {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub form: FoundationForm,
    pub errors: ValidationErrors,
}

pub struct PetListRow {
    pub pet: Pet,
    pub foundation_name: String,
}

#[derive(Template)]
#[template(path = "mascota_list.html")]
pub struct PetListPage {
    pub layout: Layout,
    pub rows: Vec<PetListRow>,
}

#[derive(Template)]
#[template(path = "mascota_form.html")]
pub struct PetFormPage {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub form: PetForm,
    pub errors: ValidationErrors,
    pub foundations: Vec<Foundation>,
}

#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeletePage {
    pub layout: Layout,
    pub label: &'static str,
    pub name: String,
    pub action: String,
    pub cancel: String,
}

#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundPage {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "500.html")]
pub struct ServerErrorPage {
    pub layout: Layout,
}
