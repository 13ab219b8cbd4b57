//! Request-level error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use mascotas_core::error::MascotasError;
use thiserror::Error;

use crate::flash::{self, Flash};
use crate::templates::{HtmlTemplate, Layout, NotFoundPage, ServerErrorPage};

pub const DASHBOARD: &str = "/inicio/";
pub const LOGIN: &str = "/login/";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] MascotasError),

    /// The route needs an authenticated user.
    #[error("login required")]
    LoginRequired,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::LoginRequired => Redirect::to(LOGIN).into_response(),
            AppError::Domain(err) => domain_response(err),
        }
    }
}

fn domain_response(err: MascotasError) -> Response {
    match err {
        MascotasError::NotFound { entity, id } => {
            tracing::debug!(%entity, %id, "Not found");
            (
                StatusCode::NOT_FOUND,
                HtmlTemplate(NotFoundPage {
                    layout: Layout::anonymous(),
                }),
            )
                .into_response()
        }
        MascotasError::AlreadyAdopted { pet_name, .. } => flash::redirect(
            CookieJar::new(),
            Flash::error(format!("La mascota {pet_name} ya fue adoptada.")),
            DASHBOARD,
        ),
        MascotasError::PermissionDenied { reason } => {
            flash::redirect(CookieJar::new(), Flash::error(reason), DASHBOARD)
        }
        MascotasError::Validation(errors) => {
            (StatusCode::BAD_REQUEST, errors.to_string()).into_response()
        }
        MascotasError::AlreadyExists { entity } => (
            StatusCode::CONFLICT,
            format!("Ya existe un registro de {entity} con esos datos."),
        )
            .into_response(),
        err @ (MascotasError::Database(_)
        | MascotasError::Crypto(_)
        | MascotasError::Internal(_)) => {
            tracing::error!(error = %err, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HtmlTemplate(ServerErrorPage {
                    layout: Layout::anonymous(),
                }),
            )
                .into_response()
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
