//! Adopting a pet, the invoice and the adoption history.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::{layout, parse_id};
use crate::error::AppResult;
use crate::extract::RequireUser;
use crate::flash::{self, Flash};
use crate::invoice_pdf;
use crate::state::AppState;
use crate::templates::{HtmlTemplate, InvoicePage, MyAdoptionsPage};

/// Routed for POST only: following a link must never adopt.
pub async fn adoptar(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(pet_id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let pet_id = parse_id("pet", &pet_id)?;
    let pet = state.pets.get(pet_id).await?;

    let adoption = state.adoptions.adopt(&user, pet_id).await?;

    Ok(flash::redirect(
        jar,
        Flash::success(format!("¡Has adoptado a {} correctamente!", pet.name)),
        &format!("/factura/{}/", adoption.id),
    ))
}

#[derive(Debug, Deserialize)]
pub struct InvoiceQuery {
    pub descargar: Option<String>,
}

pub async fn factura(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(adoption_id): Path<String>,
    Query(query): Query<InvoiceQuery>,
    jar: CookieJar,
) -> AppResult<Response> {
    let adoption_id = parse_id("adoption", &adoption_id)?;
    let invoice = state.adoptions.invoice(&user, adoption_id).await?;

    if query.descargar.as_deref() == Some("pdf") {
        let disposition = format!(
            "attachment; filename=\"{}\"",
            invoice_pdf::filename(adoption_id)
        );
        return Ok((
            [
                (header::CONTENT_TYPE, "application/pdf".to_owned()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            invoice_pdf::render(&invoice),
        )
            .into_response());
    }

    let (jar, layout) = layout(jar, Some(user));
    Ok((jar, HtmlTemplate(InvoicePage { layout, invoice })).into_response())
}

/// The caller's adoptions, newest first.
pub async fn mis_adopciones(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let adoptions = state.adoptions.history(&user).await?;

    let (jar, layout) = layout(jar, Some(user));
    Ok((jar, HtmlTemplate(MyAdoptionsPage { layout, adoptions })).into_response())
}
