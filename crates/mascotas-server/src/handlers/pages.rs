//! Landing page, dashboard and foundation detail.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use mascotas_core::repository::PetRepository;

use super::{layout, parse_id};
use crate::error::{AppResult, DASHBOARD};
use crate::extract::{CurrentUser, RequireUser};
use crate::state::AppState;
use crate::templates::{DashboardPage, FoundationDetailPage, HtmlTemplate, IndexPage};

/// Public landing page. Signed-in users go straight to the dashboard.
pub async fn index(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD).into_response();
    }
    let (jar, layout) = layout(jar, None);
    (jar, HtmlTemplate(IndexPage { layout })).into_response()
}

/// Every foundation plus every pet still up for adoption.
pub async fn inicio(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let foundations = state.foundations.list().await?;
    let pets = state.pets.repository().list_available().await?;

    let (jar, layout) = layout(jar, Some(user));
    Ok((
        jar,
        HtmlTemplate(DashboardPage {
            layout,
            foundations,
            pets,
        }),
    )
        .into_response())
}

pub async fn fundacion_detalle(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let id = parse_id("foundation", &id)?;
    let foundation = state.foundations.get(id).await?;
    let pets = state.pets.repository().list_by_foundation(id).await?;

    let (jar, layout) = layout(jar, Some(user));
    Ok((
        jar,
        HtmlTemplate(FoundationDetailPage {
            layout,
            foundation,
            pets,
        }),
    )
        .into_response())
}
