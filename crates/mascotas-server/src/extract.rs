//! Request extractors resolving the session cookie into an identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use mascotas_core::error::MascotasError;
use mascotas_core::models::user::Identity;

use crate::error::AppError;
use crate::state::AppState;

pub const STAFF_ONLY: &str = "No tienes permiso para realizar esta acción.";

/// The caller's identity, if the session cookie resolves to one.
pub struct CurrentUser(pub Option<Identity>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(state.session_cookie_name()) else {
            return Ok(CurrentUser(None));
        };
        let identity = state.auth.resolve(cookie.value()).await?;
        Ok(CurrentUser(identity))
    }
}

/// An authenticated caller. Anonymous requests are sent to the login page.
pub struct RequireUser(pub Identity);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(identity)) => Ok(RequireUser(identity)),
            CurrentUser(None) => Err(AppError::LoginRequired),
        }
    }
}

/// An authenticated staff member.
pub struct RequireStaff(pub Identity);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(identity) = RequireUser::from_request_parts(parts, state).await?;
        if !identity.is_staff {
            tracing::warn!(user = %identity.username, "Staff-only route denied");
            return Err(MascotasError::PermissionDenied {
                reason: STAFF_ONLY.into(),
            }
            .into());
        }
        Ok(RequireStaff(identity))
    }
}
