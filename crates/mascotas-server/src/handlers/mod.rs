//! Route handlers, grouped by area.

pub mod accounts;
pub mod adoptions;
pub mod crud;
pub mod foundations;
pub mod pages;
pub mod pets;

use axum_extra::extract::cookie::CookieJar;
use mascotas_core::error::MascotasError;
use mascotas_core::models::user::Identity;
use uuid::Uuid;

use crate::error::AppError;
use crate::flash;
use crate::templates::Layout;

/// Parse a path id. Malformed ids are reported as missing records.
pub(crate) fn parse_id(entity: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| MascotasError::not_found(entity, raw).into())
}

/// Drain pending flash messages into a page layout.
pub(crate) fn layout(jar: CookieJar, user: Option<Identity>) -> (CookieJar, Layout) {
    let (jar, flashes) = flash::take(jar);
    (jar, Layout::new(user, flashes))
}
