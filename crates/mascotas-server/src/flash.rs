//! One-shot messages carried across a redirect in a cookie.
//!
//! The cookie holds a base64url-encoded JSON list. It is appended to by
//! [`push`] and emptied by [`take`] when the next page renders.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "mascotas_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Error,
}

impl Level {
    /// CSS class used by the base layout.
    pub fn css(&self) -> &'static str {
        match self {
            Level::Success => "flash-success",
            Level::Info => "flash-info",
            Level::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub text: String,
}

impl Flash {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

fn decode(value: &str) -> Vec<Flash> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> String {
    // Serializing a Vec of plain structs cannot fail.
    let json = serde_json::to_vec(flashes).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Queue `flash` for the next rendered page.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut flashes = jar
        .get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default();
    flashes.push(flash);

    jar.add(
        Cookie::build((FLASH_COOKIE, encode(&flashes)))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Drain queued messages. The returned jar clears the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, Vec::new());
    };
    let flashes = decode(cookie.value());
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flashes)
}

/// Queue `flash` and redirect to `to`.
pub fn redirect(jar: CookieJar, flash: Flash, to: &str) -> Response {
    (push(jar, flash), Redirect::to(to)).into_response()
}
