//! Mascotas Server: the pet adoption web application.
//!
//! Server-rendered HTML pages over axum with askama templates. Sessions
//! are opaque cookies resolved through `mascotas-auth`; storage is
//! SurrealDB through `mascotas-db`.

pub mod config;
pub mod error;
pub mod extract;
pub mod flash;
pub mod handlers;
pub mod invoice_pdf;
pub mod state;
pub mod templates;

use axum::Router;
use axum::routing::{get, post};

pub use state::AppState;

use handlers::crud;
use handlers::foundations::FoundationPages;
use handlers::pets::PetPages;
use handlers::{accounts, adoptions, pages};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::index))
        .route("/login/", get(accounts::login_page).post(accounts::login))
        .route(
            "/registro/",
            get(accounts::register_page).post(accounts::register),
        )
        .route("/logout/", get(accounts::logout).post(accounts::logout))
        .route("/inicio/", get(pages::inicio))
        .route("/fundacion/{id}/", get(pages::fundacion_detalle))
        .route("/adoptar/{id}/", post(adoptions::adoptar))
        .route("/factura/{id}/", get(adoptions::factura))
        .route("/mis-adopciones/", get(adoptions::mis_adopciones))
        .merge(crud::routes::<FoundationPages>())
        .merge(crud::routes::<PetPages>())
}
