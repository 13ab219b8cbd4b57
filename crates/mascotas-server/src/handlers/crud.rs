//! One handler set serving the list/create/edit/delete pages of any
//! entity. Each entity supplies a [`CrudPages`] implementation.

use std::future::Future;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use axum_extra::extract::cookie::CookieJar;
use mascotas_core::crud::CrudService;
use mascotas_core::error::MascotasError;
use mascotas_core::repository::CrudRepository;
use mascotas_core::validation::{REQUIRED, ValidationErrors};
use serde::de::DeserializeOwned;

use super::{layout, parse_id};
use crate::error::AppResult;
use crate::extract::{RequireStaff, RequireUser};
use crate::flash::{self, Flash};
use crate::state::AppState;
use crate::templates::{ConfirmDeletePage, HtmlTemplate, Layout};

pub const NOT_A_NUMBER: &str = "Introduzca un número entero.";

type Record<P> = <<P as CrudPages>::Repo as CrudRepository>::Record;
type Input<P> = <<P as CrudPages>::Repo as CrudRepository>::Input;

pub trait CrudPages: Send + Sync + 'static {
    type Repo: CrudRepository + 'static;
    /// Raw form fields as submitted.
    type Form: DeserializeOwned + Default + Send + 'static;

    /// Route prefix, e.g. `/fundaciones`.
    const BASE: &'static str;
    /// Entity name as shown to users.
    const LABEL: &'static str;
    const NEW_HEADING: &'static str;
    const EDIT_HEADING: &'static str;
    const CREATED: &'static str;
    const UPDATED: &'static str;
    const DELETED: &'static str;

    fn service(state: &AppState) -> &CrudService<Self::Repo>;

    /// Convert submitted text into a typed input. Field-level problems
    /// (unparseable numbers, unknown ids) are reported here; the rest of
    /// the rules run in the service.
    fn parse(form: &Self::Form) -> Result<Input<Self>, ValidationErrors>;

    fn to_form(record: &Record<Self>) -> Self::Form;

    fn display_name(record: &Record<Self>) -> String;

    fn render_list(
        state: &AppState,
        layout: Layout,
    ) -> impl Future<Output = AppResult<Response>> + Send;

    fn render_form(
        state: &AppState,
        layout: Layout,
        heading: &'static str,
        action: String,
        form: Self::Form,
        errors: ValidationErrors,
    ) -> impl Future<Output = AppResult<Response>> + Send;
}

/// Parse a non-negative whole number form field.
pub(crate) fn parse_count(errors: &mut ValidationErrors, field: &str, raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, REQUIRED);
        return 0;
    }
    raw.parse().unwrap_or_else(|_| {
        errors.add(field, NOT_A_NUMBER);
        0
    })
}

fn list_path<P: CrudPages>() -> String {
    format!("{}/", P::BASE)
}

fn new_path<P: CrudPages>() -> String {
    format!("{}/nueva/", P::BASE)
}

fn edit_path<P: CrudPages>(id: &str) -> String {
    format!("{}/{id}/editar/", P::BASE)
}

fn delete_path<P: CrudPages>(id: &str) -> String {
    format!("{}/{id}/eliminar/", P::BASE)
}

async fn list<P: CrudPages>(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, layout) = layout(jar, Some(user));
    let page = P::render_list(&state, layout).await?;
    Ok((jar, page).into_response())
}

async fn new_form<P: CrudPages>(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    jar: CookieJar,
) -> AppResult<Response> {
    let (jar, layout) = layout(jar, Some(user));
    let page = P::render_form(
        &state,
        layout,
        P::NEW_HEADING,
        new_path::<P>(),
        P::Form::default(),
        ValidationErrors::new(),
    )
    .await?;
    Ok((jar, page).into_response())
}

async fn create<P: CrudPages>(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    jar: CookieJar,
    Form(form): Form<P::Form>,
) -> AppResult<Response> {
    let result = match P::parse(&form) {
        Ok(input) => P::service(&state).create(input).await,
        Err(errors) => Err(MascotasError::Validation(errors)),
    };

    match result {
        Ok(_) => Ok(flash::redirect(
            jar,
            Flash::success(P::CREATED),
            &list_path::<P>(),
        )),
        Err(MascotasError::Validation(errors)) => {
            let layout = Layout::new(Some(user), Vec::new());
            P::render_form(&state, layout, P::NEW_HEADING, new_path::<P>(), form, errors).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn edit_form<P: CrudPages>(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let id = parse_id(<P::Repo as CrudRepository>::ENTITY, &raw_id)?;
    let record = P::service(&state).get(id).await?;

    let (jar, layout) = layout(jar, Some(user));
    let page = P::render_form(
        &state,
        layout,
        P::EDIT_HEADING,
        edit_path::<P>(&raw_id),
        P::to_form(&record),
        ValidationErrors::new(),
    )
    .await?;
    Ok((jar, page).into_response())
}

async fn update<P: CrudPages>(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(raw_id): Path<String>,
    jar: CookieJar,
    Form(form): Form<P::Form>,
) -> AppResult<Response> {
    let id = parse_id(<P::Repo as CrudRepository>::ENTITY, &raw_id)?;
    let result = match P::parse(&form) {
        Ok(input) => P::service(&state).update(id, input).await,
        Err(errors) => {
            // Report a missing record before complaining about the form.
            P::service(&state).get(id).await?;
            Err(MascotasError::Validation(errors))
        }
    };

    match result {
        Ok(_) => Ok(flash::redirect(
            jar,
            Flash::success(P::UPDATED),
            &list_path::<P>(),
        )),
        Err(MascotasError::Validation(errors)) => {
            let layout = Layout::new(Some(user), Vec::new());
            let action = edit_path::<P>(&raw_id);
            P::render_form(&state, layout, P::EDIT_HEADING, action, form, errors).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn delete_confirm<P: CrudPages>(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let id = parse_id(<P::Repo as CrudRepository>::ENTITY, &raw_id)?;
    let record = P::service(&state).get(id).await?;

    let (jar, layout) = layout(jar, Some(user));
    let page = ConfirmDeletePage {
        layout,
        label: P::LABEL,
        name: P::display_name(&record),
        action: delete_path::<P>(&raw_id),
        cancel: list_path::<P>(),
    };
    Ok((jar, HtmlTemplate(page)).into_response())
}

async fn delete<P: CrudPages>(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let id = parse_id(<P::Repo as CrudRepository>::ENTITY, &raw_id)?;
    P::service(&state).delete(id).await?;

    Ok(flash::redirect(
        jar,
        Flash::success(P::DELETED),
        &list_path::<P>(),
    ))
}

/// The four CRUD routes for `P`, mounted under `P::BASE`.
pub fn routes<P: CrudPages>() -> Router<AppState> {
    Router::new()
        .route(&list_path::<P>(), get(list::<P>))
        .route(&new_path::<P>(), get(new_form::<P>).post(create::<P>))
        .route(
            &edit_path::<P>("{id}"),
            get(edit_form::<P>).post(update::<P>),
        )
        .route(
            &delete_path::<P>("{id}"),
            get(delete_confirm::<P>).post(delete::<P>),
        )
}
