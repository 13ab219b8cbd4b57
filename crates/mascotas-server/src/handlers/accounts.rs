//! Sign-up, login and logout.

use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use mascotas_auth::{LoginInput, LoginOutput, RegisterInput};
use mascotas_core::error::MascotasError;
use mascotas_core::validation::ValidationErrors;
use serde::Deserialize;

use super::layout;
use crate::error::{AppResult, DASHBOARD, LOGIN};
use crate::extract::CurrentUser;
use crate::flash::{self, Flash};
use crate::state::AppState;
use crate::templates::{HtmlTemplate, Layout, LoginPage, RegisterPage};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Submitted sign-up fields. Passwords are never echoed back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

/// Attach the session cookie for a fresh login.
fn start_session(state: &AppState, jar: CookieJar, login: &LoginOutput) -> CookieJar {
    jar.add(
        Cookie::build((
            state.session_cookie_name().to_owned(),
            login.session_token.clone(),
        ))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax),
    )
}

pub async fn login_page(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD).into_response();
    }
    let (jar, layout) = layout(jar, None);
    (
        jar,
        HtmlTemplate(LoginPage {
            layout,
            email: String::new(),
        }),
    )
        .into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let input = LoginInput {
        email: form.email.clone(),
        password: form.password,
    };

    match state.auth.login(input).await {
        Ok(output) => {
            let jar = start_session(&state, jar, &output);
            let welcome = format!("¡Bienvenido {}!", output.identity.username);
            Ok(flash::redirect(jar, Flash::success(welcome), DASHBOARD))
        }
        Err(MascotasError::PermissionDenied { reason }) => {
            let (jar, mut layout) = layout(jar, None);
            layout.flashes.push(Flash::error(reason));
            Ok((
                jar,
                HtmlTemplate(LoginPage {
                    layout,
                    email: form.email,
                }),
            )
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn register_page(CurrentUser(user): CurrentUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to(DASHBOARD).into_response();
    }
    let (jar, layout) = layout(jar, None);
    (
        jar,
        HtmlTemplate(RegisterPage {
            layout,
            form: RegisterForm::default(),
            errors: ValidationErrors::new(),
        }),
    )
        .into_response()
}

/// Create the account and sign the new user in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let input = RegisterInput {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
        password_confirmation: form.password_confirmation.clone(),
        phone: optional(&form.phone),
        address: optional(&form.address),
    };

    let user = match state.auth.register(input, false).await {
        Ok(user) => user,
        Err(MascotasError::Validation(errors)) => {
            return Ok(HtmlTemplate(RegisterPage {
                layout: Layout::anonymous(),
                form,
                errors,
            })
            .into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let output = state
        .auth
        .login(LoginInput {
            email: user.email,
            password: form.password,
        })
        .await?;
    let jar = start_session(&state, jar, &output);
    Ok(flash::redirect(
        jar,
        Flash::success("Tu cuenta ha sido creada correctamente."),
        DASHBOARD,
    ))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    let name = state.session_cookie_name().to_owned();
    let jar = match jar.get(&name).map(|c| c.value().to_owned()) {
        Some(token) => {
            state.auth.logout(&token).await?;
            jar.remove(Cookie::build((name, "")).path("/"))
        }
        None => jar,
    };
    Ok(flash::redirect(
        jar,
        Flash::info("Has cerrado sesión correctamente."),
        LOGIN,
    ))
}
