//! Authentication service: registration, login, logout and session
//! resolution.

use chrono::{DateTime, Duration, Utc};
use mascotas_core::error::{MascotasError, MascotasResult};
use mascotas_core::models::session::CreateSession;
use mascotas_core::models::user::{CreateUser, Identity, User};
use mascotas_core::repository::{SessionRepository, UserRepository};
use mascotas_core::validation::{self, ValidationErrors};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

pub const PASSWORD_MISMATCH: &str = "Los dos campos de contraseña no coinciden.";
pub const USERNAME_TAKEN: &str = "Ya existe un usuario con este nombre.";
pub const EMAIL_TAKEN: &str = "Ya existe un usuario con este correo electrónico.";

/// Sign-up form input.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for the login flow.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Raw opaque session token (set as a cookie, never stored).
    pub session_token: String,
    pub session_id: Uuid,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: U,
    session_repo: S,
    config: AuthConfig,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(user_repo: U, session_repo: S, config: AuthConfig) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an active account.
    ///
    /// Every field problem is collected into one `Validation` error,
    /// including a taken username or e-mail.
    pub async fn register(&self, input: RegisterInput, is_staff: bool) -> MascotasResult<User> {
        let create = CreateUser {
            username: input.username.trim().to_owned(),
            email: input.email.trim().to_owned(),
            password: input.password,
            phone: input.phone,
            address: input.address,
            is_staff,
        };

        let mut errors: ValidationErrors =
            validation::validate_new_user(&create, self.config.min_password_length)
                .err()
                .unwrap_or_default();
        if create.password != input.password_confirmation {
            errors.add("password_confirmation", PASSWORD_MISMATCH);
        }
        if !errors.has("username")
            && taken(self.user_repo.get_by_username(&create.username).await)?
        {
            errors.add("username", USERNAME_TAKEN);
        }
        if !errors.has("email") && taken(self.user_repo.get_by_email(&create.email).await)? {
            errors.add("email", EMAIL_TAKEN);
        }
        errors.into_result()?;

        let username = create.username.clone();
        let email = create.email.clone();
        let user = match self.user_repo.create(create).await {
            Ok(user) => user,
            Err(err) => {
                // A concurrent sign-up may claim the username or e-mail
                // between the lookups above and the insert.
                let mut errors = ValidationErrors::new();
                if taken(self.user_repo.get_by_username(&username).await)? {
                    errors.add("username", USERNAME_TAKEN);
                }
                if taken(self.user_repo.get_by_email(&email).await)? {
                    errors.add("email", EMAIL_TAKEN);
                }
                errors.into_result()?;
                return Err(err);
            }
        };
        info!(user_id = %user.id, username = %user.username, is_staff, "User registered");
        Ok(user)
    }

    /// Make sure a staff account exists for `input.email`.
    ///
    /// Returns the new user, or `None` when the e-mail is already
    /// registered (the existing account is left untouched).
    pub async fn ensure_staff(&self, input: RegisterInput) -> MascotasResult<Option<User>> {
        if taken(self.user_repo.get_by_email(&input.email).await)? {
            info!(email = %input.email, "Staff account already present");
            return Ok(None);
        }
        self.register(input, true).await.map(Some)
    }

    /// Authenticate by e-mail and password and open a session.
    pub async fn login(&self, input: LoginInput) -> MascotasResult<LoginOutput> {
        let user = match self.user_repo.get_by_email(&input.email).await {
            Ok(user) => user,
            Err(MascotasError::NotFound { .. }) => {
                warn!(email = %input.email, "Login for unknown e-mail");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            warn!(user_id = %user.id, "Login to inactive account");
            return Err(AuthError::AccountInactive.into());
        }

        let expires_at = self.session_expiry()?;
        let session_token = token::generate_session_token();

        let session = self
            .session_repo
            .create(CreateSession {
                user_id: user.id,
                token_hash: token::hash_session_token(&session_token),
                expires_at,
            })
            .await?;

        info!(user_id = %user.id, session_id = %session.id, "User logged in");

        Ok(LoginOutput {
            session_token,
            session_id: session.id,
            identity: user.identity(),
            expires_at,
        })
    }

    fn session_expiry(&self) -> MascotasResult<DateTime<Utc>> {
        let secs = self.config.session_lifetime_secs;
        i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                MascotasError::Internal(format!("session lifetime of {secs}s is out of range"))
            })
    }

    /// Drop the session behind `raw_token`. Unknown tokens are ignored.
    pub async fn logout(&self, raw_token: &str) -> MascotasResult<()> {
        match self
            .session_repo
            .get_by_token_hash(&token::hash_session_token(raw_token))
            .await
        {
            Ok(session) => {
                self.session_repo.invalidate(session.id).await?;
                info!(session_id = %session.id, "User logged out");
                Ok(())
            }
            Err(MascotasError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Map a cookie token to the identity it authenticates.
    ///
    /// Unknown tokens, expired sessions and inactive or deleted users all
    /// resolve to `None`. Expired sessions are removed.
    pub async fn resolve(&self, raw_token: &str) -> MascotasResult<Option<Identity>> {
        let session = match self
            .session_repo
            .get_by_token_hash(&token::hash_session_token(raw_token))
            .await
        {
            Ok(session) => session,
            Err(MascotasError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if session.expires_at <= Utc::now() {
            self.session_repo.invalidate(session.id).await?;
            return Ok(None);
        }

        match self.user_repo.get_by_id(session.user_id).await {
            Ok(user) if user.is_active => Ok(Some(user.identity())),
            Ok(_) | Err(MascotasError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove every expired session. Returns the number removed.
    pub async fn cleanup_expired(&self) -> MascotasResult<u64> {
        let removed = self.session_repo.cleanup_expired().await?;
        if removed > 0 {
            info!(removed, "Expired sessions removed");
        }
        Ok(removed)
    }
}

fn taken(lookup: MascotasResult<User>) -> MascotasResult<bool> {
    match lookup {
        Ok(_) => Ok(true),
        Err(MascotasError::NotFound { .. }) => Ok(false),
        Err(e) => Err(e),
    }
}
