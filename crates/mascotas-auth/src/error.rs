//! Authentication error types.

use mascotas_core::error::MascotasError;
use thiserror::Error;

/// Shown for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Correo o contraseña incorrectos.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for MascotasError {
    fn from(err: AuthError) -> Self {
        match err {
            // An inactive account is indistinguishable from a wrong password.
            AuthError::InvalidCredentials | AuthError::AccountInactive => {
                MascotasError::PermissionDenied {
                    reason: INVALID_CREDENTIALS.into(),
                }
            }
            AuthError::Crypto(msg) => MascotasError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_failures_share_one_message() {
        for err in [AuthError::InvalidCredentials, AuthError::AccountInactive] {
            match MascotasError::from(err) {
                MascotasError::PermissionDenied { reason } => {
                    assert_eq!(reason, INVALID_CREDENTIALS)
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
