//! Field-level validation for user-submitted records.
//!
//! Every entity has an explicit validation function that inspects the
//! input and reports all problems at once, keyed by form field name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::foundation::FoundationInput;
use crate::models::pet::PetInput;
use crate::models::user::CreateUser;

/// A single problem with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All problems found in one submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set holding exactly one error.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First message reported for `field`, if any.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: &str) -> bool {
        self.first(field).is_some()
    }

    /// `Ok(())` when no error was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

pub const REQUIRED: &str = "Este campo es obligatorio.";
pub const INVALID_EMAIL: &str = "Introduzca una dirección de correo electrónico válida.";

fn required(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        false
    } else {
        true
    }
}

fn max_len(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Asegúrese de que este valor tenga como máximo {max} caracteres (tiene {len})."),
        );
    }
}

fn optional_max_len(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if let Some(value) = value {
        max_len(errors, field, value, max);
    }
}

/// Structural e-mail check: one `@`, a non-empty local part and a dotted
/// domain without whitespace.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn email(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    if required(errors, field, value) {
        if is_valid_email(value) {
            max_len(errors, field, value, max);
        } else {
            errors.add(field, INVALID_EMAIL);
        }
    }
}

pub fn validate_foundation(input: &FoundationInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if required(&mut errors, "name", &input.name) {
        max_len(&mut errors, "name", &input.name, 100);
    }
    if required(&mut errors, "address", &input.address) {
        max_len(&mut errors, "address", &input.address, 200);
    }
    if required(&mut errors, "phone", &input.phone) {
        max_len(&mut errors, "phone", &input.phone, 20);
    }
    email(&mut errors, "email", &input.email, 100);
    errors.into_result()
}

pub fn validate_pet(input: &PetInput) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if required(&mut errors, "name", &input.name) {
        max_len(&mut errors, "name", &input.name, 100);
    }
    if required(&mut errors, "species", &input.species) {
        max_len(&mut errors, "species", &input.species, 50);
    }
    optional_max_len(&mut errors, "photo", input.photo.as_deref(), 255);
    errors.into_result()
}

/// Validate a new account. Uniqueness of username and e-mail is checked
/// against storage by the caller.
pub fn validate_new_user(
    input: &CreateUser,
    min_password_length: usize,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if required(&mut errors, "username", &input.username) {
        max_len(&mut errors, "username", &input.username, 150);
        if !input
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Introduzca un nombre de usuario válido: solo letras, números y @/./+/-/_.",
            );
        }
    }
    email(&mut errors, "email", &input.email, 254);
    if required(&mut errors, "password", &input.password)
        && input.password.chars().count() < min_password_length
    {
        errors.add(
            "password",
            format!("La contraseña debe tener al menos {min_password_length} caracteres."),
        );
    }
    optional_max_len(&mut errors, "phone", input.phone.as_deref(), 20);
    optional_max_len(&mut errors, "address", input.address.as_deref(), 100);
    errors.into_result()
}
