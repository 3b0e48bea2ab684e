//! crates/alttrack_core/src/validation.rs
//!
//! Input checks run before a form is submitted to the backend.
//! Messages are user-facing.

use regex::Regex;
use std::sync::OnceLock;

use crate::domain::CreateNotebookInput;

const MIN_USERNAME_LEN: usize = 3;
const MIN_LOGIN_PASSWORD_LEN: usize = 3;
const MIN_REGISTER_PASSWORD_LEN: usize = 4;
const MIN_NOTEBOOK_NAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Tous les champs sont requis.")]
    MissingFields,
    #[error("Le nom d'utilisateur doit contenir au moins {0} caractères.")]
    UsernameTooShort(usize),
    #[error("Le mot de passe doit contenir au moins {0} caractères.")]
    PasswordTooShort(usize),
    #[error("Les mots de passe ne correspondent pas.")]
    PasswordMismatch,
    #[error("Le nom d'utilisateur ne peut contenir que des lettres, chiffres, tirets et underscores.")]
    UsernameCharacters,
    #[error("Le nom du notebook doit contenir au moins {0} caractères.")]
    NotebookNameTooShort(usize),
    #[error("La date de fin doit être postérieure à la date de début.")]
    EndBeforeStart,
    #[error("La durée en semaines doit être positive.")]
    InvalidDuration,
    #[error("La période spéciale n°{0} est invalide.")]
    InvalidSpecialPeriod(usize),
}

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("static pattern compiles"))
}

pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort(MIN_USERNAME_LEN));
    }
    if password.chars().count() < MIN_LOGIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_LOGIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Checks run in the same order as the registration form reports them.
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    if username.is_empty() || password.is_empty() || confirm_password.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort(MIN_USERNAME_LEN));
    }
    if password.chars().count() < MIN_REGISTER_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_REGISTER_PASSWORD_LEN));
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if !username_pattern().is_match(username) {
        return Err(ValidationError::UsernameCharacters);
    }
    Ok(())
}

impl CreateNotebookInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().chars().count() < MIN_NOTEBOOK_NAME_LEN {
            return Err(ValidationError::NotebookNameTooShort(MIN_NOTEBOOK_NAME_LEN));
        }
        if matches!(self.end_date, Some(end) if end < self.start_date) {
            return Err(ValidationError::EndBeforeStart);
        }
        if self.duration_in_weeks == Some(0) {
            return Err(ValidationError::InvalidDuration);
        }
        for (index, period) in self.special_periods.iter().enumerate() {
            if period.name.trim().is_empty() || period.end_date < period.start_date {
                return Err(ValidationError::InvalidSpecialPeriod(index + 1));
            }
        }
        Ok(())
    }
}
