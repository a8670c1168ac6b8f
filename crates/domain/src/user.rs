//! User credential types and the format rules behind them.

use std::sync::LazyLock;

use lumina_core::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Symbols of which a password must contain at least one.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Maximum email length (RFC 5321 path limit).
const EMAIL_MAX_LENGTH: usize = 254;

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
    )
    .ok()
});

/// Whether the value has the shape of an email address.
#[must_use]
pub fn is_valid_email_shape(value: &str) -> bool {
    value.len() <= EMAIL_MAX_LENGTH
        && EMAIL_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(value))
}

/// Whether the password has a lowercase letter, an uppercase letter, a digit,
/// a symbol from [`PASSWORD_SYMBOLS`], and at least [`PASSWORD_MIN_LENGTH`]
/// characters. All five must hold.
#[must_use]
pub fn is_complex_password(password: &str) -> bool {
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;

    has_lowercase && has_uppercase && has_digit && has_symbol && long_enough
}

/// Validated, normalized email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address. Surrounding whitespace is trimmed
    /// and the address is lowercased.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        if !is_valid_email_shape(&normalized) {
            return Err(AppError::Validation(format!(
                "'{normalized}' is not a valid email address"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}
