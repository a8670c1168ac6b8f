//! Sign-up and log-in forms.

use std::fmt::{Debug, Formatter};

use lumina_core::{AppResult, NonEmptyString};

use crate::form::{FieldSchema, FormModel, FormSchema, Refinement, Rule, ValidatedDraft};
use crate::user::EmailAddress;

/// Field names shared by the authentication forms.
pub mod auth_fields {
    /// Display name captured at sign-up.
    pub const FULL_NAME: &str = "full_name";
    /// Sign-in email.
    pub const EMAIL: &str = "email";
    /// Plaintext password.
    pub const PASSWORD: &str = "password";
    /// Repeated password on the sign-up form.
    pub const CONFIRM_PASSWORD: &str = "confirmPassword";
}

/// Shown when the password misses any complexity requirement.
pub const PASSWORD_COMPLEXITY_MESSAGE: &str = "Password must contain 8 characters, 1 uppercase letter, 1 lowercase letter, 1 number and 1 special letter";

/// Shown when the confirmation does not repeat the password.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match!";

fn email_field() -> FieldSchema {
    FieldSchema::text(auth_fields::EMAIL)
        .required("Email is required!")
        .rule(Rule::Email, "Please enter a valid email address!")
}

/// Validated sign-up form values.
#[derive(Clone, PartialEq, Eq)]
pub struct SignUpCredentials {
    full_name: NonEmptyString,
    email: EmailAddress,
    password: String,
}

impl SignUpCredentials {
    /// Returns the full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Returns the normalized email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the plaintext password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl Debug for SignUpCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SignUpCredentials")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl FormModel for SignUpCredentials {
    const FORM_NAME: &'static str = "signup";

    fn schema() -> AppResult<FormSchema> {
        FormSchema::new(
            vec![
                FieldSchema::text(auth_fields::FULL_NAME)
                    .required("Full name is required!")
                    .whitespace_is_blank()
                    .rule(
                        Rule::MinLength(3),
                        "Your name must be at least 3 characters long.",
                    ),
                email_field(),
                FieldSchema::text(auth_fields::PASSWORD)
                    .required("Password is required!")
                    .rule(Rule::PasswordComplexity, PASSWORD_COMPLEXITY_MESSAGE),
                FieldSchema::text(auth_fields::CONFIRM_PASSWORD)
                    .required("Please confirm your password!"),
            ],
            vec![Refinement::FieldsMatch {
                field: auth_fields::PASSWORD.to_owned(),
                confirmation: auth_fields::CONFIRM_PASSWORD.to_owned(),
                message: PASSWORD_MISMATCH_MESSAGE.to_owned(),
            }],
        )
    }

    fn from_validated(values: &ValidatedDraft) -> AppResult<Self> {
        Ok(Self {
            full_name: NonEmptyString::new(values.text(auth_fields::FULL_NAME)?.trim())?,
            email: EmailAddress::new(values.text(auth_fields::EMAIL)?)?,
            password: values.text(auth_fields::PASSWORD)?.to_owned(),
        })
    }
}

/// Validated log-in form values.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: String,
}

impl LoginCredentials {
    /// Returns the normalized email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the plaintext password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl Debug for LoginCredentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl FormModel for LoginCredentials {
    const FORM_NAME: &'static str = "login";

    fn schema() -> AppResult<FormSchema> {
        FormSchema::new(
            vec![
                email_field(),
                FieldSchema::text(auth_fields::PASSWORD).required("Password is required!"),
            ],
            Vec::new(),
        )
    }

    fn from_validated(values: &ValidatedDraft) -> AppResult<Self> {
        Ok(Self {
            email: EmailAddress::new(values.text(auth_fields::EMAIL)?)?,
            password: values.text(auth_fields::PASSWORD)?.to_owned(),
        })
    }
}
