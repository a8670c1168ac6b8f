use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lumina_core::AppResult;
use lumina_domain::{LoginCredentials, SignUpCredentials};

/// User metadata attached to a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    /// Display name.
    pub full_name: String,
}

/// Sign-up options understood by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOptions {
    /// Metadata stored with the user record.
    pub data: SignUpMetadata,
}

/// Sign-up payload in the provider's request shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Extra account options.
    pub options: SignUpOptions,
}

impl From<&SignUpCredentials> for SignUpRequest {
    fn from(credentials: &SignUpCredentials) -> Self {
        Self {
            email: credentials.email().as_str().to_owned(),
            password: credentials.password().to_owned(),
            options: SignUpOptions {
                data: SignUpMetadata {
                    full_name: credentials.full_name().to_owned(),
                },
            },
        }
    }
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Password sign-in payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl From<&LoginCredentials> for SignInRequest {
    fn from(credentials: &LoginCredentials) -> Self {
        Self {
            email: credentials.email().as_str().to_owned(),
            password: credentials.password().to_owned(),
        }
    }
}

impl std::fmt::Debug for SignInRequest {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Error object returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProviderError {
    /// Provider message, possibly empty.
    pub message: String,
}

/// Raw provider response: `data` and `error` are independent and either may
/// be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthProviderResponse {
    /// Provider payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Provider error.
    #[serde(default)]
    pub error: Option<AuthProviderError>,
}

impl AuthProviderResponse {
    /// Response carrying only data.
    #[must_use]
    pub fn with_data(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// Response carrying only an error.
    #[must_use]
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(AuthProviderError {
                message: message.into(),
            }),
        }
    }
}

/// Port for the hosted authentication backend.
///
/// Implementations return `Ok` for every response the provider produced,
/// including provider-side errors, and `Err` only for transport or decoding
/// failures.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registers a new account.
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthProviderResponse>;

    /// Starts a session with email and password.
    async fn sign_in_with_password(&self, request: SignInRequest)
    -> AppResult<AuthProviderResponse>;

    /// Ends the session identified by the access token.
    async fn sign_out(&self, access_token: &str) -> AppResult<AuthProviderResponse>;
}
