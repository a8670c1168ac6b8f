//! Remote auth actions normalized into submission outcomes.

use std::sync::Arc;

use lumina_core::AppResult;
use lumina_domain::{LoginCredentials, SignUpCredentials, SubmissionOutcome};
use tracing::{info, warn};

use crate::{AuthProvider, AuthProviderResponse, SignInRequest, SignUpRequest};

/// Shown when sign-up fails without a provider message.
pub const SIGN_UP_FALLBACK_ERROR: &str = "There was an error signing up!";

/// Shown when log-in fails without a provider message.
pub const LOGIN_FALLBACK_ERROR: &str = "There was an error logging in!";

/// Shown when log-out fails without a provider message.
pub const LOGOUT_FALLBACK_ERROR: &str = "There was an error logging out!";

/// Application service that performs one provider call per action and never
/// fails: every failure mode becomes an unsuccessful [`SubmissionOutcome`].
#[derive(Clone)]
pub struct AuthActionService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthActionService {
    /// Creates the service around an auth provider.
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Registers a new account.
    pub async fn sign_up(&self, credentials: &SignUpCredentials) -> SubmissionOutcome {
        let response = self
            .provider
            .sign_up(SignUpRequest::from(credentials))
            .await;
        normalize("sign_up", response, SIGN_UP_FALLBACK_ERROR)
    }

    /// Starts a password session.
    pub async fn sign_in(&self, credentials: &LoginCredentials) -> SubmissionOutcome {
        let response = self
            .provider
            .sign_in_with_password(SignInRequest::from(credentials))
            .await;
        normalize("sign_in", response, LOGIN_FALLBACK_ERROR)
    }

    /// Ends the session identified by `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> SubmissionOutcome {
        let response = self.provider.sign_out(access_token).await;
        normalize("sign_out", response, LOGOUT_FALLBACK_ERROR)
    }
}

fn normalize(
    action: &'static str,
    response: AppResult<AuthProviderResponse>,
    fallback: &str,
) -> SubmissionOutcome {
    let response = match response {
        Ok(response) => response,
        Err(error) => {
            warn!(action, %error, "auth provider call failed");
            return SubmissionOutcome::failed(fallback);
        }
    };

    if let Some(error) = response.error {
        let message = error.message.trim();
        warn!(action, message, "auth provider rejected the request");
        return SubmissionOutcome::failed(if message.is_empty() {
            fallback
        } else {
            message
        });
    }

    if response.data.is_none() {
        warn!(action, "auth provider reported success without data");
    } else {
        info!(action, "auth provider call succeeded");
    }

    SubmissionOutcome::succeeded(response.data)
}
