use serde::{Deserialize, Serialize};

/// Signed-in user information persisted in the web session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    subject: String,
    email: String,
    full_name: Option<String>,
    access_token: String,
}

impl SessionIdentity {
    /// Creates a session identity from an auth provider sign-in payload.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        email: impl Into<String>,
        full_name: Option<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            full_name,
            access_token: access_token.into(),
        }
    }

    /// Returns the stable user id assigned by the auth provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the sign-in email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the full name captured at sign-up, if the provider returned it.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Returns the provider access token used to end the session.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }
}
