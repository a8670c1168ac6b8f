use serde::Serialize;
use serde_json::Value;

/// Normalized result of a remote action such as sign-up or log-in.
///
/// `success` is exactly `error.is_none()`; the constructors are the only way
/// to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    success: bool,
    error: Option<String>,
    data: Option<Value>,
}

impl SubmissionOutcome {
    /// Successful outcome carrying the provider payload, if any.
    #[must_use]
    pub fn succeeded(data: Option<Value>) -> Self {
        Self {
            success: true,
            error: None,
            data,
        }
    }

    /// Failed outcome with a user-facing message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }

    /// Whether the action succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Returns the failure message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the provider payload.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}
