//! Validate, submit, and report: the full lifecycle of one form submission.

use std::sync::Arc;

use lumina_core::AppResult;
use lumina_domain::{FieldErrors, FormModel, SubmissionOutcome};
use tracing::{info, warn};

use crate::form_controller::SubmissionStart;
use crate::{
    FormController, FormEvent, FormStatus, GENERATION_FALLBACK_ERROR, LOGIN_FALLBACK_ERROR,
    NotificationLevel, SIGN_UP_FALLBACK_ERROR, SubmitAction,
};

/// Notification texts and navigation target of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPolicy {
    success_message: String,
    fallback_error: String,
    destination: Option<String>,
}

impl SubmissionPolicy {
    /// Creates a policy without navigation.
    #[must_use]
    pub fn new(success_message: impl Into<String>, fallback_error: impl Into<String>) -> Self {
        Self {
            success_message: success_message.into(),
            fallback_error: fallback_error.into(),
            destination: None,
        }
    }

    /// Navigates to `destination` after a successful submission.
    #[must_use]
    pub fn navigate_to(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sign-up: confirm by email, then log in.
    #[must_use]
    pub fn sign_up() -> Self {
        Self::new(
            "Sign up successful! Please confirm your email address.",
            SIGN_UP_FALLBACK_ERROR,
        )
        .navigate_to("/login")
    }

    /// Log-in: straight to the dashboard.
    #[must_use]
    pub fn login() -> Self {
        Self::new("Login successful!", LOGIN_FALLBACK_ERROR).navigate_to("/dashboard")
    }

    /// Generation request: stays on the page.
    #[must_use]
    pub fn generation() -> Self {
        Self::new("Generation request queued!", GENERATION_FALLBACK_ERROR)
    }

    /// Returns the navigation target.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
}

/// Result of one call to [`SubmissionPipeline::submit`].
#[derive(Debug)]
pub enum SubmitReport<M> {
    /// The form was not submittable; nothing happened.
    Rejected(FormStatus),
    /// Validation failed; no remote call was made.
    Invalid(FieldErrors),
    /// The remote action succeeded.
    Succeeded {
        /// Validated model that was submitted.
        model: M,
        /// Normalized remote result.
        outcome: SubmissionOutcome,
    },
    /// The remote action failed; the form is editable again.
    Failed {
        /// Normalized remote result.
        outcome: SubmissionOutcome,
    },
}

impl<M> SubmitReport<M> {
    /// Returns the remote outcome, if a remote call was made.
    #[must_use]
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        match self {
            Self::Succeeded { outcome, .. } | Self::Failed { outcome } => Some(outcome),
            Self::Rejected(_) | Self::Invalid(_) => None,
        }
    }
}

/// Drives one form instance through validation and its remote action.
pub struct SubmissionPipeline<M: FormModel> {
    controller: FormController<M>,
    action: Arc<dyn SubmitAction<M>>,
    policy: SubmissionPolicy,
}

impl<M: FormModel> Clone for SubmissionPipeline<M> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            action: Arc::clone(&self.action),
            policy: self.policy.clone(),
        }
    }
}

impl<M: FormModel> SubmissionPipeline<M> {
    /// Creates a pipeline over an existing controller.
    #[must_use]
    pub fn new(
        controller: FormController<M>,
        action: Arc<dyn SubmitAction<M>>,
        policy: SubmissionPolicy,
    ) -> Self {
        Self {
            controller,
            action,
            policy,
        }
    }

    /// Returns the controller.
    #[must_use]
    pub fn controller(&self) -> &FormController<M> {
        &self.controller
    }

    /// Returns the policy.
    #[must_use]
    pub fn policy(&self) -> &SubmissionPolicy {
        &self.policy
    }

    /// Validates the draft and, if it passes, performs the remote action
    /// exactly once.
    ///
    /// A call while another submission is in flight, or after success,
    /// returns [`SubmitReport::Rejected`] without side effects. The outer
    /// error is reserved for defects such as an invalid schema.
    pub async fn submit(&self) -> AppResult<SubmitReport<M>> {
        let form_id = self.controller.form_id();
        let model = match self.controller.begin_submission()? {
            SubmissionStart::Rejected(status) => return Ok(SubmitReport::Rejected(status)),
            SubmissionStart::Invalid(errors) => {
                info!(
                    form = M::FORM_NAME,
                    %form_id,
                    fields = errors.len(),
                    "submission blocked by validation"
                );
                return Ok(SubmitReport::Invalid(errors));
            }
            SubmissionStart::Ready(model) => model,
        };

        self.controller.emit(FormEvent::Loading {
            form_id,
            active: true,
        });
        let outcome = self.action.perform(&model).await;
        self.controller.emit(FormEvent::Loading {
            form_id,
            active: false,
        });

        if outcome.success() {
            self.controller.succeed_submission()?;
            info!(form = M::FORM_NAME, %form_id, "submission succeeded");
            self.controller.emit(FormEvent::Notify {
                form_id,
                level: NotificationLevel::Success,
                message: self.policy.success_message.clone(),
            });
            if let Some(destination) = &self.policy.destination {
                self.controller.emit(FormEvent::Navigate {
                    form_id,
                    destination: destination.clone(),
                });
            }

            return Ok(SubmitReport::Succeeded { model, outcome });
        }

        self.controller.fail_submission()?;
        let message = outcome
            .error()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(self.policy.fallback_error.as_str())
            .to_owned();
        warn!(form = M::FORM_NAME, %form_id, %message, "submission failed");
        self.controller.emit(FormEvent::Notify {
            form_id,
            level: NotificationLevel::Error,
            message,
        });
        self.controller.resume_editing()?;

        Ok(SubmitReport::Failed { outcome })
    }
}
