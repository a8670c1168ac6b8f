//! Per-instance form state: draft values, field errors and lifecycle status.
//!
//! The controller is a cloneable handle. All state sits behind one mutex
//! that is only held for synchronous work, so a submission can check and
//! claim the `Submitting` status atomically and then await the remote call
//! without holding the lock.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

use lumina_core::{AppError, AppResult, FormInstanceId};
use lumina_domain::{
    FieldErrors, FieldValue, FormDraft, FormModel, ValidationResult, validate_model,
};
use serde::Serialize;
use tracing::debug;

use crate::{FormEvent, FormEventSink, FormStatus, FormTransition};

/// Point-in-time view of a form instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    /// Form instance.
    pub form_id: FormInstanceId,
    /// Current status.
    pub status: FormStatus,
    /// Current draft values.
    pub draft: FormDraft,
    /// Errors from the last validation pass.
    pub errors: FieldErrors,
}

/// How a submission attempt started.
#[derive(Debug)]
pub(crate) enum SubmissionStart<M> {
    /// The form was not in a submittable status.
    Rejected(FormStatus),
    /// Validation failed and errors were attached.
    Invalid(FieldErrors),
    /// Validation passed and the form is now `Submitting`.
    Ready(M),
}

struct ControllerState {
    status: FormStatus,
    draft: FormDraft,
    errors: FieldErrors,
}

impl ControllerState {
    fn apply(&mut self, transition: FormTransition, visited: &mut Vec<FormStatus>) -> AppResult<()> {
        let next = self.status.next(transition)?;
        if next != self.status {
            visited.push(next);
        }
        self.status = next;
        Ok(())
    }
}

/// State controller for one mounted form of model `M`.
pub struct FormController<M: FormModel> {
    form_id: FormInstanceId,
    state: Arc<Mutex<ControllerState>>,
    events: Arc<dyn FormEventSink>,
    model: PhantomData<fn() -> M>,
}

impl<M: FormModel> Clone for FormController<M> {
    fn clone(&self) -> Self {
        Self {
            form_id: self.form_id,
            state: Arc::clone(&self.state),
            events: Arc::clone(&self.events),
            model: PhantomData,
        }
    }
}

impl<M: FormModel> FormController<M> {
    /// Creates an `Idle` controller seeded with the model's default draft.
    #[must_use]
    pub fn new(events: Arc<dyn FormEventSink>) -> Self {
        Self::with_draft(M::default_draft(), events)
    }

    /// Creates an `Idle` controller seeded with `draft`.
    #[must_use]
    pub fn with_draft(draft: FormDraft, events: Arc<dyn FormEventSink>) -> Self {
        Self {
            form_id: FormInstanceId::new(),
            state: Arc::new(Mutex::new(ControllerState {
                status: FormStatus::Idle,
                draft,
                errors: FieldErrors::new(),
            })),
            events,
            model: PhantomData,
        }
    }

    /// Returns the form instance identifier.
    #[must_use]
    pub fn form_id(&self) -> FormInstanceId {
        self.form_id
    }

    /// Returns the current status.
    pub fn status(&self) -> AppResult<FormStatus> {
        Ok(self.lock()?.status)
    }

    /// Returns a copy of the current draft.
    pub fn draft(&self) -> AppResult<FormDraft> {
        Ok(self.lock()?.draft.clone())
    }

    /// Returns the errors of the last validation pass.
    pub fn errors(&self) -> AppResult<FieldErrors> {
        Ok(self.lock()?.errors.clone())
    }

    /// Returns status, draft and errors read under one lock.
    pub fn snapshot(&self) -> AppResult<FormSnapshot> {
        let state = self.lock()?;
        Ok(FormSnapshot {
            form_id: self.form_id,
            status: state.status,
            draft: state.draft.clone(),
            errors: state.errors.clone(),
        })
    }

    /// Sets one field value. Never validates.
    ///
    /// Fails with `Validation` for a field the form does not declare and with
    /// `Conflict` while submitting or after success.
    pub fn set_field(&self, field: &str, value: impl Into<FieldValue>) -> AppResult<FormStatus> {
        if M::schema()?.field(field).is_none() {
            return Err(AppError::Validation(format!(
                "form '{}' has no field '{field}'",
                M::FORM_NAME
            )));
        }

        let mut visited = Vec::new();
        let status = {
            let mut state = self.lock()?;
            state.apply(FormTransition::Edit, &mut visited)?;
            state.draft.set(field, value);
            state.status
        };

        self.emit_statuses(visited);
        Ok(status)
    }

    /// Restores the default draft and clears errors.
    pub fn reset(&self) -> AppResult<()> {
        let mut visited = Vec::new();
        {
            let mut state = self.lock()?;
            state.apply(FormTransition::Reset, &mut visited)?;
            state.draft = M::default_draft();
            state.errors = FieldErrors::new();
        }

        self.emit_statuses(visited);
        Ok(())
    }

    /// Validates the draft and, when it passes, claims the `Submitting`
    /// status. Check and claim happen under one lock acquisition.
    pub(crate) fn begin_submission(&self) -> AppResult<SubmissionStart<M>> {
        let mut visited = Vec::new();
        let start = {
            let mut state = self.lock()?;
            if !state.status.accepts_submit() {
                debug!(
                    form = M::FORM_NAME,
                    form_id = %self.form_id,
                    status = ?state.status,
                    "submission rejected"
                );
                return Ok(SubmissionStart::Rejected(state.status));
            }

            if state.status == FormStatus::Idle {
                state.apply(FormTransition::Edit, &mut visited)?;
            }
            state.apply(FormTransition::Submit, &mut visited)?;

            match validate_model::<M>(&state.draft) {
                Ok(ValidationResult::Valid(model)) => {
                    state.errors = FieldErrors::new();
                    state.apply(FormTransition::ValidationPassed, &mut visited)?;
                    Ok(SubmissionStart::Ready(model))
                }
                Ok(ValidationResult::Invalid(errors)) => {
                    state.errors = errors.clone();
                    state.apply(FormTransition::ValidationFailed, &mut visited)?;
                    Ok(SubmissionStart::Invalid(errors))
                }
                Err(error) => {
                    state.apply(FormTransition::ValidationFailed, &mut visited)?;
                    Err(error)
                }
            }
        };

        self.emit_statuses(visited);
        start
    }

    /// Records a successful remote result. Success discards the draft and
    /// is terminal.
    pub(crate) fn succeed_submission(&self) -> AppResult<()> {
        self.transition(FormTransition::Succeeded, |state| {
            state.draft = FormDraft::new();
        })
    }

    /// Records a failed remote result. The form stays `Failed` with its
    /// draft intact until [`Self::resume_editing`].
    pub(crate) fn fail_submission(&self) -> AppResult<()> {
        self.transition(FormTransition::Failed, |_| {})
    }

    /// Leaves `Failed` once the failure has been reported.
    pub(crate) fn resume_editing(&self) -> AppResult<()> {
        self.transition(FormTransition::Resume, |_| {})
    }

    fn transition(
        &self,
        transition: FormTransition,
        update: impl FnOnce(&mut ControllerState),
    ) -> AppResult<()> {
        let mut visited = Vec::new();
        {
            let mut state = self.lock()?;
            state.apply(transition, &mut visited)?;
            update(&mut state);
        }

        self.emit_statuses(visited);
        Ok(())
    }

    pub(crate) fn emit(&self, event: FormEvent) {
        self.events.emit(event);
    }

    fn emit_statuses(&self, visited: Vec<FormStatus>) {
        for status in visited {
            debug!(form = M::FORM_NAME, form_id = %self.form_id, ?status, "form status changed");
            self.emit(FormEvent::StatusChanged {
                form_id: self.form_id,
                status,
            });
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, ControllerState>> {
        self.state
            .lock()
            .map_err(|error| AppError::Internal(format!("form state lock poisoned: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lumina_domain::{
        GenerationConfig, LoginCredentials, auth_fields, generation_fields,
    };

    use super::{FormController, SubmissionStart};
    use crate::{FormEvent, FormStatus, RecordingEventSink};

    fn login_controller() -> (FormController<LoginCredentials>, Arc<RecordingEventSink>) {
        let events = Arc::new(RecordingEventSink::new());
        (FormController::new(events.clone()), events)
    }

    fn statuses(events: &RecordingEventSink) -> Vec<FormStatus> {
        events
            .events()
            .into_iter()
            .filter_map(|event| match event {
                FormEvent::StatusChanged { status, .. } => Some(status),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_edit_moves_idle_to_editing_once() {
        let (controller, events) = login_controller();

        assert_eq!(
            controller.set_field(auth_fields::EMAIL, "ann@example.com").ok(),
            Some(FormStatus::Editing)
        );
        assert_eq!(
            controller.set_field(auth_fields::PASSWORD, "x").ok(),
            Some(FormStatus::Editing)
        );
        assert_eq!(statuses(&events), vec![FormStatus::Editing]);
    }

    #[test]
    fn unknown_field_is_rejected_without_touching_state() {
        let (controller, _) = login_controller();

        assert!(controller.set_field("nickname", "ann").is_err());
        assert_eq!(controller.status().ok(), Some(FormStatus::Idle));
        assert!(controller.draft().is_ok_and(|draft| draft.is_empty()));
    }

    #[test]
    fn slider_updates_do_not_validate() {
        let events = Arc::new(RecordingEventSink::new());
        let controller = FormController::<GenerationConfig>::new(events);

        let status = controller.set_field(generation_fields::NUM_OUTPUT, 9.0);

        assert_eq!(status.ok(), Some(FormStatus::Editing));
        assert!(controller.errors().is_ok_and(|errors| errors.is_empty()));
    }

    #[test]
    fn invalid_submission_returns_to_editing_with_errors() {
        let (controller, events) = login_controller();

        let start = controller.begin_submission();

        let Ok(SubmissionStart::Invalid(errors)) = start else {
            panic!("empty login form should be invalid");
        };
        assert!(errors.contains(auth_fields::EMAIL));
        assert_eq!(controller.errors().ok(), Some(errors));
        assert_eq!(
            statuses(&events),
            vec![
                FormStatus::Editing,
                FormStatus::Validating,
                FormStatus::Editing
            ]
        );
    }

    #[test]
    fn second_submission_is_rejected_while_first_is_in_flight() {
        let (controller, _) = login_controller();
        let _ = controller.set_field(auth_fields::EMAIL, "ann@example.com");
        let _ = controller.set_field(auth_fields::PASSWORD, "secret");

        assert!(matches!(
            controller.begin_submission(),
            Ok(SubmissionStart::Ready(_))
        ));
        assert!(matches!(
            controller.begin_submission(),
            Ok(SubmissionStart::Rejected(FormStatus::Submitting))
        ));
        assert!(controller.set_field(auth_fields::PASSWORD, "other").is_err());
    }

    #[test]
    fn failure_keeps_draft_and_success_is_terminal() {
        let (controller, _) = login_controller();
        let _ = controller.set_field(auth_fields::EMAIL, "ann@example.com");
        let _ = controller.set_field(auth_fields::PASSWORD, "secret");

        let _ = controller.begin_submission();
        assert!(controller.fail_submission().is_ok());
        assert_eq!(controller.status().ok(), Some(FormStatus::Failed));
        assert!(controller.set_field(auth_fields::PASSWORD, "other").is_err());
        assert!(controller.resume_editing().is_ok());
        assert_eq!(controller.status().ok(), Some(FormStatus::Editing));
        assert_eq!(controller.draft().map(|draft| draft.len()).ok(), Some(2));

        let _ = controller.begin_submission();
        assert!(controller.succeed_submission().is_ok());
        assert_eq!(controller.status().ok(), Some(FormStatus::Success));
        assert!(controller.draft().is_ok_and(|draft| draft.is_empty()));
        assert!(controller.set_field(auth_fields::EMAIL, "x@y.io").is_err());
        assert!(matches!(
            controller.begin_submission(),
            Ok(SubmissionStart::Rejected(FormStatus::Success))
        ));
    }

    #[test]
    fn reset_restores_defaults() {
        let events = Arc::new(RecordingEventSink::new());
        let controller = FormController::<GenerationConfig>::new(events);
        let _ = controller.set_field(generation_fields::PROMPT, "a red fox");

        assert!(controller.reset().is_ok());

        assert_eq!(controller.status().ok(), Some(FormStatus::Idle));
        assert_eq!(
            controller
                .draft()
                .ok()
                .and_then(|draft| draft.get(generation_fields::PROMPT).cloned()),
            Some("".into())
        );
    }

    #[test]
    fn clones_share_state() {
        let (controller, _) = login_controller();
        let other = controller.clone();

        let _ = other.set_field(auth_fields::EMAIL, "ann@example.com");

        assert_eq!(controller.status().ok(), Some(FormStatus::Editing));
        assert_eq!(controller.form_id(), other.form_id());
    }
}
