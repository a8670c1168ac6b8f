use std::sync::Arc;

use axum::http::StatusCode;
use lumina_application::{
    FormController, FormEventSink, RecordingEventSink, SubmissionPipeline, SubmissionPolicy,
    SubmitAction, SubmitReport,
};
use lumina_core::AppResult;
use lumina_domain::{FormDraft, FormModel};

use crate::dto::FormSubmissionResponse;
use crate::state::AppState;

/// One finished request-scoped submission.
pub struct FormSubmission<M> {
    pub report: SubmitReport<M>,
    pub response: FormSubmissionResponse,
}

impl<M> FormSubmission<M> {
    pub fn status_code(&self) -> StatusCode {
        status_code(&self.report)
    }
}

/// Runs a posted draft through a fresh controller and pipeline.
///
/// Events are recorded for the response and forwarded to the shared sink.
pub async fn submit_form<M: FormModel>(
    state: &AppState,
    draft: FormDraft,
    action: Arc<dyn SubmitAction<M>>,
    policy: SubmissionPolicy,
) -> AppResult<FormSubmission<M>> {
    let recorder = Arc::new(RecordingEventSink::forwarding_to(state.form_events.clone()));
    let events: Arc<dyn FormEventSink> = recorder.clone();
    let pipeline =
        SubmissionPipeline::new(FormController::with_draft(draft, events), action, policy);

    let report = pipeline.submit().await?;
    let snapshot = pipeline.controller().snapshot()?;
    let response = FormSubmissionResponse::from_submission(&report, &snapshot, &recorder.events());

    Ok(FormSubmission { report, response })
}

pub fn status_code<M>(report: &SubmitReport<M>) -> StatusCode {
    match report {
        SubmitReport::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitReport::Rejected(_) => StatusCode::CONFLICT,
        SubmitReport::Succeeded { .. } | SubmitReport::Failed { .. } => StatusCode::OK,
    }
}
