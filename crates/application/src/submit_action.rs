use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use lumina_core::AppResult;
use lumina_domain::{
    FormModel, GenerationConfig, LoginCredentials, SignUpCredentials, SubmissionOutcome,
};

use crate::AuthActionService;

/// Shown when a generation request cannot be queued.
pub const GENERATION_FALLBACK_ERROR: &str = "There was an error submitting the generation request!";

/// Remote action performed with a validated form model.
#[async_trait]
pub trait SubmitAction<M: FormModel>: Send + Sync {
    /// Performs the action once. Failures are reported in the outcome.
    async fn perform(&self, model: &M) -> SubmissionOutcome;
}

/// Sign-up through the auth adapter.
#[derive(Clone)]
pub struct SignUpAction {
    service: AuthActionService,
}

impl SignUpAction {
    /// Creates the action.
    #[must_use]
    pub fn new(service: AuthActionService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SubmitAction<SignUpCredentials> for SignUpAction {
    async fn perform(&self, model: &SignUpCredentials) -> SubmissionOutcome {
        self.service.sign_up(model).await
    }
}

/// Password log-in through the auth adapter.
#[derive(Clone)]
pub struct LoginAction {
    service: AuthActionService,
}

impl LoginAction {
    /// Creates the action.
    #[must_use]
    pub fn new(service: AuthActionService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SubmitAction<LoginCredentials> for LoginAction {
    async fn perform(&self, model: &LoginCredentials) -> SubmissionOutcome {
        self.service.sign_in(model).await
    }
}

/// Processing state of a queued generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationRequestStatus {
    /// Waiting for a worker.
    Queued,
}

/// Receipt for a queued generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTicket {
    /// Identifier assigned by the queue.
    pub request_id: String,
    /// Current state.
    pub status: GenerationRequestStatus,
}

/// Port for the downstream consumer of validated generation configs.
#[async_trait]
pub trait GenerationRequestSink: Send + Sync {
    /// Hands over one config.
    async fn enqueue(&self, config: GenerationConfig) -> AppResult<GenerationTicket>;
}

/// Hands a validated config to a [`GenerationRequestSink`].
#[derive(Clone)]
pub struct GenerationAction {
    sink: Arc<dyn GenerationRequestSink>,
}

impl GenerationAction {
    /// Creates the action.
    #[must_use]
    pub fn new(sink: Arc<dyn GenerationRequestSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl SubmitAction<GenerationConfig> for GenerationAction {
    async fn perform(&self, model: &GenerationConfig) -> SubmissionOutcome {
        let advisories = model.advisories();
        match self.sink.enqueue(model.clone()).await {
            Ok(ticket) => {
                info!(request_id = %ticket.request_id, model = %model.model(), "generation request queued");
                SubmissionOutcome::succeeded(Some(json!({
                    "request_id": ticket.request_id,
                    "status": ticket.status,
                    "advisories": advisories,
                })))
            }
            Err(error) => {
                warn!(%error, "generation request could not be queued");
                SubmissionOutcome::failed(GENERATION_FALLBACK_ERROR)
            }
        }
    }
}
