//! Application services and ports.

#![forbid(unsafe_code)]

mod auth_action_service;
mod auth_provider;
mod form_controller;
mod form_event;
mod form_status;
mod submission_pipeline;
mod submit_action;

pub use auth_action_service::{
    AuthActionService, LOGIN_FALLBACK_ERROR, LOGOUT_FALLBACK_ERROR, SIGN_UP_FALLBACK_ERROR,
};
pub use auth_provider::{
    AuthProvider, AuthProviderError, AuthProviderResponse, SignInRequest, SignUpMetadata,
    SignUpOptions, SignUpRequest,
};
pub use form_controller::{FormController, FormSnapshot};
pub use form_event::{FormEvent, FormEventSink, NotificationLevel, RecordingEventSink};
pub use form_status::{FormStatus, FormTransition};
pub use submission_pipeline::{SubmissionPipeline, SubmissionPolicy, SubmitReport};
pub use submit_action::{
    GENERATION_FALLBACK_ERROR, GenerationAction, GenerationRequestSink, GenerationRequestStatus,
    GenerationTicket, LoginAction, SignUpAction, SubmitAction,
};
