mod auth;
mod common;
mod forms;
mod generation;

pub use auth::LogoutResponse;
pub use common::HealthResponse;
pub use forms::{FormSubmissionResponse, NotificationResponse};
pub use generation::{
    GenerationDefaultsResponse, GenerationOptionsResponse, OptionResponse, RangeResponse,
    RecommendedStepsResponse,
};
