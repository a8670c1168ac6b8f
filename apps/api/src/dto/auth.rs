use serde::Serialize;
use ts_rs::TS;

/// Result of a log-out request.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/logout-response.ts"
)]
pub struct LogoutResponse {
    pub success: bool,
    pub error: Option<String>,
    pub navigate_to: String,
}
