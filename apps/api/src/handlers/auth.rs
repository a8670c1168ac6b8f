use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use lumina_application::{LoginAction, SignUpAction, SubmissionPolicy, SubmitReport};
use lumina_core::{AppError, SessionIdentity};
use lumina_domain::{FormDraft, LoginCredentials, SignUpCredentials};
use serde_json::Value;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::{FormSubmissionResponse, LogoutResponse};
use crate::error::ApiResult;
use crate::handlers::forms::submit_form;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "user_identity";

const LOGOUT_DESTINATION: &str = "/login";

pub async fn signup_handler(
    State(state): State<AppState>,
    Json(draft): Json<FormDraft>,
) -> ApiResult<(StatusCode, Json<FormSubmissionResponse>)> {
    let submission = submit_form::<SignUpCredentials>(
        &state,
        draft,
        Arc::new(SignUpAction::new(state.auth_action_service.clone())),
        SubmissionPolicy::sign_up(),
    )
    .await?;

    Ok((submission.status_code(), Json(submission.response)))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(draft): Json<FormDraft>,
) -> ApiResult<(StatusCode, Json<FormSubmissionResponse>)> {
    let mut submission = submit_form::<LoginCredentials>(
        &state,
        draft,
        Arc::new(LoginAction::new(state.auth_action_service.clone())),
        SubmissionPolicy::login(),
    )
    .await?;

    if let SubmitReport::Succeeded { model, outcome } = &submission.report {
        match outcome.data().and_then(|data| identity_from_sign_in(model, data)) {
            Some(identity) => {
                session.cycle_id().await.map_err(|error| {
                    AppError::Internal(format!("failed to cycle session id: {error}"))
                })?;

                session
                    .insert(SESSION_USER_KEY, &identity)
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!("failed to persist session identity: {error}"))
                    })?;
                info!(subject = identity.subject(), "session started");
            }
            None => warn!("sign-in succeeded without a session token"),
        }
    }

    // The access token lives in the server-side session only.
    if let Some(Value::Object(data)) = submission.response.data.as_mut() {
        data.remove("session");
    }

    Ok((submission.status_code(), Json(submission.response)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<LogoutResponse>> {
    let identity = session
        .get::<SessionIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let outcome = state
        .auth_action_service
        .sign_out(identity.access_token())
        .await;

    session
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear session: {error}")))?;
    info!(subject = identity.subject(), "session ended");

    Ok(Json(LogoutResponse {
        success: outcome.success(),
        error: outcome.error().map(ToOwned::to_owned),
        navigate_to: LOGOUT_DESTINATION.to_owned(),
    }))
}

fn identity_from_sign_in(credentials: &LoginCredentials, data: &Value) -> Option<SessionIdentity> {
    let access_token = data.pointer("/session/access_token")?.as_str()?;
    let subject = data.pointer("/user/id")?.as_str()?;
    let full_name = data
        .pointer("/user/user_metadata/full_name")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);

    Some(SessionIdentity::new(
        subject,
        credentials.email().as_str(),
        full_name,
        access_token,
    ))
}

#[cfg(test)]
mod tests;
