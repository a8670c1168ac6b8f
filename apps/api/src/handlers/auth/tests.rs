use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use lumina_core::{AppError, SessionIdentity};
use lumina_domain::FormDraft;
use lumina_infrastructure::{InMemoryAuthProvider, InMemoryGenerationQueue};
use tower_sessions::{MemoryStore, Session};

use super::{SESSION_USER_KEY, login_handler, logout_handler, signup_handler};
use crate::handlers::test_support::recording_state;
use crate::state::AppState;

fn state_with(provider: Arc<InMemoryAuthProvider>) -> AppState {
    recording_state(provider, Arc::new(InMemoryGenerationQueue::new())).0
}

fn new_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

fn signup_draft() -> FormDraft {
    FormDraft::new()
        .with("full_name", "Ann Lee")
        .with("email", "ann@example.com")
        .with("password", "Abcdef1!")
        .with("confirmPassword", "Abcdef1!")
}

fn login_draft() -> FormDraft {
    FormDraft::new()
        .with("email", "ann@example.com")
        .with("password", "Abcdef1!")
}

#[tokio::test]
async fn signup_navigates_to_login() {
    let state = state_with(Arc::new(InMemoryAuthProvider::new()));

    let result = signup_handler(State(state), Json(signup_draft())).await;

    let Ok((status, Json(response))) = result else {
        panic!("signup should respond");
    };
    assert_eq!(status, StatusCode::OK);
    assert!(response.success);
    assert_eq!(response.status, "success");
    assert_eq!(response.navigate_to.as_deref(), Some("/login"));
    assert_eq!(response.notifications.len(), 1);
    assert_eq!(response.notifications[0].level, "success");
}

#[tokio::test]
async fn signup_with_mismatched_passwords_reports_confirm_field() {
    let state = state_with(Arc::new(InMemoryAuthProvider::new()));
    let draft = signup_draft().with("confirmPassword", "Abcdef1?");

    let result = signup_handler(State(state), Json(draft)).await;

    let Ok((status, Json(response))) = result else {
        panic!("signup should respond");
    };
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!response.success);
    assert_eq!(
        response.field_errors.get("confirmPassword").map(String::as_str),
        Some("Passwords do not match!")
    );
    assert_eq!(response.navigate_to, None);
}

#[tokio::test]
async fn login_stores_identity_and_hides_the_token() {
    let provider = Arc::new(InMemoryAuthProvider::new());
    let state = state_with(provider.clone());
    let session = new_session();
    let signed_up = signup_handler(State(state.clone()), Json(signup_draft())).await;
    assert!(signed_up.is_ok());

    let result = login_handler(State(state), session.clone(), Json(login_draft())).await;

    let Ok((status, Json(response))) = result else {
        panic!("login should respond");
    };
    assert_eq!(status, StatusCode::OK);
    assert!(response.success);
    assert_eq!(response.navigate_to.as_deref(), Some("/dashboard"));
    assert!(
        response
            .data
            .as_ref()
            .is_some_and(|data| data.get("session").is_none() && data.get("user").is_some())
    );

    let identity = session.get::<SessionIdentity>(SESSION_USER_KEY).await;
    let Ok(Some(identity)) = identity else {
        panic!("identity should be stored in the session");
    };
    assert_eq!(identity.email(), "ann@example.com");
    assert_eq!(identity.full_name(), Some("Ann Lee"));
    assert_eq!(provider.session_count().await, 1);
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let state = state_with(Arc::new(InMemoryAuthProvider::new()));
    let session = new_session();

    let result = login_handler(State(state), session.clone(), Json(login_draft())).await;

    let Ok((status, Json(response))) = result else {
        panic!("login should respond");
    };
    assert_eq!(status, StatusCode::OK);
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Invalid login credentials"));
    assert!(matches!(
        session.get::<SessionIdentity>(SESSION_USER_KEY).await,
        Ok(None)
    ));
}

#[tokio::test]
async fn logout_ends_provider_session_and_clears_identity() {
    let provider = Arc::new(InMemoryAuthProvider::new());
    let state = state_with(provider.clone());
    let session = new_session();
    assert!(
        signup_handler(State(state.clone()), Json(signup_draft()))
            .await
            .is_ok()
    );
    assert!(
        login_handler(State(state.clone()), session.clone(), Json(login_draft()))
            .await
            .is_ok()
    );

    let result = logout_handler(State(state), session.clone()).await;

    let Ok(Json(response)) = result else {
        panic!("logout should respond");
    };
    assert!(response.success);
    assert_eq!(response.error, None);
    assert_eq!(response.navigate_to, "/login");
    assert_eq!(provider.session_count().await, 0);
    assert!(matches!(
        session.get::<SessionIdentity>(SESSION_USER_KEY).await,
        Ok(None)
    ));
}

#[tokio::test]
async fn logout_without_identity_is_unauthorized() {
    let state = state_with(Arc::new(InMemoryAuthProvider::new()));

    let result = logout_handler(State(state), new_session()).await;

    assert!(matches!(
        result,
        Err(crate::error::ApiError(AppError::Unauthorized(_)))
    ));
}
