use axum::Router;
use axum::routing::{get, post};
use lumina_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::handlers;
use crate::state::AppState;

mod cors;

pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<MemoryStore>,
) -> Result<Router, AppError> {
    let auth_routes = Router::new()
        .route("/auth/signup", post(handlers::auth::signup_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .route("/auth/logout", post(handlers::auth::logout_handler));

    let generation_routes = Router::new()
        .route(
            "/generation/defaults",
            get(handlers::generation::generation_defaults_handler),
        )
        .route(
            "/generation/options",
            get(handlers::generation::generation_options_handler),
        )
        .route(
            "/generation/config",
            post(handlers::generation::generation_config_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(auth_routes)
        .merge(generation_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}
