use std::sync::Arc;

use lumina_application::{AuthActionService, AuthProvider, FormEventSink, GenerationRequestSink};
use lumina_infrastructure::{
    InMemoryAuthProvider, InMemoryGenerationQueue, SupabaseAuthProvider, TracingFormEventSink,
};
use tracing::info;

use crate::api_config::{ApiConfig, AuthProviderConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_action_service: AuthActionService,
    pub generation_sink: Arc<dyn GenerationRequestSink>,
    pub form_events: Arc<dyn FormEventSink>,
}

impl AppState {
    /// Wires the adapters selected by the config. Built once at startup.
    pub fn from_config(config: &ApiConfig) -> Self {
        let auth_provider: Arc<dyn AuthProvider> = match &config.auth_provider {
            AuthProviderConfig::Memory => {
                info!("using in-memory auth provider");
                Arc::new(InMemoryAuthProvider::new())
            }
            AuthProviderConfig::Supabase { url, anon_key } => {
                info!(%url, "using supabase auth provider");
                Arc::new(SupabaseAuthProvider::new(
                    reqwest::Client::new(),
                    url.clone(),
                    anon_key.clone(),
                ))
            }
        };

        Self::new(
            auth_provider,
            Arc::new(InMemoryGenerationQueue::with_capacity(
                config.generation_queue_capacity,
            )),
            Arc::new(TracingFormEventSink::new()),
        )
    }

    pub fn new(
        auth_provider: Arc<dyn AuthProvider>,
        generation_sink: Arc<dyn GenerationRequestSink>,
        form_events: Arc<dyn FormEventSink>,
    ) -> Self {
        Self {
            auth_action_service: AuthActionService::new(auth_provider),
            generation_sink,
            form_events,
        }
    }
}
