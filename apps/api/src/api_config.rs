use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use lumina_core::AppError;
use lumina_infrastructure::DEFAULT_GENERATION_QUEUE_CAPACITY;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Which auth backend the API talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProviderConfig {
    Memory,
    Supabase { url: Url, anon_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub cookie_secure: bool,
    pub auth_provider: AuthProviderConfig,
    pub generation_queue_capacity: usize,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };
        let cookie_secure = lookup("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let generation_queue_capacity = match lookup("GENERATION_QUEUE_CAPACITY") {
            Some(value) => value.parse::<usize>().map_err(|error| {
                AppError::Validation(format!("invalid GENERATION_QUEUE_CAPACITY: {error}"))
            })?,
            None => DEFAULT_GENERATION_QUEUE_CAPACITY,
        };
        if generation_queue_capacity == 0 {
            return Err(AppError::Validation(
                "GENERATION_QUEUE_CAPACITY must be at least 1".to_owned(),
            ));
        }

        let auth_provider = match lookup("AUTH_PROVIDER")
            .unwrap_or_else(|| "memory".to_owned())
            .as_str()
        {
            "memory" => AuthProviderConfig::Memory,
            "supabase" => {
                let raw_url = required_non_empty(&lookup, "SUPABASE_URL")?;
                let url = Url::parse(&raw_url).map_err(|error| {
                    AppError::Validation(format!("invalid SUPABASE_URL: {error}"))
                })?;
                AuthProviderConfig::Supabase {
                    url,
                    anon_key: required_non_empty(&lookup, "SUPABASE_ANON_KEY")?,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "AUTH_PROVIDER must be either 'memory' or 'supabase', got '{other}'"
                )));
            }
        };

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            cookie_secure,
            auth_provider,
            generation_queue_capacity,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
