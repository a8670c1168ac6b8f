//! Hosted auth adapter speaking the Supabase GoTrue REST API.

use async_trait::async_trait;
use lumina_application::{AuthProvider, AuthProviderResponse, SignInRequest, SignUpRequest};
use lumina_core::{AppError, AppResult};
use serde_json::{Value, json};
use url::Url;

/// Auth provider backed by a Supabase project.
#[derive(Clone)]
pub struct SupabaseAuthProvider {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl SupabaseAuthProvider {
    /// Creates a provider for the project at `base_url` using its anon key.
    #[must_use]
    pub fn new(http_client: reqwest::Client, mut base_url: Url, api_key: impl Into<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            http_client,
            base_url,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("invalid auth endpoint '{path}': {error}"))
        })
    }

    async fn post(
        &self,
        url: Url,
        bearer_token: &str,
        body: Option<Value>,
    ) -> AppResult<(reqwest::StatusCode, Value)> {
        let mut request = self
            .http_client
            .post(url)
            .header("apikey", self.api_key.as_str())
            .bearer_auth(bearer_token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|error| {
            AppError::Internal(format!("auth provider request failed: {error}"))
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|error| {
            AppError::Internal(format!("failed to read auth provider response: {error}"))
        })?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|error| {
                AppError::Internal(format!("auth provider returned invalid JSON: {error}"))
            })?
        };

        Ok((status, body))
    }
}

/// Provider error text, looked up under the keys GoTrue uses across versions.
fn error_message(body: &Value) -> String {
    ["msg", "message", "error_description", "error"]
        .into_iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .unwrap_or_default()
        .to_owned()
}

/// Reshapes a GoTrue user or session body into `{ user, session }`.
fn session_payload(body: Value) -> Value {
    if body.get("access_token").is_some() {
        let user = body.get("user").cloned().unwrap_or(Value::Null);
        json!({ "user": user, "session": body })
    } else {
        json!({ "user": body, "session": null })
    }
}

fn into_response(status: reqwest::StatusCode, body: Value) -> AuthProviderResponse {
    if !status.is_success() {
        return AuthProviderResponse::with_error(error_message(&body));
    }

    if body.is_null() {
        AuthProviderResponse::default()
    } else {
        AuthProviderResponse::with_data(session_payload(body))
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthProviderResponse> {
        let url = self.endpoint("auth/v1/signup")?;
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": request.options.data,
        });

        let (status, body) = self.post(url, &self.api_key, Some(body)).await?;
        Ok(into_response(status, body))
    }

    async fn sign_in_with_password(
        &self,
        request: SignInRequest,
    ) -> AppResult<AuthProviderResponse> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");
        let body = json!({
            "email": request.email,
            "password": request.password,
        });

        let (status, body) = self.post(url, &self.api_key, Some(body)).await?;
        Ok(into_response(status, body))
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<AuthProviderResponse> {
        let url = self.endpoint("auth/v1/logout")?;
        let (status, body) = self.post(url, access_token, None).await?;

        if status.is_success() {
            return Ok(AuthProviderResponse::with_data(json!({})));
        }

        Ok(AuthProviderResponse::with_error(error_message(&body)))
    }
}

#[cfg(test)]
mod tests {
    use lumina_application::{SignInRequest, SignUpMetadata, SignUpOptions, SignUpRequest};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{AuthProvider, SupabaseAuthProvider};

    fn provider(server: &MockServer) -> SupabaseAuthProvider {
        let base_url = match Url::parse(&server.uri()) {
            Ok(url) => url,
            Err(error) => panic!("mock server uri should parse: {error}"),
        };
        SupabaseAuthProvider::new(reqwest::Client::new(), base_url, "anon-key")
    }

    fn signup_request() -> SignUpRequest {
        SignUpRequest {
            email: "ann@example.com".to_owned(),
            password: "Abcdef1!".to_owned(),
            options: SignUpOptions {
                data: SignUpMetadata {
                    full_name: "Ann Lee".to_owned(),
                },
            },
        }
    }

    #[tokio::test]
    async fn sign_up_posts_metadata_and_wraps_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({
                "email": "ann@example.com",
                "password": "Abcdef1!",
                "data": { "full_name": "Ann Lee" },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "email": "ann@example.com",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).sign_up(signup_request()).await;

        let Ok(response) = response else {
            panic!("sign up should reach the mock server");
        };
        assert_eq!(response.error, None);
        assert_eq!(
            response.data,
            Some(json!({
                "user": { "id": "user-1", "email": "ann@example.com" },
                "session": null,
            }))
        );
    }

    #[tokio::test]
    async fn provider_error_body_becomes_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": 422,
                "msg": "User already registered",
            })))
            .mount(&server)
            .await;

        let response = provider(&server).sign_up(signup_request()).await;

        let Ok(response) = response else {
            panic!("provider errors are not transport errors");
        };
        assert_eq!(response.data, None);
        assert_eq!(
            response.error.map(|error| error.message).as_deref(),
            Some("User already registered")
        );
    }

    #[tokio::test]
    async fn sign_in_uses_password_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "token-1",
                "token_type": "bearer",
                "user": { "id": "user-1" },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server)
            .sign_in_with_password(SignInRequest {
                email: "ann@example.com".to_owned(),
                password: "Abcdef1!".to_owned(),
            })
            .await;

        let data = response.ok().and_then(|response| response.data);
        assert_eq!(
            data.as_ref()
                .and_then(|data| data["session"]["access_token"].as_str()),
            Some("token-1")
        );
        assert_eq!(
            data.as_ref().and_then(|data| data["user"]["id"].as_str()),
            Some("user-1")
        );
    }

    #[tokio::test]
    async fn sign_out_sends_session_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).sign_out("token-1").await;

        assert!(response.is_ok_and(|response| response.error.is_none()));
    }

    #[tokio::test]
    async fn malformed_body_is_an_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let response = provider(&server).sign_up(signup_request()).await;

        assert!(response.is_err());
    }

    #[test]
    fn base_path_is_kept_when_joining_endpoints() {
        let base_url = match Url::parse("https://project.example.co/proxy") {
            Ok(url) => url,
            Err(error) => panic!("base url should parse: {error}"),
        };
        let provider = SupabaseAuthProvider::new(reqwest::Client::new(), base_url, "anon-key");

        assert_eq!(
            provider.endpoint("auth/v1/signup").ok().map(String::from),
            Some("https://project.example.co/proxy/auth/v1/signup".to_owned())
        );
    }
}
