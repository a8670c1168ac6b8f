//! Process-local auth provider for development and tests. Accounts and
//! sessions live only as long as the process.

use std::collections::HashMap;

use async_trait::async_trait;
use lumina_application::{AuthProvider, AuthProviderResponse, SignInRequest, SignUpRequest};
use lumina_core::AppResult;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::argon2_password_hasher::Argon2PasswordHasher;

#[derive(Debug, Clone)]
struct Account {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
}

impl Account {
    fn user_json(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "user_metadata": { "full_name": self.full_name },
        })
    }
}

/// In-memory implementation of [`AuthProvider`] with provider-style error
/// messages.
#[derive(Default)]
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, Uuid>>,
    hasher: Argon2PasswordHasher,
}

impl InMemoryAuthProvider {
    /// Creates a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    async fn stored_password_hash(&self, email: &str) -> Option<String> {
        self.accounts
            .read()
            .await
            .get(email)
            .map(|account| account.password_hash.clone())
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(&self, request: SignUpRequest) -> AppResult<AuthProviderResponse> {
        let email = request.email.to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Ok(AuthProviderResponse::with_error("User already registered"));
        }

        let account = Account {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: self.hasher.hash_password(&request.password)?,
            full_name: request.options.data.full_name,
        };
        let user = account.user_json();
        accounts.insert(email, account);
        info!(user_id = %user["id"], "in-memory account created");

        Ok(AuthProviderResponse::with_data(
            json!({ "user": user, "session": null }),
        ))
    }

    async fn sign_in_with_password(
        &self,
        request: SignInRequest,
    ) -> AppResult<AuthProviderResponse> {
        let accounts = self.accounts.read().await;
        let account = match accounts.get(&request.email.to_lowercase()) {
            Some(account)
                if self
                    .hasher
                    .verify_password(&request.password, &account.password_hash)? =>
            {
                account
            }
            _ => {
                return Ok(AuthProviderResponse::with_error(
                    "Invalid login credentials",
                ));
            }
        };

        let access_token = Uuid::new_v4().simple().to_string();
        self.sessions
            .write()
            .await
            .insert(access_token.clone(), account.id);

        Ok(AuthProviderResponse::with_data(json!({
            "user": account.user_json(),
            "session": { "access_token": access_token, "token_type": "bearer" },
        })))
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<AuthProviderResponse> {
        if self.sessions.write().await.remove(access_token).is_none() {
            return Ok(AuthProviderResponse::with_error("Auth session missing!"));
        }

        Ok(AuthProviderResponse::with_data(json!({})))
    }
}
