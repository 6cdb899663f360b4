//! Email/password accounts held by a hosted identity service speaking the
//! Identity Toolkit REST dialect.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Identity, IdentityProvider};
use crate::domain::session::LoginFailure;

pub struct RestIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Map the provider's error code to what the caller can act on. Codes can
/// carry a suffix such as `TOO_MANY_ATTEMPTS_TRY_LATER : ...`.
fn classify(code: &str) -> DomainError {
    let head = code.split(':').next().unwrap_or(code).trim();
    match head {
        "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS"
        | "INVALID_EMAIL" | "USER_DISABLED" => {
            DomainError::Unauthorized(LoginFailure::InvalidCredentials)
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => DomainError::Unauthorized(LoginFailure::TooManyAttempts),
        "EMAIL_EXISTS" => DomainError::Unauthorized(LoginFailure::EmailTaken),
        "WEAK_PASSWORD" => DomainError::invalid("password is too weak"),
        other => DomainError::Upstream(format!("identity provider error: {other}")),
    }
}

impl RestIdentityProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Internal(format!("identity client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn call(&self, action: &str, email: &str, password: &str) -> Result<Identity, DomainError> {
        if self.api_key.is_empty() {
            return Err(DomainError::Upstream(
                "identity provider is not configured".to_string(),
            ));
        }
        let url = format!("{}/accounts:{}", self.base_url, action);
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(|e| DomainError::Upstream(format!("identity provider unreachable: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            let account: AccountResponse = resp.json().await.map_err(|e| {
                DomainError::Upstream(format!("identity provider response: {e}"))
            })?;
            return Ok(Identity {
                uid: account.local_id,
                email: if account.email.is_empty() {
                    email.to_string()
                } else {
                    account.email
                },
            });
        }

        let body = resp.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => {
                log::warn!("identity {} rejected ({}): {}", action, status, envelope.error.message);
                Err(classify(&envelope.error.message))
            }
            Err(_) => Err(DomainError::Upstream(format!(
                "identity provider returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, DomainError> {
        self.call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, DomainError> {
        self.call("signUp", email, password).await
    }
}
