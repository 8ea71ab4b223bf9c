use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

use crate::traits::{IdentityError, IdentityProvider, Session};

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    /// Present for anonymous sign-up, absent for custom-token sign-in
    local_id: Option<String>,
    refresh_token: Option<String>,
    /// Token lifetime in seconds, sent as a string
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    user_id: Option<String>,
    sub: Option<String>,
}

/// Firebase Authentication through the Identity Toolkit REST API
///
/// Signs in with `custom_token` when one is configured, otherwise creates an
/// anonymous account.
pub struct FirebaseIdentity {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    custom_token: Option<String>,
}

impl FirebaseIdentity {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        custom_token: Option<String>,
    ) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| IdentityError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            custom_token,
        })
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> Result<SignInResponse, IdentityError> {
        let url = format!("{}/accounts:{}", self.base_url, method);
        let response = self
            .http_client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IdentityError::SignInFailed(format!(
                "{} - {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IdentityError::SignInFailed(format!("Invalid sign-in response: {}", e)))
    }
}

/// Read the user id from an id token's payload. The signature is not checked;
/// the token is only forwarded to Firestore, which verifies it.
fn user_id_from_token(id_token: &str) -> Option<String> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: TokenClaims = serde_json::from_slice(&bytes).ok()?;
    claims.user_id.or(claims.sub)
}

/// Deadline for a token that lives `expires_in` seconds from now.
pub(crate) fn expires_at(expires_in: Option<&str>) -> Option<Instant> {
    let seconds = expires_in?.trim().parse::<u64>().ok()?;
    Some(Instant::now() + Duration::from_secs(seconds))
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self) -> Result<Session, IdentityError> {
        let (response, anonymous) = match &self.custom_token {
            Some(token) => {
                let body = serde_json::json!({ "token": token, "returnSecureToken": true });
                (self.post("signInWithCustomToken", body).await?, false)
            }
            None => {
                let body = serde_json::json!({ "returnSecureToken": true });
                (self.post("signUp", body).await?, true)
            }
        };

        let user_id = response
            .local_id
            .or_else(|| user_id_from_token(&response.id_token))
            .ok_or_else(|| {
                IdentityError::SignInFailed("Sign-in response did not identify a user".to_string())
            })?;

        let expires_at = expires_at(response.expires_in.as_deref());

        tracing::info!(user_id = %user_id, anonymous, "Signed in to Firebase");

        Ok(Session {
            user_id,
            id_token: Some(response.id_token),
            refresh_token: response.refresh_token,
            expires_at,
            anonymous,
        })
    }

    fn provider_name(&self) -> &'static str {
        "firebase"
    }
}
