//! Firebase id token lifecycle
//!
//! Id tokens expire after an hour. When the session carries a refresh token, the
//! store exchanges it through the Secure Token API shortly before expiry, or after
//! Firestore rejects the current token with 401.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;

use super::{auth::expires_at, error_from_response, transport_error};
use crate::traits::{StoreError, StoreResult};

const REQUEST_TIMEOUT_SECS: u64 = 15;
/// Refresh this long before the token's deadline.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

/// Client for `POST {base}/token`, exchanging a refresh token for a new id token.
pub struct TokenRefresher {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TokenRefresher {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> StoreResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn exchange(&self, refresh_token: &str) -> StoreResult<RefreshResponse> {
        let response = self
            .http_client
            .post(format!("{}/token", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Transport(format!("Invalid token refresh response: {}", e)))
    }
}

struct TokenState {
    id_token: String,
    refresh_token: Option<String>,
    expires_at: Option<Instant>,
}

/// Bearer token shared by all requests of one store.
pub(crate) struct AuthToken {
    state: RwLock<TokenState>,
    refresher: Option<TokenRefresher>,
}

impl AuthToken {
    pub fn fixed(id_token: String) -> Self {
        Self {
            state: RwLock::new(TokenState {
                id_token,
                refresh_token: None,
                expires_at: None,
            }),
            refresher: None,
        }
    }

    pub fn with_refresher(
        self,
        refresher: TokenRefresher,
        refresh_token: String,
        expires_at: Option<Instant>,
    ) -> Self {
        let mut state = self.state.into_inner();
        state.refresh_token = Some(refresh_token);
        state.expires_at = expires_at;
        Self {
            state: RwLock::new(state),
            refresher: Some(refresher),
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresher.is_some()
    }

    /// The token to send now, refreshed first when it is about to expire.
    pub async fn current(&self) -> StoreResult<String> {
        let stale = {
            let state = self.state.read().await;
            let expiring = state
                .expires_at
                .is_some_and(|at| Instant::now() + REFRESH_MARGIN >= at);
            if !self.can_refresh() || !expiring {
                return Ok(state.id_token.clone());
            }
            state.id_token.clone()
        };
        self.refresh(&stale).await
    }

    /// Replace `stale` with a fresh token. Concurrent callers holding the same
    /// stale token share one exchange.
    pub async fn refresh(&self, stale: &str) -> StoreResult<String> {
        let mut state = self.state.write().await;
        if state.id_token != stale {
            return Ok(state.id_token.clone());
        }

        let (Some(refresher), Some(refresh_token)) =
            (self.refresher.as_ref(), state.refresh_token.as_deref())
        else {
            return Ok(state.id_token.clone());
        };

        let refreshed = refresher.exchange(refresh_token).await?;
        tracing::info!("Refreshed Firebase id token");

        state.id_token = refreshed.id_token;
        if let Some(refresh_token) = refreshed.refresh_token {
            state.refresh_token = Some(refresh_token);
        }
        state.expires_at = expires_at(refreshed.expires_in.as_deref());
        Ok(state.id_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    async fn refresh_mock(server: &mut mockito::ServerGuard, new_token: &str) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .match_query(Matcher::UrlEncoded("key".into(), "api-key".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .expect(1)
            .with_body(
                serde_json::json!({
                    "id_token": new_token,
                    "refresh_token": "refresh-2",
                    "expires_in": "3600",
                    "token_type": "Bearer"
                })
                .to_string(),
            )
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let token = AuthToken::fixed("token-1".to_string()).with_refresher(
            TokenRefresher::new("http://127.0.0.1:9", "api-key").unwrap(),
            "refresh-1".to_string(),
            Some(Instant::now() + Duration::from_secs(3600)),
        );
        assert_eq!(token.current().await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn test_expiring_token_is_exchanged_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = refresh_mock(&mut server, "token-2").await;

        let token = AuthToken::fixed("token-1".to_string()).with_refresher(
            TokenRefresher::new(server.url(), "api-key").unwrap(),
            "refresh-1".to_string(),
            Some(Instant::now()),
        );

        assert_eq!(token.current().await.unwrap(), "token-2");
        // The new token is valid for an hour.
        assert_eq!(token.current().await.unwrap(), "token-2");
        // A caller still holding the old token gets the new one without another exchange.
        assert_eq!(token.refresh("token-1").await.unwrap(), "token-2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fixed_token_never_refreshes() {
        let token = AuthToken::fixed("token-1".to_string());
        assert!(!token.can_refresh());
        assert_eq!(token.refresh("token-1").await.unwrap(), "token-1");
    }

    #[tokio::test]
    async fn test_rejected_refresh_is_permanent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"message":"TOKEN_EXPIRED"}}"#)
            .create_async()
            .await;

        let token = AuthToken::fixed("token-1".to_string()).with_refresher(
            TokenRefresher::new(server.url(), "api-key").unwrap(),
            "refresh-1".to_string(),
            Some(Instant::now()),
        );
        let err = token.current().await.unwrap_err();
        assert!(matches!(err, StoreError::Permanent(ref m) if m.contains("TOKEN_EXPIRED")));
    }
}
