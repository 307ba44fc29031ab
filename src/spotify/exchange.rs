use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{
    error::AuthError,
    types::{CodeExchangeRequest, Credential, RefreshRequest, TokenPayload},
    utils,
};

pub const CODE_EXCHANGE_PATH: &str = "/api/spotify-token";
pub const REFRESH_PATH: &str = "/api/refresh-token";

/// Obtains credentials from the token endpoint.
///
/// A credential returned by [`TokenExchanger::refresh`] has
/// `refresh_token: None` when the provider did not rotate it; callers merge
/// it with [`Credential::refreshed_with`].
pub trait TokenExchanger: Send + Sync {
    fn exchange_code(&self, code: &str) -> impl Future<Output = Result<Credential, AuthError>> + Send;

    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<Credential, AuthError>> + Send;
}

/// Exchanges codes and refresh tokens through the trusted intermediary,
/// which adds the client secret before talking to Spotify.
#[derive(Debug, Clone)]
pub struct IntermediaryExchanger {
    http: Client,
    base_url: String,
    skew_margin: Duration,
}

impl IntermediaryExchanger {
    pub fn new(base_url: &str, skew_margin: Duration, timeout: Duration) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::TokenExchange {
                status: None,
                body: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            skew_margin,
        })
    }

    #[tracing::instrument(skip(self, body))]
    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Credential, AuthError> {
        let issued_at = utils::now_timestamp();
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(AuthError::TokenExchange {
                status: Some(status.as_u16()),
                body: error_message(&text),
            });
        }

        let payload: TokenPayload =
            serde_json::from_str(&text).map_err(|e| AuthError::TokenExchange {
                status: Some(status.as_u16()),
                body: format!("malformed token payload: {e}"),
            })?;

        Ok(Credential::from_payload(payload, issued_at, self.skew_margin))
    }
}

impl TokenExchanger for IntermediaryExchanger {
    async fn exchange_code(&self, code: &str) -> Result<Credential, AuthError> {
        let body = CodeExchangeRequest {
            code: Some(code.to_string()),
        };
        self.post(CODE_EXCHANGE_PATH, &body).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, AuthError> {
        let body = RefreshRequest {
            refresh_token: Some(refresh_token.to_string()),
        };
        self.post(REFRESH_PATH, &body).await
    }
}

fn transport_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::TokenExchange {
            status: None,
            body: e.to_string(),
        }
    }
}

/// Pulls `error` out of an intermediary error body, falling back to the raw
/// text.
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","details":{}}"#),
            "invalid_grant"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
