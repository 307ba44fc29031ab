use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::{config::IntermediaryConfig, utils};

/// Failure reported by the provider token endpoint, or `status: None` when
/// it could not be reached.
#[derive(Debug, Clone, thiserror::Error)]
#[error("token endpoint failure (status {status:?})")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub body: Value,
}

/// Confidential-client access to the Spotify token endpoint.
///
/// Lives only inside the intermediary: it is the one component that holds
/// the client secret. Payloads are returned exactly as Spotify sent them.
pub struct ProviderTokenClient {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
}

impl ProviderTokenClient {
    pub fn new(config: &IntermediaryConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        })
    }

    pub async fn exchange_code(&self, code: &str) -> Result<Value, ProviderError> {
        self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Value, ProviderError> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let authorization =
            utils::basic_auth_header(&self.client_id, self.client_secret.expose_secret());

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("token endpoint unreachable: {e}");
                ProviderError {
                    status: None,
                    body: Value::String(e.to_string()),
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "token endpoint rejected request");
            return Err(ProviderError {
                status: Some(status.as_u16()),
                body,
            });
        }

        Ok(body)
    }
}
