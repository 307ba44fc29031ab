use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    config::ClientConfig,
    error::AuthError,
    management::{CredentialStore, KeyValueStore},
    spotify::exchange::TokenExchanger,
    types::Credential,
    utils,
};

/// Called once each time the client gives up on the stored credential.
pub type ReauthHandler = Arc<dyn Fn() + Send + Sync>;

/// Method, JSON body and extra headers for a Web API call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::method(Method::GET)
    }

    pub fn post(body: Value) -> Self {
        Self::method(Method::POST).json(body)
    }

    pub fn put(body: Value) -> Self {
        Self::method(Method::PUT).json(body)
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    pub fn method(method: Method) -> Self {
        RequestOptions {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Successful Web API result.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    /// 204 No Content, or a 2xx with an empty body.
    Empty,
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    /// The JSON body; an empty response reads as `{}`.
    pub fn into_json(self) -> Value {
        match self {
            ApiResponse::Json(value) => value,
            ApiResponse::Empty => Value::Object(Map::new()),
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, AuthError> {
        Ok(serde_json::from_value(self.into_json())?)
    }
}

enum Sent {
    Done(ApiResponse),
    Unauthorized,
}

/// Calls the Spotify Web API with the stored access token.
///
/// Each [`request`](Self::request) runs the same sequence:
///
/// ```text
/// CHECK_EXPIRY ── missing/expired ──> REFRESH ──> SEND
/// CHECK_EXPIRY ── valid ────────────────────────> SEND
/// SEND ── 2xx ──> done (204 -> ApiResponse::Empty)
/// SEND ── 401 (first) ──> REFRESH ──> SEND
/// SEND ── 401 (second) ──> ReauthRequired
/// SEND ── other ──> AuthError::Api
/// REFRESH ── failure ──> ReauthRequired
/// ```
///
/// A refreshed credential is saved before it is used. Reaching
/// `ReauthRequired` clears the store and fires the reauth handler.
///
/// Concurrent requests are not coordinated: two of them may refresh at the
/// same time, and the last save wins.
pub struct AuthenticatedClient<E, S> {
    http: Client,
    api_url: String,
    exchanger: E,
    credentials: CredentialStore<S>,
    on_reauth: Option<ReauthHandler>,
}

impl<E, S> AuthenticatedClient<E, S>
where
    E: TokenExchanger,
    S: KeyValueStore,
{
    pub fn new(
        api_url: &str,
        timeout: Duration,
        exchanger: E,
        credentials: CredentialStore<S>,
    ) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Api {
                status: None,
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            exchanger,
            credentials,
            on_reauth: None,
        })
    }

    pub fn from_config(
        config: &ClientConfig,
        exchanger: E,
        credentials: CredentialStore<S>,
    ) -> Result<Self, AuthError> {
        Self::new(&config.api_url, config.request_timeout, exchanger, credentials)
    }

    pub fn on_reauth(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_reauth = Some(Arc::new(handler));
        self
    }

    pub fn credentials(&self) -> &CredentialStore<S> {
        &self.credentials
    }

    /// Sends `options` to `endpoint`: a path relative to the API base URL, or
    /// an absolute URL on the same origin as the base URL (such as a
    /// pagination `next` link).
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidEndpoint`] for URLs outside the API origin; no
    ///   token is loaded or sent
    /// - [`AuthError::Api`] for non-401 failures and transport errors
    /// - [`AuthError::ReauthRequired`] when no usable credential remains
    /// - [`AuthError::Timeout`] when a call exceeds the configured timeout
    #[tracing::instrument(skip(self, options), fields(method = %options.method))]
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, AuthError> {
        let url = self.url_for(endpoint)?;

        let mut credential = match self.credentials.load().await? {
            Some(c) if !c.is_expired(utils::now_timestamp()) => c,
            stale => {
                tracing::debug!("access token missing or expired; refreshing before send");
                self.refresh(stale.as_ref()).await?
            }
        };

        let mut retry_available = true;
        loop {
            match self.send(&url, &options, &credential.access_token).await? {
                Sent::Done(response) => return Ok(response),
                Sent::Unauthorized if retry_available => {
                    retry_available = false;
                    tracing::info!("access token rejected; refreshing and retrying once");
                    credential = self.refresh(Some(&credential)).await?;
                }
                Sent::Unauthorized => {
                    tracing::warn!("access token rejected again after refresh");
                    return Err(self.force_reauth().await);
                }
            }
        }
    }

    async fn refresh(&self, current: Option<&Credential>) -> Result<Credential, AuthError> {
        let Some(current) = current else {
            return Err(self.force_reauth().await);
        };
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            tracing::warn!("no refresh token stored");
            return Err(self.force_reauth().await);
        };

        match self.exchanger.refresh(refresh_token).await {
            Ok(fresh) => {
                let credential = current.refreshed_with(fresh);
                self.credentials.save(&credential).await?;
                tracing::info!("access token refreshed");
                Ok(credential)
            }
            Err(AuthError::Timeout) => Err(AuthError::Timeout),
            Err(e) => {
                tracing::warn!("token refresh failed: {e}");
                Err(self.force_reauth().await)
            }
        }
    }

    async fn force_reauth(&self) -> AuthError {
        if let Err(e) = self.credentials.clear().await {
            tracing::error!("failed to clear credentials: {e}");
        }
        if let Some(handler) = &self.on_reauth {
            (handler.as_ref())();
        }
        AuthError::ReauthRequired
    }

    async fn send(
        &self,
        url: &Url,
        options: &RequestOptions,
        access_token: &str,
    ) -> Result<Sent, AuthError> {
        let mut request = self
            .http
            .request(options.method.clone(), url.clone())
            .bearer_auth(access_token);

        for (name, value) in &options.headers {
            if !name.eq_ignore_ascii_case("authorization") {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Sent::Unauthorized);
        }

        let text = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(AuthError::Api {
                status: Some(status.as_u16()),
                message: api_error_message(&text, status),
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Sent::Done(ApiResponse::Empty));
        }

        Ok(Sent::Done(ApiResponse::Json(serde_json::from_str(&text)?)))
    }

    /// Resolves `endpoint` against the API base URL. Absolute URLs must share
    /// its scheme, host and port, so the bearer token only ever reaches the
    /// resource API.
    fn url_for(&self, endpoint: &str) -> Result<Url, AuthError> {
        let invalid = |reason: &str| AuthError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: reason.to_string(),
        };

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            let joined = match endpoint.strip_prefix('/') {
                Some(path) => format!("{}/{}", self.api_url, path),
                None => format!("{}/{}", self.api_url, endpoint),
            };
            return Url::parse(&joined).map_err(|e| invalid(&e.to_string()));
        }

        let target = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;
        let base = Url::parse(&self.api_url).map_err(|e| AuthError::InvalidEndpoint {
            url: self.api_url.clone(),
            reason: e.to_string(),
        })?;

        if target.origin() != base.origin() {
            tracing::warn!(endpoint, "refusing to send credentials outside the API origin");
            return Err(invalid("not on the API origin"));
        }
        Ok(target)
    }
}

fn transport_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::Timeout
    } else {
        AuthError::Api {
            status: None,
            message: e.to_string(),
        }
    }
}

/// Spotify reports errors as `{"error": {"status": .., "message": ..}}`.
fn api_error_message(text: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| text.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_reads_spotify_shape() {
        let body = r#"{"error":{"status":404,"message":"Non existing id"}}"#;
        assert_eq!(
            api_error_message(body, StatusCode::NOT_FOUND),
            "Non existing id"
        );
    }

    #[test]
    fn api_error_message_falls_back_to_reason() {
        assert_eq!(
            api_error_message("<html>", StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }

    #[test]
    fn empty_response_reads_as_empty_object() {
        assert_eq!(ApiResponse::Empty.into_json(), serde_json::json!({}));
    }
}
