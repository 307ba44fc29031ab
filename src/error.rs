//! Error types shared by the authentication pipeline.

use crate::management::StorageError;

/// Errors produced while signing in, exchanging tokens or calling the
/// Spotify Web API.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The `state` returned by the provider was missing, did not match, or
    /// no state had been stored for this login.
    #[error("CSRF state validation failed")]
    CsrfValidation,

    /// The user (or the provider) denied the authorization request.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The callback carried neither a code nor an error.
    #[error("authorization code missing from callback")]
    MissingCode,

    /// Configured scopes lack a capability the application depends on.
    #[error("required scopes missing: {}", .0.join(" "))]
    MissingScopes(Vec<String>),

    /// State nonces shorter than the minimum are never issued.
    #[error("state length {0} is below the minimum of {min}", min = crate::management::MIN_STATE_LENGTH)]
    InvalidStateLength(usize),

    /// The token endpoint rejected a code or refresh token (`status` is
    /// `None` when no HTTP response was received).
    #[error("token exchange failed ({}): {body}", status_label(.status))]
    TokenExchange { status: Option<u16>, body: String },

    #[error("invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// Non-401 failure from the resource API.
    #[error("Spotify API error ({}): {message}", status_label(.status))]
    Api { status: Option<u16>, message: String },

    /// The retry budget is exhausted or the credential cannot be refreshed;
    /// stored credentials have been cleared and the user must sign in again.
    #[error("re-authorization required")]
    ReauthRequired,

    /// A network call did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Playlists are never exported without tracks.
    #[error("track list is empty")]
    EmptyPlaylist,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no response".to_string(), |s| s.to_string())
}
