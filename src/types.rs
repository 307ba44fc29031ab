use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Persisted authentication record.
///
/// `expires_at` is a Unix timestamp in seconds that already has the skew
/// margin subtracted; once `now >= expires_at` the access token is treated
/// as invalid.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

impl Credential {
    pub fn from_payload(payload: TokenPayload, issued_at: i64, skew_margin: Duration) -> Self {
        let lifetime = i64::try_from(payload.expires_in).unwrap_or(i64::MAX);
        let margin = i64::try_from(skew_margin.as_secs()).unwrap_or(i64::MAX);
        Credential {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token.filter(|t| !t.is_empty()),
            expires_at: issued_at.saturating_add(lifetime).saturating_sub(margin),
        }
    }

    /// Merges a refresh result into this credential. The provider may omit
    /// the refresh token, in which case the current one is kept.
    pub fn refreshed_with(&self, fresh: Credential) -> Credential {
        Credential {
            refresh_token: fresh.refresh_token.or_else(|| self.refresh_token.clone()),
            ..fresh
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token endpoint payload as forwarded by the intermediary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeExchangeRequest {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Query parameters delivered to the redirect target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Tabled)]
pub struct ProfileTableRow {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}
