use crate::types::Credential;

use super::store::{KeyValueStore, StorageError, WriteBatch};

pub const ACCESS_TOKEN_KEY: &str = "spotify_token";
pub const REFRESH_TOKEN_KEY: &str = "spotify_refresh_token";
pub const EXPIRATION_KEY: &str = "spotify_token_expiration";

/// Persists the user's [`Credential`] in a [`KeyValueStore`].
///
/// The three fields are always written together, so a reader never sees an
/// access token paired with another token's expiry.
pub struct CredentialStore<S> {
    store: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(store: S) -> Self {
        CredentialStore { store }
    }

    pub async fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        let batch = WriteBatch::new()
            .set(ACCESS_TOKEN_KEY, credential.access_token.as_str())
            .set(EXPIRATION_KEY, credential.expires_at.to_string());

        let batch = match &credential.refresh_token {
            Some(token) => batch.set(REFRESH_TOKEN_KEY, token.as_str()),
            None => batch.remove(REFRESH_TOKEN_KEY),
        };

        self.store.write(batch).await
    }

    pub async fn load(&self) -> Result<Option<Credential>, StorageError> {
        let Some(access_token) = self.store.get(ACCESS_TOKEN_KEY).await? else {
            return Ok(None);
        };

        let refresh_token = self.store.get(REFRESH_TOKEN_KEY).await?;
        let expires_at = match self.store.get(EXPIRATION_KEY).await? {
            Some(raw) => raw.parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!("stored token expiration is not a timestamp; treating token as expired");
                0
            }),
            None => 0,
        };

        Ok(Some(Credential {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store
            .write(
                WriteBatch::new()
                    .remove(ACCESS_TOKEN_KEY)
                    .remove(REFRESH_TOKEN_KEY)
                    .remove(EXPIRATION_KEY),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::management::MemoryStore;

    fn credential(refresh: Option<&str>) -> Credential {
        Credential {
            access_token: "A".to_string(),
            refresh_token: refresh.map(str::to_string),
            expires_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = CredentialStore::new(MemoryStore::new());
        store.save(&credential(Some("R"))).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(credential(Some("R"))));
    }

    #[tokio::test]
    async fn load_without_access_token_is_absent() {
        let kv = MemoryStore::new();
        kv.write(WriteBatch::new().set(REFRESH_TOKEN_KEY, "R"))
            .await
            .unwrap();
        assert_eq!(CredentialStore::new(kv).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_expiration_loads_as_expired() {
        let kv = MemoryStore::new();
        kv.write(
            WriteBatch::new()
                .set(ACCESS_TOKEN_KEY, "A")
                .set(EXPIRATION_KEY, "tomorrow"),
        )
        .await
        .unwrap();

        let loaded = CredentialStore::new(kv).load().await.unwrap().unwrap();
        assert!(loaded.is_expired(1));
    }

    #[tokio::test]
    async fn clear_removes_every_field() {
        let kv = std::sync::Arc::new(MemoryStore::new());
        let store = CredentialStore::new(kv.clone());
        store.save(&credential(Some("R"))).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(store.load().await.unwrap(), None);
        assert_eq!(kv.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(kv.get(EXPIRATION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_without_refresh_token_drops_stale_one() {
        let store = CredentialStore::new(MemoryStore::new());
        store.save(&credential(Some("R"))).await.unwrap();
        store.save(&credential(None)).await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().refresh_token, None);
    }
}
