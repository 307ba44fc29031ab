use crate::{error::AuthError, utils};

use super::store::{KeyValueStore, WriteBatch};

pub const AUTH_STATE_KEY: &str = "spotify_auth_state";
pub const MIN_STATE_LENGTH: usize = 16;

/// Issues and checks the one-time CSRF nonce of an authorization round-trip.
///
/// The nonce lives in session-scoped storage and is removed the first time
/// it is read back, whatever the outcome of the comparison.
pub struct StateGuard<S> {
    store: S,
}

impl<S: KeyValueStore> StateGuard<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Generates a new alphanumeric state of `length` characters and stores
    /// it, replacing any state left by an earlier attempt.
    pub async fn generate(&self, length: usize) -> Result<String, AuthError> {
        if length < MIN_STATE_LENGTH {
            return Err(AuthError::InvalidStateLength(length));
        }

        let state = utils::generate_random_string(length);
        self.store
            .write(WriteBatch::new().set(AUTH_STATE_KEY, state.as_str()))
            .await?;
        Ok(state)
    }

    /// Returns `true` only if a state was stored and it equals `received`.
    /// The stored state is taken atomically, so concurrent calls with the
    /// same value succeed at most once. Storage failures count as a mismatch.
    pub async fn validate(&self, received: &str) -> bool {
        match self.store.take(AUTH_STATE_KEY).await {
            Ok(Some(expected)) => !expected.is_empty() && expected == received,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("failed to take auth state: {e}");
                false
            }
        }
    }
}
