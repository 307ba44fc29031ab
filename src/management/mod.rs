mod credentials;
mod state;
mod store;

pub use credentials::ACCESS_TOKEN_KEY;
pub use credentials::CredentialStore;
pub use credentials::EXPIRATION_KEY;
pub use credentials::REFRESH_TOKEN_KEY;
pub use state::AUTH_STATE_KEY;
pub use state::MIN_STATE_LENGTH;
pub use state::StateGuard;
pub use store::FileStore;
pub use store::KeyValueStore;
pub use store::MemoryStore;
pub use store::StorageError;
pub use store::WriteBatch;
