//! # API Module
//!
//! HTTP endpoints served by tastemixer's local axum server.
//!
//! ## Endpoints
//!
//! ### Login
//!
//! - [`callback`] - Redirect target for Spotify's authorization server.
//!   Validates the CSRF state, exchanges the code and stores the credential.
//!
//! ### Token intermediary
//!
//! These endpoints hold the client secret; nothing else in the crate does.
//!
//! - [`exchange_code`] - `POST /api/spotify-token`, body `{ "code": "..." }`
//! - [`refresh_token`] - `POST /api/refresh-token`, body `{ "refreshToken": "..." }`
//!
//! Both return Spotify's token payload unchanged on success, or
//! `{ "error": "..." }` with a 4xx/5xx status.
//!
//! ### Monitoring
//!
//! - [`health`] - Status and version.

mod callback;
mod health;
mod token;

pub use callback::LoginContext;
pub use callback::callback;
pub use health::ServerRoles;
pub use health::health;
pub use token::exchange_code;
pub use token::refresh_token;
