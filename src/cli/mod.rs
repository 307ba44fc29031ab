//! # CLI Module
//!
//! User-facing commands of tastemixer. Each command loads its
//! configuration, delegates to the [`crate::spotify`] layer and reports the
//! outcome with the crate's output macros.
//!
//! ## Commands
//!
//! ### Session
//!
//! - [`login`] - Authorization Code flow in the browser
//! - [`logout`] - Remove the stored credential
//! - [`status`] - Show whether a credential is stored and when it expires
//!
//! ### Web API
//!
//! - [`me`] - Show the signed-in user's profile
//! - [`export`] - Create a private playlist from track URIs
//!
//! ### Intermediary
//!
//! - [`serve`] - Run the token intermediary that holds the client secret
//!
//! ## Usage
//!
//! ```bash
//! tastemixer login
//! tastemixer me
//! tastemixer export --track spotify:track:4uLU6hMCjMI75M1A2tKUQC
//! tastemixer serve            # on the host that owns the client secret
//! ```

mod auth;
mod playlist;
mod profile;
mod serve;

pub use auth::login;
pub use auth::logout;
pub use auth::status;
pub use playlist::export;
pub use profile::me;
pub use serve::serve;
