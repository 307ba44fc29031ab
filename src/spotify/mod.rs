//! # Spotify Integration Module
//!
//! Authentication and Web API access for tastemixer.
//!
//! ## Architecture
//!
//! ```text
//! CLI (login, me, export)
//!          ↓
//! auth      ── authorization URL, CSRF state, callback handling
//! client    ── authenticated requests with refresh-and-retry-once
//!          ↓
//! exchange  ── code / refresh-token exchange via the intermediary
//!          ↓
//! Intermediary (api::token) ── provider ── Spotify token endpoint
//! ```
//!
//! ## Authorization Code Flow
//!
//! 1. **State**: [`auth::begin_login`] stores a 16-character nonce and
//!    builds the authorization URL.
//! 2. **Redirect**: Spotify sends the browser back to `/callback` with
//!    `code` and `state` (or `error`).
//! 3. **Validation**: [`auth::complete_login`] consumes the nonce; only a
//!    match reaches the token exchange.
//! 4. **Exchange**: the code goes to the intermediary, which adds the client
//!    secret and calls Spotify.
//! 5. **Storage**: the resulting credential is persisted.
//!
//! The client secret is only ever loaded by [`provider::ProviderTokenClient`].
//!
//! ## Token Lifecycle
//!
//! [`client::AuthenticatedClient`] refreshes proactively when the stored
//! token has passed its (skew-adjusted) expiry and reactively on the first
//! 401 of a request. A second 401, or any failed refresh, clears the stored
//! credential and ends in [`AuthError::ReauthRequired`](crate::error::AuthError).
//!
//! ## API Coverage
//!
//! - `GET /me` - [`profile::get_user_profile`]
//! - `POST /users/{user_id}/playlists` - [`playlist::create`]
//! - `POST /playlists/{playlist_id}/tracks` - [`playlist::add_tracks`]

pub mod auth;
pub mod client;
pub mod exchange;
pub mod playlist;
pub mod profile;
pub mod provider;
