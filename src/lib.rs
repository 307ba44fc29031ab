//! tastemixer library
//!
//! Signs a user in to the Spotify Web API with the OAuth 2.0 Authorization
//! Code flow, keeps the resulting tokens fresh and exposes an authenticated
//! request client used to read the profile and export playlists.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints: OAuth callback, token intermediary, health
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy of the authentication pipeline
//! - `management` - Credential persistence and CSRF state
//! - `server` - Local HTTP server
//! - `spotify` - Authorization, token exchange and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```ignore
//! use tastemixer::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tastemixer::config::ConfigError> {
//!     config::load_env().await?;
//!     cli::me().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::AuthError;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```ignore
/// info!("Waiting for the authorization callback...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```ignore
/// success!("Playlist exported: {}", url);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program
/// with status 1.
///
/// Only for failures the command cannot recover from.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
