use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::sync::mpsc;

use crate::{
    api::LoginContext,
    config::{ClientConfig, IntermediaryConfig},
    error, info,
    management::{CredentialStore, FileStore, MemoryStore, StateGuard},
    server,
    spotify::{
        auth, client::AuthenticatedClient, exchange::IntermediaryExchanger,
        provider::ProviderTokenClient,
    },
    success,
    types::ProfileTableRow,
    utils, warning,
};

/// How long `login` waits for the browser to come back.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) type CliClient = AuthenticatedClient<IntermediaryExchanger, Arc<FileStore>>;

pub(crate) fn client_config() -> ClientConfig {
    match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    }
}

pub(crate) fn credential_store() -> CredentialStore<Arc<FileStore>> {
    CredentialStore::new(Arc::new(FileStore::default_location()))
}

fn exchanger(config: &ClientConfig) -> IntermediaryExchanger {
    match IntermediaryExchanger::new(
        &config.intermediary_url,
        config.skew_margin,
        config.request_timeout,
    ) {
        Ok(exchanger) => exchanger,
        Err(e) => error!("Cannot create HTTP client: {}", e),
    }
}

/// Client for commands that call the Web API on the user's behalf.
pub(crate) fn authenticated_client(config: &ClientConfig) -> CliClient {
    let client = AuthenticatedClient::from_config(config, exchanger(config), credential_store());
    match client {
        Ok(client) => client.on_reauth(|| {
            warning!("Your Spotify session has ended. Run tastemixer login to sign in again.")
        }),
        Err(e) => error!("Cannot create HTTP client: {}", e),
    }
}

/// Runs the Authorization Code flow in the user's browser.
///
/// Starts the local server (with the token intermediary mounted when the
/// client secret is configured here), opens the authorization URL and
/// waits for the callback to store a credential.
pub async fn login() {
    let config = client_config();

    let session = Arc::new(MemoryStore::new());
    let guard = StateGuard::new(Arc::clone(&session));
    let auth_url = match auth::begin_login(&guard, &config).await {
        Ok(url) => url,
        Err(e) => error!("Cannot start login: {}", e),
    };

    let intermediary = if IntermediaryConfig::secret_available() {
        let provider = IntermediaryConfig::from_env()
            .map_err(|e| e.to_string())
            .and_then(|c| ProviderTokenClient::new(&c).map_err(|e| e.to_string()));
        match provider {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => error!("Cannot start token intermediary: {}", e),
        }
    } else {
        info!("No client secret configured; using intermediary at {}", config.intermediary_url);
        None
    };

    let (outcome, mut results) = mpsc::channel(1);
    let ctx = Arc::new(LoginContext {
        guard,
        exchanger: exchanger(&config),
        credentials: credential_store(),
        outcome,
    });

    let listener = match server::bind(config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot listen on {}: {}", config.server_addr, e),
    };
    let app = server::router(Some(ctx), intermediary);
    tokio::spawn(async move {
        if let Err(e) = server::start_api_server(listener, app).await {
            warning!("Local server stopped: {}", e);
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for Spotify authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = tokio::time::timeout(LOGIN_TIMEOUT, results.recv()).await;
    pb.finish_and_clear();

    match result {
        Ok(Some(Ok(_))) => success!("Authentication successful!"),
        Ok(Some(Err(e))) => error!("Authentication failed: {}", e),
        Ok(None) | Err(_) => error!("Authentication failed or timed out."),
    }
}

/// Removes the stored credential.
pub async fn logout() {
    match credential_store().clear().await {
        Ok(()) => success!("Signed out."),
        Err(e) => error!("Failed to clear credentials: {}", e),
    }
}

/// Shows whether a credential is stored and when it expires.
pub async fn status() {
    let credential = match credential_store().load().await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            info!("Not signed in. Run tastemixer login.");
            return;
        }
        Err(e) => error!("Cannot read credentials: {}", e),
    };

    let expires = DateTime::from_timestamp(credential.expires_at, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let state = if credential.is_expired(utils::now_timestamp()) {
        "expired (refreshed on next request)"
    } else {
        "valid"
    };

    let rows = vec![
        ProfileTableRow {
            field: "access token".to_string(),
            value: state.to_string(),
        },
        ProfileTableRow {
            field: "expires".to_string(),
            value: expires,
        },
        ProfileTableRow {
            field: "refresh token".to_string(),
            value: if credential.refresh_token.is_some() {
                "stored".to_string()
            } else {
                "missing".to_string()
            },
        },
    ];
    println!("{}", Table::new(rows));
}
