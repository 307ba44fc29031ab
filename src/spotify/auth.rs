use reqwest::Url;

use crate::{
    config::ClientConfig,
    error::AuthError,
    management::{CredentialStore, KeyValueStore, MIN_STATE_LENGTH, StateGuard},
    spotify::exchange::TokenExchanger,
    types::{CallbackParams, Credential},
};

/// Builds the provider authorization URL the user is sent to.
///
/// Pure: no storage is touched and nothing is fetched. Fails with
/// [`AuthError::MissingScopes`] when the configured scope list lacks a
/// required capability.
///
/// # Example
///
/// ```ignore
/// let url = build_authorization_url("q1w2e3r4t5y6u7i8", &config)?;
/// webbrowser::open(url.as_str())?;
/// ```
pub fn build_authorization_url(state: &str, config: &ClientConfig) -> Result<Url, AuthError> {
    let missing = config.missing_scopes();
    if !missing.is_empty() {
        return Err(AuthError::MissingScopes(missing));
    }

    let scope = config.scopes.join(" ");
    Url::parse_with_params(
        &config.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("scope", scope.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::InvalidEndpoint {
        url: config.auth_url.clone(),
        reason: e.to_string(),
    })
}

/// Starts an authorization round-trip: checks the scopes, stores a fresh
/// CSRF state and returns the URL to open.
pub async fn begin_login<S: KeyValueStore>(
    guard: &StateGuard<S>,
    config: &ClientConfig,
) -> Result<Url, AuthError> {
    let missing = config.missing_scopes();
    if !missing.is_empty() {
        return Err(AuthError::MissingScopes(missing));
    }

    let state = guard.generate(MIN_STATE_LENGTH).await?;
    build_authorization_url(&state, config)
}

/// Handles the redirect back from the provider.
///
/// The stored state is consumed on every call. Only a matching state lets
/// the code reach the token exchange; the resulting credential is saved
/// before returning.
#[tracing::instrument(skip_all)]
pub async fn complete_login<E, G, S>(
    guard: &StateGuard<G>,
    exchanger: &E,
    credentials: &CredentialStore<S>,
    params: CallbackParams,
) -> Result<Credential, AuthError>
where
    E: TokenExchanger,
    G: KeyValueStore,
    S: KeyValueStore,
{
    let state_valid = guard
        .validate(params.state.as_deref().unwrap_or_default())
        .await;

    if let Some(error) = params.error {
        return Err(AuthError::AuthorizationDenied(error));
    }

    if !state_valid {
        tracing::warn!("authorization callback rejected: state mismatch");
        return Err(AuthError::CsrfValidation);
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let credential = exchanger.exchange_code(&code).await?;
    if credential.refresh_token.is_none() {
        tracing::warn!("code exchange returned no refresh token; session cannot be renewed");
    }

    credentials.save(&credential).await?;
    tracing::info!("signed in; credential stored");
    Ok(credential)
}
