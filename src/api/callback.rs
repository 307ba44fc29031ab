use std::sync::Arc;

use axum::{Extension, extract::Query, http::StatusCode, response::Html};
use tokio::sync::mpsc;

use crate::{
    error::AuthError,
    management::{CredentialStore, FileStore, MemoryStore, StateGuard},
    spotify::{auth, exchange::IntermediaryExchanger},
    types::{CallbackParams, Credential},
};

/// Everything the redirect target needs to finish a login started by the
/// `login` command.
pub struct LoginContext {
    pub guard: StateGuard<Arc<MemoryStore>>,
    pub exchanger: IntermediaryExchanger,
    pub credentials: CredentialStore<Arc<FileStore>>,
    pub outcome: mpsc::Sender<Result<Credential, AuthError>>,
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(ctx): Extension<Arc<LoginContext>>,
) -> (StatusCode, Html<&'static str>) {
    let result = auth::complete_login(&ctx.guard, &ctx.exchanger, &ctx.credentials, params).await;

    let page = match &result {
        Ok(_) => (
            StatusCode::OK,
            Html("<h2>Authentication successful.</h2><p>You can close this window.</p>"),
        ),
        Err(AuthError::AuthorizationDenied(_)) => (
            StatusCode::BAD_REQUEST,
            Html("<h4>Authorization was denied.</h4><p>Run <code>tastemixer login</code> to try again.</p>"),
        ),
        Err(AuthError::CsrfValidation) => (
            StatusCode::FORBIDDEN,
            Html("<h4>Login request could not be verified.</h4><p>Run <code>tastemixer login</code> again.</p>"),
        ),
        Err(AuthError::MissingCode) => (
            StatusCode::BAD_REQUEST,
            Html("<h4>Missing authorization code.</h4>"),
        ),
        Err(_) => (StatusCode::BAD_GATEWAY, Html("<h4>Login failed.</h4>")),
    };

    if ctx.outcome.send(result).await.is_err() {
        tracing::debug!("login outcome dropped; no login is waiting");
    }

    page
}
