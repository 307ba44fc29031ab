use std::sync::Arc;

use axum::{Extension, Json, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    spotify::provider::{ProviderError, ProviderTokenClient},
    types::{CodeExchangeRequest, RefreshRequest},
};

type JsonResponse = (StatusCode, Json<Value>);

/// `POST /api/spotify-token` with `{ "code": ... }`.
pub async fn exchange_code(
    Extension(provider): Extension<Arc<ProviderTokenClient>>,
    Json(body): Json<CodeExchangeRequest>,
) -> JsonResponse {
    let Some(code) = body.code.filter(|c| !c.is_empty()) else {
        return bad_request("missing authorization code");
    };

    respond(
        provider.exchange_code(&code).await,
        "failed to obtain token from Spotify",
    )
}

/// `POST /api/refresh-token` with `{ "refreshToken": ... }`.
pub async fn refresh_token(
    Extension(provider): Extension<Arc<ProviderTokenClient>>,
    Json(body): Json<RefreshRequest>,
) -> JsonResponse {
    let Some(refresh_token) = body.refresh_token.filter(|t| !t.is_empty()) else {
        return bad_request("missing refresh token");
    };

    respond(
        provider.refresh(&refresh_token).await,
        "failed to refresh token with Spotify",
    )
}

fn bad_request(message: &str) -> JsonResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn respond(result: Result<Value, ProviderError>, context: &str) -> JsonResponse {
    match result {
        Ok(payload) => (StatusCode::OK, Json(payload)),
        Err(ProviderError {
            status: Some(status),
            body,
        }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let error = match provider_reason(&body) {
                Some(reason) => format!("{context}: {reason}"),
                None => context.to_string(),
            };
            (status, Json(json!({ "error": error, "details": body })))
        }
        Err(ProviderError { status: None, .. }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        ),
    }
}

/// OAuth error bodies carry `error` and optionally `error_description`.
fn provider_reason(body: &Value) -> Option<String> {
    body.get("error_description")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failure_keeps_status_and_reason() {
        let (status, Json(body)) = respond(
            Err(ProviderError {
                status: Some(400),
                body: json!({"error": "invalid_grant", "error_description": "Invalid authorization code"}),
            }),
            "failed to obtain token from Spotify",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "failed to obtain token from Spotify: Invalid authorization code"
        );
        assert_eq!(body["details"]["error"], "invalid_grant");
    }

    #[test]
    fn unreachable_provider_is_internal_error() {
        let (status, Json(body)) = respond(
            Err(ProviderError {
                status: None,
                body: Value::Null,
            }),
            "ignored",
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "internal server error" }));
    }
}
