use axum::{Extension, response::Json};
use serde_json::{Value, json};

/// Which route groups a server instance mounted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerRoles {
    pub login: bool,
    pub intermediary: bool,
}

pub async fn health(Extension(roles): Extension<ServerRoles>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "login": roles.login,
        "intermediary": roles.intermediary,
    }))
}
