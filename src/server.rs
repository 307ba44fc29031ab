use std::{net::SocketAddr, sync::Arc};

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{
    api::{self, LoginContext, ServerRoles},
    spotify::{
        exchange::{CODE_EXCHANGE_PATH, REFRESH_PATH},
        provider::ProviderTokenClient,
    },
};

/// Builds the local router. The callback route is mounted when a login is
/// in progress, the token intermediary when this process holds the client
/// secret.
pub fn router(login: Option<Arc<LoginContext>>, intermediary: Option<Arc<ProviderTokenClient>>) -> Router {
    let roles = ServerRoles {
        login: login.is_some(),
        intermediary: intermediary.is_some(),
    };

    let mut app = Router::new().route("/health", get(api::health).layer(Extension(roles)));

    if let Some(ctx) = login {
        app = app.route("/callback", get(api::callback).layer(Extension(ctx)));
    }

    if let Some(provider) = intermediary {
        app = app
            .route(
                CODE_EXCHANGE_PATH,
                post(api::exchange_code).layer(Extension(Arc::clone(&provider))),
            )
            .route(
                REFRESH_PATH,
                post(api::refresh_token).layer(Extension(provider)),
            );
    }

    app
}

pub async fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    Ok(listener)
}

pub async fn start_api_server(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}
