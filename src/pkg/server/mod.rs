pub mod handlers;
pub mod middlewares;
pub mod router;
pub mod state;

use crate::{conf::Settings, prelude::Result};
use router::build_routes;

pub async fn listen(settings: Settings) -> Result<()> {
    let port = settings.listen_port.clone();
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &port)).await?;
    tracing::info!("Listening at port {}", &port);
    tokio::select! {
        r = axum::serve(listener, build_routes(settings).await?) => {
            tracing::warn!("server ended unexpectedly: {:?}", &r)
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received ctrl+c interrupt, closing server");
        }
    }
    Ok(())
}
