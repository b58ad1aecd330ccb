use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, put};
use axum::Router;

use super::handlers;
use super::handlers::probes::{healthz, livez};
use super::handlers::resumes::MAX_UPLOAD_BYTES;
use super::middlewares::authn;
use super::state::AppState;
use crate::conf::Settings;
use crate::prelude::Result;

pub async fn build_routes(settings: Settings) -> Result<Router> {
    let state = AppState::new(settings).await?;
    let app = Router::new()
        .route(
            "/resumes",
            get(handlers::resumes::list).post(handlers::resumes::upload),
        )
        .route("/resumes/{id}/primary", put(handlers::resumes::set_primary))
        .route("/resumes/{id}", delete(handlers::resumes::remove))
        .layer(from_fn_with_state(state.clone(), authn::authenticate))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        // multipart framing overhead on top of the per-file limit
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .with_state(state);

    Ok(app)
}
