use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use standard_error::{StandardError, Status};

use crate::{
    pkg::{internal::auth::resolve_caller, server::state::AppState},
    prelude::Result,
};

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    let token = jar
        .get("_Host_token")
        .filter(|c| !c.value().is_empty())
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(&headers));

    if let Some(token) = token {
        if let Ok(user) = resolve_caller(&state, &token).await {
            request.extensions_mut().insert(Arc::new(user));
            return Ok(next.run(request).await);
        }
    }
    tracing::warn!("token missing or invalid, authentication denied");
    Err(StandardError::new("ERR-AUTH-001").code(StatusCode::UNAUTHORIZED))
}
