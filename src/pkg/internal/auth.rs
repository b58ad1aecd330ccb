use serde::Serialize;
use sqlx::prelude::FromRow;
use standard_error::StandardError;
use uuid::Uuid;

use crate::{pkg::server::state::AppState, prelude::Result};

#[derive(FromRow, Serialize, Debug)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

/// Resolves the caller behind an opaque session token. The rest of the
/// service trusts the returned `user_id` and never inspects credentials
/// itself.
pub async fn resolve_caller(state: &AppState, token_str: &str) -> Result<User> {
    let token = token_str
        .parse::<Uuid>()
        .map_err(|_| StandardError::new("ERR-AUTH-002"))?;

    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.user_id, u.email, u.name
        FROM tokens t
        JOIN users u ON u.user_id = t.user_id
        WHERE t.token = $1
          AND t.status = 'verified'
          AND t.expiry > now()
        "#,
    )
    .bind(token)
    .fetch_optional(&*state.db_pool)
    .await?;

    user.ok_or_else(|| StandardError::new("ERR-AUTH-001"))
}
