use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::envelope::success;
use crate::api::server::AppState;
use crate::db::models::{NewUser, User};
use crate::db::repo;
use crate::error::{ApiError, Result};

/// GET /ping
pub async fn ping() -> Response {
    success("pong!", StatusCode::OK)
}

/// GET /users/{id}
pub async fn get_single_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Response> {
    let id: i64 = user_id.trim().parse().map_err(|_| ApiError::NotFound)?;
    let user = repo::get_user(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(success(
        json!({
            "username": user.username,
            "email": user.email,
            "created_at": user.created_at,
        }),
        StatusCode::OK,
    ))
}

/// GET /users
pub async fn get_all_users(State(state): State<Arc<AppState>>) -> Result<Response> {
    let users: Vec<Value> = repo::list_users(&state.db)
        .await?
        .into_iter()
        .map(|user: User| {
            json!({
                "id": user.id,
                "username": user.username,
                "email": user.email,
                "created_at": user.created_at,
            })
        })
        .collect();

    Ok(success(json!({ "users": users }), StatusCode::OK))
}

/// POST /users
pub async fn add_user(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response> {
    let payload = parse_payload(&body)?;

    if repo::find_by_email(&state.db, payload.email.as_deref())
        .await?
        .is_some()
    {
        return Err(ApiError::EmailTaken);
    }

    let id = repo::insert_user(&state.db, &payload).await?;
    tracing::debug!("Added user {}", id);

    let email = payload.email.unwrap_or_default();
    Ok(success(format!("{} was added", email), StatusCode::CREATED))
}

/// Decodes a creation payload. Anything falsy (no body, `{}`, `null`, `[]`,
/// `""`, `0`, `false`) or not an object of optional strings is rejected.
fn parse_payload(body: &[u8]) -> Result<NewUser> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidPayload)?;

    let truthy = match &value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    };
    if !truthy || !value.is_object() {
        return Err(ApiError::InvalidPayload);
    }

    serde_json::from_value(value).map_err(|_| ApiError::InvalidPayload)
}
