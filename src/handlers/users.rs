//! User registration, login, and profile lookup.
//!
//! Users back the Auth Gate: login issues the JWT that the write routes on
//! the telemetry resources require.

use axum::{
    extract::{Path, State},
    handler::Handler,
    http::StatusCode,
    middleware::from_fn,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, PgPool, Row};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::middleware::{require_authentication, AuthUser};

#[derive(Clone)]
pub struct UsersState {
    pool: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, FromRow)]
struct Credentials {
    id: i64,
    password_digest: String,
}

pub fn router(pool: PgPool) -> Router {
    let state = UsersState { pool };

    Router::new()
        .route("/", post(create_user))
        .route("/login", post(login))
        .route("/:id", get(get_user.layer(from_fn(require_authentication))))
        .with_state(state)
}

/// POST /users - register a new user
async fn create_user(
    State(state): State<UsersState>,
    Json(new_user): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    if new_user.email.is_empty() || new_user.password.is_empty() {
        return Err(ApiError::bad_request("Request body is not a valid user object."));
    }

    let row = sqlx::query("INSERT INTO users (email, password_digest) VALUES ($1, $2) RETURNING id")
        .bind(&new_user.email)
        .bind(password_digest(&new_user.password))
        .fetch_one(&state.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::conflict("A user with that email already exists.")
            }
            _ => {
                tracing::error!("user insert failed: {}", e);
                ApiError::internal_server_error(
                    "Error inserting user record into DB. Please try again later.",
                )
            }
        })?;

    let id: i64 = row.try_get("id").map_err(|e| {
        tracing::error!("user insert returned no id: {}", e);
        ApiError::internal_server_error("Error inserting user record into DB. Please try again later.")
    })?;

    let body = json!({
        "id": id,
        "links": { "user": format!("/users/{}", id) },
    });
    Ok((StatusCode::CREATED, Json(body)))
}

/// POST /users/login - verify credentials and issue a JWT
async fn login(
    State(state): State<UsersState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let credentials =
        sqlx::query_as::<_, Credentials>("SELECT id, password_digest FROM users WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(&state.pool)
            .await
            .map_err(|e| {
                tracing::error!("credential lookup failed: {}", e);
                ApiError::internal_server_error(
                    "Error validating user credentials. Please try again later.",
                )
            })?;

    let Some(credentials) = credentials else {
        return Err(ApiError::unauthorized("Invalid email or password."));
    };
    if credentials.password_digest != password_digest(&request.password) {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }

    let token = generate_jwt(Claims::new(credentials.id)).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::internal_server_error("Error generating authentication token.")
    })?;

    Ok(Json(json!({ "token": token })))
}

/// GET /users/:id - fetch a user's own record
async fn get_user(
    State(state): State<UsersState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let Ok(id) = id.parse::<i64>() else {
        return Err(ApiError::not_found("Requested user record does not exist"));
    };

    if auth.user_id != id {
        return Err(ApiError::forbidden("Cannot access another user's record."));
    }

    let user = sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!("user fetch failed for id {}: {}", id, e);
            ApiError::internal_server_error("Unable to fetch user record. Please try again later.")
        })?;

    match user {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::not_found("Requested user record does not exist")),
    }
}

fn password_digest(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
