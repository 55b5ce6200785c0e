/// User resource endpoints
///
/// Maps the five REST operations onto [`UserService`](usercrud_shared::service::UserService).
/// Bodies that are not JSON objects of the right shape are rejected by
/// [`AppJson`]; field rules are checked by the service.
///
/// # Endpoints
///
/// - `POST /users` - Create user
/// - `GET /users` - List users
/// - `GET /users/:id` - Get user
/// - `PATCH /users/:id` - Update user
/// - `DELETE /users/:id` - Delete user

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, AppJson},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use usercrud_shared::models::user::{CreateUser, UpdateUser, User, UserId};

/// Parses a path segment into a user ID
///
/// Anything that is not a 32-bit integer is rejected rather than coerced.
fn parse_user_id(raw: &str) -> ApiResult<UserId> {
    raw.parse::<UserId>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid user ID: {}", raw)))
}

/// Create a user
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// {
///   "email": "a@x.com",
///   "firstName": "A",
///   "lastName": "B"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// { "id": 1, "email": "a@x.com", "firstName": "A", "lastName": "B" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or validation failed
/// - `409 Conflict`: Email already exists
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.users.create(req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users
///
/// # Endpoint
///
/// ```text
/// GET /users
/// ```
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// Get a user by ID
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let id = parse_user_id(&id)?;
    let user = state.users.get(id).await?;
    Ok(Json(user))
}

/// Update a user
///
/// Any subset of `email`, `firstName`, `lastName` may be sent; other keys
/// are ignored.
///
/// # Endpoint
///
/// ```text
/// PATCH /users/1
/// Content-Type: application/json
///
/// { "lastName": "C" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Bad ID, malformed body or validation failed
/// - `404 Not Found`: No such user
/// - `409 Conflict`: Email belongs to another user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateUser>,
) -> ApiResult<Json<User>> {
    let id = parse_user_id(&id)?;
    let user = state.users.update(id, req).await?;
    Ok(Json(user))
}

/// Delete a user
///
/// # Response
///
/// `204 No Content` on success.
///
/// # Errors
///
/// - `400 Bad Request`: ID is not an integer
/// - `404 Not Found`: No such user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_user_id(&id)?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
