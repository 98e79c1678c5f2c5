use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use threadline_persist::{ThreadWithReplies, UpdateUser, User, UserSearch, UserThreads, UsersPage};
use threadline_types::{SortOrder, DEFAULT_PAGE_SIZE};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    routes::threads::{reply_to_response, thread_to_response, ReplyResponse, ThreadResponse},
    state::AppState,
};

const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image: String,
    /// Page the form was submitted from
    #[serde(default = "default_profile_path")]
    pub path: String,
}

fn default_profile_path() -> String {
    "/onboarding".to_string()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub auth_id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub image: String,
    pub onboarded: bool,
    pub threads: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadWithRepliesResponse {
    pub thread: ThreadResponse,
    pub children: Vec<ReplyResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserThreadsResponse {
    pub user: UserResponse,
    pub threads: Vec<ThreadWithRepliesResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersPageResponse {
    pub users: Vec<UserResponse>,
    pub is_next: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Create or update the current user's profile
#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 204, description = "Profile saved"),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn update_current_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth_id): CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<StatusCode> {
    if req.username.trim().is_empty() {
        return Err(ApiError::BadRequest("username is required".to_string()));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    state
        .users
        .update_user(UpdateUser {
            auth_id,
            username: req.username,
            name: req.name,
            bio: req.bio,
            image: req.image,
            path: req.path,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User has not onboarded")
    ),
    tag = "users"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth_id): CurrentUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .fetch_user(&auth_id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound(auth_id))?;

    Ok(Json(user_to_response(user)))
}

/// Search other users, newest first by default
#[utoipa::path(
    get,
    path = "/users",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on username or name"),
        ("page" = Option<u64>, Query, description = "One-based page number (default: 1)"),
        ("page_size" = Option<u64>, Query, description = "Users per page (default: 20, max: 100)"),
        ("sort" = Option<String>, Query, description = "asc or desc by creation time (default: desc)")
    ),
    responses(
        (status = 200, description = "Page of users", body = UsersPageResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth_id): CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<UsersPageResponse>> {
    let page_size = query.page_size.min(MAX_PAGE_SIZE);

    let page = state
        .users
        .fetch_users(
            UserSearch::new(auth_id)
                .with_search(query.search)
                .with_page(query.page, page_size)
                .with_sort(query.sort),
        )
        .await?;

    Ok(Json(page_to_response(page)))
}

/// Get a user by identity-provider id
#[utoipa::path(
    get,
    path = "/users/{auth_id}",
    params(
        ("auth_id" = String, Path, description = "Identity-provider user ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(auth_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users
        .fetch_user(&auth_id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound(auth_id))?;

    Ok(Json(user_to_response(user)))
}

/// Get a user's threads with replies and reply authors
#[utoipa::path(
    get,
    path = "/users/{auth_id}/threads",
    params(
        ("auth_id" = String, Path, description = "Identity-provider user ID")
    ),
    responses(
        (status = 200, description = "User with threads", body = UserThreadsResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user_threads(
    State(state): State<Arc<AppState>>,
    Path(auth_id): Path<String>,
) -> ApiResult<Json<UserThreadsResponse>> {
    let user_threads = state
        .users
        .fetch_user_threads(&auth_id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound(auth_id))?;

    Ok(Json(user_threads_to_response(user_threads)))
}

/// Replies other users made to this user's threads
#[utoipa::path(
    get,
    path = "/users/{auth_id}/activity",
    params(
        ("auth_id" = String, Path, description = "Identity-provider user ID")
    ),
    responses(
        (status = 200, description = "Activity feed, newest first", body = [ReplyResponse]),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user_activity(
    State(state): State<Arc<AppState>>,
    Path(auth_id): Path<String>,
) -> ApiResult<Json<Vec<ReplyResponse>>> {
    let user = state
        .users
        .fetch_user(&auth_id)
        .await?
        .ok_or_else(|| ApiError::UserNotFound(auth_id))?;

    let activity = state.users.get_activity(&user.id).await?;

    Ok(Json(activity.into_iter().map(reply_to_response).collect()))
}

fn user_to_response(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        auth_id: user.auth_id,
        username: user.username,
        name: user.name,
        bio: user.bio,
        image: user.image,
        onboarded: user.onboarded,
        threads: user.threads,
        created_at: user.created_at,
    }
}

fn page_to_response(page: UsersPage) -> UsersPageResponse {
    UsersPageResponse {
        users: page.users.into_iter().map(user_to_response).collect(),
        is_next: page.is_next,
    }
}

fn user_threads_to_response(user_threads: UserThreads) -> UserThreadsResponse {
    UserThreadsResponse {
        user: user_to_response(user_threads.user),
        threads: user_threads
            .threads
            .into_iter()
            .map(|ThreadWithReplies { thread, children }| ThreadWithRepliesResponse {
                thread: thread_to_response(thread),
                children: children.into_iter().map(reply_to_response).collect(),
            })
            .collect(),
    }
}
