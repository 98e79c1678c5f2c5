use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use threadline_persist::{AuthorSummary, ReplyView, Thread, ThreadDetails};
use threadline_types::{CommentValidation, ThreadValidation};

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// New top-level thread; field names follow the submission schema
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateThreadRequest {
    pub thread: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
}

impl From<CreateThreadRequest> for ThreadValidation {
    fn from(req: CreateThreadRequest) -> Self {
        ThreadValidation::new(req.thread, req.account_id)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub thread: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponse {
    pub thread_id: String,
    pub author_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorResponse {
    pub id: String,
    pub auth_id: String,
    pub name: String,
    pub image: String,
}

/// A thread together with who wrote it
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplyResponse {
    pub thread: ThreadResponse,
    pub author: AuthorResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ThreadDetailsResponse {
    pub thread: ThreadResponse,
    pub author: AuthorResponse,
    pub children: Vec<ReplyResponse>,
}

/// Create a new top-level thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = CreateThreadRequest,
    responses(
        (status = 201, description = "Thread created", body = ThreadResponse),
        (status = 400, description = "Invalid submission"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "accountId is not the current user"),
        (status = 404, description = "Author not found")
    ),
    tag = "threads"
)]
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth_id): CurrentUser,
    Json(req): Json<CreateThreadRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    let user = state
        .users
        .fetch_user(&auth_id)
        .await?
        .ok_or(ApiError::UserNotFound(auth_id))?;

    // An empty accountId is left to validation
    if !req.account_id.is_empty() && req.account_id != user.id {
        return Err(ApiError::Forbidden(
            "threads can only be posted as the current user".to_string(),
        ));
    }

    let thread = state
        .threads
        .create_thread(ThreadValidation::from(req))
        .await?;

    Ok((StatusCode::CREATED, Json(thread_to_response(thread))))
}

/// Get a thread with its author and direct replies
#[utoipa::path(
    get,
    path = "/threads/{thread_id}",
    params(
        ("thread_id" = String, Path, description = "Thread ID")
    ),
    responses(
        (status = 200, description = "Thread details", body = ThreadDetailsResponse),
        (status = 400, description = "Invalid thread ID"),
        (status = 404, description = "Thread not found")
    ),
    tag = "threads"
)]
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadDetailsResponse>> {
    let details = state
        .threads
        .fetch_thread(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id))?;

    Ok(Json(details_to_response(details)))
}

/// Reply to a thread as the current user
#[utoipa::path(
    post,
    path = "/threads/{thread_id}/comments",
    params(
        ("thread_id" = String, Path, description = "Thread being replied to")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Reply created", body = ThreadResponse),
        (status = 400, description = "Invalid submission"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Thread or user not found")
    ),
    tag = "threads"
)]
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    CurrentUser(auth_id): CurrentUser,
    Path(thread_id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<(StatusCode, Json<ThreadResponse>)> {
    let user = state
        .users
        .fetch_user(&auth_id)
        .await?
        .ok_or(ApiError::UserNotFound(auth_id))?;

    let reply = state
        .threads
        .add_comment(&thread_id, CommentValidation::new(req.thread), &user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(thread_to_response(reply))))
}

pub(crate) fn thread_to_response(thread: Thread) -> ThreadResponse {
    ThreadResponse {
        thread_id: thread.id,
        author_id: thread.author,
        parent_id: thread.parent_id,
        children: thread.children,
        text: thread.text,
        created_at: thread.created_at,
    }
}

pub(crate) fn author_to_response(author: AuthorSummary) -> AuthorResponse {
    AuthorResponse {
        id: author.id,
        auth_id: author.auth_id,
        name: author.name,
        image: author.image,
    }
}

pub(crate) fn reply_to_response(reply: ReplyView) -> ReplyResponse {
    ReplyResponse {
        thread: thread_to_response(reply.thread),
        author: author_to_response(reply.author),
    }
}

fn details_to_response(details: ThreadDetails) -> ThreadDetailsResponse {
    ThreadDetailsResponse {
        thread: thread_to_response(details.thread),
        author: author_to_response(details.author),
        children: details.children.into_iter().map(reply_to_response).collect(),
    }
}
