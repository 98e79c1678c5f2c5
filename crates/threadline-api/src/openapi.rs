use axum::Json;
use utoipa::OpenApi;

use crate::routes::{health, threads, users};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::get_current_user,
        users::update_current_user,
        users::list_users,
        users::get_user,
        users::get_user_threads,
        users::get_user_activity,
        threads::create_thread,
        threads::get_thread,
        threads::add_comment,
    ),
    components(schemas(
        health::HealthResponse,
        users::UpdateProfileRequest,
        users::UserResponse,
        users::UsersPageResponse,
        users::UserThreadsResponse,
        users::ThreadWithRepliesResponse,
        threads::CreateThreadRequest,
        threads::CommentRequest,
        threads::ThreadResponse,
        threads::AuthorResponse,
        threads::ReplyResponse,
        threads::ThreadDetailsResponse,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "users", description = "Profiles, search, and activity"),
        (name = "threads", description = "Thread and reply submissions")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
