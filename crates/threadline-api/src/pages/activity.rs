use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use threadline_persist::ActivityItem;

use crate::{auth::CurrentUser, error::ApiResult, state::AppState};

pub const ONBOARDING_PATH: &str = "/onboarding";

#[derive(Template)]
#[template(path = "activity.html")]
pub struct ActivityTemplate {
    pub items: Vec<ActivityEntry>,
}

/// One rendered "replied to your thread" row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub href: String,
    pub author_name: String,
    pub author_image: String,
}

impl From<ActivityItem> for ActivityEntry {
    fn from(item: ActivityItem) -> Self {
        let parent = item.thread.parent_id.unwrap_or(item.thread.id);
        Self {
            href: format!("/thread/{}", parent),
            author_name: item.author.name,
            author_image: item.author.image,
        }
    }
}

/// Activity page for the signed-in user
///
/// Anonymous and not-yet-onboarded visitors are sent to onboarding.
pub async fn activity_page(
    State(state): State<Arc<AppState>>,
    user: Option<CurrentUser>,
) -> ApiResult<Response> {
    let Some(CurrentUser(auth_id)) = user else {
        return Ok(Redirect::to(ONBOARDING_PATH).into_response());
    };

    let Some(user_info) = state
        .users
        .fetch_user(&auth_id)
        .await?
        .filter(|u| u.onboarded)
    else {
        return Ok(Redirect::to(ONBOARDING_PATH).into_response());
    };

    let activity = state.users.get_activity(&user_info.id).await?;
    let page = ActivityTemplate {
        items: activity.into_iter().map(ActivityEntry::from).collect(),
    };

    Ok(Html(page.render()?).into_response())
}
