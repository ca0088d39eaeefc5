//! Group endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use zapis_common::AppError;

use super::FeedQuery;
use crate::middleware::AppState;
use crate::response::{self, GroupFeedResponse};

/// `GET /api/groups` — the group directory.
pub async fn list_groups(State(state): State<AppState>) -> Result<Response, AppError> {
    let groups = state.groups.list().await?;
    Ok(response::ok(groups))
}

/// `GET /api/groups/{slug}` — one group's feed.
pub async fn group_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let (group, page) = state.timeline.group_feed(&slug, query.page_number()).await?;

    Ok(response::ok(GroupFeedResponse {
        group,
        posts: page.into(),
    }))
}
