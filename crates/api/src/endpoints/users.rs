//! User profile endpoints.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use zapis_common::AppError;

use super::FeedQuery;
use crate::extractors::MaybeAuthUser;
use crate::middleware::AppState;
use crate::response::{self, AuthorFeedResponse};

/// `GET /api/users/{username}` — an author's profile and feed.
pub async fn author_feed(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    let feed = state
        .timeline
        .author_feed(&username, viewer.as_ref(), query.page_number())
        .await?;

    Ok(response::ok(AuthorFeedResponse {
        author: feed.author.into(),
        posts: feed.page.into(),
        post_count: feed.post_count,
        following: feed.following,
    }))
}
