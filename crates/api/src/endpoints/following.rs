//! Follow endpoints and the followed-authors feed.

use axum::{
    extract::{Path, Query, State},
    http::Uri,
    response::Response,
};
use zapis_common::AppError;
use zapis_core::guard;

use super::FeedQuery;
use crate::extractors::MaybeAuthUser;
use crate::middleware::AppState;
use crate::response::{self, PageResponse};

/// `GET /api/feed/following` — posts by every author the viewer follows.
pub async fn followed_feed(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    uri: Uri,
    Query(query): Query<FeedQuery>,
) -> Result<Response, AppError> {
    if let Some(denied) =
        response::deny(guard::can_view_followed_feed(viewer.as_ref(), super::full_path(&uri)))
    {
        return Ok(denied);
    }
    let viewer = viewer.ok_or(AppError::Unauthorized)?;

    let page = state
        .timeline
        .followed_feed(&viewer, query.page_number())
        .await?;

    Ok(response::ok(PageResponse::from(page)))
}

/// `POST /api/users/{username}/follow` — follow an author. Idempotent.
pub async fn follow(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    // Anonymous followers go to login before the target is looked up.
    let Some(viewer) = viewer else {
        return response::deny(guard::login_redirect(super::full_path(&uri)))
            .ok_or(AppError::Unauthorized);
    };

    let target = state.users.get_by_username(&username).await?;

    if let Some(denied) =
        response::deny(guard::can_follow(Some(&viewer), &target, super::full_path(&uri)))
    {
        return Ok(denied);
    }

    let edge = state.following.follow(&viewer, &username).await?;
    Ok(response::created(edge))
}

/// `DELETE /api/users/{username}/follow` — unfollow an author. 404 when
/// no follow edge exists.
pub async fn unfollow(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    if let Some(denied) = response::deny(guard::can_unfollow(viewer.as_ref(), super::full_path(&uri)))
    {
        return Ok(denied);
    }
    let viewer = viewer.ok_or(AppError::Unauthorized)?;

    state.following.unfollow(&viewer, &username).await?;
    Ok(response::ok(serde_json::json!({ "unfollowed": username })))
}
