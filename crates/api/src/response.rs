//! Response shapes and guard-denial rendering.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use zapis_common::AppError;
use zapis_core::{Decision, Page};
use zapis_db::entities::{comment, group, post, user};

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Always `true`; errors use their own envelope.
    pub ok: bool,
    /// Response payload.
    pub data: T,
}

/// 200 with the standard envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(ApiResponse { ok: true, data }).into_response()
}

/// 201 with the standard envelope.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse { ok: true, data })).into_response()
}

/// Render a guard denial, or `None` when the mutation may proceed.
///
/// `Redirect` denials become 303s so a browser replays the navigation
/// with GET rather than re-posting the form.
pub fn deny(decision: Decision) -> Option<Response> {
    match decision {
        Decision::Allowed => None,
        Decision::Redirect(target) => Some(Redirect::to(&target).into_response()),
        Decision::Forbidden => {
            Some(AppError::Forbidden("not allowed".to_string()).into_response())
        }
    }
}

/// One page of feed items with navigation metadata.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number actually served (after clamping).
    pub page: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of items.
    pub total_items: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            page: page.index,
            total_pages: page.total_pages,
            total_items: page.total_items,
            has_next: page.has_next,
            has_previous: page.has_previous,
        }
    }
}

/// Public view of a user. The access token never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User id.
    pub id: String,
    /// Unique handle.
    pub username: String,
    /// Display name.
    pub name: Option<String>,
    /// Profile text.
    pub bio: Option<String>,
    /// Registration time.
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

/// A post's detail view.
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    /// The post.
    pub post: post::Model,
    /// Its author.
    pub author: UserResponse,
    /// Comments, newest first.
    pub comments: Vec<comment::Model>,
    /// The author's lifetime post count.
    pub author_post_count: u64,
}

/// A group's feed page with the group itself.
#[derive(Debug, Serialize)]
pub struct GroupFeedResponse {
    /// The group.
    pub group: group::Model,
    /// One page of its posts.
    pub posts: PageResponse<post::Model>,
}

/// An author's profile page.
#[derive(Debug, Serialize)]
pub struct AuthorFeedResponse {
    /// The profile owner.
    pub author: UserResponse,
    /// One page of their posts.
    pub posts: PageResponse<post::Model>,
    /// Lifetime post count.
    pub post_count: u64,
    /// Whether the viewer follows this author.
    pub following: bool,
}
