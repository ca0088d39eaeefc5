//! Endpoint handlers and the application router.

pub mod following;
pub mod groups;
pub mod posts;
pub mod users;

use axum::{
    Router,
    http::Uri,
    middleware as axum_middleware,
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::{self, AppState};

/// `?page=` query parameter. Parsed forgivingly: anything that is not a
/// positive integer means page 1.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Requested page number, as sent.
    pub page: Option<String>,
}

impl FeedQuery {
    /// Resolve the requested page number.
    #[must_use]
    pub fn page_number(&self) -> u64 {
        zapis_core::pagination::parse_page_param(self.page.as_deref())
    }
}

/// The request path with its query string, used as the login `next` target
/// so a `?page=` survives the round trip through sign-in.
pub(crate) fn full_path(uri: &Uri) -> &str {
    uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(posts::global_feed).post(posts::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(posts::single_post).post(posts::edit_post),
        )
        .route("/api/posts/{id}/comments", post(posts::create_comment))
        .route("/api/groups", get(groups::list_groups))
        .route("/api/groups/{slug}", get(groups::group_feed))
        .route("/api/users/{username}", get(users::author_feed))
        .route(
            "/api/users/{username}/follow",
            post(following::follow).delete(following::unfollow),
        )
        .route("/api/feed/following", get(following::followed_feed))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
