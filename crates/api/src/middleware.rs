//! Application state and request middleware.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use zapis_common::{AppError, FeedCache};
use zapis_core::{
    CommentService, FollowingService, GroupService, PostService, TimelineService, UserService,
};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// User service.
    pub users: UserService,
    /// Group service.
    pub groups: GroupService,
    /// Post service.
    pub posts: PostService,
    /// Comment service.
    pub comments: CommentService,
    /// Following service.
    pub following: FollowingService,
    /// Timeline service.
    pub timeline: TimelineService,
    /// Global-feed page cache.
    pub feed_cache: FeedCache,
}

/// Resolve a bearer token to its user and stash the user in request
/// extensions. Requests without an `Authorization` header proceed
/// anonymously; a token that resolves to nobody is a hard 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        let user = state.users.authenticate_by_token(token).await?;
        tracing::debug!(user_id = %user.id, "authenticated request");
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}
