//! Mutation access guard.
//!
//! Pure decision functions consulted by the HTTP layer before any write.
//! The guard never performs the denial itself; it returns a [`Decision`]
//! and the caller turns `Redirect` into a 303 and `Forbidden` into a 403.
//!
//! Denied mutations leave no trace: callers must check the guard before
//! touching storage or the database.

use zapis_db::entities::{post, user};

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The viewer may perform the mutation.
    Allowed,
    /// The viewer is sent elsewhere instead; the mutation does not run.
    Redirect(String),
    /// The mutation is rejected outright.
    Forbidden,
}

impl Decision {
    /// Whether the mutation may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Redirect target for an anonymous viewer, preserving where they were
/// headed so they can resume after signing in.
#[must_use]
pub fn login_redirect(next: &str) -> Decision {
    Decision::Redirect(format!("/login?next={next}"))
}

/// Anyone signed in may create a post; anonymous viewers go to login.
#[must_use]
pub fn can_create_post(viewer: Option<&user::Model>, next: &str) -> Decision {
    match viewer {
        Some(_) => Decision::Allowed,
        None => login_redirect(next),
    }
}

/// Only the author may edit a post. A signed-in non-author is redirected
/// to the post's detail view; anonymous viewers go to login.
#[must_use]
pub fn can_edit_post(viewer: Option<&user::Model>, post: &post::Model, next: &str) -> Decision {
    match viewer {
        Some(u) if u.id == post.user_id => Decision::Allowed,
        Some(_) => Decision::Redirect(format!("/posts/{}", post.id)),
        None => login_redirect(next),
    }
}

/// Commenting requires being signed in.
#[must_use]
pub fn can_comment(viewer: Option<&user::Model>, next: &str) -> Decision {
    match viewer {
        Some(_) => Decision::Allowed,
        None => login_redirect(next),
    }
}

/// Following requires being signed in, and a user may never follow
/// themselves.
#[must_use]
pub fn can_follow(viewer: Option<&user::Model>, target: &user::Model, next: &str) -> Decision {
    match viewer {
        Some(u) if u.id == target.id => Decision::Forbidden,
        Some(_) => Decision::Allowed,
        None => login_redirect(next),
    }
}

/// Unfollowing requires being signed in.
#[must_use]
pub fn can_unfollow(viewer: Option<&user::Model>, next: &str) -> Decision {
    match viewer {
        Some(_) => Decision::Allowed,
        None => login_redirect(next),
    }
}

/// The followed-authors feed is only meaningful signed in.
#[must_use]
pub fn can_view_followed_feed(viewer: Option<&user::Model>, next: &str) -> Decision {
    match viewer {
        Some(_) => Decision::Allowed,
        None => login_redirect(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            token: None,
            name: None,
            bio: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            group_id: None,
            text: "hello".to_string(),
            image_key: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_anonymous_create_redirects_to_login_with_next() {
        let decision = can_create_post(None, "/posts/new");
        assert_eq!(
            decision,
            Decision::Redirect("/login?next=/posts/new".to_string())
        );
    }

    #[test]
    fn test_signed_in_create_allowed() {
        let alice = test_user("u1", "alice");
        assert_eq!(can_create_post(Some(&alice), "/posts/new"), Decision::Allowed);
    }

    #[test]
    fn test_author_may_edit() {
        let alice = test_user("u1", "alice");
        let post = test_post("p1", "u1");
        assert_eq!(
            can_edit_post(Some(&alice), &post, "/posts/p1/edit"),
            Decision::Allowed
        );
    }

    #[test]
    fn test_non_author_edit_redirects_to_post() {
        let bob = test_user("u2", "bob");
        let post = test_post("p1", "u1");
        assert_eq!(
            can_edit_post(Some(&bob), &post, "/posts/p1/edit"),
            Decision::Redirect("/posts/p1".to_string())
        );
    }

    #[test]
    fn test_anonymous_edit_redirects_to_login() {
        let post = test_post("p1", "u1");
        assert_eq!(
            can_edit_post(None, &post, "/posts/p1/edit"),
            Decision::Redirect("/login?next=/posts/p1/edit".to_string())
        );
    }

    #[test]
    fn test_anonymous_comment_redirects() {
        assert_eq!(
            can_comment(None, "/posts/p1/comments"),
            Decision::Redirect("/login?next=/posts/p1/comments".to_string())
        );
    }

    #[test]
    fn test_self_follow_forbidden() {
        let alice = test_user("u1", "alice");
        assert_eq!(
            can_follow(Some(&alice), &alice, "/users/alice/follow"),
            Decision::Forbidden
        );
    }

    #[test]
    fn test_follow_other_allowed() {
        let alice = test_user("u1", "alice");
        let bob = test_user("u2", "bob");
        assert_eq!(
            can_follow(Some(&alice), &bob, "/users/bob/follow"),
            Decision::Allowed
        );
    }

    #[test]
    fn test_anonymous_follow_redirects() {
        let bob = test_user("u2", "bob");
        assert_eq!(
            can_follow(None, &bob, "/users/bob/follow"),
            Decision::Redirect("/login?next=/users/bob/follow".to_string())
        );
    }

    #[test]
    fn test_anonymous_followed_feed_redirects() {
        assert_eq!(
            can_view_followed_feed(None, "/feed/following"),
            Decision::Redirect("/login?next=/feed/following".to_string())
        );
    }

    #[test]
    fn test_signed_in_unfollow_allowed() {
        let alice = test_user("u1", "alice");
        assert_eq!(
            can_unfollow(Some(&alice), "/users/bob/follow"),
            Decision::Allowed
        );
    }
}
