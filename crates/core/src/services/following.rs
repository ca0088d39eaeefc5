//! Following service.
//!
//! Follow is idempotent: repeating it returns the existing edge instead
//! of erroring or duplicating. Unfollow is strict: removing an edge that
//! does not exist is a not-found error.

use sea_orm::Set;
use zapis_common::{AppError, AppResult, IdGenerator};
use zapis_db::entities::{follow, user};
use zapis_db::repositories::{FollowRepository, UserRepository};

/// Following service.
#[derive(Clone)]
pub struct FollowingService {
    follows: FollowRepository,
    users: UserRepository,
    ids: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(follows: FollowRepository, users: UserRepository) -> Self {
        Self {
            follows,
            users,
            ids: IdGenerator::new(),
        }
    }

    /// Follow the user named `followee_username`.
    ///
    /// Returns the follow edge, existing or newly created.
    pub async fn follow(
        &self,
        follower: &user::Model,
        followee_username: &str,
    ) -> AppResult<follow::Model> {
        let followee = self.users.get_by_username(followee_username).await?;

        if follower.id == followee.id {
            return Err(AppError::Forbidden(
                "cannot follow yourself".to_string(),
            ));
        }

        if let Some(existing) = self.follows.find_by_pair(&follower.id, &followee.id).await? {
            return Ok(existing);
        }

        let model = follow::ActiveModel {
            id: Set(self.ids.generate()),
            follower_id: Set(follower.id.clone()),
            followee_id: Set(followee.id.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.follows.create(model).await?;
        tracing::info!(
            follower = %follower.username,
            followee = %followee.username,
            "created follow"
        );
        Ok(created)
    }

    /// Unfollow the user named `followee_username`.
    pub async fn unfollow(
        &self,
        follower: &user::Model,
        followee_username: &str,
    ) -> AppResult<()> {
        let followee = self.users.get_by_username(followee_username).await?;

        let deleted = self
            .follows
            .delete_by_pair(&follower.id, &followee.id)
            .await?;
        if !deleted {
            return Err(AppError::NotFound(format!(
                "not following '{followee_username}'"
            )));
        }

        tracing::info!(
            follower = %follower.username,
            followee = %followee.username,
            "removed follow"
        );
        Ok(())
    }

    /// Whether `follower_id` follows `followee_id`.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follows.is_following(follower_id, followee_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, username: &str) -> user::Model {
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

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_follow_creates_edge() {
        let alice = create_test_user("u1", "alice");
        let bob = create_test_user("u2", "bob");
        let edge = create_test_follow("f1", "u1", "u2");

        let users_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .into_connection(),
        );
        let follows_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new(), vec![edge]])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowRepository::new(follows_db),
            UserRepository::new(users_db),
        );

        let created = service.follow(&alice, "bob").await.unwrap();
        assert_eq!(created.follower_id, "u1");
        assert_eq!(created.followee_id, "u2");
    }

    #[tokio::test]
    async fn test_follow_twice_is_noop() {
        let alice = create_test_user("u1", "alice");
        let bob = create_test_user("u2", "bob");
        let existing = create_test_follow("f1", "u1", "u2");

        let users_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .into_connection(),
        );
        // Only a lookup result: any attempted insert would fail the mock.
        let follows_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowRepository::new(follows_db),
            UserRepository::new(users_db),
        );

        let edge = service.follow(&alice, "bob").await.unwrap();
        assert_eq!(edge.id, "f1");
    }

    #[tokio::test]
    async fn test_follow_self_forbidden() {
        let alice = create_test_user("u1", "alice");

        let users_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[alice.clone()]])
                .into_connection(),
        );
        let follows_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowRepository::new(follows_db),
            UserRepository::new(users_db),
        );

        let result = service.follow(&alice, "alice").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let alice = create_test_user("u1", "alice");

        let users_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let follows_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowingService::new(
            FollowRepository::new(follows_db),
            UserRepository::new(users_db),
        );

        let result = service.follow(&alice, "ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_missing_edge() {
        let alice = create_test_user("u1", "alice");
        let bob = create_test_user("u2", "bob");

        let users_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .into_connection(),
        );
        let follows_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowRepository::new(follows_db),
            UserRepository::new(users_db),
        );

        let result = service.unfollow(&alice, "bob").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_removes_edge() {
        let alice = create_test_user("u1", "alice");
        let bob = create_test_user("u2", "bob");
        let edge = create_test_follow("f1", "u1", "u2");

        let users_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[bob]])
                .into_connection(),
        );
        let follows_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = FollowingService::new(
            FollowRepository::new(follows_db),
            UserRepository::new(users_db),
        );

        service.unfollow(&alice, "bob").await.unwrap();
    }
}
