//! Comment service.

use sea_orm::Set;
use validator::Validate;
use zapis_common::{AppResult, IdGenerator};
use zapis_db::entities::{comment, user};
use zapis_db::repositories::{CommentRepository, PostRepository};

/// Input for adding a comment.
#[derive(Debug, Clone, Validate)]
pub struct CreateCommentInput {
    /// Comment text.
    #[validate(length(min = 1, max = 700))]
    pub text: String,
}

/// Comment service.
#[derive(Clone)]
pub struct CommentService {
    comments: CommentRepository,
    posts: PostRepository,
    ids: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comments: CommentRepository, posts: PostRepository) -> Self {
        Self {
            comments,
            posts,
            ids: IdGenerator::new(),
        }
    }

    /// Add a comment by `author` on the given post.
    pub async fn create(
        &self,
        author: &user::Model,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        // The post must still exist when the comment lands.
        let post = self.posts.get_by_id(post_id).await?;

        let model = comment::ActiveModel {
            id: Set(self.ids.generate()),
            post_id: Set(post.id),
            user_id: Set(author.id.clone()),
            text: Set(input.text),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.comments.create(model).await?;
        tracing::debug!(comment_id = %created.id, post_id = %created.post_id, "added comment");
        Ok(created)
    }

    /// List a post's comments, newest first.
    pub async fn list_for_post(&self, post_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comments.find_by_post(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use zapis_common::AppError;
    use zapis_db::entities::post;

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

    fn create_test_post(id: &str, user_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            group_id: None,
            text: "hello".to_string(),
            image_key: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_comment(id: &str, post_id: &str, user_id: &str, text: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            post_id: post_id.to_string(),
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let bob = create_test_user("u2", "bob");

        let posts_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let comments_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CommentService::new(
            CommentRepository::new(comments_db),
            PostRepository::new(posts_db),
        );

        let result = service
            .create(
                &bob,
                "p-missing",
                CreateCommentInput {
                    text: "nice".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_comment_created() {
        let bob = create_test_user("u2", "bob");
        let post = create_test_post("p1", "u1");
        let comment = create_test_comment("c1", "p1", "u2", "nice");

        let posts_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let comments_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[comment]])
                .into_connection(),
        );

        let service = CommentService::new(
            CommentRepository::new(comments_db),
            PostRepository::new(posts_db),
        );

        let created = service
            .create(
                &bob,
                "p1",
                CreateCommentInput {
                    text: "nice".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.post_id, "p1");
        assert_eq!(created.user_id, "u2");
    }

    #[tokio::test]
    async fn test_comment_rejects_empty_text() {
        let bob = create_test_user("u2", "bob");
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = CommentService::new(
            CommentRepository::new(db.clone()),
            PostRepository::new(db),
        );

        let result = service
            .create(&bob, "p1", CreateCommentInput { text: String::new() })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
