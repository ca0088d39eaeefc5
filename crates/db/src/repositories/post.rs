//! Post repository.
//!
//! Every listing query here applies the same canonical ordering
//! (`created_at DESC, id DESC`) so a post's relative position never depends
//! on which feed is being rendered, only on which subset is included.

use std::sync::Arc;

use crate::entities::{Post, post};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use zapis_common::{AppError, AppResult};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

/// Apply the canonical feed ordering to a post query.
fn ordered(query: Select<Post>) -> Select<Post> {
    query
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Feed queries ====================

    /// Count all posts.
    pub async fn count_all(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of the global feed (zero-based page index).
    pub async fn fetch_page_all(&self, page: u64, per_page: u64) -> AppResult<Vec<post::Model>> {
        ordered(Post::find())
            .paginate(self.db.as_ref(), per_page)
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts filed under a group.
    pub async fn count_by_group(&self, group_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of a group's feed (zero-based page index).
    pub async fn fetch_page_by_group(
        &self,
        group_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<post::Model>> {
        ordered(Post::find().filter(post::Column::GroupId.eq(group_id)))
            .paginate(self.db.as_ref(), per_page)
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts by an author.
    pub async fn count_by_author(&self, user_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of an author's feed (zero-based page index).
    pub async fn fetch_page_by_author(
        &self,
        user_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<post::Model>> {
        ordered(Post::find().filter(post::Column::UserId.eq(user_id)))
            .paginate(self.db.as_ref(), per_page)
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts authored by any of the given users.
    pub async fn count_by_authors(&self, user_ids: &[String]) -> AppResult<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }

        Post::find()
            .filter(post::Column::UserId.is_in(user_ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of posts authored by any of the given users
    /// (zero-based page index). Used for the followed-authors feed: the
    /// caller resolves the followee set, this preserves the global ordering
    /// over that subset.
    pub async fn fetch_page_by_authors(
        &self,
        user_ids: &[String],
        page: u64,
        per_page: u64,
    ) -> AppResult<Vec<post::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        ordered(Post::find().filter(post::Column::UserId.is_in(user_ids.to_vec())))
            .paginate(self.db.as_ref(), per_page)
            .fetch_page(page)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

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

    #[tokio::test]
    async fn test_find_by_id_found() {
        let post = create_test_post("p1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.find_by_id("p1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().id, "p1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_page_by_author() {
        let p1 = create_test_post("p2", "u1");
        let p2 = create_test_post("p1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[p1.clone(), p2.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.fetch_page_by_author("u1", 0, 10).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "p2");
    }

    #[tokio::test]
    async fn test_fetch_page_by_authors_empty_set_skips_query() {
        // No followees means an empty feed without touching the database.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.fetch_page_by_authors(&[], 0, 10).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(repo.count_by_authors(&[]).await.unwrap(), 0);
    }
}
