//! Post service.
//!
//! Post creation stores the image blob before inserting the record, so a
//! failed store never leaves a post pointing at a missing image. Edits
//! never touch the author or the publication timestamp.

use std::sync::Arc;

use sea_orm::{IntoActiveModel, Set};
use validator::Validate;
use zapis_common::{AppResult, IdGenerator, StorageBackend, generate_storage_key};
use zapis_db::entities::{post, user};
use zapis_db::repositories::{GroupRepository, PostRepository};

/// An uploaded image, decoded from the request body.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original filename, used only for its extension.
    pub filename: String,
    /// MIME content type.
    pub content_type: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// Input for creating a post.
#[derive(Debug, Validate)]
pub struct CreatePostInput {
    /// Body text.
    #[validate(length(min = 1, max = 700))]
    pub text: String,
    /// Slug of the group to publish into, if any.
    pub group_slug: Option<String>,
    /// Attached image, if any.
    pub image: Option<ImageUpload>,
}

/// Input for editing a post.
#[derive(Debug, Validate)]
pub struct UpdatePostInput {
    /// Replacement body text.
    #[validate(length(min = 1, max = 700))]
    pub text: String,
    /// Replacement group slug; `None` detaches the post from its group.
    pub group_slug: Option<String>,
    /// Replacement image; `None` keeps the current one.
    pub image: Option<ImageUpload>,
}

/// Post service.
#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
    groups: GroupRepository,
    storage: Arc<dyn StorageBackend>,
    ids: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        posts: PostRepository,
        groups: GroupRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            posts,
            groups,
            storage,
            ids: IdGenerator::new(),
        }
    }

    /// Publish a new post by `author`.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let group_id = match &input.group_slug {
            Some(slug) => Some(self.groups.get_by_slug(slug).await?.id),
            None => None,
        };

        let id = self.ids.generate();

        // The blob goes in first; if the store fails, no record exists.
        let image_key = match &input.image {
            Some(image) => Some(self.store_image(&id, image).await?),
            None => None,
        };

        let model = post::ActiveModel {
            id: Set(id),
            user_id: Set(author.id.clone()),
            group_id: Set(group_id),
            text: Set(input.text),
            image_key: Set(image_key),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.posts.create(model).await?;
        tracing::info!(post_id = %created.id, author = %author.username, "published post");
        Ok(created)
    }

    /// Edit an existing post. Authorization happens upstream; this only
    /// rewrites text, group, and image, leaving author and timestamp as
    /// they were.
    pub async fn update(
        &self,
        existing: post::Model,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let group_id = match &input.group_slug {
            Some(slug) => Some(self.groups.get_by_slug(slug).await?.id),
            None => None,
        };

        let new_image_key = match &input.image {
            Some(image) => Some(self.store_image(&existing.id, image).await?),
            None => None,
        };

        let mut model = existing.into_active_model();
        model.text = Set(input.text);
        model.group_id = Set(group_id);
        if let Some(key) = new_image_key {
            model.image_key = Set(Some(key));
        }

        self.posts.update(model).await
    }

    /// Load a post by id.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.posts.get_by_id(id).await
    }

    async fn store_image(&self, post_id: &str, image: &ImageUpload) -> AppResult<String> {
        let key = generate_storage_key(post_id, &image.filename);
        self.storage
            .upload(&key, &image.data, &image.content_type)
            .await?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use zapis_common::{AppError, StoredFile};

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

    fn create_test_post(id: &str, user_id: &str, text: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            group_id: None,
            text: text.to_string(),
            image_key: None,
            created_at: Utc::now().into(),
        }
    }

    /// Records uploads instead of writing anywhere.
    #[derive(Default)]
    struct RecordingStorage {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl StorageBackend for RecordingStorage {
        async fn upload(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> AppResult<StoredFile> {
            self.uploads.lock().unwrap().push(key.to_string());
            Ok(StoredFile {
                key: key.to_string(),
                url: format!("/files/{key}"),
                size: data.len() as u64,
                content_type: content_type.to_string(),
                md5: String::new(),
            })
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/files/{key}")
        }

        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(true)
        }
    }

    /// Always fails to store.
    struct BrokenStorage;

    #[async_trait::async_trait]
    impl StorageBackend for BrokenStorage {
        async fn upload(
            &self,
            _key: &str,
            _data: &[u8],
            _content_type: &str,
        ) -> AppResult<StoredFile> {
            Err(AppError::Storage("disk full".to_string()))
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            key.to_string()
        }

        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    fn service_with(
        db: MockDatabase,
        storage: Arc<dyn StorageBackend>,
    ) -> PostService {
        let conn = Arc::new(db.into_connection());
        PostService::new(
            PostRepository::new(conn.clone()),
            GroupRepository::new(conn),
            storage,
        )
    }

    #[tokio::test]
    async fn test_create_stores_image_before_record() {
        let alice = create_test_user("u1", "alice");
        let mut created = create_test_post("p1", "u1", "look at this cat");
        created.image_key = Some("posts/2026/08/p1.png".to_string());

        let storage = Arc::new(RecordingStorage::default());
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[created]]),
            storage.clone(),
        );

        let post = service
            .create(
                &alice,
                CreatePostInput {
                    text: "look at this cat".to_string(),
                    group_slug: None,
                    image: Some(ImageUpload {
                        filename: "cat.png".to_string(),
                        content_type: "image/png".to_string(),
                        data: vec![1, 2, 3],
                    }),
                },
            )
            .await
            .unwrap();

        assert!(post.image_key.is_some());
        let uploads = storage.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].starts_with("posts/"));
        assert!(uploads[0].ends_with(".png"));
    }

    #[tokio::test]
    async fn test_create_failed_store_leaves_no_record() {
        let alice = create_test_user("u1", "alice");

        // No query results: if the insert were attempted it would fail
        // with a mock error, not a storage error.
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(BrokenStorage),
        );

        let result = service
            .create(
                &alice,
                CreatePostInput {
                    text: "doomed".to_string(),
                    group_slug: None,
                    image: Some(ImageUpload {
                        filename: "cat.png".to_string(),
                        content_type: "image/png".to_string(),
                        data: vec![1],
                    }),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_text() {
        let alice = create_test_user("u1", "alice");
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            Arc::new(RecordingStorage::default()),
        );

        let result = service
            .create(
                &alice,
                CreatePostInput {
                    text: String::new(),
                    group_slug: None,
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_unknown_group() {
        let alice = create_test_user("u1", "alice");
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<zapis_db::entities::group::Model>::new()]),
            Arc::new(RecordingStorage::default()),
        );

        let result = service
            .create(
                &alice,
                CreatePostInput {
                    text: "into the void".to_string(),
                    group_slug: Some("missing".to_string()),
                    image: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rewrites_text() {
        let existing = create_test_post("p1", "u1", "old text");
        let mut updated = existing.clone();
        updated.text = "new text".to_string();

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[updated]]),
            Arc::new(RecordingStorage::default()),
        );

        let post = service
            .update(
                existing,
                UpdatePostInput {
                    text: "new text".to_string(),
                    group_slug: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(post.text, "new text");
        assert_eq!(post.user_id, "u1");
    }
}
