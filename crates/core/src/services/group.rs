//! Group service.
//!
//! Groups are a curated taxonomy: the set changes rarely and only through
//! this service, while membership of posts in groups changes constantly.

use sea_orm::Set;
use validator::Validate;
use zapis_common::{AppError, AppResult, IdGenerator};
use zapis_db::entities::group;
use zapis_db::repositories::GroupRepository;

/// Input for creating a group.
#[derive(Debug, Clone, Validate)]
pub struct CreateGroupInput {
    /// Human-readable title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// URL-safe unique identifier.
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    /// Free-form description.
    #[validate(length(max = 700))]
    pub description: Option<String>,
}

/// Group service.
#[derive(Clone)]
pub struct GroupService {
    groups: GroupRepository,
    ids: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(groups: GroupRepository) -> Self {
        Self {
            groups,
            ids: IdGenerator::new(),
        }
    }

    /// List all groups.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.groups.list().await
    }

    /// Look up a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.groups.get_by_slug(slug).await
    }

    /// Create a new group.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        if self.groups.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "group slug '{}' already exists",
                input.slug
            )));
        }

        let model = group::ActiveModel {
            id: Set(self.ids.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.groups.create(model).await?;
        tracing::info!(group_id = %created.id, slug = %created.slug, "created group");
        Ok(created)
    }
}
