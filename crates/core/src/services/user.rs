//! User service.

use sea_orm::Set;
use validator::Validate;
use zapis_common::{AppError, AppResult, IdGenerator};
use zapis_db::entities::user;
use zapis_db::repositories::UserRepository;

/// Input for registering a user.
#[derive(Debug, Clone, Validate)]
pub struct CreateUserInput {
    /// Unique handle, matched case-insensitively on lookup.
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Optional profile text.
    pub bio: Option<String>,
}

/// User service.
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    ids: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(users: UserRepository) -> Self {
        Self {
            users,
            ids: IdGenerator::new(),
        }
    }

    /// Register a new user and issue their access token.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                input.username
            )));
        }

        let model = user::ActiveModel {
            id: Set(self.ids.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            token: Set(Some(self.ids.generate_token())),
            name: Set(Some(input.name)),
            bio: Set(input.bio),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.users.create(model).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "registered user");
        Ok(created)
    }

    /// Look up a user by username, case-insensitively.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.users.get_by_username(username).await
    }

    /// Resolve an access token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.users
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
