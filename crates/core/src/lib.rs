//! Core domain logic: services, access guards, and pagination.
//!
//! Services compose the repositories from `zapis-db` into the operations
//! the HTTP layer exposes. They own validation, authorization-adjacent
//! invariants (author immutability, self-follow rejection), and the
//! page-clamping rules shared by every feed.

pub mod guard;
pub mod pagination;
pub mod services;

pub use guard::Decision;
pub use pagination::{PAGE_SIZE, Page};
pub use services::{
    comment::CommentService,
    following::FollowingService,
    group::GroupService,
    post::{CreatePostInput, ImageUpload, PostService, UpdatePostInput},
    timeline::{AuthorFeed, PostDetail, TimelineService},
    user::UserService,
};
