//! Domain services.

pub mod comment;
pub mod following;
pub mod group;
pub mod post;
pub mod timeline;
pub mod user;
