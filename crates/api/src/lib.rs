//! HTTP layer: router, endpoints, auth middleware, and response shapes.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
