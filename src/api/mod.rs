pub mod auth;
pub mod middleware;
pub mod router;
pub mod segments;
pub mod templates;

pub use middleware::*;
