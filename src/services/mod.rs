pub mod auth_service;
pub mod google_auth_service;
pub mod segmentation_service;
pub mod template_service;

pub use auth_service::*;
pub use google_auth_service::*;
pub use segmentation_service::*;
pub use template_service::*;
