pub mod envelope;
pub mod segment;
pub mod session;
pub mod template;
pub mod user;

pub use envelope::*;
pub use segment::*;
pub use session::*;
pub use template::*;
pub use user::*;
