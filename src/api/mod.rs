pub mod backend;
pub mod geocode;
pub mod moderation;

pub use backend::{BackendClient, BackendError};
pub use geocode::reverse_geocode;
pub use moderation::{ModerationVerdict, verify_image};
