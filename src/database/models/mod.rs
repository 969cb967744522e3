//! Persisted entity models.

pub mod user;
pub mod video;

pub use user::User;
pub use video::Video;
