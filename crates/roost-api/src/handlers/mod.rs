pub mod health;
pub mod media;
pub mod timeline;
pub mod tweet;
