pub mod genre;
pub mod library;
pub mod media;
pub mod user;
