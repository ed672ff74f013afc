pub mod forms;
pub mod library;
pub mod media;
pub mod page;
