pub use super::genres::Entity as Genres;
pub use super::users::Entity as Users;
