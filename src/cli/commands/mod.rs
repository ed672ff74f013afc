mod genre;
mod summary;
mod user;

pub use genre::{cmd_genre_add, cmd_genre_list};
pub use summary::cmd_summary;
pub use user::{cmd_user_create, cmd_user_delete};
