pub mod prelude;

pub mod genres;
pub mod users;
