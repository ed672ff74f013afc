/// Items per catalog or library page unless `catalog.page_size` overrides it.
pub const PAGE_SIZE: u64 = 50;

pub mod limits {

    pub const TITLE_MAX_LEN: usize = 255;

    pub const GENRE_NAME_MAX_LEN: usize = 25;

    pub const USERNAME_MAX_LEN: usize = 150;

    pub const PASSWORD_MIN_LEN: usize = 8;
}

pub mod session {

    pub const USER_ID_KEY: &str = "user_id";
}
