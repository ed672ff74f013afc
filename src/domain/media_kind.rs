use serde::Serialize;
use std::fmt;

/// The four catalogs a user can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Anime,
    Series,
    Cartoon,
}

/// Sort keys a list request may ask for.
///
/// Only title sorts ascending; the numeric fields sort newest/largest first,
/// which is what the `-` prefix in the query parameter expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderField {
    #[default]
    Title,
    YearReleasedDesc,
    SeasonsDesc,
    EpisodesDesc,
}

impl OrderField {
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::YearReleasedDesc => "-year_released",
            Self::SeasonsDesc => "-seasons",
            Self::EpisodesDesc => "-episodes",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::YearReleasedDesc => "Newest first",
            Self::SeasonsDesc => "Most seasons",
            Self::EpisodesDesc => "Most episodes",
        }
    }

    #[must_use]
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "title" => Some(Self::Title),
            "-year_released" => Some(Self::YearReleasedDesc),
            "-seasons" => Some(Self::SeasonsDesc),
            "-episodes" => Some(Self::EpisodesDesc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_descending(self) -> bool {
        !matches!(self, Self::Title)
    }
}

/// Static description of how one media kind is stored and sorted.
///
/// A single generic query layer is parameterised by this instead of having
/// per-kind copies of the list and mutation code.
#[derive(Debug)]
pub struct KindDescriptor {
    pub kind: MediaKind,
    pub table: &'static str,
    pub genre_table: &'static str,
    pub link_table: &'static str,
    pub order_fields: &'static [OrderField],
    /// Movies have no seasons/episodes columns at all.
    pub has_episodes: bool,
}

impl KindDescriptor {
    #[must_use]
    pub fn allows(&self, field: OrderField) -> bool {
        self.order_fields.contains(&field)
    }

    /// Resolves a raw `order` parameter against the allow-list, falling
    /// back to title order for anything absent or not allowed.
    #[must_use]
    pub fn resolve_order(&self, raw: Option<&str>) -> OrderField {
        raw.and_then(OrderField::from_param)
            .filter(|field| self.allows(*field))
            .unwrap_or_default()
    }
}

const MOVIE_ORDER: &[OrderField] = &[OrderField::Title, OrderField::YearReleasedDesc];

const EPISODIC_ORDER: &[OrderField] = &[
    OrderField::Title,
    OrderField::YearReleasedDesc,
    OrderField::SeasonsDesc,
    OrderField::EpisodesDesc,
];

static MOVIE: KindDescriptor = KindDescriptor {
    kind: MediaKind::Movie,
    table: "movies",
    genre_table: "movie_genres",
    link_table: "user_movie_data",
    order_fields: MOVIE_ORDER,
    has_episodes: false,
};

static ANIME: KindDescriptor = KindDescriptor {
    kind: MediaKind::Anime,
    table: "anime",
    genre_table: "anime_genres",
    link_table: "user_anime_data",
    order_fields: EPISODIC_ORDER,
    has_episodes: true,
};

static SERIES: KindDescriptor = KindDescriptor {
    kind: MediaKind::Series,
    table: "series",
    genre_table: "series_genres",
    link_table: "user_series_data",
    order_fields: EPISODIC_ORDER,
    has_episodes: true,
};

static CARTOON: KindDescriptor = KindDescriptor {
    kind: MediaKind::Cartoon,
    table: "cartoons",
    genre_table: "cartoon_genres",
    link_table: "user_cartoon_data",
    order_fields: EPISODIC_ORDER,
    has_episodes: true,
};

impl MediaKind {
    pub const ALL: [Self; 4] = [Self::Movie, Self::Anime, Self::Series, Self::Cartoon];

    #[must_use]
    pub const fn descriptor(self) -> &'static KindDescriptor {
        match self {
            Self::Movie => &MOVIE,
            Self::Anime => &ANIME,
            Self::Series => &SERIES,
            Self::Cartoon => &CARTOON,
        }
    }

    /// Path segment used by the HTTP routes.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Anime => "anime",
            Self::Series => "series",
            Self::Cartoon => "cartoons",
        }
    }

    /// Accepts both the singular and the plural route segment.
    #[must_use]
    pub fn from_slug(raw: &str) -> Option<Self> {
        match raw {
            "movie" | "movies" => Some(Self::Movie),
            "anime" => Some(Self::Anime),
            "series" => Some(Self::Series),
            "cartoon" | "cartoons" => Some(Self::Cartoon),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Movie => "Movie",
            Self::Anime => "Anime",
            Self::Series => "Series",
            Self::Cartoon => "Cartoon",
        };
        f.write_str(name)
    }
}
