use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where a user is with a title in their library.
///
/// There is no transition graph: a user may move an entry between any two
/// states. New entries start as [`WatchStatus::WantToWatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    #[default]
    WantToWatch,
    Dropped,
    Finished,
}

impl WatchStatus {
    pub const ALL: [Self; 4] = [
        Self::Watching,
        Self::WantToWatch,
        Self::Dropped,
        Self::Finished,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::WantToWatch => "want_to_watch",
            Self::Dropped => "dropped",
            Self::Finished => "finished",
        }
    }

    /// Legacy numeric code, still accepted in query strings and forms.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Watching => "1",
            Self::WantToWatch => "2",
            Self::Dropped => "3",
            Self::Finished => "4",
        }
    }

    /// Parses either the snake_case name or the numeric code.
    #[must_use]
    pub fn from_param(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw || status.code() == raw)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Select a valid choice. {0} is not one of the available choices.")]
pub struct UnknownStatus(pub String);

impl FromStr for WatchStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_param(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_want_to_watch() {
        assert_eq!(WatchStatus::default(), WatchStatus::WantToWatch);
    }

    #[test]
    fn parses_names_and_codes() {
        assert_eq!(WatchStatus::from_param("watching"), Some(WatchStatus::Watching));
        assert_eq!(WatchStatus::from_param("2"), Some(WatchStatus::WantToWatch));
        assert_eq!(WatchStatus::from_param(" 4 "), Some(WatchStatus::Finished));
        assert_eq!(WatchStatus::from_param("5"), None);
        assert_eq!(WatchStatus::from_param("Watching"), None);
    }

    #[test]
    fn from_str_reports_the_bad_value() {
        let err = "paused".parse::<WatchStatus>().unwrap_err();
        assert_eq!(err, UnknownStatus("paused".to_string()));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&WatchStatus::WantToWatch).unwrap();
        assert_eq!(json, "\"want_to_watch\"");
    }
}
