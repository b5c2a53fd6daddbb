use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Movie listings exposed by the metadata API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MovieCategory {
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
}

impl MovieCategory {
    pub const ALL: [MovieCategory; 4] = [
        Self::Popular,
        Self::TopRated,
        Self::Upcoming,
        Self::NowPlaying,
    ];

    /// Route segment and API path component for this listing.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::Upcoming => "upcoming",
            Self::NowPlaying => "now_playing",
        }
    }

    pub fn title(&self) -> String {
        title_from_route(self.as_str())
    }
}

impl fmt::Display for MovieCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovieCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| format!("unknown movie category '{value}'"))
    }
}

/// Turn a route name such as `now_playing` or `top-rated` into a display
/// title (`Now Playing`, `Top Rated`).
pub fn title_from_route(route: &str) -> String {
    route
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars).collect::<String>()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_titles() {
        assert_eq!(title_from_route("now_playing"), "Now Playing");
        assert_eq!(title_from_route("top-rated"), "Top Rated");
        assert_eq!(title_from_route("popular"), "Popular");
        assert_eq!(title_from_route(""), "");
    }

    #[test]
    fn parses_route_names() {
        assert_eq!(
            "top-rated".parse::<MovieCategory>(),
            Ok(MovieCategory::TopRated)
        );
        assert_eq!(
            "NOW_PLAYING".parse::<MovieCategory>(),
            Ok(MovieCategory::NowPlaying)
        );
        assert!("trending".parse::<MovieCategory>().is_err());
    }
}
