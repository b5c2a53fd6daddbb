use serde::{Deserialize, Serialize};
use std::fmt;

/// Default TMDB image CDN root.
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Image kind plus the TMDB size variant to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSize {
    Poster(PosterSize),
    Backdrop(BackdropSize),
    Profile(ProfileSize),
}

impl ImageSize {
    /// Size used by poster cards (342px)
    pub const fn poster() -> Self {
        Self::Poster(PosterSize::W342)
    }

    /// Size used by backdrop cards (780px)
    pub const fn backdrop() -> Self {
        Self::Backdrop(BackdropSize::W780)
    }

    /// Size used by person cards (185px)
    pub const fn profile() -> Self {
        Self::Profile(ProfileSize::W185)
    }

    /// Path segment TMDB expects for this size, e.g. `w342`.
    pub const fn to_tmdb_param(&self) -> &'static str {
        match self {
            ImageSize::Poster(s) => s.as_str(),
            ImageSize::Backdrop(s) => s.as_str(),
            ImageSize::Profile(s) => s.as_str(),
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSize::Poster(s) => write!(f, "poster_{}", s.as_str()),
            ImageSize::Backdrop(s) => write!(f, "backdrop_{}", s.as_str()),
            ImageSize::Profile(s) => write!(f, "profile_{}", s.as_str()),
        }
    }
}

/// Poster sizes (2:3 aspect ratio)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum PosterSize {
    W92,
    W154,
    W185,
    #[default]
    W342,
    W500,
    W780,
    Original,
}

impl PosterSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::W92 => "w92",
            Self::W154 => "w154",
            Self::W185 => "w185",
            Self::W342 => "w342",
            Self::W500 => "w500",
            Self::W780 => "w780",
            Self::Original => "original",
        }
    }
}

/// Backdrop sizes (16:9 aspect ratio)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum BackdropSize {
    W300,
    #[default]
    W780,
    W1280,
    Original,
}

impl BackdropSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::W300 => "w300",
            Self::W780 => "w780",
            Self::W1280 => "w1280",
            Self::Original => "original",
        }
    }
}

/// Profile sizes for people
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum ProfileSize {
    W45,
    #[default]
    W185,
    H632,
    Original,
}

impl ProfileSize {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::W45 => "w45",
            Self::W185 => "w185",
            Self::H632 => "h632",
            Self::Original => "original",
        }
    }
}

/// Build an absolute image URL from an opaque API path.
///
/// Returns `None` when the entity carries no image for this kind.
pub fn image_url(
    base: &str,
    path: Option<&str>,
    size: ImageSize,
) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = base.trim_end_matches('/');
    let separator = if path.starts_with('/') { "" } else { "/" };

    Some(format!(
        "{}/{}{}{}",
        base,
        size.to_tmdb_param(),
        separator,
        path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_poster_url() {
        assert_eq!(
            image_url(TMDB_IMAGE_BASE, Some("/abc.jpg"), ImageSize::poster()),
            Some("https://image.tmdb.org/t/p/w342/abc.jpg".to_string())
        );
    }

    #[test]
    fn tolerates_trailing_slash_and_missing_leading_slash() {
        assert_eq!(
            image_url(
                "https://cdn.example/t/p/",
                Some("abc.jpg"),
                ImageSize::Backdrop(BackdropSize::Original)
            ),
            Some("https://cdn.example/t/p/original/abc.jpg".to_string())
        );
    }

    #[test]
    fn null_or_blank_path_has_no_url() {
        assert_eq!(image_url(TMDB_IMAGE_BASE, None, ImageSize::profile()), None);
        assert_eq!(
            image_url(TMDB_IMAGE_BASE, Some("  "), ImageSize::profile()),
            None
        );
    }
}
