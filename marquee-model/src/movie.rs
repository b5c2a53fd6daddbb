use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    entity::{CatalogEntity, Namespace},
    error::NormalizeError,
    ids::MovieId,
};

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

/// Movie record as returned inside a listing page. Unknown fields are dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMovie {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieEntity {
    pub id: MovieId,
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f32,
    pub vote_count: u32,
    pub overview: String,
}

impl MovieEntity {
    /// Average vote, only once at least one vote has been cast.
    pub fn rating(&self) -> Option<f32> {
        (self.vote_count > 0).then_some(self.vote_average)
    }
}

impl CatalogEntity for MovieEntity {
    type Id = MovieId;
    type Raw = RawMovie;

    const NAMESPACE: Namespace = Namespace::Movies;

    fn id(&self) -> MovieId {
        self.id
    }

    fn normalize(raw: RawMovie) -> Result<Self, NormalizeError> {
        let id = raw.id.ok_or(NormalizeError::MissingId {
            namespace: Namespace::Movies,
        })?;

        Ok(Self {
            id: MovieId(id),
            title: raw.title.unwrap_or_default(),
            release_date: raw.release_date,
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            vote_average: raw.vote_average.unwrap_or_default(),
            vote_count: raw.vote_count.unwrap_or_default(),
            overview: raw.overview.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_declared_fields_and_drops_the_rest() {
        let raw: RawMovie = serde_json::from_str(
            r#"{
                "id": 550,
                "title": "Fight Club",
                "release_date": "1999-10-15",
                "poster_path": "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
                "backdrop_path": null,
                "vote_average": 8.4,
                "vote_count": 27000,
                "overview": "A ticking-time-bomb insomniac...",
                "genre_ids": [18],
                "adult": false
            }"#,
        )
        .expect("raw movie");

        let movie = MovieEntity::normalize(raw).expect("normalized");
        assert_eq!(movie.id, MovieId(550));
        assert_eq!(movie.title, "Fight Club");
        assert_eq!(
            movie.release_date,
            NaiveDate::from_ymd_opt(1999, 10, 15)
        );
        assert_eq!(movie.backdrop_path, None);
        assert_eq!(movie.vote_count, 27000);
        assert_eq!(movie.rating(), Some(8.4));
    }

    #[test]
    fn blank_release_date_becomes_none() {
        let raw: RawMovie =
            serde_json::from_str(r#"{"id": 1, "release_date": ""}"#)
                .expect("raw movie");
        assert_eq!(raw.release_date, None);
    }

    #[test]
    fn record_without_id_is_rejected() {
        let raw: RawMovie = serde_json::from_str(r#"{"title": "Untitled"}"#)
            .expect("raw movie");

        assert_eq!(
            MovieEntity::normalize(raw),
            Err(NormalizeError::MissingId {
                namespace: Namespace::Movies
            })
        );
    }

    #[test]
    fn rating_hidden_without_votes() {
        let movie = MovieEntity::normalize(RawMovie {
            id: Some(7),
            vote_average: Some(6.0),
            vote_count: Some(0),
            ..RawMovie::default()
        })
        .expect("normalized");

        assert_eq!(movie.rating(), None);
    }
}
