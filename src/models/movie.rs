use serde::{Deserialize, Serialize};

use crate::catalog::genres::genres_text;

/// A single catalog entry, immutable once loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Catalog identifier (TMDB id)
    pub id: i64,
    /// Display title, not guaranteed unique
    pub title: String,
    /// Raw genre field as it appeared in the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_genres: Option<String>,
    /// Plot synopsis, empty when the catalog had none
    pub overview: String,
    /// Genre names flattened into a space-separated string
    pub genres: String,
}

impl Movie {
    /// Builds a movie from raw catalog fields, normalizing genres and overview
    pub fn new(
        id: i64,
        title: impl Into<String>,
        raw_genres: Option<String>,
        overview: Option<String>,
    ) -> Self {
        let genres = genres_text(raw_genres.as_deref());
        Self {
            id,
            title: title.into(),
            raw_genres,
            overview: overview.unwrap_or_default(),
            genres,
        }
    }

    /// Text fed to the vectorizer: genre labels followed by the overview
    pub fn content(&self) -> String {
        format!("{} {}", self.genres, self.overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_movie_flattens_genres() {
        let movie = Movie::new(
            27205,
            "Inception",
            Some(r#"[{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]"#.to_string()),
            Some("Cobb steals secrets from dreams.".to_string()),
        );
        assert_eq!(movie.genres, "Action Science Fiction");
        assert_eq!(
            movie.content(),
            "Action Science Fiction Cobb steals secrets from dreams."
        );
    }

    #[test]
    fn test_missing_fields_become_empty_strings() {
        let movie = Movie::new(1, "Untitled", None, None);
        assert_eq!(movie.genres, "");
        assert_eq!(movie.overview, "");
        assert_eq!(movie.content(), " ");
    }

    #[test]
    fn test_raw_genres_not_serialized_when_absent() {
        let movie = Movie::new(1, "Untitled", None, None);
        let json = serde_json::to_value(&movie).unwrap();
        assert!(json.get("raw_genres").is_none());
        assert_eq!(json["title"], "Untitled");
    }
}
