use serde::{Deserialize, Serialize};

pub const FOUND_MESSAGE: &str = "Success";
pub const NOT_FOUND_MESSAGE: &str = "Movie not found in database.";

/// A single neighbor of the queried movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub genres: String,
    pub overview: String,
    /// Cosine similarity to the queried movie, in [0, 1]
    pub similarity: f64,
    /// External search link for the recommended title
    pub url: String,
}

/// Outcome of a recommendation query
///
/// `suggestions` is only populated when `found` is false; `recommendations`
/// only when it is true.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub found: bool,
    /// Canonical catalog title on a hit, the caller's text on a miss
    pub input_title: String,
    pub message: String,
    pub recommendations: Vec<Recommendation>,
    pub suggestions: Vec<String>,
}

impl RecommendationResult {
    pub fn found(input_title: String, recommendations: Vec<Recommendation>) -> Self {
        Self {
            found: true,
            input_title,
            message: FOUND_MESSAGE.to_string(),
            recommendations,
            suggestions: Vec::new(),
        }
    }

    pub fn not_found(input_title: String, suggestions: Vec<String>) -> Self {
        Self {
            found: false,
            input_title,
            message: NOT_FOUND_MESSAGE.to_string(),
            recommendations: Vec::new(),
            suggestions,
        }
    }
}
