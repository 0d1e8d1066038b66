use std::{path::Path, time::Instant};

use crate::{
    catalog::{Catalog, Table},
    error::AppResult,
    models::{Movie, Recommendation, RecommendationResult},
};

use super::{
    similarity::SimilarityMatrix,
    title_search::{Resolution, TitleIndex},
    vectorizer::{TfidfVectorizer, VectorSpace},
};

const SEARCH_URL_BASE: &str = "https://www.imdb.com/find/?q=";
const SEARCH_URL_SUFFIX: &str = "&s=tt&ttype=ft";

/// Content-based movie recommender
///
/// Everything is built once by [`Recommender::build`] and read-only
/// afterwards, so a single instance can be shared across request handlers
/// behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    space: VectorSpace,
    similarity: SimilarityMatrix,
    titles: TitleIndex,
}

impl Recommender {
    /// Loads a catalog CSV and builds the index
    pub fn from_csv_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading catalog");
        let table = Table::from_csv_path(path)?;
        Self::build(&table)
    }

    /// Validates the table schema, then builds the vector space, similarity
    /// matrix and title lookup
    pub fn build(table: &Table) -> AppResult<Self> {
        let catalog = Catalog::from_table(table)?;
        Ok(Self::from_catalog(catalog))
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        let started = Instant::now();

        let space = TfidfVectorizer::for_catalog().fit_transform(&catalog.contents());
        tracing::info!(
            documents = space.len(),
            vocabulary = space.vocabulary().len(),
            "Vector space built"
        );

        let similarity = SimilarityMatrix::from_space(&space);
        let titles = TitleIndex::new(&catalog);

        tracing::info!(
            dimension = similarity.len(),
            distinct_titles = titles.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recommender ready"
        );

        Self {
            catalog,
            space,
            similarity,
            titles,
        }
    }

    /// Recommends up to `count` movies similar to `title`.
    ///
    /// On a miss the result carries spelling suggestions instead. Asking for
    /// more than the catalog holds returns everything but the movie itself.
    pub fn recommend(&self, title: &str, count: usize) -> RecommendationResult {
        let index = match self.titles.resolve(title) {
            Resolution::Found(index) => index,
            Resolution::NotFound { suggestions } => {
                tracing::debug!(
                    title = %title,
                    suggestions = suggestions.len(),
                    "Title not found"
                );
                return RecommendationResult::not_found(title.to_string(), suggestions);
            }
        };

        let (Some(movie), Some(ranked)) = (self.catalog.get(index), self.similarity.ranked(index))
        else {
            return RecommendationResult::not_found(title.to_string(), Vec::new());
        };

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .filter(|(other, _)| *other != index)
            .take(count)
            .filter_map(|(other, score)| {
                self.catalog
                    .get(other)
                    .map(|neighbor| to_recommendation(neighbor, score))
            })
            .collect();

        tracing::debug!(
            title = %movie.title,
            index,
            returned = recommendations.len(),
            "Recommendations assembled"
        );

        RecommendationResult::found(movie.title.clone(), recommendations)
    }

    /// Catalog titles spelled closest to `query`, in display casing
    pub fn suggest_titles(&self, query: &str, limit: usize) -> Vec<String> {
        self.titles.suggest(query, limit)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vector_space(&self) -> &VectorSpace {
        &self.space
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

fn to_recommendation(movie: &Movie, similarity: f64) -> Recommendation {
    Recommendation {
        title: movie.title.clone(),
        genres: movie.genres.clone(),
        overview: movie.overview.clone(),
        similarity,
        url: search_url(&movie.title),
    }
}

/// External title search link. Everything but ASCII alphanumerics, `-_.~`
/// and `/` is percent-encoded.
pub fn search_url(title: &str) -> String {
    let query = urlencoding::encode(title).replace("%2F", "/");
    format!("{}{}{}", SEARCH_URL_BASE, query, SEARCH_URL_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommender() -> Recommender {
        Recommender::from_catalog(Catalog::from_movies(vec![
            Movie::new(
                1,
                "A",
                Some(r#"[{"name": "Action"}]"#.to_string()),
                Some("A hero saves the city".to_string()),
            ),
            Movie::new(
                2,
                "B",
                Some(r#"[{"name": "Action"}]"#.to_string()),
                Some("A hero saves the world".to_string()),
            ),
            Movie::new(
                3,
                "C",
                Some(r#"[{"name": "Romance"}]"#.to_string()),
                Some("Two people fall in love".to_string()),
            ),
        ]))
    }

    #[test]
    fn test_similar_movie_ranks_first() {
        let result = recommender().recommend("A", 2);
        assert!(result.found);
        assert_eq!(result.input_title, "A");
        let titles: Vec<&str> = result.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert!(result.recommendations[0].similarity > result.recommendations[1].similarity);
        assert_eq!(result.recommendations[1].similarity, 0.0);
        assert_eq!(result.recommendations[0].genres, "Action");
    }

    #[test]
    fn test_count_is_clamped() {
        let rec = recommender();
        assert_eq!(rec.recommend("a", 10).recommendations.len(), 2);
        assert_eq!(rec.recommend("a", 1).recommendations.len(), 1);
        assert!(rec.recommend("a", 0).recommendations.is_empty());
        assert!(rec.recommend("a", 0).found);
    }

    #[test]
    fn test_miss_keeps_input_title() {
        let result = recommender().recommend("Zzzznotamovie", 5);
        assert!(!result.found);
        assert_eq!(result.input_title, "Zzzznotamovie");
        assert!(result.recommendations.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_search_url_encoding() {
        assert_eq!(
            search_url("The Dark Knight"),
            "https://www.imdb.com/find/?q=The%20Dark%20Knight&s=tt&ttype=ft"
        );
        assert_eq!(
            search_url("Face/Off"),
            "https://www.imdb.com/find/?q=Face/Off&s=tt&ttype=ft"
        );
        assert_eq!(
            search_url("Amélie & Co."),
            "https://www.imdb.com/find/?q=Am%C3%A9lie%20%26%20Co.&s=tt&ttype=ft"
        );
    }
}
