use std::collections::HashMap;

use crate::catalog::Catalog;

use super::close_match::get_close_matches;

pub const SUGGESTION_LIMIT: usize = 5;
pub const SUGGESTION_CUTOFF: f64 = 0.4;

/// Outcome of resolving a free-text title
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Catalog position of the matching record
    Found(usize),
    /// No exact match; closest titles in display casing, best first
    NotFound { suggestions: Vec<String> },
}

/// Case-insensitive title lookup over a catalog
///
/// When several records share a title up to case, the first one in catalog
/// order owns it. Later duplicates remain in the catalog but cannot be
/// reached by title.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    /// lower-cased title -> catalog position
    lookup: HashMap<String, usize>,
    /// distinct lower-cased titles, first-seen order
    keys: Vec<String>,
    /// display casing for each lower-cased title
    display: HashMap<String, String>,
}

impl TitleIndex {
    pub fn new(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        for (position, movie) in catalog.movies().iter().enumerate() {
            let key = movie.title.to_lowercase();
            if index.lookup.contains_key(&key) {
                tracing::debug!(title = %movie.title, position, "Duplicate title, keeping first");
                continue;
            }
            index.lookup.insert(key.clone(), position);
            index.display.insert(key.clone(), movie.title.clone());
            index.keys.push(key);
        }
        index
    }

    /// Resolves `query` to a catalog position, falling back to suggestions.
    /// A blank query is not found and gets no suggestions.
    pub fn resolve(&self, query: &str) -> Resolution {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Resolution::NotFound {
                suggestions: Vec::new(),
            };
        }

        match self.lookup.get(&normalized) {
            Some(&position) => Resolution::Found(position),
            None => Resolution::NotFound {
                suggestions: self.close_titles(&normalized, SUGGESTION_LIMIT),
            },
        }
    }

    /// Up to `limit` catalog titles spelled closest to `query`
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Vec::new();
        }
        self.close_titles(&normalized, limit)
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn close_titles(&self, normalized: &str, limit: usize) -> Vec<String> {
        get_close_matches(
            normalized,
            self.keys.iter().map(String::as_str),
            limit,
            SUGGESTION_CUTOFF,
        )
        .into_iter()
        .filter_map(|key| self.display.get(key).cloned())
        .collect()
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Movie;

    fn catalog(titles: &[&str]) -> Catalog {
        Catalog::from_movies(
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| Movie::new(i as i64, *t, None, None))
                .collect(),
        )
    }

    #[test]
    fn test_exact_match_ignores_case_and_whitespace() {
        let index = TitleIndex::new(&catalog(&["Avatar", "Inception", "The Dark Knight"]));
        assert_eq!(index.resolve("Inception"), Resolution::Found(1));
        assert_eq!(index.resolve("  inCEPTION "), Resolution::Found(1));
        assert_eq!(index.resolve("the dark knight"), Resolution::Found(2));
    }

    #[test]
    fn test_miss_suggests_original_casing() {
        let index = TitleIndex::new(&catalog(&["Avatar", "Inception", "The Dark Knight"]));
        match index.resolve("Inceptoin") {
            Resolution::NotFound { suggestions } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Inception"));
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_query_has_no_suggestions() {
        let index = TitleIndex::new(&catalog(&["Avatar", ""]));
        assert_eq!(
            index.resolve("   "),
            Resolution::NotFound {
                suggestions: vec![]
            }
        );
        assert!(index.suggest("", 5).is_empty());
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first() {
        let index = TitleIndex::new(&catalog(&["The Host", "Alien", "the host"]));
        assert_eq!(index.resolve("THE HOST"), Resolution::Found(0));
        assert_eq!(index.len(), 2);
        assert_eq!(index.suggest("the hots", 5), vec!["The Host".to_string()]);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let index = TitleIndex::new(&catalog(&[
            "Saw", "Saw II", "Saw III", "Saw IV", "Saw V", "Saw VI", "Saw 3D",
        ]));
        let suggestions = index.suggest("saw x", 5);
        assert_eq!(suggestions.len(), 5);
        assert!(index.suggest("saw x", 2).len() == 2);
    }

    #[test]
    fn test_unrelated_query_has_no_suggestions() {
        let index = TitleIndex::new(&catalog(&["A", "B", "C"]));
        assert_eq!(
            index.resolve("Zzzznotamovie"),
            Resolution::NotFound {
                suggestions: vec![]
            }
        );
    }
}
