use std::collections::HashMap;

use super::stop_words::StopWords;

pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// A sparse vector stored as `(term index, weight)` pairs sorted by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a vector from unsorted entries
    pub fn from_entries(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_by_key(|(index, _)| *index);
        Self { entries }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }
}

/// Fitted vocabulary plus one weighted vector per document, aligned with the
/// input order
#[derive(Debug, Clone, Default)]
pub struct VectorSpace {
    vocabulary: Vec<String>,
    term_index: HashMap<String, usize>,
    idf: Vec<f64>,
    vectors: Vec<SparseVector>,
}

impl VectorSpace {
    /// Terms in index order (lexicographic)
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.term_index.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|i| self.idf[i])
    }

    pub fn vector(&self, document: usize) -> Option<&SparseVector> {
        self.vectors.get(document)
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// Builder for a TF-IDF [`VectorSpace`].
///
/// Documents are lower-cased and split into word tokens of at least two
/// characters. Stop words are dropped before n-grams are formed, so a bigram
/// joins two tokens that were adjacent once stop words were removed. Weights
/// are raw term counts scaled by the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1`, and every document vector is L2-normalized.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    max_features: Option<usize>,
    ngram_range: (usize, usize),
    stop_words: StopWords,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TfidfVectorizer {
    /// Unigrams only, no stop words, unbounded vocabulary
    pub fn new() -> Self {
        Self {
            max_features: None,
            ngram_range: (1, 1),
            stop_words: StopWords::none(),
        }
    }

    /// The configuration used for catalog content: English stop words,
    /// unigrams and bigrams, at most 5000 terms
    pub fn for_catalog() -> Self {
        Self::new()
            .with_stop_words(StopWords::english())
            .with_ngram_range(1, 2)
            .with_max_features(DEFAULT_MAX_FEATURES)
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    #[must_use]
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    #[must_use]
    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Learns the vocabulary and weights from `documents` and returns their
    /// vectors.
    ///
    /// When more distinct terms exist than `max_features`, the terms with the
    /// highest total count across the corpus are kept (ties go to the
    /// lexicographically smaller term).
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> VectorSpace {
        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for term in self.analyze(doc.as_ref()) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        // term -> (corpus count, document frequency)
        let mut stats: HashMap<&str, (usize, usize)> = HashMap::new();
        for doc in &counts {
            for (term, count) in doc {
                let entry = stats.entry(term.as_str()).or_insert((0, 0));
                entry.0 += count;
                entry.1 += 1;
            }
        }

        let mut terms: Vec<(&str, usize, usize)> = stats
            .into_iter()
            .map(|(term, (total, df))| (term, total, df))
            .collect();
        if let Some(limit) = self.max_features {
            if terms.len() > limit {
                terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                terms.truncate(limit);
            }
        }
        terms.sort_by(|a, b| a.0.cmp(b.0));

        let n_docs = documents.len() as f64;
        let vocabulary: Vec<String> = terms.iter().map(|(t, _, _)| t.to_string()).collect();
        let idf: Vec<f64> = terms
            .iter()
            .map(|(_, _, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        let term_index: HashMap<String, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        if vocabulary.is_empty() && !documents.is_empty() {
            tracing::warn!(documents = documents.len(), "Empty vocabulary, all vectors are zero");
        }

        let vectors = counts
            .iter()
            .map(|doc| {
                let entries = doc
                    .iter()
                    .filter_map(|(term, count)| {
                        term_index
                            .get(term)
                            .map(|&i| (i, *count as f64 * idf[i]))
                    })
                    .collect();
                let mut vector = SparseVector::from_entries(entries);
                vector.normalize();
                vector
            })
            .collect();

        VectorSpace {
            vocabulary,
            term_index,
            idf,
            vectors,
        }
    }

    /// Terms produced for one document, with repetition
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens: Vec<String> = tokenize(text)
            .into_iter()
            .filter(|t| !self.stop_words.contains(t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

/// Lower-cases `text` and returns its runs of word characters that are at
/// least two characters long
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(
            tokenize("A hero's 2nd city-wide rescue, x!"),
            vec!["hero", "2nd", "city", "wide", "rescue"]
        );
    }

    #[test]
    fn test_bigrams_skip_stop_words() {
        let vectorizer = TfidfVectorizer::for_catalog();
        assert_eq!(
            vectorizer.analyze("A hero saves the city"),
            vec!["hero", "saves", "city", "hero saves", "saves city"]
        );
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let space = TfidfVectorizer::new().fit_transform(&["zebra apple", "mango apple"]);
        assert_eq!(space.vocabulary(), ["apple", "mango", "zebra"]);
        assert_eq!(space.term_index("mango"), Some(1));
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_smoothed_idf() {
        let space = TfidfVectorizer::new().fit_transform(&["zebra apple", "mango apple"]);
        let common = space.idf("apple").unwrap();
        let rare = space.idf("zebra").unwrap();
        assert!((common - 1.0).abs() < 1e-12);
        assert!((rare - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_vectors_are_unit_length() {
        let space = TfidfVectorizer::for_catalog().fit_transform(&[
            "Action A hero saves the city",
            "Romance Two people fall in love",
        ]);
        for vector in space.vectors() {
            assert!((vector.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_max_features_keeps_most_frequent_terms() {
        let space = TfidfVectorizer::new()
            .with_max_features(2)
            .fit_transform(&["apple apple banana", "apple cherry cherry", "date"]);
        assert_eq!(space.vocabulary(), ["apple", "cherry"]);
    }

    #[test]
    fn test_max_features_ties_break_lexicographically() {
        let space = TfidfVectorizer::new()
            .with_max_features(2)
            .fit_transform(&["delta charlie bravo alpha"]);
        assert_eq!(space.vocabulary(), ["alpha", "bravo"]);
    }

    #[test]
    fn test_out_of_vocabulary_terms_have_zero_weight() {
        let space = TfidfVectorizer::new()
            .with_max_features(1)
            .fit_transform(&["common common", "common rare"]);
        assert_eq!(space.vocabulary(), ["common"]);
        assert_eq!(space.vector(1).unwrap().entries().len(), 1);
    }

    #[test]
    fn test_empty_documents_yield_zero_vectors() {
        let space = TfidfVectorizer::for_catalog().fit_transform(&[" ", "the of and"]);
        assert!(space.vocabulary().is_empty());
        assert!(space.vectors().iter().all(SparseVector::is_empty));
    }

    #[test]
    fn test_sparse_dot() {
        let a = SparseVector::from_entries(vec![(3, 1.0), (0, 2.0)]);
        let b = SparseVector::from_entries(vec![(0, 0.5), (2, 4.0), (3, 3.0)]);
        assert_eq!(a.dot(&b), 4.0);
        assert_eq!(a.entries()[0], (0, 2.0));
    }
}
