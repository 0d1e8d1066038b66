use super::vectorizer::VectorSpace;

/// Dense pairwise cosine similarity over every document in a [`VectorSpace`]
///
/// Computed once at build time; memory is quadratic in the catalog size in
/// exchange for constant-time neighbor lookup.
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Computes the full matrix. Vectors in the space are L2-normalized, so
    /// cosine similarity reduces to the dot product; a zero vector scores 0
    /// against everything, itself included.
    pub fn from_space(space: &VectorSpace) -> Self {
        let size = space.len();
        let mut scores = vec![0.0; size * size];

        // term -> documents containing it, in document order
        let mut postings: Vec<Vec<(usize, f64)>> = vec![Vec::new(); space.vocabulary().len()];
        for (doc, vector) in space.vectors().iter().enumerate() {
            for &(term, weight) in vector.entries() {
                postings[term].push((doc, weight));
            }
        }

        for (i, vector) in space.vectors().iter().enumerate() {
            let row = &mut scores[i * size..(i + 1) * size];
            for &(term, weight) in vector.entries() {
                let list = &postings[term];
                let start = list.partition_point(|(doc, _)| *doc < i);
                for &(j, other) in &list[start..] {
                    row[j] += weight * other;
                }
            }
            row[i] = if vector.is_empty() { 0.0 } else { 1.0 };
        }

        for i in 0..size {
            for j in (i + 1)..size {
                let score = scores[i * size + j].clamp(0.0, 1.0);
                scores[i * size + j] = score;
                scores[j * size + i] = score;
            }
        }

        Self { size, scores }
    }

    /// Catalog size (the matrix is `len() x len()`)
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn score(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.size && j < self.size).then(|| self.scores[i * self.size + j])
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        (i < self.size).then(|| &self.scores[i * self.size..(i + 1) * self.size])
    }

    /// Row `i` as `(index, score)` pairs, highest score first; equal scores
    /// keep ascending index order
    pub fn ranked(&self, i: usize) -> Option<Vec<(usize, f64)>> {
        let mut ranked: Vec<(usize, f64)> = self.row(i)?.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Some(ranked)
    }
}
