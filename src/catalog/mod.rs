pub mod genres;
pub mod table;

pub use genres::{genres_text, parse_genre_names, MalformedFieldError};
pub use table::Table;

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

/// Columns every catalog must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["id", "title", "genres", "overview"];

/// Ordered, immutable sequence of catalog records.
///
/// Positions in the catalog are the identity used by the vector space and the
/// similarity matrix, so the record order is fixed at load time.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    /// Validates the schema and normalizes every row into a [`Movie`].
    ///
    /// Missing required columns and non-integer ids are fatal; malformed genre
    /// fields are not.
    pub fn from_table(table: &Table) -> AppResult<Self> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = table.column_index(name).ok_or_else(|| AppError::Schema {
                missing: name.to_string(),
                available: table.columns().to_vec(),
            })?;
        }
        let [id_col, title_col, genres_col, overview_col] = positions;

        let mut movies = Vec::with_capacity(table.len());
        for (row_index, row) in table.rows().iter().enumerate() {
            let cell = |col: usize| row.get(col).cloned().flatten();
            let id = parse_id(cell(id_col).as_deref(), row_index)?;
            movies.push(Movie::new(
                id,
                cell(title_col).unwrap_or_default(),
                cell(genres_col),
                cell(overview_col),
            ));
        }

        tracing::info!(records = movies.len(), "Catalog loaded");
        Ok(Self { movies })
    }

    pub fn from_movies(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Vectorizer input, one document per record in catalog order
    pub fn contents(&self) -> Vec<String> {
        self.movies.iter().map(Movie::content).collect()
    }
}

/// Ids are integers; CSV tools sometimes write them as `123.0`
fn parse_id(raw: Option<&str>, row: usize) -> AppResult<i64> {
    let raw = raw.map(str::trim).ok_or_else(|| AppError::InvalidRecord {
        row,
        reason: "missing id".to_string(),
    })?;

    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    match raw.parse::<f64>() {
        // `i64::MAX as f64` rounds up to 2^63, which is already out of range
        Ok(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(AppError::InvalidRecord {
            row,
            reason: format!("id '{}' is not an integer", raw),
        }),
    }
}
