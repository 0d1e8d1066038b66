use std::sync::Arc;

use crate::{config::Config, services::Recommender};

/// Shared application state
///
/// The recommender is built once before the server starts and never mutated,
/// so handlers share it without a lock.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub default_recommendations: usize,
    pub max_recommendations: usize,
}

impl AppState {
    /// Creates state around a built recommender
    pub fn new(recommender: Arc<Recommender>, config: &Config) -> Self {
        Self {
            recommender,
            default_recommendations: config.default_recommendations,
            max_recommendations: config.max_recommendations,
        }
    }
}
