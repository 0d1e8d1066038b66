pub mod close_match;
pub mod recommendations;
pub mod similarity;
pub mod stop_words;
pub mod title_search;
pub mod vectorizer;

pub use recommendations::Recommender;
pub use similarity::SimilarityMatrix;
pub use title_search::{Resolution, TitleIndex};
pub use vectorizer::{TfidfVectorizer, VectorSpace};
