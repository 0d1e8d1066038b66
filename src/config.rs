use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the movie catalog CSV (TMDB export layout)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendations returned when the request does not ask for a count
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Upper bound on the count a single request may ask for
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_catalog_path() -> String {
    "data/tmdb_5000_movies.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_recommendations() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            host: default_host(),
            port: default_port(),
            default_recommendations: default_recommendations(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.catalog_path, "data/tmdb_5000_movies.csv");
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_recommendations, 5);
        assert_eq!(config.max_recommendations, 50);
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            ("CATALOG_PATH".to_string(), "/srv/movies.csv".to_string()),
            ("PORT".to_string(), "8080".to_string()),
            ("DEFAULT_RECOMMENDATIONS".to_string(), "10".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.catalog_path, "/srv/movies.csv");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.default_recommendations, 10);
    }
}
