use serde::Deserialize;

/// Which persistence backend holds the user's ratings
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Redis,
}

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the recommendation service
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where ratings are persisted
    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,

    /// Directory holding the ratings file (file backend)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Redis connection URL (redis backend)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Number of recommendations requested per exchange
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Neighbourhood size used by the service
    #[serde(default = "default_neighbor_count")]
    pub neighbor_count: u32,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::File
}

fn default_data_dir() -> String {
    ".music-recommender".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_max_results() -> u32 {
    20
}

fn default_neighbor_count() -> u32 {
    10
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_vars(Vec::new()).unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.storage_backend, StorageBackend::File);
        assert_eq!(config.data_dir, ".music-recommender");
        assert_eq!(config.max_results, 20);
        assert_eq!(config.neighbor_count, 10);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_vars(vars(&[
            ("API_URL", "https://recommender.example.com"),
            ("STORAGE_BACKEND", "redis"),
            ("MAX_RESULTS", "5"),
            ("NEIGHBOR_COUNT", "25"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://recommender.example.com");
        assert_eq!(config.storage_backend, StorageBackend::Redis);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.neighbor_count, 25);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Config::from_vars(vars(&[("STORAGE_BACKEND", "sqlite")]));
        assert!(result.is_err());
    }
}
