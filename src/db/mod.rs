/// Rating persistence
///
/// The user's rating mapping is the only client state that survives a restart.
/// Every backend stores it as one flat JSON object (song name → stars) under the
/// fixed identifier [`RATINGS_KEY`]. Loading fails soft: a missing or corrupt
/// value yields an empty mapping and is never surfaced to the caller.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    config::{Config, StorageBackend},
    error::AppResult,
    models::{Rating, RatingMap},
};

pub mod file;
pub mod memory;
pub mod redis;

pub use file::FileRatingStore;
pub use memory::MemoryRatingStore;
pub use redis::RedisRatingStore;

/// Fixed identifier the rating mapping is stored under
pub const RATINGS_KEY: &str = "musicRecommenderRatings";

/// Durable storage for the rating mapping
#[async_trait::async_trait]
pub trait RatingStore: Send + Sync {
    /// Returns the stored mapping, or an empty one if nothing usable is stored
    async fn load(&self) -> RatingMap;

    /// Overwrites the stored mapping unconditionally
    async fn save(&self, ratings: &RatingMap) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Builds the store selected by configuration
pub fn create_store(config: &Config) -> AppResult<Arc<dyn RatingStore>> {
    let store: Arc<dyn RatingStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(FileRatingStore::in_dir(&config.data_dir)),
        StorageBackend::Redis => Arc::new(RedisRatingStore::open(&config.redis_url)?),
    };

    tracing::info!(backend = store.name(), "Rating store configured");

    Ok(store)
}

/// Parses a stored mapping, dropping entries whose value is not a valid rating
pub fn decode_ratings(raw: &str) -> AppResult<RatingMap> {
    let stored: BTreeMap<String, i64> = serde_json::from_str(raw)?;

    let mut ratings = RatingMap::new();
    for (song, value) in stored {
        match Rating::try_from(value) {
            Ok(rating) => {
                ratings.insert(song, rating);
            }
            Err(e) => {
                tracing::warn!(song = %song, error = %e, "Dropping invalid stored rating");
            }
        }
    }

    Ok(ratings)
}

pub fn encode_ratings(ratings: &RatingMap) -> AppResult<String> {
    serde_json::to_string(ratings)
        .map_err(|e| crate::error::AppError::Storage(format!("Rating serialization error: {}", e)))
}

/// Soft-fail decoding shared by the backends
pub(crate) fn decode_or_empty(raw: Option<&str>, backend: &'static str) -> RatingMap {
    let Some(raw) = raw else {
        tracing::debug!(backend, "No stored ratings");
        return RatingMap::new();
    };

    match decode_ratings(raw) {
        Ok(ratings) => {
            tracing::debug!(backend, count = ratings.len(), "Loaded stored ratings");
            ratings
        }
        Err(e) => {
            tracing::warn!(backend, error = %e, "Stored ratings unreadable, starting empty");
            RatingMap::new()
        }
    }
}
