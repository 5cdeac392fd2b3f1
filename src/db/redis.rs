use ::redis::{AsyncCommands, Client};

use crate::{
    db::{decode_or_empty, encode_ratings, RatingStore, RATINGS_KEY},
    error::AppResult,
    models::RatingMap,
};

/// Ratings kept under a single Redis key
#[derive(Clone)]
pub struct RedisRatingStore {
    redis_client: Client,
    key: String,
}

impl RedisRatingStore {
    /// Creates a store for the given Redis URL
    ///
    /// Only parses the URL; connections are opened per operation.
    pub fn open(redis_url: &str) -> AppResult<Self> {
        Ok(Self::new(Client::open(redis_url)?))
    }

    pub fn new(redis_client: Client) -> Self {
        Self::with_key(redis_client, RATINGS_KEY)
    }

    /// Uses a custom key, e.g. to keep test sessions apart
    pub fn with_key(redis_client: Client, key: impl Into<String>) -> Self {
        Self {
            redis_client,
            key: key.into(),
        }
    }

    async fn read_raw(&self) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(&self.key).await?;
        Ok(raw)
    }
}

#[async_trait::async_trait]
impl RatingStore for RedisRatingStore {
    async fn load(&self) -> RatingMap {
        match self.read_raw().await {
            Ok(raw) => decode_or_empty(raw.as_deref(), self.name()),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Redis read failed, starting empty");
                RatingMap::new()
            }
        }
    }

    async fn save(&self, ratings: &RatingMap) -> AppResult<()> {
        let json = encode_ratings(ratings)?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(&self.key, json).await?;

        tracing::debug!(key = %self.key, count = ratings.len(), "Ratings saved");

        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
