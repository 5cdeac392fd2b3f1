use tokio::sync::Mutex;

use crate::{
    db::{decode_or_empty, encode_ratings, RatingStore},
    error::AppResult,
    models::RatingMap,
};

/// Process-local store, holding the serialized mapping like the durable backends do
#[derive(Debug, Default)]
pub struct MemoryRatingStore {
    raw: Mutex<Option<String>>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an already-serialized value, valid or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    /// The currently stored serialized value
    pub async fn raw(&self) -> Option<String> {
        self.raw.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl RatingStore for MemoryRatingStore {
    async fn load(&self) -> RatingMap {
        let raw = self.raw.lock().await;
        decode_or_empty(raw.as_deref(), self.name())
    }

    async fn save(&self, ratings: &RatingMap) -> AppResult<()> {
        let json = encode_ratings(ratings)?;
        *self.raw.lock().await = Some(json);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_value_loads_empty() {
        let store = MemoryRatingStore::with_raw("not json at all");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_is_idempotent() {
        let store = MemoryRatingStore::new();
        let ratings = crate::db::decode_ratings(r#"{"Clocks": 3}"#).unwrap();

        store.save(&ratings).await.unwrap();
        let first = store.raw().await;
        store.save(&ratings).await.unwrap();

        assert_eq!(store.raw().await, first);
        assert_eq!(store.load().await, ratings);
    }
}
