use std::path::{Path, PathBuf};

use crate::{
    db::{decode_or_empty, encode_ratings, RatingStore, RATINGS_KEY},
    error::AppResult,
    models::RatingMap,
};

/// Ratings kept as a JSON file on the local filesystem
#[derive(Debug, Clone)]
pub struct FileRatingStore {
    path: PathBuf,
}

impl FileRatingStore {
    /// Stores ratings at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stores ratings as `<dir>/musicRecommenderRatings.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", RATINGS_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl RatingStore for FileRatingStore {
    async fn load(&self) -> RatingMap {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => decode_or_empty(Some(&raw), self.name()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => decode_or_empty(None, self.name()),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read ratings file, starting empty"
                );
                RatingMap::new()
            }
        }
    }

    async fn save(&self, ratings: &RatingMap) -> AppResult<()> {
        let json = encode_ratings(ratings)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename so a crash never leaves a truncated file behind
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            count = ratings.len(),
            "Ratings saved"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;

    fn ratings(entries: &[(&str, u8)]) -> RatingMap {
        entries
            .iter()
            .map(|(song, value)| (song.to_string(), Rating::new(*value).unwrap()))
            .collect()
    }

    #[test]
    fn test_in_dir_uses_fixed_key() {
        let store = FileRatingStore::in_dir("/tmp/data");
        assert_eq!(
            store.path(),
            Path::new("/tmp/data/musicRecommenderRatings.json")
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRatingStore::in_dir(dir.path());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRatingStore::in_dir(dir.path().join("nested"));
        let expected = ratings(&[("Clocks", 4), ("Yellow", 1)]);

        tokio_test::assert_ok!(store.save(&expected).await);

        assert_eq!(store.load().await, expected);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRatingStore::in_dir(dir.path());

        store.save(&ratings(&[("Clocks", 4)])).await.unwrap();
        store.save(&RatingMap::new()).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "{}");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRatingStore::in_dir(dir.path());
        std::fs::write(store.path(), "{\"Clocks\": ").unwrap();

        assert!(store.load().await.is_empty());
    }
}
