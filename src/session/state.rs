use clap::ValueEnum;

use crate::models::{CatalogStats, Rating, RatingMap, RecommendationResult, Song};

/// Number of distinct rated songs required before recommendations can be requested
pub const MIN_RATINGS_FOR_RECOMMENDATION: usize = 10;

/// Which songs the catalog view shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SongFilter {
    #[default]
    All,
    Rated,
    Unrated,
}

/// In-memory record of one user's session
///
/// All queries here are pure; mutation goes through the rating controller and
/// the recommendation orchestrator.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Catalog in server order. This order defines evaluation vector positions.
    pub catalog: Vec<Song>,
    pub ratings: RatingMap,
    pub last_result: Option<RecommendationResult>,
    pub stats: Option<CatalogStats>,
    pub filter: SongFilter,
    pub search_query: String,
    /// Bumped on every reset so in-flight exchanges can detect they are stale
    pub(crate) generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rated_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_eligible_for_recommendation(&self) -> bool {
        self.rated_count() >= MIN_RATINGS_FOR_RECOMMENDATION
    }

    /// How many more distinct ratings are needed before becoming eligible
    pub fn ratings_needed(&self) -> usize {
        MIN_RATINGS_FOR_RECOMMENDATION.saturating_sub(self.rated_count())
    }

    /// Share of the catalog the user has rated, in percent
    pub fn progress_percent(&self) -> f64 {
        if self.catalog.is_empty() {
            return 0.0;
        }
        self.rated_count() as f64 / self.catalog.len() as f64 * 100.0
    }

    pub fn rating_of(&self, song: &str) -> Option<Rating> {
        self.ratings.get(song).copied()
    }

    /// Catalog filtered by the search query (case-insensitive substring), then by the filter
    pub fn visible_songs(&self) -> Vec<&Song> {
        let query = self.search_query.to_lowercase();

        self.catalog
            .iter()
            .filter(|song| query.is_empty() || song.to_lowercase().contains(&query))
            .filter(|song| match self.filter {
                SongFilter::All => true,
                SongFilter::Rated => self.ratings.contains_key(song.as_str()),
                SongFilter::Unrated => !self.ratings.contains_key(song.as_str()),
            })
            .collect()
    }

    /// One entry per catalog song in catalog order: its rating, or 0 if unrated
    pub fn evaluation_vector(&self) -> Vec<u8> {
        self.catalog
            .iter()
            .map(|song| self.rating_of(song).map(Rating::value).unwrap_or(0))
            .collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
