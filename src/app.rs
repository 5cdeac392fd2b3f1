use std::sync::Arc;

use crate::{
    config::Config,
    db::{self, RatingStore},
    error::AppResult,
    services::{
        HttpRecommenderClient, RatingController, RecommendationOrchestrator,
        RecommendationParams, RecommenderApi,
    },
    session::{Notice, Session},
};

/// What the startup sequence managed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub stats_loaded: bool,
    pub catalog_loaded: bool,
    pub ratings_loaded: usize,
}

/// One session wired to its rating controller, orchestrator and remote client
#[derive(Clone)]
pub struct Recommender {
    session: Session,
    client: Arc<dyn RecommenderApi>,
    ratings: RatingController,
    recommendations: RecommendationOrchestrator,
}

impl Recommender {
    pub fn new(
        client: Arc<dyn RecommenderApi>,
        store: Arc<dyn RatingStore>,
        params: RecommendationParams,
    ) -> Self {
        let session = Session::new();
        let ratings = RatingController::new(session.clone(), store);
        let recommendations =
            RecommendationOrchestrator::with_params(session.clone(), client.clone(), params);

        Self {
            session,
            client,
            ratings,
            recommendations,
        }
    }

    /// Builds the HTTP client and rating store described by `config`
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = Arc::new(HttpRecommenderClient::new(config.api_url.clone()));
        let store = db::create_store(config)?;
        let params = RecommendationParams {
            max_results: config.max_results,
            neighbor_count: config.neighbor_count,
        };

        tracing::info!(api_url = %config.api_url, "Recommender configured");

        Ok(Self::new(client, store, params))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client(&self) -> &Arc<dyn RecommenderApi> {
        &self.client
    }

    pub fn ratings(&self) -> &RatingController {
        &self.ratings
    }

    pub fn recommendations(&self) -> &RecommendationOrchestrator {
        &self.recommendations
    }

    /// Loads stats and catalog concurrently, and the persisted ratings
    ///
    /// Never fails: a failed exchange is logged, reported as an error notice and
    /// leaves that part of the session empty.
    pub async fn bootstrap(&self) -> BootstrapReport {
        let (stats, catalog, ratings_loaded) = tokio::join!(
            self.client.fetch_stats(),
            self.client.fetch_catalog(),
            self.ratings.load(),
        );

        let stats_loaded = match stats {
            Ok(stats) => {
                self.session.set_stats(stats).await;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading stats");
                self.session
                    .notify(Notice::error("Could not load statistics"));
                false
            }
        };

        let catalog_loaded = match catalog {
            Ok(songs) => {
                self.session.set_catalog(songs).await;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading catalog");
                self.session.notify(Notice::error(
                    "Could not load songs. Check that the recommendation service is running.",
                ));
                false
            }
        };

        BootstrapReport {
            stats_loaded,
            catalog_loaded,
            ratings_loaded,
        }
    }
}
