use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Classification, RecommendationResult},
    services::client::RecommenderApi,
    session::{Notice, Session, SessionEvent, MIN_RATINGS_FOR_RECOMMENDATION},
};

/// Tunable parameters sent with every recommendation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationParams {
    pub max_results: u32,
    pub neighbor_count: u32,
}

impl Default for RecommendationParams {
    fn default() -> Self {
        Self {
            max_results: 20,
            neighbor_count: 10,
        }
    }
}

/// Evaluation vector captured at request time, with the session generation it belongs to
struct RequestSnapshot {
    evaluations: Vec<u8>,
    generation: u64,
    rated_count: usize,
}

/// Builds evaluation vectors from a session, calls the service and commits results
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    session: Session,
    client: Arc<dyn RecommenderApi>,
    params: RecommendationParams,
}

impl RecommendationOrchestrator {
    pub fn new(session: Session, client: Arc<dyn RecommenderApi>) -> Self {
        Self::with_params(session, client, RecommendationParams::default())
    }

    pub fn with_params(
        session: Session,
        client: Arc<dyn RecommenderApi>,
        params: RecommendationParams,
    ) -> Self {
        Self {
            session,
            client,
            params,
        }
    }

    pub fn params(&self) -> RecommendationParams {
        self.params
    }

    /// Requests recommendations with the configured parameters
    pub async fn run(&self) -> AppResult<RecommendationResult> {
        self.run_with(self.params).await
    }

    /// Requests recommendations and commits them as the session's last result
    ///
    /// Ratings changed while the exchange is in flight are not reflected in it.
    /// If the session is reset before the response arrives, the response is
    /// discarded and [`AppError::StaleResponse`] is returned.
    pub async fn run_with(&self, params: RecommendationParams) -> AppResult<RecommendationResult> {
        let snapshot = self.snapshot().await?;

        tracing::info!(
            songs = snapshot.evaluations.len(),
            rated = snapshot.rated_count,
            max_results = params.max_results,
            neighbor_count = params.neighbor_count,
            "Requesting recommendations"
        );
        self.session
            .notify(Notice::success("Generating recommendations..."));

        let result = self
            .client
            .request_recommendations(snapshot.evaluations, params.max_results, params.neighbor_count)
            .await
            .map_err(|e| self.report_failure(e))?;

        let mut state = self.session.write().await;
        if state.generation() != snapshot.generation {
            drop(state);
            tracing::warn!(
                requested_generation = snapshot.generation,
                "Discarding recommendations from before a reset"
            );
            return Err(AppError::StaleResponse);
        }
        state.last_result = Some(result.clone());
        drop(state);

        let count = result.recommendations.len();
        self.session
            .emit(SessionEvent::RecommendationsReady { count });
        self.session
            .notify(Notice::success("Recommendations generated"));

        Ok(result)
    }

    /// Requests a classification with the configured neighbourhood size
    pub async fn classify(&self) -> AppResult<Classification> {
        self.classify_with(self.params).await
    }

    /// Requests a classification only; nothing is committed into the session
    ///
    /// Only `neighbor_count` is used from `params`.
    pub async fn classify_with(&self, params: RecommendationParams) -> AppResult<Classification> {
        let snapshot = self.snapshot().await?;

        tracing::info!(
            songs = snapshot.evaluations.len(),
            neighbor_count = params.neighbor_count,
            "Requesting classification"
        );

        self.client
            .classify(snapshot.evaluations, params.neighbor_count)
            .await
            .map_err(|e| self.report_failure(e))
    }

    /// Enforces the eligibility gate and captures the evaluation vector
    async fn snapshot(&self) -> AppResult<RequestSnapshot> {
        let state = self.session.read().await;

        if !state.is_eligible_for_recommendation() {
            let rated = state.rated_count();
            drop(state);

            tracing::debug!(rated, "Recommendation request blocked by eligibility gate");
            self.session.notify(Notice::warning(format!(
                "Rate at least {} songs first",
                MIN_RATINGS_FOR_RECOMMENDATION
            )));
            return Err(AppError::NotEligible {
                rated,
                required: MIN_RATINGS_FOR_RECOMMENDATION,
            });
        }

        Ok(RequestSnapshot {
            evaluations: state.evaluation_vector(),
            generation: state.generation(),
            rated_count: state.rated_count(),
        })
    }

    fn report_failure(&self, error: AppError) -> AppError {
        tracing::error!(error = %error, "Recommendation exchange failed");
        self.session.notify(Notice::error(error.to_string()));
        error
    }
}
