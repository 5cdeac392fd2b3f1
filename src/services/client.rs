/// Remote client for the recommendation service
///
/// Each operation is a single request/response exchange against a base URL fixed
/// at construction. There is no retry and no timeout beyond the transport
/// default, so a hung exchange stays outstanding until the transport gives up.
use reqwest::{Client as HttpClient, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::Instrument;

use crate::{
    error::{AppError, AppResult},
    models::{
        ApiCatalog, ApiClassifyRequest, ApiClassifyResponse, ApiErrorBody, ApiHealth,
        ApiRecommendRequest, ApiRecommendResponse, ApiStats, CatalogStats, Classification,
        HealthStatus, RecommendationResult, Song,
    },
    services::request_id::{exchange_span, RequestId, REQUEST_ID_HEADER},
};

/// Exchanges offered by the recommendation service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommenderApi: Send + Sync {
    /// Dataset statistics (`GET /stats`)
    async fn fetch_stats(&self) -> AppResult<CatalogStats>;

    /// Song catalog in authoritative order (`GET /canciones`)
    async fn fetch_catalog(&self) -> AppResult<Vec<Song>>;

    /// Classification plus ranked recommendations for an evaluation vector (`POST /recomendar`)
    async fn request_recommendations(
        &self,
        evaluations: Vec<u8>,
        max_results: u32,
        neighbor_count: u32,
    ) -> AppResult<RecommendationResult>;

    /// Classification only (`POST /clasificar`)
    async fn classify(&self, evaluations: Vec<u8>, neighbor_count: u32)
        -> AppResult<Classification>;

    /// Service liveness (`GET /health`)
    async fn health(&self) -> AppResult<HealthStatus>;
}

/// How a non-success response is mapped to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorBodyPolicy {
    /// Any non-success status is a network error
    Ignore,
    /// A JSON `{"error": ...}` body becomes a validation error
    Structured,
}

#[derive(Clone)]
pub struct HttpRecommenderClient {
    http_client: HttpClient,
    api_url: String,
}

impl HttpRecommenderClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_http_client(HttpClient::new(), api_url)
    }

    pub fn with_http_client(http_client: HttpClient, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            api_url,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request_id = RequestId::new();
        let span = exchange_span("GET", path, &request_id);

        async move {
            let response = self
                .http_client
                .get(self.url(path))
                .header(REQUEST_ID_HEADER, request_id.as_str())
                .send()
                .await?;

            Self::read_json(response, path, ErrorBodyPolicy::Ignore).await
        }
        .instrument(span)
        .await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request_id = RequestId::new();
        let span = exchange_span("POST", path, &request_id);

        async move {
            let response = self
                .http_client
                .post(self.url(path))
                .header(REQUEST_ID_HEADER, request_id.as_str())
                .json(body)
                .send()
                .await?;

            Self::read_json(response, path, ErrorBodyPolicy::Structured).await
        }
        .instrument(span)
        .await
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        path: &str,
        policy: ErrorBodyPolicy,
    ) -> AppResult<T> {
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text,
                "Recommendation service request failed"
            );
            return Err(Self::error_from_body(status, &response_text, path, policy));
        }

        tracing::debug!(response = %response_text, "Raw recommendation service response");

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize recommendation service response"
            );
            AppError::Network(format!("Malformed response from {}: {}", path, e))
        })
    }

    fn error_from_body(
        status: reqwest::StatusCode,
        body: &str,
        path: &str,
        policy: ErrorBodyPolicy,
    ) -> AppError {
        if policy == ErrorBodyPolicy::Structured {
            if let Ok(error_body) = serde_json::from_str::<ApiErrorBody>(body) {
                return AppError::Validation(error_body.error);
            }
        }

        AppError::Network(format!("{} returned status {}", path, status))
    }
}

#[async_trait::async_trait]
impl RecommenderApi for HttpRecommenderClient {
    async fn fetch_stats(&self) -> AppResult<CatalogStats> {
        let stats: ApiStats = self.get_json("/stats").await?;

        tracing::info!(
            songs = stats.total_canciones,
            users = stats.total_usuarios,
            "Stats fetched"
        );

        Ok(stats.into())
    }

    async fn fetch_catalog(&self) -> AppResult<Vec<Song>> {
        let catalog: ApiCatalog = self.get_json("/canciones").await?;

        tracing::info!(songs = catalog.canciones.len(), "Catalog fetched");

        Ok(catalog.canciones)
    }

    async fn request_recommendations(
        &self,
        evaluations: Vec<u8>,
        max_results: u32,
        neighbor_count: u32,
    ) -> AppResult<RecommendationResult> {
        let body = ApiRecommendRequest {
            evaluaciones: &evaluations,
            n_recomendaciones: max_results,
            k_vecinos: neighbor_count,
        };

        let response: ApiRecommendResponse = self.post_json("/recomendar", &body).await?;
        let result = RecommendationResult::from(response);

        tracing::info!(
            category = %result.classification.category,
            recommendations = result.recommendations.len(),
            "Recommendations received"
        );

        Ok(result)
    }

    async fn classify(
        &self,
        evaluations: Vec<u8>,
        neighbor_count: u32,
    ) -> AppResult<Classification> {
        let body = ApiClassifyRequest {
            evaluaciones: &evaluations,
            k_vecinos: neighbor_count,
        };

        let response: ApiClassifyResponse = self.post_json("/clasificar", &body).await?;
        let classification = Classification::from(response.clasificacion);

        tracing::info!(category = %classification.category, "Classification received");

        Ok(classification)
    }

    async fn health(&self) -> AppResult<HealthStatus> {
        let health: ApiHealth = self.get_json("/health").await?;
        Ok(health.into())
    }
}
