use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod rating;

pub use rating::{InvalidRating, Rating, RatingMap, Song};

/// Summary statistics about the service's rating dataset
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub song_count: u64,
    pub user_count: u64,
    pub global_average_rating: f64,
    pub total_ratings: Option<u64>,
    pub possible_ratings: Option<u64>,
    pub density_percent: Option<f64>,
    pub median_rating: Option<f64>,
    pub rating_std_dev: Option<f64>,
    pub distribution: Option<RatingDistribution>,
}

/// How many stored ratings carry each star value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RatingDistribution {
    #[serde(rename = "1_estrella")]
    pub one_star: u64,
    #[serde(rename = "2_estrellas")]
    pub two_stars: u64,
    #[serde(rename = "3_estrellas")]
    pub three_stars: u64,
    #[serde(rename = "4_estrellas")]
    pub four_stars: u64,
    #[serde(rename = "5_estrellas")]
    pub five_stars: u64,
}

/// Service liveness as reported by `GET /health`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub dataset_loaded: bool,
    pub user_count: u64,
    pub song_count: u64,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// User category assigned by the service from the neighbourhood's rating habits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Entusiastas")]
    Enthusiasts,
    #[serde(rename = "Selectivos Positivos")]
    SelectivePositive,
    #[serde(rename = "Moderados Activos")]
    ActiveModerates,
    #[serde(rename = "Moderados Casuales")]
    CasualModerates,
    #[serde(rename = "Críticos")]
    Critics,
    #[serde(rename = "Exploradores")]
    Explorers,
    #[serde(other)]
    Unknown,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Category::Enthusiasts => "Entusiastas",
            Category::SelectivePositive => "Selectivos Positivos",
            Category::ActiveModerates => "Moderados Activos",
            Category::CasualModerates => "Moderados Casuales",
            Category::Critics => "Críticos",
            Category::Explorers => "Exploradores",
            Category::Unknown => "Desconocida",
        };
        write!(f, "{}", label)
    }
}

/// Server-computed description of the current user
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Category,
    pub mean_similarity: f64,
    pub neighborhood_average_rating: f64,
    pub neighborhood_rating_std_dev: Option<f64>,
    /// Average number of songs rated per neighbour. May be fractional.
    pub neighborhood_songs_rated: f64,
}

/// One recommended song. Rank is its position in the returned sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationItem {
    pub name: Song,
    pub neighbor_average_rating: f64,
    pub predicted_score: f64,
    pub neighbor_count: u32,
}

/// Classification and recommendations from one successful exchange
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub classification: Classification,
    pub recommendations: Vec<RecommendationItem>,
    pub received_at: DateTime<Utc>,
}

// ============================================================================
// Recommendation Service Wire Types
// ============================================================================

/// Raw response from GET /stats
#[derive(Debug, Clone, Deserialize)]
pub struct ApiStats {
    pub total_canciones: u64,
    pub total_usuarios: u64,
    pub rating_promedio_global: f64,
    #[serde(default)]
    pub evaluaciones_totales: Option<u64>,
    #[serde(default)]
    pub evaluaciones_posibles: Option<u64>,
    #[serde(default)]
    pub densidad_porcentaje: Option<f64>,
    #[serde(default)]
    pub rating_mediana_global: Option<f64>,
    #[serde(default)]
    pub rating_desviacion_global: Option<f64>,
    #[serde(default)]
    pub distribucion_ratings: Option<RatingDistribution>,
}

impl From<ApiStats> for CatalogStats {
    fn from(stats: ApiStats) -> Self {
        CatalogStats {
            song_count: stats.total_canciones,
            user_count: stats.total_usuarios,
            global_average_rating: stats.rating_promedio_global,
            total_ratings: stats.evaluaciones_totales,
            possible_ratings: stats.evaluaciones_posibles,
            density_percent: stats.densidad_porcentaje,
            median_rating: stats.rating_mediana_global,
            rating_std_dev: stats.rating_desviacion_global,
            distribution: stats.distribucion_ratings,
        }
    }
}

/// Raw response from GET /canciones
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCatalog {
    pub canciones: Vec<Song>,
}

/// Raw response from GET /health
#[derive(Debug, Clone, Deserialize)]
pub struct ApiHealth {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub dataset_loaded: bool,
    #[serde(default)]
    pub dataset_shape: Option<ApiDatasetShape>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDatasetShape {
    pub usuarios: u64,
    pub canciones: u64,
}

impl From<ApiHealth> for HealthStatus {
    fn from(health: ApiHealth) -> Self {
        let (user_count, song_count) = health
            .dataset_shape
            .map(|shape| (shape.usuarios, shape.canciones))
            .unwrap_or_default();

        HealthStatus {
            status: health.status,
            service: health.service,
            dataset_loaded: health.dataset_loaded,
            user_count,
            song_count,
        }
    }
}

/// Body for POST /recomendar
#[derive(Debug, Serialize)]
pub struct ApiRecommendRequest<'a> {
    pub evaluaciones: &'a [u8],
    pub n_recomendaciones: u32,
    pub k_vecinos: u32,
}

/// Body for POST /clasificar
#[derive(Debug, Serialize)]
pub struct ApiClassifyRequest<'a> {
    pub evaluaciones: &'a [u8],
    pub k_vecinos: u32,
}

/// Raw classification block shared by /recomendar and /clasificar
#[derive(Debug, Clone, Deserialize)]
pub struct ApiClassification {
    pub categoria: Category,
    pub similitud_promedio: f64,
    pub promedio_rating_vecindario: f64,
    #[serde(default)]
    pub desviacion_rating_vecindario: Option<f64>,
    pub canciones_evaluadas_vecindario: f64,
}

impl From<ApiClassification> for Classification {
    fn from(raw: ApiClassification) -> Self {
        Classification {
            category: raw.categoria,
            mean_similarity: raw.similitud_promedio,
            neighborhood_average_rating: raw.promedio_rating_vecindario,
            neighborhood_rating_std_dev: raw.desviacion_rating_vecindario,
            neighborhood_songs_rated: raw.canciones_evaluadas_vecindario,
        }
    }
}

/// Raw recommendation entry
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecommendation {
    pub cancion: Song,
    pub rating_promedio_vecinos: f64,
    pub vecinos_que_evaluaron: u32,
    pub score_predicho: f64,
}

impl From<ApiRecommendation> for RecommendationItem {
    fn from(raw: ApiRecommendation) -> Self {
        RecommendationItem {
            name: raw.cancion,
            neighbor_average_rating: raw.rating_promedio_vecinos,
            predicted_score: raw.score_predicho,
            neighbor_count: raw.vecinos_que_evaluaron,
        }
    }
}

/// Raw response from POST /recomendar
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRecommendResponse {
    pub recomendaciones: Vec<ApiRecommendation>,
    pub clasificacion: ApiClassification,
}

impl From<ApiRecommendResponse> for RecommendationResult {
    fn from(raw: ApiRecommendResponse) -> Self {
        RecommendationResult {
            classification: raw.clasificacion.into(),
            recommendations: raw
                .recomendaciones
                .into_iter()
                .map(RecommendationItem::from)
                .collect(),
            received_at: Utc::now(),
        }
    }
}

/// Raw response from POST /clasificar
#[derive(Debug, Clone, Deserialize)]
pub struct ApiClassifyResponse {
    pub clasificacion: ApiClassification,
}

/// Structured error body returned by the service
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
