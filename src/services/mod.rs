pub mod client;
pub mod ratings;
pub mod recommendations;
pub mod request_id;

pub use client::{HttpRecommenderClient, RecommenderApi};
pub use ratings::{RatingController, RatingOutcome};
pub use recommendations::{RecommendationOrchestrator, RecommendationParams};
