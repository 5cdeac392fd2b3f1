use std::sync::Arc;

use crate::{
    db::RatingStore,
    models::{Rating, Song},
    session::{Notice, Session, SessionEvent},
};

/// Result of applying one rating action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingOutcome {
    pub song: Song,
    /// Rating now stored for the song, `None` if it was toggled off
    pub rating: Option<Rating>,
    pub toggled_off: bool,
    pub rated_count: usize,
    pub eligible: bool,
}

/// Applies rating mutations to a session and persists them
///
/// No network calls happen here. Every mutation is saved before the session
/// lock is released, so saves land in the same order as the mutations.
#[derive(Clone)]
pub struct RatingController {
    session: Session,
    store: Arc<dyn RatingStore>,
}

impl RatingController {
    pub fn new(session: Session, store: Arc<dyn RatingStore>) -> Self {
        Self { session, store }
    }

    /// Replaces the session's ratings with the persisted mapping
    pub async fn load(&self) -> usize {
        let ratings = self.store.load().await;
        let count = ratings.len();

        self.session.write().await.ratings = ratings;

        tracing::info!(count, backend = self.store.name(), "Ratings loaded");
        self.session.emit(SessionEvent::RatingsLoaded { count });

        count
    }

    /// Rates `song` with `value`, or removes its rating if it already has exactly `value`
    pub async fn apply_rating(&self, song: &str, value: Rating) -> RatingOutcome {
        let mut state = self.session.write().await;

        let toggled_off = state.ratings.get(song) == Some(&value);
        if toggled_off {
            state.ratings.remove(song);
        } else {
            state.ratings.insert(song.to_string(), value);
        }

        let outcome = RatingOutcome {
            song: song.to_string(),
            rating: state.rating_of(song),
            toggled_off,
            rated_count: state.rated_count(),
            eligible: state.is_eligible_for_recommendation(),
        };

        let saved = self.store.save(&state.ratings).await;
        drop(state);

        tracing::info!(
            song = %song,
            rating = value.value(),
            toggled_off,
            rated_count = outcome.rated_count,
            "Rating applied"
        );

        self.session.emit(SessionEvent::RatingChanged {
            song: outcome.song.clone(),
            rating: outcome.rating,
            toggled_off,
        });

        match saved {
            Ok(()) if toggled_off => {
                self.session
                    .notify(Notice::success(format!("Removed rating for {}", song)));
            }
            Ok(()) => {
                self.session
                    .notify(Notice::success(format!("{} rated with {} stars", song, value)));
            }
            Err(e) => {
                tracing::error!(error = %e, backend = self.store.name(), "Failed to persist ratings");
                self.session
                    .notify(Notice::error(format!("Could not save ratings: {}", e)));
            }
        }

        outcome
    }

    /// Clears every rating and the last recommendation result
    ///
    /// Also invalidates any recommendation exchange still in flight.
    pub async fn reset(&self) {
        let mut state = self.session.write().await;

        state.ratings.clear();
        state.last_result = None;
        state.generation += 1;

        let saved = self.store.save(&state.ratings).await;
        let generation = state.generation;
        drop(state);

        tracing::info!(generation, "Ratings reset");

        self.session.emit(SessionEvent::RatingsReset);

        match saved {
            Ok(()) => self.session.notify(Notice::success("Ratings reset")),
            Err(e) => {
                tracing::error!(error = %e, backend = self.store.name(), "Failed to persist reset");
                self.session
                    .notify(Notice::error(format!("Could not save ratings: {}", e)));
            }
        }
    }
}
