use crate::models::{Rating, Song};

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// State changes observed by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StatsLoaded,
    CatalogLoaded {
        songs: usize,
    },
    RatingsLoaded {
        count: usize,
    },
    RatingChanged {
        song: Song,
        /// New rating, `None` when the song became unrated
        rating: Option<Rating>,
        toggled_off: bool,
    },
    RatingsReset,
    /// Filter or search query changed
    ViewChanged,
    RecommendationsReady {
        count: usize,
    },
    Notice(Notice),
}
