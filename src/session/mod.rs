use std::sync::Arc;

use tokio::sync::{broadcast, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{CatalogStats, Song};

pub mod events;
pub mod state;

pub use events::{Notice, NoticeLevel, SessionEvent};
pub use state::{SessionState, SongFilter, MIN_RATINGS_FOR_RECOMMENDATION};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Shared handle to one user's session state
///
/// Cloning the handle shares the same state; create separate sessions with
/// [`Session::new`]. Every change is announced on a broadcast channel so a
/// presentation layer can re-render without the core knowing about it.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a new empty session
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(SessionState::new())),
            events,
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> SessionState {
        self.inner.read().await.clone()
    }

    /// Receives every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // Err only means nobody is listening
        let _ = self.events.send(event);
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.emit(SessionEvent::Notice(notice));
    }

    /// Replaces the catalog with the server's ordering
    pub async fn set_catalog(&self, songs: Vec<Song>) {
        let count = songs.len();
        self.write().await.catalog = songs;
        tracing::debug!(songs = count, "Catalog committed to session");
        self.emit(SessionEvent::CatalogLoaded { songs: count });
    }

    pub async fn set_stats(&self, stats: CatalogStats) {
        self.write().await.stats = Some(stats);
        self.emit(SessionEvent::StatsLoaded);
    }

    pub async fn set_filter(&self, filter: SongFilter) {
        self.write().await.filter = filter;
        self.emit(SessionEvent::ViewChanged);
    }

    pub async fn set_search_query(&self, query: impl Into<String>) {
        self.write().await.search_query = query.into();
        self.emit(SessionEvent::ViewChanged);
    }
}
