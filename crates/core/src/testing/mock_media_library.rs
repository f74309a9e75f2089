//! Mock media server library for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::media_server::{
    AuthSession, AuthStrategy, ConnectedLibrary, ItemPage, LibraryConnector, LibraryView,
    MediaLibrary, MediaServerError, RawItem,
};
use crate::settings::MediaServerSettings;

/// A recorded page request for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPageRequest {
    pub library_id: String,
    pub offset: u64,
    pub page_size: u32,
}

#[derive(Debug, Clone)]
struct MockLibrary {
    id: String,
    name: String,
    items: Vec<RawItem>,
}

/// In-memory implementation of the `MediaLibrary` trait.
///
/// Clones share state, so a test can keep a handle while the engine owns
/// another through `MockConnector`.
///
/// # Example
///
/// ```rust,ignore
/// use shelfsync_core::testing::{fixtures, MockMediaLibrary};
///
/// let library = MockMediaLibrary::new();
/// library.add_library("lib-1", "Movies", fixtures::numbered_movies(10)).await;
///
/// let page = library.get_page("lib-1", 0, 4).await?;
/// assert_eq!(page.items.len(), 4);
/// assert_eq!(page.total_count, Some(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockMediaLibrary {
    libraries: Arc<RwLock<Vec<MockLibrary>>>,
    page_requests: Arc<RwLock<Vec<RecordedPageRequest>>>,
    /// If set, the next library call fails with this error.
    next_error: Arc<RwLock<Option<MediaServerError>>>,
}

impl MockMediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a library with the given items in listing order.
    pub async fn add_library(&self, id: &str, name: &str, items: Vec<RawItem>) {
        let mut libraries = self.libraries.write().await;
        libraries.retain(|l| l.id != id);
        libraries.push(MockLibrary {
            id: id.to_string(),
            name: name.to_string(),
            items,
        });
    }

    /// Make the next library call fail.
    pub async fn set_next_error(&self, error: MediaServerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Page requests received so far.
    pub async fn page_requests(&self) -> Vec<RecordedPageRequest> {
        self.page_requests.read().await.clone()
    }

    async fn take_error(&self) -> Result<(), MediaServerError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaLibrary for MockMediaLibrary {
    async fn list_libraries(&self) -> Result<Vec<LibraryView>, MediaServerError> {
        self.take_error().await?;
        let libraries = self.libraries.read().await;
        Ok(libraries
            .iter()
            .map(|l| LibraryView {
                id: l.id.clone(),
                name: l.name.clone(),
                total_item_count: l.items.len() as u64,
            })
            .collect())
    }

    async fn get_page(
        &self,
        library_id: &str,
        offset: u64,
        page_size: u32,
    ) -> Result<ItemPage, MediaServerError> {
        self.page_requests.write().await.push(RecordedPageRequest {
            library_id: library_id.to_string(),
            offset,
            page_size,
        });
        self.take_error().await?;

        let libraries = self.libraries.read().await;
        let library = libraries
            .iter()
            .find(|l| l.id == library_id)
            .ok_or_else(|| MediaServerError::Api {
                status: 404,
                message: format!("library {} not found", library_id),
            })?;

        Ok(ItemPage {
            items: library
                .items
                .iter()
                .skip(offset as usize)
                .take(page_size as usize)
                .cloned()
                .collect(),
            total_count: Some(library.items.len() as u64),
        })
    }
}

/// Connector handing out a shared `MockMediaLibrary`.
#[derive(Debug, Clone)]
pub struct MockConnector {
    library: MockMediaLibrary,
    session: AuthSession,
    failure: Arc<RwLock<Option<String>>>,
    connects: Arc<AtomicUsize>,
    seen_settings: Arc<RwLock<Vec<MediaServerSettings>>>,
}

impl MockConnector {
    /// Connector that authenticates with a keyed session as `mock-account`.
    pub fn new(library: MockMediaLibrary) -> Self {
        Self {
            library,
            session: AuthSession {
                strategy: AuthStrategy::KeyedSession,
                account_id: "mock-account".to_string(),
            },
            failure: Arc::new(RwLock::new(None)),
            connects: Arc::new(AtomicUsize::new(0)),
            seen_settings: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Report the given session on connect.
    pub fn with_session(mut self, session: AuthSession) -> Self {
        self.session = session;
        self
    }

    /// Fail every following connect with an authentication error.
    pub async fn fail_with(&self, reason: &str) {
        *self.failure.write().await = Some(reason.to_string());
    }

    /// Let connects succeed again.
    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Number of connect calls, failed ones included.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub async fn seen_settings(&self) -> Vec<MediaServerSettings> {
        self.seen_settings.read().await.clone()
    }
}

#[async_trait]
impl LibraryConnector for MockConnector {
    async fn connect(
        &self,
        settings: &MediaServerSettings,
    ) -> Result<ConnectedLibrary, MediaServerError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.seen_settings.write().await.push(settings.clone());

        if let Some(reason) = self.failure.read().await.clone() {
            return Err(MediaServerError::AuthenticationFailed(reason));
        }

        Ok(ConnectedLibrary {
            session: self.session.clone(),
            library: Box::new(self.library.clone()),
        })
    }
}
