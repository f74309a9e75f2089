//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory media server library, a connector that
//! hands it out, and a catalog that fails every call, so the sync engine and
//! the HTTP layer can be exercised without a real media server.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfsync_core::testing::{fixtures, MockConnector, MockMediaLibrary};
//!
//! let library = MockMediaLibrary::new();
//! library.add_library("lib-1", "Movies", fixtures::numbered_movies(450)).await;
//! let connector = MockConnector::new(library.clone());
//!
//! // Use in SyncEngine...
//! ```

mod failing_catalog;
mod mock_media_library;

pub use failing_catalog::FailingCatalog;
pub use mock_media_library::{MockConnector, MockMediaLibrary, RecordedPageRequest};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogItem, MediaType};
    use crate::media_server::RawItem;

    /// A raw movie with only id, title and type set.
    pub fn raw_movie(id: &str, title: &str) -> RawItem {
        RawItem {
            id: Some(id.to_string()),
            name: Some(title.to_string()),
            item_type: Some("Movie".to_string()),
            ..Default::default()
        }
    }

    /// A raw series with only id, title and type set.
    pub fn raw_series(id: &str, title: &str) -> RawItem {
        RawItem {
            item_type: Some("Series".to_string()),
            ..raw_movie(id, title)
        }
    }

    /// A raw movie with a TMDB id, poster and release year.
    pub fn raw_movie_with_metadata(id: &str, title: &str, tmdb_id: i64) -> RawItem {
        let mut item = raw_movie(id, title);
        item.provider_ids
            .insert("Tmdb".to_string(), tmdb_id.to_string());
        item.image_tags
            .insert("Primary".to_string(), format!("tag-{}", id));
        item.production_year = Some(2000);
        item
    }

    /// `count` movies with ids `movie-0..` and TMDB ids `1..`.
    pub fn numbered_movies(count: usize) -> Vec<RawItem> {
        (0..count)
            .map(|i| {
                raw_movie_with_metadata(
                    &format!("movie-{}", i),
                    &format!("Movie {:04}", i),
                    i as i64 + 1,
                )
            })
            .collect()
    }

    /// A normalized catalog movie.
    pub fn catalog_item(id: &str, metadata_id: Option<i64>) -> CatalogItem {
        CatalogItem {
            external_item_id: id.to_string(),
            media_type: MediaType::Movie,
            title: format!("Title {}", id),
            overview: String::new(),
            poster_ref: None,
            backdrop_ref: None,
            release_date: None,
            external_metadata_id: metadata_id,
            secondary_metadata_id: None,
            genres: Vec::new(),
            rating: None,
        }
    }
}
