//! Catalog search holding the latest result page

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::ApiError;
use super::notifications::NotificationCenter;
use super::session::Session;
use super::spotify_client::CatalogApi;
use super::types::{Severity, Track};

#[derive(Default)]
struct ResultSet {
    tracks: Vec<Track>,
    query: String,
}

#[derive(Clone)]
pub struct CatalogSearch {
    api: Arc<dyn CatalogApi>,
    session: Session,
    notifications: NotificationCenter,
    results: Arc<RwLock<ResultSet>>,
    // Ticket of the most recently issued search.
    issued: Arc<AtomicU64>,
    limit: u32,
}

impl CatalogSearch {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        session: Session,
        notifications: NotificationCenter,
        limit: u32,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
            results: Arc::new(RwLock::new(ResultSet::default())),
            issued: Arc::new(AtomicU64::new(0)),
            limit,
        }
    }

    /// Query the catalog and replace the held results. Only the most recently
    /// issued search may publish; responses to superseded searches are
    /// dropped.
    pub async fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            let err = ApiError::validation("Type something to search for.");
            self.notifications.show(err.user_message(), err.severity()).await;
            return;
        }

        let Some(token) = self.session.token().await else {
            self.notifications
                .show("Please log in to search.", Severity::Warning)
                .await;
            return;
        };

        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(query, ticket, "Performing search");

        let response = self.api.search_tracks(&token, query, self.limit).await;

        let mut results = self.results.write().await;
        let latest = self.issued.load(Ordering::SeqCst) == ticket;

        match response {
            Ok(tracks) if latest => {
                let count = tracks.len();
                tracing::info!(query, count, "Search completed successfully");
                results.tracks = tracks;
                results.query = query.to_string();
                drop(results);

                if count == 0 {
                    self.notifications
                        .show(format!("No results for \"{}\".", query), Severity::Info)
                        .await;
                }
            }
            Ok(_) => {
                tracing::debug!(query, ticket, "Discarding superseded search response");
            }
            Err(err) => {
                drop(results);
                tracing::error!(query, error = %err, "Search failed");
                // A rejected token stays rejected whichever search noticed it.
                if latest || err.is_auth() {
                    self.notifications.report(&err, &self.session, &token).await;
                }
            }
        }
    }

    pub async fn results(&self) -> Vec<Track> {
        self.results.read().await.tracks.clone()
    }

    pub async fn result(&self, index: usize) -> Option<Track> {
        self.results.read().await.tracks.get(index).cloned()
    }

    pub async fn last_query(&self) -> String {
        self.results.read().await.query.clone()
    }
}
