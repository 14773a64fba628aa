//! Spotify Web API access used by search and export

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rspotify::{
    model::{FullTrack, PlayableId, PlaylistId, SearchResult, SearchType, TrackId, UserId},
    prelude::*,
    AuthCodeSpotify, Config, Token,
};

use crate::auth::SCOPES;
use crate::error::{ApiError, Result};
use crate::{log_api_request, log_api_result};
use super::types::Track;

/// The remote operations the core needs. Every call carries the bearer token
/// explicitly.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /v1/search?q=..&type=track&limit=..`
    async fn search_tracks(&self, token: &str, query: &str, limit: u32) -> Result<Vec<Track>>;

    /// `GET /v1/me`
    async fn current_user_id(&self, token: &str) -> Result<String>;

    /// `POST /v1/users/{user_id}/playlists`, returns the new playlist id
    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<String>;

    /// `POST /v1/playlists/{playlist_id}/tracks`
    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()>;

    /// `DELETE /v1/playlists/{playlist_id}/followers`; for the owner this
    /// removes the playlist from their library.
    async fn remove_playlist(&self, token: &str, playlist_id: &str) -> Result<()>;
}

/// rspotify-backed client. The implicit-flow token is installed before each
/// call; rspotify's own caching and refreshing stay disabled.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Arc<AuthCodeSpotify>,
}

impl SpotifyClient {
    pub fn new() -> Self {
        let client = AuthCodeSpotify::with_config(
            Default::default(),
            Default::default(),
            Config {
                token_cached: false,
                token_refreshing: false,
                ..Default::default()
            },
        );
        tracing::debug!("rspotify client initialized");
        Self { client: Arc::new(client) }
    }

    async fn authorized(&self, access_token: &str) -> Result<&AuthCodeSpotify> {
        let token = Token {
            access_token: access_token.to_string(),
            expires_in: chrono::Duration::seconds(3600),
            expires_at: None,
            scopes: SCOPES
                .split_whitespace()
                .map(|s| s.to_string())
                .collect::<HashSet<String>>(),
            refresh_token: None,
        };

        let mut slot = self
            .client
            .token
            .lock()
            .await
            .map_err(|_| ApiError::Transport("token lock poisoned".to_string()))?;
        *slot = Some(token);
        Ok(&self.client)
    }
}

impl Default for SpotifyClient {
    fn default() -> Self {
        Self::new()
    }
}

fn track_from_full(track: FullTrack) -> Option<Track> {
    // Local files have no catalog id and cannot be added to a playlist.
    let id = track.id?;
    Some(Track {
        id: id.id().to_string(),
        uri: id.uri(),
        name: track.name,
        artists: track.artists.into_iter().map(|a| a.name).collect(),
        images: track.album.images.into_iter().map(|i| i.url).collect(),
    })
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn search_tracks(&self, token: &str, query: &str, limit: u32) -> Result<Vec<Track>> {
        log_api_request!("search", query, limit);
        let client = self.authorized(token).await?;
        let result = client
            .search(query, SearchType::Track, None, None, Some(limit), None)
            .await;
        log_api_result!("search", result);

        match result? {
            SearchResult::Tracks(page) => {
                Ok(page.items.into_iter().filter_map(track_from_full).collect())
            }
            _ => Err(ApiError::Transport("unexpected search payload".to_string())),
        }
    }

    async fn current_user_id(&self, token: &str) -> Result<String> {
        log_api_request!("me");
        let client = self.authorized(token).await?;
        let result = client.me().await;
        log_api_result!("me", result);
        Ok(result?.id.id().to_string())
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<String> {
        log_api_request!("create_playlist", user_id, name, public);
        let user = UserId::from_id(user_id)?;
        let client = self.authorized(token).await?;
        let result = client
            .user_playlist_create(user, name, Some(public), None, Some(description))
            .await;
        log_api_result!("create_playlist", result);
        Ok(result?.id.id().to_string())
    }

    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        log_api_request!("add_tracks", playlist_id, count = uris.len());
        let playlist = PlaylistId::from_id(playlist_id)?;
        let items = uris
            .iter()
            .map(|uri| TrackId::from_uri(uri).map(PlayableId::Track))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let client = self.authorized(token).await?;
        let result = client.playlist_add_items(playlist, items, None).await;
        log_api_result!("add_tracks", result);
        result?;
        Ok(())
    }

    async fn remove_playlist(&self, token: &str, playlist_id: &str) -> Result<()> {
        log_api_request!("remove_playlist", playlist_id);
        let playlist = PlaylistId::from_id(playlist_id)?;
        let client = self.authorized(token).await?;
        let result = client.playlist_unfollow(playlist).await;
        log_api_result!("remove_playlist", result);
        result?;
        Ok(())
    }
}
