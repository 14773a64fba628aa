//! Bearer-token session: capture from the implicit-flow redirect, persistence,
//! and invalidation.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Durable storage for the single token string.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    saved_at: DateTime<Utc>,
}

/// Token persisted as a small JSON file (default `.cache/token.json`).
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let stored: StoredToken = serde_json::from_str(&content)?;
        if stored.access_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(stored.access_token))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let stored = StoredToken {
            access_token: token.to_string(),
            saved_at: Utc::now(),
        };
        fs::write(&self.path, serde_json::to_string(&stored)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Source of the redirect fragment (`#access_token=...&token_type=Bearer`).
pub trait Navigation {
    fn fragment(&self) -> Option<&str>;
    fn clear_fragment(&mut self);
}

/// A redirect URL handed to the terminal client, either on the command line
/// or pasted into the login prompt.
#[derive(Debug, Default)]
pub struct RedirectFragment {
    fragment: Option<String>,
}

impl RedirectFragment {
    /// Accepts a full redirect URL, a `#...` fragment, or a bare
    /// `access_token=...` parameter list.
    pub fn from_redirect(input: &str) -> Self {
        let input = input.trim();
        let fragment = match input.split_once('#') {
            Some((_, fragment)) => Some(fragment),
            None if input.contains(&format!("{}=", ACCESS_TOKEN_PARAM)) => Some(input),
            None => None,
        };
        Self {
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
        }
    }
}

impl Navigation for RedirectFragment {
    fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    fn clear_fragment(&mut self) {
        self.fragment = None;
    }
}

/// Extract `access_token` from a `&`-joined fragment in any parameter order.
pub fn parse_access_token(fragment: &str) -> Option<String> {
    fragment
        .trim_start_matches('#')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == ACCESS_TOKEN_PARAM)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// The current credential. Cloned handles share state; storage I/O never
/// leaves this type.
#[derive(Clone)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Startup: adopt a stored token, otherwise try the redirect fragment.
    pub async fn restore_or_capture(&self, navigation: &mut dyn Navigation) -> bool {
        match self.store.load() {
            Ok(Some(stored)) => {
                tracing::info!("Restored saved access token");
                *self.token.write().await = Some(stored);
                return true;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Could not read saved token, ignoring it"),
        }
        self.capture(navigation).await
    }

    /// Adopt the token carried by the redirect fragment. Only valid while
    /// unauthenticated; re-authentication always starts from a logged-out
    /// session.
    pub async fn capture(&self, navigation: &mut dyn Navigation) -> bool {
        let mut current = self.token.write().await;
        if current.is_some() {
            tracing::debug!("Already authenticated, ignoring redirect");
            return false;
        }

        let Some(token) = navigation.fragment().and_then(parse_access_token) else {
            tracing::debug!("No access_token in redirect fragment");
            return false;
        };
        navigation.clear_fragment();

        if let Err(e) = self.store.save(&token) {
            tracing::warn!(error = %e, "Failed to persist access token");
        }
        *current = Some(token);
        tracing::info!("Captured access token from redirect");
        true
    }

    /// Logout: forget the token everywhere.
    pub async fn invalidate(&self) {
        let mut current = self.token.write().await;
        self.forget(&mut current);
    }

    /// A request made with `rejected` got a 401. Only that credential is
    /// dropped; a token captured since then stays.
    pub async fn invalidate_rejected(&self, rejected: &str) -> bool {
        let mut current = self.token.write().await;
        if current.as_deref() != Some(rejected) {
            tracing::debug!("Rejected token is no longer current, keeping session");
            return false;
        }
        self.forget(&mut current);
        true
    }

    fn forget(&self, current: &mut Option<String>) {
        let had_token = current.take().is_some();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to remove saved access token");
        }
        if had_token {
            tracing::info!("Session invalidated");
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    #[cfg(test)]
    pub(crate) async fn authenticated(token: &str) -> (Self, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::with_token(token));
        let session = Self::new(store.clone());
        session.restore_or_capture(&mut RedirectFragment::default()).await;
        (session, store)
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryTokenStore {
    value: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryTokenStore {
    pub(crate) fn with_token(token: &str) -> Self {
        Self { value: std::sync::Mutex::new(Some(token.to_string())) }
    }

    pub(crate) fn stored(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.value.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.value.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_any_order() {
        assert_eq!(
            parse_access_token("#access_token=XYZ&token_type=Bearer").as_deref(),
            Some("XYZ")
        );
        assert_eq!(
            parse_access_token("token_type=Bearer&expires_in=3600&access_token=ABC").as_deref(),
            Some("ABC")
        );
        assert_eq!(parse_access_token("access_token=a%2Bb").as_deref(), Some("a+b"));
    }

    #[test]
    fn test_parse_token_absent_or_empty() {
        assert_eq!(parse_access_token(""), None);
        assert_eq!(parse_access_token("#token_type=Bearer&expires_in=3600"), None);
        assert_eq!(parse_access_token("access_token=&token_type=Bearer"), None);
        assert_eq!(parse_access_token("access_token_hint=1"), None);
        assert_eq!(parse_access_token("error=access_denied"), None);
    }

    #[test]
    fn test_redirect_fragment_sources() {
        let url = RedirectFragment::from_redirect("http://localhost:3000/#access_token=XYZ");
        assert_eq!(url.fragment(), Some("access_token=XYZ"));

        let bare = RedirectFragment::from_redirect("  access_token=XYZ&token_type=Bearer ");
        assert_eq!(bare.fragment(), Some("access_token=XYZ&token_type=Bearer"));

        assert_eq!(RedirectFragment::from_redirect("http://localhost:3000/").fragment(), None);
        assert_eq!(RedirectFragment::from_redirect("http://localhost:3000/#").fragment(), None);
    }

    #[tokio::test]
    async fn test_capture_from_fragment() {
        let store = Arc::new(MemoryTokenStore::default());
        let session = Session::new(store.clone());
        let mut nav = RedirectFragment::from_redirect("#access_token=XYZ&token_type=Bearer");

        assert!(session.restore_or_capture(&mut nav).await);
        assert!(session.is_authenticated().await);
        assert_eq!(session.token().await.as_deref(), Some("XYZ"));
        assert_eq!(nav.fragment(), None);
        assert_eq!(store.stored().as_deref(), Some("XYZ"));
    }

    #[tokio::test]
    async fn test_stored_token_wins_over_fragment() {
        let store = Arc::new(MemoryTokenStore::with_token("saved"));
        let session = Session::new(store.clone());
        let mut nav = RedirectFragment::from_redirect("#access_token=fresh");

        assert!(session.restore_or_capture(&mut nav).await);
        assert_eq!(session.token().await.as_deref(), Some("saved"));
        assert_eq!(nav.fragment(), Some("access_token=fresh"));
    }

    #[tokio::test]
    async fn test_no_source_stays_unauthenticated() {
        let session = Session::new(Arc::new(MemoryTokenStore::default()));
        let mut nav = RedirectFragment::from_redirect("#token_type=Bearer");

        assert!(!session.restore_or_capture(&mut nav).await);
        assert!(!session.is_authenticated().await);
        assert_eq!(nav.fragment(), Some("token_type=Bearer"));
    }

    #[tokio::test]
    async fn test_invalidate_clears_memory_and_storage() {
        let (session, store) = Session::authenticated("abc").await;
        session.invalidate().await;
        assert!(!session.is_authenticated().await);
        assert_eq!(store.stored(), None);
    }

    #[tokio::test]
    async fn test_invalidate_rejected_only_drops_matching_token() {
        let (session, store) = Session::authenticated("current").await;

        assert!(!session.invalidate_rejected("stale").await);
        assert_eq!(session.token().await.as_deref(), Some("current"));
        assert_eq!(store.stored().as_deref(), Some("current"));

        assert!(session.invalidate_rejected("current").await);
        assert!(!session.is_authenticated().await);
        assert_eq!(store.stored(), None);
    }

    #[tokio::test]
    async fn test_capture_only_from_unauthenticated() {
        let (session, _store) = Session::authenticated("old").await;
        let mut nav = RedirectFragment::from_redirect("#access_token=new");
        assert!(!session.capture(&mut nav).await);
        assert_eq!(session.token().await.as_deref(), Some("old"));

        session.invalidate().await;
        assert!(session.capture(&mut nav).await);
        assert_eq!(session.token().await.as_deref(), Some("new"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save("XYZ").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("XYZ"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "{not json").unwrap();
        let session = Session::new(Arc::new(FileTokenStore::new(&path)));

        assert!(!session.restore_or_capture(&mut RedirectFragment::default()).await);
    }
}
