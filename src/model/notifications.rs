//! Ephemeral user-facing messages with timed auto-clear

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::ApiError;
use super::session::Session;
use super::types::{Notification, Severity};

struct Slot {
    current: Option<Notification>,
    // Bumped on every show/dismiss; a pending clear only fires for its own message.
    generation: u64,
}

#[derive(Clone)]
pub struct NotificationCenter {
    slot: Arc<RwLock<Slot>>,
    ttl: Duration,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot { current: None, generation: 0 })),
            ttl,
        }
    }

    /// Replace the current message and schedule its removal after the
    /// configured interval. An overwrite restarts the interval.
    pub async fn show(&self, text: impl Into<String>, severity: Severity) {
        let text = text.into();
        let expires_at = Instant::now() + self.ttl;

        let generation = {
            let mut slot = self.slot.write().await;
            slot.generation += 1;
            slot.current = Some(Notification { text: text.clone(), severity, expires_at });
            slot.generation
        };
        tracing::debug!(severity = severity.label(), text = %text, "Notification shown");

        let slot = self.slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            let mut slot = slot.write().await;
            if slot.generation == generation {
                slot.current = None;
            }
        });
    }

    pub async fn dismiss(&self) {
        let mut slot = self.slot.write().await;
        slot.generation += 1;
        slot.current = None;
    }

    pub async fn current(&self) -> Option<Notification> {
        self.slot.read().await.current.clone()
    }

    /// Convert a failed operation into exactly one notification. An
    /// authentication failure also ends the session, if `token` (the one the
    /// request carried) is still the current credential.
    pub async fn report(&self, err: &ApiError, session: &Session, token: &str) {
        if err.is_auth() {
            session.invalidate_rejected(token).await;
        }
        self.show(err.user_message(), err.severity()).await;
    }
}
