//! Narrow interface over a browser automation session.
//!
//! The search executor and the run orchestrator only talk to these traits.
//! `chrome` provides the real implementation; tests script fakes.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Timed out after {0:?} waiting for '{1}'")]
    Timeout(Duration, String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Browser session lost: {0}")]
    SessionLost(String),
}

impl BrowserError {
    /// True when the session itself is unusable and no later keyword can succeed.
    #[must_use]
    pub const fn is_session_lost(&self) -> bool {
        matches!(self, Self::Launch(_) | Self::SessionLost(_))
    }

    /// Maps a raw driver message into a variant.
    ///
    /// Messages that indicate a dead browser or a closed target become
    /// `SessionLost`; everything else goes through `otherwise`.
    pub fn classify(message: impl Into<String>, otherwise: fn(String) -> Self) -> Self {
        let message = message.into();
        if indicates_session_loss(&message) {
            Self::SessionLost(message)
        } else {
            otherwise(message)
        }
    }
}

fn indicates_session_loss(message: &str) -> bool {
    let lower = message.to_lowercase();

    lower.contains("browser closed")
        || lower.contains("browser disconnected")
        || lower.contains("page closed")
        || lower.contains("target closed")
        || lower.contains("session not found")
        || lower.contains("session closed")
        || lower.contains("no response from the chromium instance")
        || lower.contains("channel")
        || lower.contains("websocket")
}

/// One live browser session, exclusively owned by a single run.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    /// Waits until at least one element matches `selector`.
    ///
    /// Returns [`BrowserError::Timeout`] if none appear within `timeout`.
    async fn wait_for_elements(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Vec<Self::Element>, BrowserError>;

    /// First descendant of `element` matching `selector`, if any.
    async fn find_child(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>, BrowserError>;

    async fn get_attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError>;

    /// Releases the underlying browser. Called exactly once per session.
    async fn quit(&mut self) -> Result<(), BrowserError>;
}

/// Opens browser sessions. One session serves a whole run.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: BrowserSession + 'static;

    async fn open(&self) -> Result<Self::Session, BrowserError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_dead_browser_messages() {
        let err = BrowserError::classify("Target closed unexpectedly", BrowserError::Navigation);
        assert!(matches!(err, BrowserError::SessionLost(_)));
        assert!(err.is_session_lost());

        let err = BrowserError::classify(
            "No response from the chromium instance",
            BrowserError::Extraction,
        );
        assert!(err.is_session_lost());
    }

    #[test]
    fn keeps_ordinary_faults_per_keyword() {
        let err = BrowserError::classify("net::ERR_NAME_NOT_RESOLVED", BrowserError::Navigation);
        assert!(matches!(err, BrowserError::Navigation(_)));
        assert!(!err.is_session_lost());

        let timeout = BrowserError::Timeout(Duration::from_secs(10), "div.g".into());
        assert!(!timeout.is_session_lost());
    }
}
