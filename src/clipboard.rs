use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Host clipboard of the machine running the server.
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        let len = text.len();
        // arboard talks to the display server synchronously
        tokio::task::spawn_blocking(move || {
            let mut clipboard =
                arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            clipboard.set_text(text).map_err(|e| ClipboardError::Write(e.to_string()))
        })
        .await
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
        .map(|_| debug!("📋 Copied {} bytes to clipboard", len))
        .map_err(|e| {
            warn!("⚠️ {}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_cause() {
        let err = ClipboardError::Unavailable("no display".into());
        assert_eq!(err.to_string(), "clipboard unavailable: no display");
        let err = ClipboardError::Write("denied".into());
        assert_eq!(err.to_string(), "clipboard write failed: denied");
    }
}
