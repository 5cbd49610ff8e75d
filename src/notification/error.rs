//! Error types for the notification service.

use thiserror::Error;

/// Defines the possible errors that can occur while delivering an alert.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The webhook answered with a non-success status.
    #[error("Notification failed: {0}")]
    NotifyFailed(String),

    /// An error from the underlying `reqwest` client.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_failed_display() {
        let error = NotificationError::NotifyFailed("HTTP 500".into());
        assert_eq!(error.to_string(), "Notification failed: HTTP 500");
    }
}
