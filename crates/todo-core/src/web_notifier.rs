//! Web server notifier for out-of-process writers.
//!
//! The CLI writes to the store directly. This client tells a running server
//! to broadcast the change to its open streams.

use std::time::Duration;
use tracing::{debug, warn};

/// Default web server URL.
pub const DEFAULT_WEB_URL: &str = "http://127.0.0.1:3000";

/// Notifies the web server of changes via HTTP.
#[derive(Clone)]
pub struct WebNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl WebNotifier {
    /// Create a notifier for the server at `base_url`.
    pub fn with_url(base_url: &str) -> Self {
        debug!(base_url = %base_url, "WebNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn notify_url(&self) -> String {
        format!("{}/internal/notify", self.base_url)
    }

    /// Ask the server to push a fresh task list to all streams.
    ///
    /// Returns whether the server acknowledged. Failures are only logged.
    pub async fn notify_changed(&self) -> bool {
        let url = self.notify_url();
        debug!(url = %url, "Sending change notification");

        match self.client.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Change notification sent successfully");
                true
            }
            Ok(response) => {
                warn!(status_code = %response.status(), "Change notification failed with status");
                false
            }
            Err(e) => {
                // Expected when no server is running.
                debug!(error = %e, url = %url, "Failed to send change notification");
                false
            }
        }
    }
}
