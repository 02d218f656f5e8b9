//! Host interface for the feedback widget.
//!
//! The embedding page supplies everything the widget cannot know on its own:
//! which page is active, how to show a blocking alert, and how to ask for
//! confirmation. The store connection is likewise supplied by the host and
//! opened lazily on first use.

use std::sync::Arc;

use crate::store::{FeedbackStore, RemoteStore, StoreError};

/// Callbacks bound by the host page.
pub trait WidgetHost: Send + Sync {
    /// Identifier of the page or phase the reviewer is looking at right now.
    fn current_page(&self) -> String;

    /// Show a blocking, user-visible message.
    fn alert(&self, message: &str);

    /// Ask a yes/no question; `true` means the user accepted.
    fn confirm(&self, message: &str) -> bool;
}

/// Opens the store connection. Called at most once per successful connect.
#[async_trait::async_trait]
pub trait StoreConnector: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be reached or configured.
    async fn connect(&self) -> Result<Arc<dyn FeedbackStore>, StoreError>;
}

/// Connects to a feedback server over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteConnector {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[async_trait::async_trait]
impl StoreConnector for RemoteConnector {
    async fn connect(&self) -> Result<Arc<dyn FeedbackStore>, StoreError> {
        let store = RemoteStore::new(&self.base_url, self.timeout_secs)?;
        tracing::info!(base_url = %store.base_url(), "feedback store client ready");
        Ok(Arc::new(store))
    }
}

/// An already-open store.
pub struct Connected(pub Arc<dyn FeedbackStore>);

#[async_trait::async_trait]
impl StoreConnector for Connected {
    async fn connect(&self) -> Result<Arc<dyn FeedbackStore>, StoreError> {
        Ok(Arc::clone(&self.0))
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
