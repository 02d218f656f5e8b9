//! Feedback widget — reviewer comments on the page being read.
//!
//! DESIGN
//! ======
//! The widget is an explicit component object owned by its host. All host
//! interaction goes through `WidgetHost`; the store is reached through a
//! `StoreConnector` the first time it is needed and the handle is then
//! shared by every operation.
//!
//! Operations take `&self` so a host can keep rendering (`view`) while a
//! request is in flight. State lives behind a plain mutex that is never held
//! across an `.await` or a host callback.
//!
//! ERROR HANDLING
//! ==============
//! Nothing is retried. Validation and write failures raise a host alert and
//! are returned to the caller; list failures become an inline message and
//! are never returned. A failed connection is not cached, so the next
//! operation tries to connect again.

pub mod host;
pub mod view;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

pub use host::{Connected, RemoteConnector, StoreConnector, WidgetHost};
pub use view::{AuthorOption, FeedbackItemView, ListView, WidgetView};

use crate::error::ErrorCode;
use crate::record::{FeedbackRecord, NewFeedback, PageFilter, Resolution, Roster, ValidationError, now_ms, sort_recent_first};
use crate::store::{DEFAULT_LIST_LIMIT, FeedbackStore, StoreError};

pub const DELETE_CONFIRM: &str = "Delete this feedback?";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("a submission is already in progress")]
    Busy,
}

impl ErrorCode for WidgetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::Busy => "E_BUSY",
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug)]
enum ListState {
    Idle,
    Loaded(Vec<FeedbackRecord>),
    Failed(&'static str),
}

#[derive(Debug)]
struct WidgetState {
    open: bool,
    filter: PageFilter,
    author: String,
    draft: String,
    submitting: bool,
    /// Page identifier observed at the last open/submit.
    page: String,
    list: ListState,
}

// =============================================================================
// WIDGET
// =============================================================================

pub struct FeedbackWidget<H: WidgetHost> {
    host: H,
    connector: Box<dyn StoreConnector>,
    store: OnceCell<Arc<dyn FeedbackStore>>,
    roster: Roster,
    limit: usize,
    state: Mutex<WidgetState>,
}

impl<H: WidgetHost> FeedbackWidget<H> {
    pub fn new(host: H, connector: impl StoreConnector + 'static, roster: Roster) -> Self {
        Self {
            host,
            connector: Box::new(connector),
            store: OnceCell::new(),
            roster,
            limit: DEFAULT_LIST_LIMIT,
            state: Mutex::new(WidgetState {
                open: false,
                filter: PageFilter::Current,
                author: String::new(),
                draft: String::new(),
                submitting: false,
                page: String::new(),
                list: ListState::Idle,
            }),
        }
    }

    /// Override how many recent records a list load fetches.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether the store connection has been established.
    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    fn lock(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn store(&self) -> Result<Arc<dyn FeedbackStore>, StoreError> {
        let store = self
            .store
            .get_or_try_init(|| async {
                let store = self.connector.connect().await?;
                info!("feedback widget connected to store");
                Ok::<_, StoreError>(store)
            })
            .await?;
        Ok(Arc::clone(store))
    }

    /// Log, alert, and hand back a store failure.
    fn fail(&self, action: &str, err: StoreError) -> WidgetError {
        warn!(error = %err, code = err.error_code(), action, "feedback widget operation failed");
        self.host.alert(&format!("Failed to {action} feedback: {err}"));
        WidgetError::Store(err)
    }

    // -------------------------------------------------------------------------
    // Panel
    // -------------------------------------------------------------------------

    /// Open the panel if closed, close it if open.
    pub async fn toggle(&self) {
        let is_open = self.lock().open;
        if is_open {
            self.close();
        } else {
            self.open().await;
        }
    }

    /// Open the panel: observe the current page, connect if needed, load the list.
    pub async fn open(&self) {
        let page = self.host.current_page();
        {
            let mut st = self.lock();
            st.open = true;
            st.page = page;
        }
        self.load_list().await;
    }

    pub fn close(&self) {
        self.lock().open = false;
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    pub fn select_author(&self, name: &str) {
        name.clone_into(&mut self.lock().author);
    }

    pub fn set_draft(&self, text: &str) {
        text.clone_into(&mut self.lock().draft);
    }

    /// Switch between this page and all pages; reloads when the panel is open.
    pub async fn set_filter(&self, filter: PageFilter) {
        let reload = {
            let mut st = self.lock();
            st.filter = filter;
            st.open
        };
        if reload {
            self.load_list().await;
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Submit the draft as the selected author on the current page.
    ///
    /// # Errors
    ///
    /// Validation failures and store failures are alerted through the host
    /// and returned. On any failure the draft is left intact.
    pub async fn submit(&self) -> Result<FeedbackRecord, WidgetError> {
        let page = self.host.current_page();
        let validated = {
            let mut st = self.lock();
            if st.submitting {
                return Err(WidgetError::Busy);
            }
            st.page.clone_from(&page);
            let candidate =
                NewFeedback { author: st.author.clone(), content: st.draft.clone(), page, timestamp: now_ms() };
            let validated = candidate.validate(&self.roster);
            st.submitting = validated.is_ok();
            validated
        };
        let new = match validated {
            Ok(new) => new,
            Err(e) => {
                self.host.alert(&e.to_string());
                return Err(e.into());
            }
        };

        let result = match self.store().await {
            Ok(store) => store.add(new).await,
            Err(e) => Err(e),
        };
        self.lock().submitting = false;

        let record = result.map_err(|e| self.fail("submit", e))?;
        info!(id = %record.id, page = %record.page, "feedback submitted");
        self.lock().draft.clear();
        self.load_list().await;
        Ok(record)
    }

    /// Reload the list. Failures render inline and are never returned.
    pub async fn load_list(&self) {
        let (filter, page) = {
            let st = self.lock();
            (st.filter, st.page.clone())
        };

        let list = match self.store().await {
            Err(e) => {
                warn!(error = %e, "feedback store connection failed");
                ListState::Failed(view::CONNECT_FAILED)
            }
            Ok(store) => match store.recent(self.limit).await {
                Ok(mut records) => {
                    sort_recent_first(&mut records);
                    ListState::Loaded(filter.retain(records, &page))
                }
                Err(e) => {
                    warn!(error = %e, "feedback list load failed");
                    ListState::Failed(view::LOAD_FAILED)
                }
            },
        };
        self.lock().list = list;
    }

    /// Mark one record resolved (`true`) or open again (`false`).
    ///
    /// # Errors
    ///
    /// Store failures are alerted and returned; the list is left as it was.
    pub async fn toggle_resolved(&self, id: Uuid, resolved: bool) -> Result<FeedbackRecord, WidgetError> {
        let resolution = Resolution::from_flag(resolved, now_ms());
        let result = match self.store().await {
            Ok(store) => store.set_resolution(id, resolution).await,
            Err(e) => Err(e),
        };
        let record = result.map_err(|e| self.fail("update", e))?;
        self.load_list().await;
        Ok(record)
    }

    /// Delete one record after the host confirms. Returns `false` if declined.
    ///
    /// # Errors
    ///
    /// Store failures are alerted and returned.
    pub async fn delete(&self, id: Uuid) -> Result<bool, WidgetError> {
        if !self.host.confirm(DELETE_CONFIRM) {
            return Ok(false);
        }
        let result = match self.store().await {
            Ok(store) => store.delete(id).await,
            Err(e) => Err(e),
        };
        result.map_err(|e| self.fail("delete", e))?;
        info!(%id, "feedback deleted");
        self.load_list().await;
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Render
    // -------------------------------------------------------------------------

    pub fn view(&self) -> WidgetView {
        let st = self.lock();
        let list = match &st.list {
            ListState::Idle => ListView::Idle,
            ListState::Failed(message) => ListView::Error(*message),
            ListState::Loaded(records) => view::list_view(records, st.filter),
        };
        WidgetView {
            open: st.open,
            toggle_label: if st.open { view::TOGGLE_LABEL_OPEN } else { view::TOGGLE_LABEL_CLOSED },
            page: st.page.clone(),
            authors: self
                .roster
                .names()
                .iter()
                .map(|name| AuthorOption { name: name.clone(), selected: *name == st.author })
                .collect(),
            draft: st.draft.clone(),
            submit_label: if st.submitting { view::SUBMITTING_LABEL } else { view::SUBMIT_LABEL },
            submit_enabled: !st.submitting,
            filter: st.filter,
            list,
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
