use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Notify;

use super::*;
use crate::store::MemoryStore;

// =============================================================
// Test doubles
// =============================================================

struct MockHost {
    page: Mutex<String>,
    alerts: Mutex<Vec<String>>,
    confirm_answer: AtomicBool,
    confirms: AtomicUsize,
}

impl MockHost {
    fn on_page(page: &str) -> Self {
        Self {
            page: Mutex::new(page.to_owned()),
            alerts: Mutex::new(Vec::new()),
            confirm_answer: AtomicBool::new(true),
            confirms: AtomicUsize::new(0),
        }
    }

    fn navigate(&self, page: &str) {
        *self.page.lock().unwrap() = page.to_owned();
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl WidgetHost for MockHost {
    fn current_page(&self) -> String {
        self.page.lock().unwrap().clone()
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_owned());
    }

    fn confirm(&self, _message: &str) -> bool {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

/// Counts connects; fails the first `fail_first` attempts.
struct CountingConnector {
    store: Arc<dyn FeedbackStore>,
    attempts: Arc<AtomicUsize>,
    fail_first: usize,
}

#[async_trait::async_trait]
impl StoreConnector for CountingConnector {
    async fn connect(&self) -> Result<Arc<dyn FeedbackStore>, StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(StoreError::Transport("connection refused".into()));
        }
        Ok(Arc::clone(&self.store))
    }
}

/// Every operation fails with a transport error.
struct FailingStore;

#[async_trait::async_trait]
impl FeedbackStore for FailingStore {
    async fn add(&self, _new: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        Err(StoreError::Transport("offline".into()))
    }

    async fn set_resolution(&self, _id: Uuid, _resolution: Resolution) -> Result<FeedbackRecord, StoreError> {
        Err(StoreError::Transport("offline".into()))
    }

    async fn delete(&self, _id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::Transport("offline".into()))
    }

    async fn recent(&self, _limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        Err(StoreError::Transport("offline".into()))
    }
}

/// Holds `add` until released, so in-flight state can be observed.
struct GatedStore {
    inner: MemoryStore,
    entered: Notify,
    release: Notify,
}

#[async_trait::async_trait]
impl FeedbackStore for GatedStore {
    async fn add(&self, new: NewFeedback) -> Result<FeedbackRecord, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.add(new).await
    }

    async fn set_resolution(&self, id: Uuid, resolution: Resolution) -> Result<FeedbackRecord, StoreError> {
        self.inner.set_resolution(id, resolution).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.inner.recent(limit).await
    }
}

fn roster() -> Roster {
    Roster::new(["Ana", "Ben"])
}

fn widget_over(store: Arc<dyn FeedbackStore>, page: &str) -> FeedbackWidget<MockHost> {
    FeedbackWidget::new(MockHost::on_page(page), Connected(store), roster())
}

fn items(view: &WidgetView) -> Vec<FeedbackItemView> {
    match &view.list {
        ListView::Items(items) => items.clone(),
        other => panic!("expected items, got {other:?}"),
    }
}

// =============================================================
// Submit
// =============================================================

#[tokio::test]
async fn submit_with_empty_author_is_rejected_without_write() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.set_draft("the second paragraph is unclear");

    let err = widget.submit().await.unwrap_err();

    assert!(matches!(err, WidgetError::Invalid(ValidationError::MissingAuthor)));
    assert_eq!(widget.host().alerts(), vec!["Please select your name".to_string()]);
    assert!(store.is_empty().await);
    assert_eq!(widget.view().draft, "the second paragraph is unclear");
}

#[tokio::test]
async fn submit_with_whitespace_content_is_rejected_without_write() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.select_author("Ana");
    widget.set_draft("   \n ");

    let err = widget.submit().await.unwrap_err();

    assert_eq!(err.error_code(), "E_MISSING_CONTENT");
    assert_eq!(widget.host().alerts(), vec!["Please enter feedback".to_string()]);
    assert!(store.is_empty().await);
    assert!(widget.view().submit_enabled);
}

#[tokio::test]
async fn successful_submit_surfaces_new_record_first() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.open().await;

    widget.select_author("Ana");
    widget.set_draft("first");
    widget.submit().await.unwrap();
    widget.set_draft("  second  ");
    let record = widget.submit().await.unwrap();

    assert_eq!(record.content, "second");
    assert_eq!(record.page, "intro");
    assert!(record.timestamp > 0);

    let view = widget.view();
    assert_eq!(view.draft, "", "draft cleared on success");
    assert!(view.authors.iter().any(|a| a.name == "Ana" && a.selected), "author selection kept");
    let listed = items(&view);
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, record.id);
    assert!(widget.host().alerts().is_empty());
}

#[tokio::test]
async fn submit_uses_page_at_submission_time() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.open().await;

    widget.host().navigate("quiz");
    widget.select_author("Ben");
    widget.set_draft("question 3 has two right answers");
    let record = widget.submit().await.unwrap();

    assert_eq!(record.page, "quiz");
    assert_eq!(widget.view().page, "quiz");
    assert_eq!(items(&widget.view()).len(), 1, "list follows the new page");
}

#[tokio::test]
async fn submit_store_failure_alerts_and_keeps_draft() {
    let widget = widget_over(Arc::new(FailingStore), "intro");
    widget.select_author("Ana");
    widget.set_draft("keep me");

    let err = widget.submit().await.unwrap_err();

    assert!(matches!(err, WidgetError::Store(StoreError::Transport(_))));
    let alerts = widget.host().alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].starts_with("Failed to submit feedback"));
    let view = widget.view();
    assert_eq!(view.draft, "keep me");
    assert!(view.submit_enabled);
    assert_eq!(view.submit_label, view::SUBMIT_LABEL);
}

#[tokio::test]
async fn in_flight_submit_shows_submitting_and_blocks_resubmit() {
    let gated = Arc::new(GatedStore { inner: MemoryStore::new(), entered: Notify::new(), release: Notify::new() });
    let widget = Arc::new(widget_over(gated.clone(), "intro"));
    widget.select_author("Ana");
    widget.set_draft("slow network");

    let task = {
        let widget = Arc::clone(&widget);
        tokio::spawn(async move { widget.submit().await })
    };
    gated.entered.notified().await;

    let view = widget.view();
    assert!(!view.submit_enabled);
    assert_eq!(view.submit_label, view::SUBMITTING_LABEL);
    assert!(matches!(widget.submit().await, Err(WidgetError::Busy)));

    gated.release.notify_one();
    let record = task.await.unwrap().unwrap();
    assert_eq!(record.content, "slow network");
    assert!(widget.view().submit_enabled);
    assert_eq!(gated.inner.len().await, 1);
}

// =============================================================
// Listing
// =============================================================

#[tokio::test]
async fn view_before_open_is_idle_and_closed() {
    let widget = widget_over(Arc::new(MemoryStore::new()), "intro");
    let view = widget.view();
    assert!(!view.open);
    assert_eq!(view.toggle_label, view::TOGGLE_LABEL_CLOSED);
    assert_eq!(view.list, ListView::Idle);
    assert_eq!(view.filter, PageFilter::Current);
    assert!(!widget.is_connected(), "connection is lazy");
}

#[tokio::test]
async fn toggle_opens_then_closes() {
    let widget = widget_over(Arc::new(MemoryStore::new()), "intro");
    widget.toggle().await;
    let view = widget.view();
    assert!(view.open);
    assert_eq!(view.toggle_label, view::TOGGLE_LABEL_OPEN);
    assert_eq!(view.list, ListView::Empty(view::EMPTY_CURRENT_PAGE));

    widget.toggle().await;
    assert!(!widget.view().open);
}

#[tokio::test]
async fn current_filter_excludes_other_pages() {
    let store = Arc::new(MemoryStore::new());
    for (page, content) in [("intro", "a"), ("quiz", "b"), ("intro", "c")] {
        store
            .add(NewFeedback { author: "Ana".into(), content: content.into(), page: page.into(), timestamp: 1 })
            .await
            .unwrap();
    }
    let widget = widget_over(store, "intro");
    widget.open().await;

    let listed = items(&widget.view());
    assert_eq!(listed.iter().map(|i| i.content.as_str()).collect::<Vec<_>>(), vec!["c", "a"]);
    assert!(listed.iter().all(|i| i.page.is_none()));

    widget.set_filter(PageFilter::All).await;
    let listed = items(&widget.view());
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[1].page.as_deref(), Some("quiz"));
}

#[tokio::test]
async fn empty_all_pages_message() {
    let widget = widget_over(Arc::new(MemoryStore::new()), "intro");
    widget.set_filter(PageFilter::All).await;
    assert_eq!(widget.view().list, ListView::Idle, "closed panel does not reload");
    widget.open().await;
    assert_eq!(widget.view().list, ListView::Empty(view::EMPTY_ALL_PAGES));
}

#[tokio::test]
async fn list_respects_limit() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..5 {
        store
            .add(NewFeedback { author: "Ana".into(), content: format!("n{i}"), page: "intro".into(), timestamp: 1 })
            .await
            .unwrap();
    }
    let widget = widget_over(store, "intro").with_limit(2);
    widget.open().await;
    let listed = items(&widget.view());
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].content, "n4");
}

#[tokio::test]
async fn load_failure_renders_inline_error_without_alert() {
    let widget = widget_over(Arc::new(FailingStore), "intro");
    widget.open().await;
    assert_eq!(widget.view().list, ListView::Error(view::LOAD_FAILED));
    assert!(widget.host().alerts().is_empty());
}

#[tokio::test]
async fn connection_is_established_once() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let connector =
        CountingConnector { store: Arc::new(MemoryStore::new()), attempts: Arc::clone(&attempts), fail_first: 0 };
    let widget = FeedbackWidget::new(MockHost::on_page("intro"), connector, roster());

    widget.open().await;
    widget.select_author("Ana");
    widget.set_draft("x");
    let record = widget.submit().await.unwrap();
    widget.toggle_resolved(record.id, true).await.unwrap();
    widget.close();
    widget.open().await;

    assert!(widget.is_connected());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_connection_is_retried_on_next_open() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let connector =
        CountingConnector { store: Arc::new(MemoryStore::new()), attempts: Arc::clone(&attempts), fail_first: 1 };
    let widget = FeedbackWidget::new(MockHost::on_page("intro"), connector, roster());

    widget.open().await;
    assert_eq!(widget.view().list, ListView::Error(view::CONNECT_FAILED));
    assert!(!widget.is_connected());

    widget.close();
    widget.open().await;
    assert_eq!(widget.view().list, ListView::Empty(view::EMPTY_CURRENT_PAGE));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

// =============================================================
// Resolve / delete
// =============================================================

#[tokio::test]
async fn toggle_resolved_sets_and_clears_time() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.open().await;
    widget.select_author("Ana");
    widget.set_draft("x");
    let record = widget.submit().await.unwrap();

    let resolved = widget.toggle_resolved(record.id, true).await.unwrap();
    assert!(resolved.resolved);
    assert!(resolved.resolved_at.is_some());
    assert_eq!(items(&widget.view())[0].action_label, view::REOPEN_LABEL);

    let reopened = widget.toggle_resolved(record.id, false).await.unwrap();
    assert!(!reopened.resolved);
    assert_eq!(reopened.resolved_at, None);
    assert_eq!(items(&widget.view())[0].action_label, view::RESOLVE_LABEL);
}

#[tokio::test]
async fn toggle_resolved_failure_alerts() {
    let widget = widget_over(Arc::new(FailingStore), "intro");
    let err = widget.toggle_resolved(Uuid::new_v4(), true).await.unwrap_err();
    assert_eq!(err.error_code(), "E_TRANSPORT");
    assert!(widget.host().alerts()[0].starts_with("Failed to update feedback"));
}

#[tokio::test]
async fn delete_requires_confirmation_and_removes_record() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.open().await;
    widget.select_author("Ben");
    widget.set_draft("remove me");
    let record = widget.submit().await.unwrap();

    assert!(widget.delete(record.id).await.unwrap());

    assert_eq!(widget.host().confirms.load(Ordering::SeqCst), 1);
    assert!(store.is_empty().await);
    assert_eq!(widget.view().list, ListView::Empty(view::EMPTY_CURRENT_PAGE));
}

#[tokio::test]
async fn declined_delete_performs_no_write() {
    let store = Arc::new(MemoryStore::new());
    let widget = widget_over(store.clone(), "intro");
    widget.select_author("Ben");
    widget.set_draft("keep me");
    let record = widget.submit().await.unwrap();
    widget.host().confirm_answer.store(false, Ordering::SeqCst);

    assert!(!widget.delete(record.id).await.unwrap());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn delete_missing_record_alerts() {
    let widget = widget_over(Arc::new(MemoryStore::new()), "intro");
    let err = widget.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, WidgetError::Store(StoreError::NotFound(_))));
    assert!(widget.host().alerts()[0].starts_with("Failed to delete feedback"));
}
