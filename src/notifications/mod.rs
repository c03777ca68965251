//! Transient toast notifications.
//!
//! [`Notifier::emit`] is fire-and-forget: the toast is inserted into the UI
//! tree, slides in after a short delay, stays visible for a fixed time, slides
//! out and is removed. Concurrent toasts are independent of one another. Every
//! phase change is also broadcast as a [`NotificationEvent`] for hosts that
//! render toasts themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::ui::{Element, ElementId, UiTree};

const EVENT_CAPACITY: usize = 64;
const TOAST_CLASS: &str = "toast";
const TOAST_ANCHOR_CLASS: &str = "toast-top-right";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn class(self) -> &'static str {
        match self {
            NotificationKind::Info => "toast-info",
            NotificationKind::Success => "toast-success",
            NotificationKind::Warning => "toast-warning",
            NotificationKind::Error => "toast-error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationPhase {
    /// Inserted but still off-screen.
    Entering,
    Visible,
    /// Sliding out; removal follows.
    Exiting,
    Removed,
}

impl NotificationPhase {
    fn class(self) -> &'static str {
        match self {
            NotificationPhase::Entering => "toast-entering",
            NotificationPhase::Visible => "toast-visible",
            NotificationPhase::Exiting => "toast-exiting",
            NotificationPhase::Removed => "toast-removed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    pub phase: NotificationPhase,
}

impl Notification {
    pub fn element_id(&self) -> ElementId {
        element_id(self.id)
    }
}

fn element_id(id: Uuid) -> ElementId {
    ElementId::new(format!("notification-{id}"))
}

/// Lifecycle change published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub phase: NotificationPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTimings {
    pub enter_delay: Duration,
    pub display_for: Duration,
    pub exit_duration: Duration,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            enter_delay: Duration::from_millis(100),
            display_for: Duration::from_millis(3000),
            exit_duration: Duration::from_millis(300),
        }
    }
}

impl NotificationTimings {
    /// Time from creation until the toast leaves the tree.
    pub fn total(&self) -> Duration {
        self.enter_delay + self.display_for + self.exit_duration
    }
}

/// Owns every toast from creation to removal.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

struct Inner {
    ui: Arc<dyn UiTree>,
    clock: Arc<dyn Clock>,
    timings: NotificationTimings,
    live: Mutex<Vec<Notification>>,
    tasks: Mutex<HashMap<Uuid, AbortHandle>>,
    events: broadcast::Sender<NotificationEvent>,
    closed: AtomicBool,
}

impl Notifier {
    pub fn new(ui: Arc<dyn UiTree>, clock: Arc<dyn Clock>, timings: NotificationTimings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                ui,
                clock,
                timings,
                live: Mutex::new(Vec::new()),
                tasks: Mutex::new(HashMap::new()),
                events,
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Shows `message` as a toast of the given kind.
    pub fn emit(&self, message: impl Into<String>, kind: NotificationKind) {
        if self.inner.closed.load(Ordering::SeqCst) {
            debug!("notifier shut down; dropping notification");
            return;
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            created_at: self.inner.clock.now(),
            phase: NotificationPhase::Entering,
        };
        let id = notification.id;
        debug!(%id, %kind, message = %notification.message, "notification created");

        let element = Element::default()
            .with_text(notification.message.clone())
            .with_class(TOAST_CLASS)
            .with_class(TOAST_ANCHOR_CLASS)
            .with_class(kind.class())
            .with_class(NotificationPhase::Entering.class());
        self.inner.ui.append(notification.element_id(), element);
        self.inner.publish(&notification);
        lock(&self.inner.live).push(notification);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%id, "no async runtime; notification will not be dismissed");
            return;
        };

        let mut tasks = lock(&self.inner.tasks);
        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            let timings = inner.timings;
            tokio::time::sleep(timings.enter_delay).await;
            inner.transition(id, NotificationPhase::Visible);
            tokio::time::sleep(timings.display_for).await;
            inner.transition(id, NotificationPhase::Exiting);
            tokio::time::sleep(timings.exit_duration).await;
            inner.finish(id);
        });
        tasks.insert(id, handle.abort_handle());
    }

    /// Live toasts in creation order.
    pub fn active(&self) -> Vec<Notification> {
        lock(&self.inner.live).clone()
    }

    /// Cancels pending timers and removes every toast still on screen.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        for (_, task) in lock(&self.inner.tasks).drain() {
            task.abort();
        }
        let remaining: Vec<Notification> = lock(&self.inner.live).drain(..).collect();
        for mut notification in remaining {
            self.inner.ui.remove(&notification.element_id());
            notification.phase = NotificationPhase::Removed;
            self.inner.publish(&notification);
        }
    }
}

impl Inner {
    fn transition(&self, id: Uuid, phase: NotificationPhase) {
        let updated = {
            let mut live = lock(&self.live);
            let entry = live.iter_mut().find(|n| n.id == id).map(|notification| {
                let previous = notification.phase;
                notification.phase = phase;
                (previous, notification.clone())
            });
            entry
        };
        let Some((previous, notification)) = updated else {
            return;
        };
        let element = notification.element_id();
        self.ui.remove_class(&element, previous.class());
        self.ui.add_class(&element, phase.class());
        self.publish(&notification);
    }

    fn finish(&self, id: Uuid) {
        let removed = {
            let mut live = lock(&self.live);
            let index = live.iter().position(|n| n.id == id);
            index.map(|index| live.remove(index))
        };
        lock(&self.tasks).remove(&id);
        if let Some(mut notification) = removed {
            self.ui.remove(&notification.element_id());
            notification.phase = NotificationPhase::Removed;
            self.publish(&notification);
            debug!(%id, "notification removed");
        }
    }

    fn publish(&self, notification: &Notification) {
        // Nobody listening is fine.
        let _ = self.events.send(NotificationEvent {
            id: notification.id,
            message: notification.message.clone(),
            kind: notification.kind,
            phase: notification.phase,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::ui::MemoryUi;

    fn notifier() -> (Arc<MemoryUi>, Notifier) {
        let ui = Arc::new(MemoryUi::new());
        let notifier = Notifier::new(
            ui.clone(),
            Arc::new(SystemClock),
            NotificationTimings::default(),
        );
        (ui, notifier)
    }

    fn phase_of(notifier: &Notifier) -> Option<NotificationPhase> {
        notifier.active().first().map(|n| n.phase)
    }

    #[tokio::test(start_paused = true)]
    async fn toast_walks_through_its_lifecycle() {
        let (ui, notifier) = notifier();
        notifier.emit("Now following Sophia Chen!", NotificationKind::Success);
        assert_eq!(phase_of(&notifier), Some(NotificationPhase::Entering));
        assert_eq!(ui.find_by_class("toast").len(), 1);

        tokio::time::sleep(Duration::from_millis(101)).await;
        assert_eq!(phase_of(&notifier), Some(NotificationPhase::Visible));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(phase_of(&notifier), Some(NotificationPhase::Exiting));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(notifier.active().is_empty());
        assert!(ui.find_by_class("toast").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_toasts_do_not_cancel_each_other() {
        let (ui, notifier) = notifier();
        notifier.emit("first", NotificationKind::Info);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        notifier.emit("second", NotificationKind::Warning);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let live = notifier.active();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].message, "second");
        assert_eq!(ui.find_by_class("toast-warning").len(), 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(notifier.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_broadcast_for_each_phase() {
        let (_ui, notifier) = notifier();
        let mut events = notifier.subscribe();
        notifier.emit("hello", NotificationKind::Info);
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let mut phases = Vec::new();
        while let Ok(event) = events.try_recv() {
            phases.push(event.phase);
        }
        assert_eq!(
            phases,
            vec![
                NotificationPhase::Entering,
                NotificationPhase::Visible,
                NotificationPhase::Exiting,
                NotificationPhase::Removed,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_toasts() {
        let (ui, notifier) = notifier();
        notifier.emit("bye", NotificationKind::Error);
        notifier.shutdown();
        assert!(notifier.active().is_empty());
        assert!(ui.is_empty());

        notifier.emit("ignored", NotificationKind::Info);
        assert!(notifier.active().is_empty());
    }

    #[test]
    fn default_timings_total_3400ms() {
        assert_eq!(
            NotificationTimings::default().total(),
            Duration::from_millis(3400)
        );
    }
}
