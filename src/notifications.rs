//! Notification flow: announce now, optionally auto-dismiss later
//!
//! Timers run as tokio tasks and are tracked per notification id so an
//! explicit dismissal can cancel them. A finished timer removes its own entry.

use crate::dialogs::DialogService;
use crate::types::Notification;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

/// Returned by `add_notification`
///
/// Dropping the handle detaches the timer; it still fires.
#[derive(Debug)]
pub struct NotificationHandle {
    id: String,
    timer: Option<JoinHandle<()>>,
}

impl NotificationHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether an auto-dismiss was scheduled
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Wait until the auto-dismiss has been announced or the timer was cancelled.
    /// Resolves immediately when no timer was scheduled.
    pub async fn dismissed(self) {
        if let Some(timer) = self.timer {
            if let Err(e) = timer.await {
                if !e.is_cancelled() {
                    warn!("Notification timer for {} failed: {}", self.id, e);
                }
            }
        }
    }
}

struct TimerEntry {
    generation: u64,
    abort: AbortHandle,
}

/// Auto-dismiss timers keyed by notification id
#[derive(Default)]
pub(crate) struct NotificationTimers {
    entries: Arc<Mutex<HashMap<String, TimerEntry>>>,
    next_generation: AtomicU64,
}

fn lock_entries(entries: &Mutex<HashMap<String, TimerEntry>>) -> MutexGuard<'_, HashMap<String, TimerEntry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

impl NotificationTimers {
    /// Spawn a timer that runs `on_expiry` for `id` after `delay`.
    /// A timer already scheduled for `id` is cancelled.
    ///
    /// `on_expiry` only runs if this timer is still the one registered for `id`,
    /// and it runs with the timer map locked.
    fn schedule<F>(&self, id: &str, delay: Duration, on_expiry: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No tokio runtime available, notification {} will not auto-dismiss", id);
                return None;
            }
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);
        let timer_id = id.to_string();

        // Spawning under the lock keeps the timer from removing its entry before it exists
        let mut guard = lock_entries(&self.entries);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let mut entries = lock_entries(&entries);
            if entries.get(&timer_id).is_some_and(|entry| entry.generation == generation) {
                entries.remove(&timer_id);
                // Fired under the lock so a concurrent cancel either wins or is ordered after this end
                on_expiry();
            }
        });

        let previous = guard.insert(
            id.to_string(),
            TimerEntry {
                generation,
                abort: handle.abort_handle(),
            },
        );
        if let Some(previous) = previous {
            debug!("Replacing pending auto-dismiss for notification {}", id);
            previous.abort.abort();
        }

        Some(handle)
    }

    /// Cancel the timer for `id`, returning whether one was pending
    fn cancel(&self, id: &str) -> bool {
        match lock_entries(&self.entries).remove(id) {
            Some(entry) => {
                entry.abort.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) {
        for (_, entry) in lock_entries(&self.entries).drain() {
            entry.abort.abort();
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock_entries(&self.entries).len()
    }
}

impl DialogService {
    /// Announce `notification` and schedule its auto-dismiss if it has a duration
    ///
    /// An unset id is generated first. Durations above
    /// `notifications.max_display_ms` are clamped. Must be called from within a
    /// tokio runtime for the timer to be scheduled.
    pub fn add_notification(&self, mut notification: Notification) -> NotificationHandle {
        let id = match &notification.id {
            Some(id) => id.clone(),
            None => {
                let id = self.ids.generate();
                notification.id = Some(id.clone());
                id
            }
        };

        // The previous timer must be gone before the new notification is announced
        if self.timers.cancel(&id) {
            debug!("Replacing pending auto-dismiss for notification {}", id);
        }
        self.sink.notification_start(&notification);

        let timer = notification.display_ms.and_then(|display_ms| {
            let delay = Duration::from_millis(display_ms.min(self.config.notifications.max_display_ms));
            let sink = Arc::clone(&self.sink);
            let expired_id = id.clone();
            debug!("Notification {} will be dismissed in {:?}", id, delay);
            self.timers.schedule(&id, delay, move || {
                debug!("Auto-dismissing notification {}", expired_id);
                sink.notification_end(&expired_id);
            })
        });

        NotificationHandle { id, timer }
    }

    /// Dismiss notification `id` now, cancelling its auto-dismiss if still pending
    pub fn dismiss_notification(&self, id: &str) {
        if self.timers.cancel(id) {
            debug!("Cancelled auto-dismiss for notification {}", id);
        }
        self.sink.notification_end(id);
    }

    /// Number of notifications waiting on an auto-dismiss timer
    pub fn scheduled_notifications(&self) -> usize {
        self.timers.len()
    }
}
