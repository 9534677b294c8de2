//! Dialog request/response flow and the dismissal dispatcher
//!
//! [`DialogService`] is the application-owned entry point. Opening a dialog
//! registers a one-shot callback and hands the caller a [`DialogResponse`]
//! future; closing it takes that callback out of the registry, runs the
//! handler for the chosen action and resolves the future.
//!
//! # Example
//!
//! ```no_run
//! use modal_relay::{ChannelSink, DialogActions, DialogContent, DialogService, DialogType};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), modal_relay::DialogError> {
//! let (sink, _announcements) = ChannelSink::new();
//! let service = DialogService::new(Arc::new(sink));
//!
//! let response = service.show_dialog(
//!     DialogType::Question,
//!     "Delete?",
//!     DialogContent::message("This cannot be undone"),
//!     DialogActions::new().choice("yes").choice("no"),
//! )?;
//!
//! // The renderer answers later, usually from another task
//! service.close_dialog(response.id(), "yes", None);
//! let result = response.await?;
//! assert_eq!(result.action, "yes");
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::error::{DialogError, DismissOutcome};
use crate::id::{IdGenerator, UuidGenerator};
use crate::notifications::NotificationTimers;
use crate::registry::{CallbackRegistry, PendingCallback};
use crate::sink::AnnouncementSink;
use crate::types::{DialogActions, DialogContent, DialogRequest, DialogResult, DialogType};
use log::{debug, error, warn};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Future resolving to the user's choice for one dialog
#[derive(Debug)]
#[must_use = "the dialog result is only observable by awaiting the response"]
pub struct DialogResponse {
    id: String,
    receiver: oneshot::Receiver<DialogResult>,
}

impl DialogResponse {
    /// Correlation id of the dialog, as announced to the renderer
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Future for DialogResponse {
    type Output = Result<DialogResult, DialogError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        Pin::new(&mut this.receiver)
            .poll(cx)
            .map(|received| received.map_err(|_| DialogError::Abandoned(this.id.clone())))
    }
}

/// Correlates dialogs and notifications with their eventual dismissal
pub struct DialogService {
    pub(crate) registry: CallbackRegistry,
    pub(crate) sink: Arc<dyn AnnouncementSink>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) config: Config,
    pub(crate) timers: NotificationTimers,
}

impl DialogService {
    pub fn new(sink: Arc<dyn AnnouncementSink>) -> Self {
        Self::with_config(sink, Config::default())
    }

    pub fn with_config(sink: Arc<dyn AnnouncementSink>, config: Config) -> Self {
        Self {
            registry: CallbackRegistry::new(),
            sink,
            ids: Arc::new(UuidGenerator),
            config,
            timers: NotificationTimers::default(),
        }
    }

    /// Replace the id generator used for dialogs and unnamed notifications
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of dialogs still waiting for a response
    pub fn pending_dialogs(&self) -> usize {
        self.registry.len()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Open a dialog under a freshly generated id
    ///
    /// The callback is registered before the dialog is announced, so a renderer
    /// answering synchronously from inside the sink still finds it.
    ///
    /// # Returns
    /// Returns the response future, or `DuplicateId` if every generated id collided.
    pub fn show_dialog(
        &self,
        kind: DialogType,
        title: impl Into<String>,
        content: DialogContent,
        actions: DialogActions,
    ) -> Result<DialogResponse, DialogError> {
        let keys = actions.keys();
        let (tx, rx) = oneshot::channel();
        let callback = PendingCallback::new(kind, actions.into_handlers(), tx);

        let ids = Arc::clone(&self.ids);
        let id = self
            .registry
            .register_unique(self.config.dialogs.id_attempts, || ids.generate(), callback)?;

        self.announce_open(&id, kind, title.into(), content, keys);
        Ok(DialogResponse { id, receiver: rx })
    }

    /// Open a dialog under a caller-chosen id
    ///
    /// # Returns
    /// Returns `DuplicateId` without announcing anything if `id` is already pending.
    pub fn show_dialog_with_id(
        &self,
        id: impl Into<String>,
        kind: DialogType,
        title: impl Into<String>,
        content: DialogContent,
        actions: DialogActions,
    ) -> Result<DialogResponse, DialogError> {
        let id = id.into();
        let keys = actions.keys();
        let (tx, rx) = oneshot::channel();
        let callback = PendingCallback::new(kind, actions.into_handlers(), tx);

        self.registry.register(&id, callback)?;

        self.announce_open(&id, kind, title.into(), content, keys);
        Ok(DialogResponse { id, receiver: rx })
    }

    fn announce_open(&self, id: &str, kind: DialogType, title: String, content: DialogContent, actions: Vec<String>) {
        debug!("Opening {} dialog {} with actions [{}]", kind, id, actions.join(", "));
        let request = DialogRequest {
            id: id.to_string(),
            kind,
            title,
            content,
            actions,
        };
        self.sink.dialog_open(&request);
    }

    /// Dismiss dialog `id` with the user's choice
    ///
    /// The close is always announced, even when nothing is pending. Handler
    /// failures are logged and reported in the outcome, never propagated.
    pub fn close_dialog(&self, id: &str, action: &str, input: Option<Value>) -> DismissOutcome {
        self.sink.dialog_close(id);

        let Some(callback) = self.registry.take(id) else {
            debug!("No pending callback for dialog {} (action: {})", id, action);
            return DismissOutcome::Unregistered;
        };

        match callback.invoke(action, input) {
            Ok(()) => DismissOutcome::Resolved,
            Err(err) => {
                error!("Failed to invoke dialog callback (id: {}, action: {}): {}", id, action, err);
                DismissOutcome::HandlerFailed(err)
            }
        }
    }

    /// Dismiss dialog `id` without a response
    ///
    /// No handler runs and the caller's future resolves to `Abandoned`.
    ///
    /// # Returns
    /// Returns whether a callback was pending.
    pub fn dismiss_dialog(&self, id: &str) -> bool {
        self.sink.dialog_close(id);
        match self.registry.take(id) {
            Some(callback) => {
                debug!("Abandoned {} dialog {}", callback.kind(), id);
                true
            }
            None => false,
        }
    }

    /// Abandon dialogs pending longer than `dialogs.expiry_secs`
    ///
    /// Does nothing when expiry is disabled (0).
    ///
    /// # Returns
    /// Returns the ids of the expired dialogs.
    pub fn expire_stale_dialogs(&self) -> Vec<String> {
        match self.config.dialogs.expiry_secs {
            0 => Vec::new(),
            secs => self.expire_dialogs_older_than(Duration::from_secs(secs)),
        }
    }

    /// Abandon dialogs pending longer than `max_age`, announcing their close
    pub fn expire_dialogs_older_than(&self, max_age: Duration) -> Vec<String> {
        let expired = self.registry.expire_older_than(max_age);
        for id in &expired {
            warn!("Dialog {} expired after {:?} without a response", id, max_age);
            self.sink.dialog_close(id);
        }
        expired
    }

    /// Abandon all pending dialogs and cancel all notification timers
    pub fn shutdown(&self) {
        for id in self.registry.pending_ids() {
            self.dismiss_dialog(&id);
        }
        self.timers.cancel_all();
    }
}

impl Drop for DialogService {
    fn drop(&mut self) {
        // Detached timers would otherwise keep announcing after teardown
        self.timers.cancel_all();
    }
}

impl std::fmt::Debug for DialogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogService")
            .field("pending_dialogs", &self.registry.len())
            .field("active_timers", &self.timers.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialGenerator;
    use crate::sink::{Announcement, ChannelSink};

    fn service() -> (DialogService, tokio::sync::mpsc::UnboundedReceiver<Announcement>) {
        let (sink, rx) = ChannelSink::new();
        let service = DialogService::new(Arc::new(sink)).with_id_generator(Arc::new(SequentialGenerator::new("dlg")));
        (service, rx)
    }

    #[tokio::test]
    async fn test_generated_ids_are_announced() {
        let (service, mut rx) = service();
        let response = service
            .show_dialog(DialogType::Info, "Hi", DialogContent::default(), DialogActions::new().choice("ok"))
            .unwrap();
        assert_eq!(response.id(), "dlg-1");

        match rx.try_recv().unwrap() {
            Announcement::DialogOpen(request) => {
                assert_eq!(request.id, "dlg-1");
                assert_eq!(request.actions, vec!["ok"]);
            }
            other => panic!("unexpected announcement: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_caller_supplied_duplicate_is_rejected_silently() {
        let (service, mut rx) = service();
        let _first = service
            .show_dialog_with_id("fixed", DialogType::Info, "A", DialogContent::default(), DialogActions::new())
            .unwrap();
        let _ = rx.try_recv();

        let err = service
            .show_dialog_with_id("fixed", DialogType::Info, "B", DialogContent::default(), DialogActions::new())
            .unwrap_err();
        assert_eq!(err, DialogError::DuplicateId("fixed".to_string()));
        assert!(rx.try_recv().is_err());
        assert_eq!(service.pending_dialogs(), 1);
    }
}
