//! Pending-callback registry
//!
//! Maps a dialog id to the one-shot callback that resolves its caller. The
//! registry owns every callback from registration until it is taken for
//! invocation or evicted. `register` and `take` are atomic with respect to each
//! other, so a callback can be invoked at most once even when dismissals race.

use crate::error::{HandlerError, RegistryError};
use crate::types::{ActionHandler, DialogResult, DialogType};
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// One-shot completion handler for a single dialog
///
/// Invoking consumes the callback. Dropping it without invoking abandons the
/// dialog, which resolves the caller's future with an error instead of leaving
/// it pending forever.
pub struct PendingCallback {
    kind: DialogType,
    handlers: HashMap<String, ActionHandler>,
    responder: oneshot::Sender<DialogResult>,
    registered_at: Instant,
}

impl PendingCallback {
    pub(crate) fn new(
        kind: DialogType,
        handlers: Vec<(String, ActionHandler)>,
        responder: oneshot::Sender<DialogResult>,
    ) -> Self {
        Self {
            kind,
            handlers: handlers.into_iter().collect(),
            responder,
            registered_at: Instant::now(),
        }
    }

    pub fn kind(&self) -> DialogType {
        self.kind
    }

    pub fn age(&self) -> Duration {
        self.registered_at.elapsed()
    }

    /// Run the handler bound to `action`, if any, then resolve the caller with
    /// `{action, input}`. The caller is resolved whether or not the handler fails.
    pub fn invoke(mut self, action: &str, input: Option<Value>) -> Result<(), HandlerError> {
        let outcome = match self.handlers.remove(action) {
            Some(handler) => run_handler(action, handler, input.clone()),
            None => Ok(()),
        };

        let result = DialogResult {
            action: action.to_string(),
            input,
        };
        if self.responder.send(result).is_err() {
            debug!("Dialog caller went away before action '{}' was delivered", action);
        }

        outcome
    }
}

impl std::fmt::Debug for PendingCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.handlers.keys().collect();
        keys.sort();
        f.debug_struct("PendingCallback")
            .field("kind", &self.kind)
            .field("handlers", &keys)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}

fn run_handler(action: &str, handler: ActionHandler, input: Option<Value>) -> Result<(), HandlerError> {
    match panic::catch_unwind(AssertUnwindSafe(move || handler(input))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(HandlerError::Failed {
            action: action.to_string(),
            source,
        }),
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            Err(HandlerError::Panicked {
                action: action.to_string(),
                message,
            })
        }
    }
}

/// Id -> pending callback map, guarded for multi-threaded use
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    pending: Mutex<HashMap<String, PendingCallback>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingCallback>> {
        // No operation leaves the map half-updated, so a poisoned lock is still usable
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `callback` under `id`
    ///
    /// # Returns
    /// Returns `DuplicateId` if `id` is already pending; the existing entry is kept
    /// and `callback` is dropped.
    pub fn register(&self, id: &str, callback: PendingCallback) -> Result<(), RegistryError> {
        let mut pending = self.lock();
        if pending.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        pending.insert(id.to_string(), callback);
        Ok(())
    }

    /// Register `callback` under the first id from `generate` that is not pending
    ///
    /// Ids are drawn and checked under the same lock, so no other registration can
    /// claim the chosen id in between.
    ///
    /// # Returns
    /// Returns the chosen id, or `DuplicateId` with the last candidate once
    /// `attempts` ids have all collided.
    pub fn register_unique<G>(&self, attempts: u32, mut generate: G, callback: PendingCallback) -> Result<String, RegistryError>
    where
        G: FnMut() -> String,
    {
        let mut pending = self.lock();
        let mut last = String::new();
        for _ in 0..attempts.max(1) {
            let id = generate();
            if !pending.contains_key(&id) {
                pending.insert(id.clone(), callback);
                return Ok(id);
            }
            debug!("Generated dialog id '{}' collides with a pending dialog", id);
            last = id;
        }
        Err(RegistryError::DuplicateId(last))
    }

    /// Remove and return the callback for `id`
    pub fn take(&self, id: &str) -> Option<PendingCallback> {
        self.lock().remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Evict every callback registered longer ago than `max_age`
    ///
    /// # Returns
    /// Returns the evicted ids. Their callers resolve as abandoned.
    pub fn expire_older_than(&self, max_age: Duration) -> Vec<String> {
        let expired: Vec<(String, PendingCallback)> = {
            let mut pending = self.lock();
            let ids: Vec<String> = pending
                .iter()
                .filter(|(_, callback)| callback.age() > max_age)
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| pending.remove(&id).map(|callback| (id, callback)))
                .collect()
        };

        // Callbacks are dropped outside the lock since handlers may own arbitrary state
        expired.into_iter().map(|(id, _)| id).collect()
    }

    /// Evict everything, returning how many callbacks were abandoned
    pub fn clear(&self) -> usize {
        let drained: Vec<PendingCallback> = self.lock().drain().map(|(_, callback)| callback).collect();
        drained.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn callback(handlers: Vec<(String, ActionHandler)>) -> (PendingCallback, oneshot::Receiver<DialogResult>) {
        let (tx, rx) = oneshot::channel();
        (PendingCallback::new(DialogType::Question, handlers, tx), rx)
    }

    #[test]
    fn test_register_and_take() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());

        let (cb, _rx) = callback(Vec::new());
        registry.register("a", cb).unwrap();
        assert!(registry.contains("a"));
        assert_eq!(registry.len(), 1);

        assert!(registry.take("a").is_some());
        assert!(registry.take("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = CallbackRegistry::new();
        let (first, mut first_rx) = callback(Vec::new());
        let (second, mut second_rx) = callback(Vec::new());

        registry.register("a", first).unwrap();
        let err = registry.register("a", second).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("a".to_string()));

        // The rejected callback was dropped, the original is still live
        assert!(second_rx.try_recv().is_err());
        registry.take("a").unwrap().invoke("ok", None).unwrap();
        assert_eq!(first_rx.try_recv().unwrap().action, "ok");
    }

    #[test]
    fn test_register_unique_skips_taken_ids() {
        let registry = CallbackRegistry::new();
        let (first, _first_rx) = callback(Vec::new());
        registry.register("dlg-1", first).unwrap();

        let mut candidates = vec!["dlg-1", "dlg-2"].into_iter();
        let (second, _second_rx) = callback(Vec::new());
        let id = registry
            .register_unique(3, || candidates.next().unwrap_or("dlg-x").to_string(), second)
            .unwrap();
        assert_eq!(id, "dlg-2");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_unique_gives_up() {
        let registry = CallbackRegistry::new();
        let (first, _first_rx) = callback(Vec::new());
        registry.register("same", first).unwrap();

        let (second, mut second_rx) = callback(Vec::new());
        let err = registry.register_unique(2, || "same".to_string(), second).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("same".to_string()));
        assert!(matches!(second_rx.try_recv(), Err(oneshot::error::TryRecvError::Closed)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invoke_runs_matching_handler_only() {
        let hits = Arc::new(AtomicUsize::new(0));
        let yes_hits = Arc::clone(&hits);
        let handler: ActionHandler = Box::new(move |_| {
            yes_hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let (cb, mut rx) = callback(vec![("yes".to_string(), handler)]);

        cb.invoke("no", Some(Value::Bool(true))).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        let result = rx.try_recv().unwrap();
        assert_eq!(result.action, "no");
        assert_eq!(result.input, Some(Value::Bool(true)));
    }

    #[test]
    fn test_panicking_handler_still_resolves() {
        let handler: ActionHandler = Box::new(|_| panic!("handler exploded"));
        let (cb, mut rx) = callback(vec![("yes".to_string(), handler)]);

        let err = cb.invoke("yes", None).unwrap_err();
        match err {
            HandlerError::Panicked { action, message } => {
                assert_eq!(action, "yes");
                assert_eq!(message, "handler exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(rx.try_recv().unwrap().action, "yes");
    }

    #[test]
    fn test_clear_abandons_callers() {
        let registry = CallbackRegistry::new();
        let (a, mut a_rx) = callback(Vec::new());
        let (b, mut b_rx) = callback(Vec::new());
        registry.register("a", a).unwrap();
        registry.register("b", b).unwrap();

        assert_eq!(registry.clear(), 2);
        assert!(registry.is_empty());
        assert!(matches!(a_rx.try_recv(), Err(oneshot::error::TryRecvError::Closed)));
        assert!(matches!(b_rx.try_recv(), Err(oneshot::error::TryRecvError::Closed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_older_than() {
        let registry = CallbackRegistry::new();
        let (old, mut old_rx) = callback(Vec::new());
        registry.register("old", old).unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        let (fresh, _fresh_rx) = callback(Vec::new());
        registry.register("fresh", fresh).unwrap();

        let expired = registry.expire_older_than(Duration::from_secs(5));
        assert_eq!(expired, vec!["old".to_string()]);
        assert!(registry.contains("fresh"));
        assert!(matches!(old_rx.try_recv(), Err(oneshot::error::TryRecvError::Closed)));
    }
}
