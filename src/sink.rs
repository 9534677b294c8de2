//! Announcement sink: the one-way contract with the rendering layer
//!
//! The service never reads anything back through this trait. Auto-dismissals
//! call `notification_end` while the service's timer map is locked, so that
//! method must not call back into the service's notification methods.

use crate::types::{DialogRequest, Notification};
use log::info;
use tokio::sync::mpsc;

pub trait AnnouncementSink: Send + Sync {
    /// A notification should appear. `notification.id` is always set.
    fn notification_start(&self, notification: &Notification);

    fn notification_end(&self, id: &str);

    fn dialog_open(&self, request: &DialogRequest);

    fn dialog_close(&self, id: &str);
}

/// Announcement as forwarded by [`ChannelSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum Announcement {
    NotificationStart(Notification),
    NotificationEnd(String),
    DialogOpen(DialogRequest),
    DialogClose(String),
}

impl Announcement {
    /// Correlation id the announcement refers to
    pub fn id(&self) -> Option<&str> {
        match self {
            Announcement::NotificationStart(notification) => notification.id.as_deref(),
            Announcement::NotificationEnd(id) | Announcement::DialogClose(id) => Some(id),
            Announcement::DialogOpen(request) => Some(&request.id),
        }
    }
}

/// Forwards announcements over an unbounded channel to whoever renders them
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Announcement>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Announcement>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }

    fn send(&self, announcement: Announcement) {
        // A renderer that has shut down is not an error for the caller
        let _ = self.sender.send(announcement);
    }
}

impl AnnouncementSink for ChannelSink {
    fn notification_start(&self, notification: &Notification) {
        self.send(Announcement::NotificationStart(notification.clone()));
    }

    fn notification_end(&self, id: &str) {
        self.send(Announcement::NotificationEnd(id.to_string()));
    }

    fn dialog_open(&self, request: &DialogRequest) {
        self.send(Announcement::DialogOpen(request.clone()));
    }

    fn dialog_close(&self, id: &str) {
        self.send(Announcement::DialogClose(id.to_string()));
    }
}

/// Writes announcements to the log, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AnnouncementSink for LogSink {
    fn notification_start(&self, notification: &Notification) {
        info!(
            "notification {} [{:?}]: {}",
            notification.id.as_deref().unwrap_or("-"),
            notification.kind,
            notification.message
        );
    }

    fn notification_end(&self, id: &str) {
        info!("notification {} dismissed", id);
    }

    fn dialog_open(&self, request: &DialogRequest) {
        info!(
            "dialog {} [{}] '{}' actions: {}",
            request.id,
            request.kind,
            request.title,
            request.actions.join(", ")
        );
    }

    fn dialog_close(&self, id: &str) {
        info!("dialog {} closed", id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NotificationType;

    #[test]
    fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        let notification = Notification::new(NotificationType::Info, "hello").with_id("n1");

        sink.notification_start(&notification);
        sink.notification_end("n1");

        assert_eq!(rx.try_recv().unwrap(), Announcement::NotificationStart(notification));
        assert_eq!(rx.try_recv().unwrap(), Announcement::NotificationEnd("n1".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_log_sink_accepts_every_announcement() {
        let sink = LogSink;
        let request = DialogRequest {
            id: "d1".to_string(),
            kind: crate::types::DialogType::Question,
            title: "Quit?".to_string(),
            content: Default::default(),
            actions: vec!["yes".to_string(), "no".to_string()],
        };
        sink.notification_start(&Notification::new(NotificationType::Warning, "careful"));
        sink.notification_end("n1");
        sink.dialog_open(&request);
        sink.dialog_close("d1");
        assert_eq!(Announcement::DialogOpen(request).id(), Some("d1"));
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.dialog_close("gone");
    }
}
