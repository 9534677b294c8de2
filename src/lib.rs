//! modal-relay - request/response correlation for modal dialogs and notifications
//!
//! A caller asks for a dialog and gets back a future; the rendering layer is
//! told about the dialog through an [`AnnouncementSink`]; when the user answers,
//! the renderer calls [`DialogService::close_dialog`] with the same id and the
//! caller's future resolves. Notifications are announced the same way and can
//! dismiss themselves after a delay.
//!
//! # Modules
//!
//! * [`config`] - Configuration loading and validation
//! * [`dialogs`] - Dialog request/response flow and dismissal dispatcher
//! * [`notifications`] - Notification flow with timed auto-dismiss
//! * [`registry`] - Pending-callback registry
//! * [`sink`] - Announcement contract with the rendering layer
//! * [`id`] - Correlation identifier generation

/// Configuration module for managing service settings
pub mod config;

/// Constants and default values
pub mod constants;

/// Dialog request/response flow
pub mod dialogs;

/// Error types
pub mod error;

/// Correlation identifier generation
pub mod id;

/// Logging setup
pub mod logger;

/// Notification flow
pub mod notifications;

/// Pending-callback registry
pub mod registry;

/// Announcement sinks
pub mod sink;

/// Shared data model
pub mod types;

pub use config::Config;
pub use dialogs::{DialogResponse, DialogService};
pub use error::{DialogError, DismissOutcome, HandlerError, RegistryError};
pub use id::{IdGenerator, SequentialGenerator, UuidGenerator};
pub use notifications::NotificationHandle;
pub use registry::{CallbackRegistry, PendingCallback};
pub use sink::{Announcement, AnnouncementSink, ChannelSink, LogSink};
pub use types::{
    ActionHandler, Checkbox, DialogActions, DialogContent, DialogRequest, DialogResult, DialogType, InputField,
    Notification, NotificationType,
};
