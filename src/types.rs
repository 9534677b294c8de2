//! Data model shared between callers, the service and the rendering layer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Activity,
    Success,
    Info,
    Warning,
    Error,
}

/// A non-blocking, optionally time-limited announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Generated by `add_notification` when left unset
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: Option<String>,
    pub message: String,
    /// Auto-dismiss after this many milliseconds; `None` keeps it until dismissed
    pub display_ms: Option<u64>,
}

impl Notification {
    pub fn new(kind: NotificationType, message: impl Into<String>) -> Self {
        Self {
            id: None,
            kind,
            title: None,
            message: message.into(),
            display_ms: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_display_ms(mut self, display_ms: u64) -> Self {
        self.display_ms = Some(display_ms);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogType {
    Info,
    Error,
    Question,
}

impl fmt::Display for DialogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialogType::Info => "info",
            DialogType::Error => "error",
            DialogType::Question => "question",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkbox {
    pub id: String,
    pub text: String,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub id: String,
    pub label: Option<String>,
    pub value: String,
    pub placeholder: Option<String>,
}

/// Structured body of a dialog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogContent {
    pub message: Option<String>,
    pub checkboxes: Vec<Checkbox>,
    pub input: Vec<InputField>,
}

impl DialogContent {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_checkbox(mut self, id: impl Into<String>, text: impl Into<String>, value: bool) -> Self {
        self.checkboxes.push(Checkbox {
            id: id.into(),
            text: text.into(),
            value,
        });
        self
    }

    pub fn with_input(mut self, id: impl Into<String>, label: Option<String>, value: impl Into<String>) -> Self {
        self.input.push(InputField {
            id: id.into(),
            label,
            value: value.into(),
            placeholder: None,
        });
        self
    }
}

/// What the rendering layer is told when a dialog opens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DialogType,
    pub title: String,
    pub content: DialogContent,
    /// Action keys in the order the caller offered them
    pub actions: Vec<String>,
}

/// Terminal value of a dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogResult {
    pub action: String,
    pub input: Option<Value>,
}

/// Handler run when the user picks its action
pub type ActionHandler = Box<dyn FnOnce(Option<Value>) -> anyhow::Result<()> + Send>;

/// Ordered set of action keys offered by a dialog, each with an optional handler
#[derive(Default)]
pub struct DialogActions {
    entries: Vec<(String, Option<ActionHandler>)>,
}

impl DialogActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `key` with a handler. Re-adding a key replaces its handler but keeps its position.
    pub fn action<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: FnOnce(Option<Value>) -> anyhow::Result<()> + Send + 'static,
    {
        self.insert(key.into(), Some(Box::new(handler)));
        self
    }

    /// Offer `key` as a plain response choice
    pub fn choice(mut self, key: impl Into<String>) -> Self {
        self.insert(key.into(), None);
        self
    }

    fn insert(&mut self, key: String, handler: Option<ActionHandler>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = handler,
            None => self.entries.push((key, handler)),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_handlers(self) -> Vec<(String, ActionHandler)> {
        self.entries
            .into_iter()
            .filter_map(|(key, handler)| handler.map(|h| (key, h)))
            .collect()
    }
}

impl fmt::Debug for DialogActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogActions").field("keys", &self.keys()).finish()
    }
}
