//! Constants used throughout the crate
//!
//! This module centralizes file names, defaults, and user-facing strings.

// Configuration
pub const CONFIG_DIR_NAME: &str = "modal-relay";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOCAL_CONFIG_FILE_NAME: &str = "modal-relay.toml";
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration";

// Defaults
pub const DEFAULT_ID_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_DISPLAY_MS: u64 = 600_000;
pub const MAX_DIALOG_EXPIRY_SECS: u64 = 86_400;

// Logging
pub const LOG_FILE_NAME: &str = "modal-relay.log";
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// Demo renderer
pub const PROMPT_PICK_ACTION: &str = "Pick an action";
pub const MSG_UNKNOWN_ACTION: &str = "❌ Unknown action";
pub const MSG_DIALOG_RESOLVED: &str = "✅ Dialog resolved";
pub const MSG_NOTIFICATION_DISMISSED: &str = "🔕 Notification dismissed";
