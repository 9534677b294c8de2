//! Correlation identifier generation

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of correlation identifiers for dialogs and notifications
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUIDs in their 32-character simple form
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic `<prefix>-<n>` ids, starting at 1
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}
