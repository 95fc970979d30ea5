//! ID generation for tickets.
//!
//! Production IDs are random 128-bit UUIDs (v4) in hyphenated lowercase form.
//! [`SequentialIds`] exists so tests can predict the IDs a store hands out.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh ticket identifiers.
pub trait IdSource: fmt::Debug + Send + Sync {
    /// Produce an identifier not returned before by this source.
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `<prefix>-<n>` identifiers, counting from 1.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

impl<T: IdSource + ?Sized> IdSource for std::sync::Arc<T> {
    fn next_id(&self) -> String {
        (**self).next_id()
    }
}
