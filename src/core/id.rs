//! Identifier sources for blocks
//!
//! Every block id in a workspace is minted by the workspace's `IdSource`.
//! The source is an injected capability rather than global state, so a test
//! that needs reproducible ids swaps the implementation for that one
//! workspace instead of patching anything process-wide.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// A source of block identifiers.
///
/// Implementations must be cheap to call; the workspace invokes this once
/// per block it instantiates.
pub trait IdSource: Send + Sync {
    /// Mint the next identifier.
    fn next_id(&self) -> String;
}

/// Default source: random UUID v4 strings, unique across workspaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Source that returns the same identifier on every call.
///
/// Used by the serialization round-trip runner so that ids embedded in
/// generated XML are stable across runs.
#[derive(Debug, Clone)]
pub struct FixedIds {
    id: String,
}

impl FixedIds {
    /// Create a source that always returns `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The conventional deterministic source: every id is `"1"`.
    pub fn one() -> Self {
        Self::new("1")
    }
}

impl IdSource for FixedIds {
    fn next_id(&self) -> String {
        self.id.clone()
    }
}

/// Source that counts up from 1, for tests that need distinct but
/// reproducible ids.
#[derive(Debug)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self) -> String {
        self.counter.fetch_add(1, Ordering::Relaxed).to_string()
    }
}
