//! Core block model
//!
//! This module defines the object model the test harness exercises: block
//! trees, field values, block definitions, the workspace container, and the
//! injectable id source.

pub mod block;
pub mod field;
pub mod id;
pub mod registry;
pub mod workspace;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use block::{Block, BlockError, Input, InputKind};
pub use field::{Field, FieldValue};
pub use id::{FixedIds, IdSource, RandomIds, SequentialIds};
pub use registry::{BlockDefinition, BlockRegistry, RegistryError};
pub use workspace::Workspace;

/// Unique identifier for a block.
///
/// Ids are opaque strings minted by the owning workspace's [`IdSource`]
/// (random UUIDs by default), or carried over verbatim from source XML.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        BlockId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        BlockId::new(id)
    }
}
