//! Workspace
//!
//! The workspace is the container holding a set of block trees during a
//! test: it mints block ids through its injected [`IdSource`], instantiates
//! blocks from the shared registry, and owns the finished top-level trees.
//! The test runners create one fresh workspace per case and drop it
//! afterwards, so nothing leaks between cases.

use std::sync::Arc;

use super::block::Block;
use super::id::{IdSource, RandomIds};
use super::registry::{BlockRegistry, RegistryError};
use super::BlockId;

/// A container of block trees with an id-minting capability.
pub struct Workspace {
    registry: BlockRegistry,
    ids: Arc<dyn IdSource>,
    top_blocks: Vec<Block>,
}

impl Workspace {
    /// Create a workspace with random block ids.
    pub fn new(registry: BlockRegistry) -> Self {
        Self::with_ids(registry, Arc::new(RandomIds))
    }

    /// Create a workspace with an explicit id source.
    ///
    /// The serialization round-trip runner uses this with
    /// [`FixedIds::one`](super::id::FixedIds::one) so every minted id is
    /// `"1"`.
    pub fn with_ids(registry: BlockRegistry, ids: Arc<dyn IdSource>) -> Self {
        Self {
            registry,
            ids,
            top_blocks: Vec::new(),
        }
    }

    /// The registry this workspace instantiates from.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// The workspace's id source.
    pub fn ids(&self) -> &Arc<dyn IdSource> {
        &self.ids
    }

    /// Instantiate a detached block of the given type.
    ///
    /// The block gets its definition's default field values and an id from
    /// this workspace's source. Attach children, then [`add`](Self::add)
    /// the finished tree.
    pub fn new_block(&self, block_type: &str) -> Result<Block, RegistryError> {
        Ok(self.registry.definition(block_type)?.instantiate(&*self.ids))
    }

    /// Adopt a finished tree as a top-level block; returns its root id.
    pub fn add(&mut self, block: Block) -> BlockId {
        let id = block.id().clone();
        self.top_blocks.push(block);
        id
    }

    /// Top-level blocks, in the order they were added.
    pub fn top_blocks(&self) -> &[Block] {
        &self.top_blocks
    }

    /// Find any block (top-level or nested) by id.
    pub fn find_block(&self, id: &BlockId) -> Option<&Block> {
        self.top_blocks.iter().find_map(|b| b.find(id))
    }

    /// Total number of blocks, including descendants.
    pub fn block_count(&self) -> usize {
        self.top_blocks.iter().map(Block::descendant_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.top_blocks.is_empty()
    }

    /// Remove every block.
    pub fn clear(&mut self) {
        self.top_blocks.clear();
    }
}
