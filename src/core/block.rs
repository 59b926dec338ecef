//! Block trees
//!
//! A block is a node in the editor's program representation. Blocks own
//! their children: value and statement inputs each hold at most one child
//! block, and a block with a next connection owns the rest of its statement
//! chain. The workspace owns the top-level trees.

use serde::{Deserialize, Serialize};

use super::field::{Field, FieldValue};
use super::BlockId;

/// Kind of connection an input accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Holds a single expression block
    Value,
    /// Holds the head of a statement chain
    Statement,
}

/// A named input slot on a block instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    name: String,
    kind: InputKind,
    child: Option<Block>,
}

impl Input {
    pub(crate) fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            child: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// The connected child block, if any.
    pub fn child(&self) -> Option<&Block> {
        self.child.as_ref()
    }
}

/// A block instance.
///
/// Constructed through [`Workspace::new_block`](super::workspace::Workspace::new_block)
/// (or XML deserialization), which assigns the id and the field/input layout
/// declared by the block's definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    block_type: String,
    id: BlockId,
    id_in_xml: bool,
    fields: Vec<Field>,
    inputs: Vec<Input>,
    has_next: bool,
    next: Option<Box<Block>>,
}

impl Block {
    pub(crate) fn new(
        block_type: impl Into<String>,
        id: BlockId,
        fields: Vec<Field>,
        inputs: Vec<Input>,
        has_next: bool,
    ) -> Self {
        Self {
            block_type: block_type.into(),
            id,
            id_in_xml: false,
            fields,
            inputs,
            has_next,
            next: None,
        }
    }

    /// The block's type name, e.g. `"math_number"`.
    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    /// The block's identifier.
    pub fn id(&self) -> &BlockId {
        &self.id
    }

    /// Whether the id came from source XML (and should be written back out).
    pub fn id_in_xml(&self) -> bool {
        self.id_in_xml
    }

    /// Replace the minted id with one carried by source XML.
    pub(crate) fn set_id_from_xml(&mut self, id: impl Into<String>) {
        self.id = BlockId::new(id);
        self.id_in_xml = true;
    }

    /// Whether this block can chain a following statement block.
    pub fn has_next_connection(&self) -> bool {
        self.has_next
    }

    /// All fields, in definition order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field's current value by name.
    pub fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).map(|f| &f.value)
    }

    /// Set a field's value.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), BlockError> {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value;
                Ok(())
            }
            None => Err(BlockError::UnknownField {
                block_type: self.block_type.clone(),
                field: name.to_string(),
            }),
        }
    }

    /// All input slots, in definition order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Look up an input by name.
    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// The child block connected to a named input, if any.
    pub fn input_child(&self, name: &str) -> Option<&Block> {
        self.input(name).and_then(|i| i.child())
    }

    /// Connect `child` to the named input. The input must exist and be empty.
    pub fn attach_input(&mut self, name: &str, child: Block) -> Result<(), BlockError> {
        let block_type = self.block_type.clone();
        let input = self
            .inputs
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| BlockError::UnknownInput {
                block_type,
                input: name.to_string(),
            })?;
        if input.child.is_some() {
            return Err(BlockError::InputOccupied {
                input: name.to_string(),
            });
        }
        input.child = Some(child);
        Ok(())
    }

    /// The next block in this statement chain, if any.
    pub fn next(&self) -> Option<&Block> {
        self.next.as_deref()
    }

    /// Append `block` to the end of this block's statement chain.
    ///
    /// Every block already in the chain must itself have a next connection,
    /// which holds by construction.
    pub fn attach_next(&mut self, block: Block) -> Result<(), BlockError> {
        if !self.has_next {
            return Err(BlockError::NoNextConnection {
                block_type: self.block_type.clone(),
            });
        }
        match self.next {
            Some(ref mut next) => next.attach_next(block),
            None => {
                self.next = Some(Box::new(block));
                Ok(())
            }
        }
    }

    /// This block plus every descendant (input children and next chains),
    /// depth first.
    pub fn descendants(&self) -> Vec<&Block> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(block) = stack.pop() {
            out.push(block);
            if let Some(next) = block.next() {
                stack.push(next);
            }
            for input in block.inputs.iter().rev() {
                if let Some(child) = input.child() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Number of blocks in this tree, including this one.
    pub fn descendant_count(&self) -> usize {
        self.descendants().len()
    }

    /// Find a block in this tree by id.
    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        self.descendants().into_iter().find(|b| b.id() == id)
    }
}

/// Block construction and mutation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlockError {
    /// The block's definition declares no such field
    #[error("block '{block_type}' has no field named '{field}'")]
    UnknownField { block_type: String, field: String },

    /// The block's definition declares no such input
    #[error("block '{block_type}' has no input named '{input}'")]
    UnknownInput { block_type: String, input: String },

    /// The input already holds a child block
    #[error("input '{input}' already has a connected block")]
    InputOccupied { input: String },

    /// The block's definition declares no next connection
    #[error("block '{block_type}' has no next connection")]
    NoNextConnection { block_type: String },
}
