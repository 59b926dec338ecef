//! Block definition registry
//!
//! The registry maps block type names to their definitions: the fields a
//! block carries (with defaults), the inputs it exposes, and whether it can
//! chain a following statement. Workspaces instantiate blocks from these
//! definitions, and the XML codec consults them while deserializing.
//!
//! The registry is thread-safe (`Arc<RwLock<HashMap>>` with parking_lot) so
//! one registry can back every workspace a test run creates.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::block::{Block, Input, InputKind};
use super::field::{Field, FieldValue};
use super::id::IdSource;
use super::BlockId;

/// A field declared by a block definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name, unique within the definition
    pub name: String,
    /// Default value; also decides the shape XML text is coerced into
    pub default: FieldValue,
}

/// An input slot declared by a block definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDefinition {
    /// Input name, unique within the definition
    pub name: String,
    /// Whether the slot takes an expression or a statement chain
    pub kind: InputKind,
}

/// Definition of a block type.
///
/// Built either with the builder methods or from a JSON definition array
/// via [`BlockRegistry::define_blocks_from_json`].
///
/// # Example
/// ```
/// use block_harness::core::registry::BlockDefinition;
/// use block_harness::core::field::FieldValue;
///
/// let def = BlockDefinition::new("math_number").field("NUM", FieldValue::number(0.0));
/// assert_eq!(def.block_type, "math_number");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Type name, e.g. `"math_number"`
    #[serde(rename = "type")]
    pub block_type: String,
    /// Declared fields with their defaults
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// Declared input slots
    #[serde(default)]
    pub inputs: Vec<InputDefinition>,
    /// Whether instances can chain a following statement block
    #[serde(default)]
    pub has_next: bool,
}

impl BlockDefinition {
    /// Start a definition for `block_type` with no fields or inputs.
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            fields: Vec::new(),
            inputs: Vec::new(),
            has_next: false,
        }
    }

    /// Declare a field with its default value.
    pub fn field(mut self, name: impl Into<String>, default: FieldValue) -> Self {
        self.fields.push(FieldDefinition {
            name: name.into(),
            default,
        });
        self
    }

    /// Declare a value input.
    pub fn value_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(InputDefinition {
            name: name.into(),
            kind: InputKind::Value,
        });
        self
    }

    /// Declare a statement input.
    pub fn statement_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(InputDefinition {
            name: name.into(),
            kind: InputKind::Statement,
        });
        self
    }

    /// Declare a next connection.
    pub fn with_next(mut self) -> Self {
        self.has_next = true;
        self
    }

    /// Instantiate a detached block: default field values, empty inputs,
    /// id minted from `ids`.
    pub fn instantiate(&self, ids: &dyn IdSource) -> Block {
        let fields = self
            .fields
            .iter()
            .map(|f| Field::new(&f.name, f.default.clone()))
            .collect();
        let inputs = self
            .inputs
            .iter()
            .map(|i| Input::new(&i.name, i.kind))
            .collect();
        Block::new(
            &self.block_type,
            BlockId::new(ids.next_id()),
            fields,
            inputs,
            self.has_next,
        )
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.block_type.is_empty() {
            return Err(RegistryError::InvalidDefinition(
                "block type name cannot be empty".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(RegistryError::InvalidDefinition(format!(
                    "block '{}' declares field '{}' twice",
                    self.block_type, field.name
                )));
            }
        }
        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.name.as_str()) {
                return Err(RegistryError::InvalidDefinition(format!(
                    "block '{}' declares input '{}' twice",
                    self.block_type, input.name
                )));
            }
        }
        Ok(())
    }
}

/// Thread-safe registry of block definitions.
#[derive(Clone)]
pub struct BlockRegistry {
    definitions: Arc<RwLock<HashMap<String, Arc<BlockDefinition>>>>,
}

impl BlockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a block definition.
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeds
    /// * `Err(RegistryError)` if the type is already registered or the
    ///   definition declares duplicate field/input names
    pub fn register(&self, definition: BlockDefinition) -> Result<(), RegistryError> {
        definition.validate()?;

        let mut definitions = self.definitions.write();
        if definitions.contains_key(&definition.block_type) {
            return Err(RegistryError::DuplicateType(definition.block_type));
        }
        definitions.insert(definition.block_type.clone(), Arc::new(definition));
        Ok(())
    }

    /// Register every definition in a JSON array.
    ///
    /// The array uses the same shape `BlockDefinition` serializes to:
    ///
    /// ```json
    /// [{"type": "text", "fields": [{"name": "TEXT", "default": ""}]}]
    /// ```
    ///
    /// # Returns
    /// The number of definitions registered. Nothing is registered if any
    /// entry fails to parse or validate.
    pub fn define_blocks_from_json(&self, json: &str) -> Result<usize, RegistryError> {
        let parsed: Vec<BlockDefinition> =
            serde_json::from_str(json).map_err(|e| RegistryError::InvalidJson(e.to_string()))?;
        let mut seen = HashSet::new();
        for definition in &parsed {
            definition.validate()?;
            if self.contains(&definition.block_type) || !seen.insert(definition.block_type.as_str())
            {
                return Err(RegistryError::DuplicateType(definition.block_type.clone()));
            }
        }
        let count = parsed.len();
        let mut definitions = self.definitions.write();
        for definition in parsed {
            definitions.insert(definition.block_type.clone(), Arc::new(definition));
        }
        Ok(count)
    }

    /// Remove a definition.
    pub fn unregister(&self, block_type: &str) -> Result<(), RegistryError> {
        self.definitions
            .write()
            .remove(block_type)
            .map(|_| ())
            .ok_or_else(|| RegistryError::UnknownType(block_type.to_string()))
    }

    /// Look up a definition by type name.
    pub fn definition(&self, block_type: &str) -> Result<Arc<BlockDefinition>, RegistryError> {
        self.definitions
            .read()
            .get(block_type)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownType(block_type.to_string()))
    }

    /// Whether a type is registered.
    pub fn contains(&self, block_type: &str) -> bool {
        self.definitions.read().contains_key(block_type)
    }

    /// All registered type names, unordered.
    pub fn types(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// A definition for this type is already registered
    #[error("block type '{0}' is already registered")]
    DuplicateType(String),

    /// No definition for this type
    #[error("unknown block type '{0}'")]
    UnknownType(String),

    /// The definition itself is malformed
    #[error("invalid block definition: {0}")]
    InvalidDefinition(String),

    /// A JSON definition array failed to parse
    #[error("invalid block definition JSON: {0}")]
    InvalidJson(String),
}
