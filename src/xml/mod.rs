//! XML serialization of blocks
//!
//! The element tree lives in [`dom`]; parsing and the block mapping live in
//! [`codec`]. The canonical pretty form produced by
//! [`dom_to_pretty_text`] is the comparison format for every serialization
//! assertion in the harness.

pub mod codec;
pub mod dom;

pub use codec::{
    block_to_dom, canonical_block_xml, dom_to_block, root_block_element, text_to_dom, XmlError,
};
pub use dom::{dom_to_pretty_text, dom_to_text, Element, Node};
