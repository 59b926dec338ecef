//! XML codec: text to DOM, DOM to blocks and back
//!
//! `text_to_dom` tokenizes XML with quick-xml into the owned [`Element`]
//! tree. `dom_to_block` builds a block tree in a workspace from that DOM,
//! consulting the workspace's registry for field shapes and input kinds;
//! `block_to_dom` is its inverse. The codec accepts either a bare `<block>`
//! document or a `<xml>` wrapper around one.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::block::{Block, BlockError, InputKind};
use crate::core::registry::RegistryError;
use crate::core::workspace::Workspace;
use crate::core::BlockId;

use super::dom::{dom_to_pretty_text, Element, Node};

/// XML (de)serialization errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XmlError {
    /// The text is not well-formed XML
    #[error("malformed XML: {0}")]
    Syntax(String),

    /// An element that has no meaning at this position
    #[error("unexpected element <{name}>")]
    UnexpectedElement { name: String },

    /// Text content where only elements are allowed
    #[error("unexpected text content {0:?}")]
    UnexpectedText(String),

    /// A required attribute is absent
    #[error("<{element}> element is missing its '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    /// Field text does not parse as the shape the definition declares
    #[error("field '{field}' cannot hold value {value:?}")]
    BadFieldValue { field: String, value: String },

    /// A `<value>`/`<statement>` element targets an input of the other kind
    #[error("<{element}> element targets input '{input}', which is not a {element} input")]
    WrongInputKind { input: String, element: String },

    /// The document holds no `<block>` element
    #[error("document contains no block element")]
    NoBlock,

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Parse XML text into an element tree.
///
/// Inter-element whitespace is dropped and text content trimmed, matching
/// the canonical pretty form. Comments, processing instructions, and the
/// XML declaration are skipped.
pub fn text_to_dom(xml: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::Syntax("multiple root elements".to_string()));
                }
                stack.push(element_from(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.push_element(element),
                    None => {
                        if root.is_some() {
                            return Err(XmlError::Syntax("multiple root elements".to_string()));
                        }
                        root = Some(element);
                    }
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::Syntax("unbalanced end tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.push_element(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| XmlError::Syntax(e.to_string()))?
                    .into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.push_text(text),
                    None => {
                        return Err(XmlError::Syntax(format!(
                            "text outside the root element: {:?}",
                            text
                        )))
                    }
                }
            }
            Ok(Event::CData(t)) => {
                let bytes = t.into_inner();
                let text = String::from_utf8_lossy(&bytes).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.push_text(text),
                    None => {
                        return Err(XmlError::Syntax(
                            "CDATA outside the root element".to_string(),
                        ))
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(Event::Decl(_)) | Ok(Event::Comment(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {}
            Ok(_) => {}
            Err(e) => return Err(XmlError::Syntax(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Syntax("unclosed element at end of input".to_string()));
    }
    root.ok_or_else(|| XmlError::Syntax("empty document".to_string()))
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::Syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::Syntax(e.to_string()))?
            .into_owned();
        element.set_attr(key, value);
    }
    Ok(element)
}

/// The `<block>` element of a parsed document: the root itself, or the
/// first block inside a `<xml>` wrapper.
pub fn root_block_element(dom: &Element) -> Result<&Element, XmlError> {
    match dom.name() {
        "block" => Ok(dom),
        "xml" => dom
            .child_elements()
            .find(|e| e.name() == "block")
            .ok_or(XmlError::NoBlock),
        other => Err(XmlError::UnexpectedElement {
            name: other.to_string(),
        }),
    }
}

/// Build a block tree from a parsed document and adopt it into the
/// workspace as a top-level block. Returns the root block's id.
///
/// Blocks whose XML carries an `id` attribute keep that id (and write it
/// back out on serialization); blocks without one get an id from the
/// workspace's source and stay unidentified in XML. Attributes other than
/// `type` and `id` (editor geometry and the like) are ignored and do not
/// survive a round trip.
pub fn dom_to_block(dom: &Element, workspace: &mut Workspace) -> Result<BlockId, XmlError> {
    let block_element = root_block_element(dom)?;
    let block = build_block(block_element, workspace)?;
    Ok(workspace.add(block))
}

fn build_block(element: &Element, workspace: &Workspace) -> Result<Block, XmlError> {
    let block_type = element
        .attr("type")
        .ok_or_else(|| XmlError::MissingAttribute {
            element: "block".to_string(),
            attribute: "type".to_string(),
        })?;
    let mut block = workspace.new_block(block_type)?;
    if let Some(id) = element.attr("id") {
        block.set_id_from_xml(id);
    }

    for node in element.children() {
        let child = match node {
            Node::Text(text) => return Err(XmlError::UnexpectedText(text.clone())),
            Node::Element(child) => child,
        };
        match child.name() {
            "field" => {
                let name = named(child)?;
                let text = field_text(child)?;
                let template =
                    block
                        .field_value(name)
                        .ok_or_else(|| BlockError::UnknownField {
                            block_type: block.block_type().to_string(),
                            field: name.to_string(),
                        })?;
                let value =
                    template
                        .parse_matching(text)
                        .ok_or_else(|| XmlError::BadFieldValue {
                            field: name.to_string(),
                            value: text.to_string(),
                        })?;
                block.set_field(name, value)?;
            }
            "value" | "statement" => {
                let name = named(child)?;
                let expected_kind = if child.name() == "value" {
                    InputKind::Value
                } else {
                    InputKind::Statement
                };
                let input = block
                    .input(name)
                    .ok_or_else(|| BlockError::UnknownInput {
                        block_type: block.block_type().to_string(),
                        input: name.to_string(),
                    })?;
                if input.kind() != expected_kind {
                    return Err(XmlError::WrongInputKind {
                        input: name.to_string(),
                        element: child.name().to_string(),
                    });
                }
                let inner = child
                    .child_elements()
                    .find(|e| e.name() == "block")
                    .ok_or(XmlError::NoBlock)?;
                let inner_block = build_block(inner, workspace)?;
                block.attach_input(name, inner_block)?;
            }
            "next" => {
                let inner = child
                    .child_elements()
                    .find(|e| e.name() == "block")
                    .ok_or(XmlError::NoBlock)?;
                let inner_block = build_block(inner, workspace)?;
                block.attach_next(inner_block)?;
            }
            other => {
                return Err(XmlError::UnexpectedElement {
                    name: other.to_string(),
                })
            }
        }
    }

    Ok(block)
}

fn named<'e>(element: &'e Element) -> Result<&'e str, XmlError> {
    element.attr("name").ok_or_else(|| XmlError::MissingAttribute {
        element: element.name().to_string(),
        attribute: "name".to_string(),
    })
}

fn field_text(element: &Element) -> Result<&str, XmlError> {
    if element.children().is_empty() {
        return Ok("");
    }
    element.text().ok_or_else(|| XmlError::UnexpectedElement {
        name: element
            .child_elements()
            .next()
            .map(|e| e.name().to_string())
            .unwrap_or_else(|| "#text".to_string()),
    })
}

/// Serialize a block tree back to a DOM element.
///
/// Emits `type` always, `id` only when the block carried one in source XML,
/// every field in definition order, occupied inputs, and the next chain.
pub fn block_to_dom(block: &Block) -> Element {
    let mut element = Element::new("block");
    element.set_attr("type", block.block_type());
    if block.id_in_xml() {
        element.set_attr("id", block.id().as_str());
    }
    for field in block.fields() {
        let mut field_element = Element::new("field");
        field_element.set_attr("name", &field.name);
        let text = field.value.to_string();
        if !text.is_empty() {
            field_element.push_text(text);
        }
        element.push_element(field_element);
    }
    for input in block.inputs() {
        if let Some(child) = input.child() {
            let tag = match input.kind() {
                InputKind::Value => "value",
                InputKind::Statement => "statement",
            };
            let mut wrapper = Element::new(tag);
            wrapper.set_attr("name", input.name());
            wrapper.push_element(block_to_dom(child));
            element.push_element(wrapper);
        }
    }
    if let Some(next) = block.next() {
        let mut wrapper = Element::new("next");
        wrapper.push_element(block_to_dom(next));
        element.push_element(wrapper);
    }
    element
}

/// Canonicalize block XML text: parse, take the block element, pretty-print.
///
/// Both sides of the round-trip equality assertion go through this, so test
/// literals compare by structure-preserving canonical text rather than by
/// incidental whitespace.
pub fn canonical_block_xml(xml: &str) -> Result<String, XmlError> {
    let dom = text_to_dom(xml)?;
    let block = root_block_element(&dom)?;
    Ok(dom_to_pretty_text(block))
}
