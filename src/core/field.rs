//! Field values on blocks
//!
//! A field is a named, editable value on a block (the literal text of a
//! text block, the number of a numeric literal, a dropdown choice). Field
//! values carry their own type so XML parsing can coerce text content into
//! the shape the block definition declares.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A field value.
///
/// Serializes untagged, so `"hi"`, `5`, and `true` in a JSON block
/// definition map directly onto the matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Shorthand for a text value.
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Shorthand for a numeric value.
    pub fn number(value: f64) -> Self {
        FieldValue::Number(value)
    }

    /// Try to view the value as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to view the value as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to view the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Parse XML text content into a value of the same shape as `self`.
    ///
    /// The block definition's default value decides the shape: a field whose
    /// default is a number only accepts numeric text, and so on. Returns
    /// `None` when the text does not parse as that shape.
    pub fn parse_matching(&self, text: &str) -> Option<FieldValue> {
        match self {
            FieldValue::Text(_) => Some(FieldValue::Text(text.to_string())),
            FieldValue::Number(_) => text.trim().parse::<f64>().ok().map(FieldValue::Number),
            FieldValue::Bool(_) => match text.trim() {
                "true" => Some(FieldValue::Bool(true)),
                "false" => Some(FieldValue::Bool(false)),
                _ => None,
            },
        }
    }
}

impl fmt::Display for FieldValue {
    /// Renders the value the way it appears as XML text content.
    ///
    /// Whole numbers print without a trailing `.0` so `5.0` round-trips as
    /// the `5` it was parsed from.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A named field on a block instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its block
    pub name: String,
    /// Current value
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_xml_text() {
        assert_eq!(FieldValue::text("hi").to_string(), "hi");
        assert_eq!(FieldValue::number(5.0).to_string(), "5");
        assert_eq!(FieldValue::number(2.5).to_string(), "2.5");
        assert_eq!(FieldValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_parse_matching_coerces_by_shape() {
        let number = FieldValue::number(0.0);
        assert_eq!(number.parse_matching("42"), Some(FieldValue::number(42.0)));
        assert_eq!(number.parse_matching("nope"), None);

        let flag = FieldValue::Bool(false);
        assert_eq!(flag.parse_matching("true"), Some(FieldValue::Bool(true)));
        assert_eq!(flag.parse_matching("TRUE"), None);

        let text = FieldValue::text("");
        assert_eq!(text.parse_matching("42"), Some(FieldValue::text("42")));
    }

    #[test]
    fn test_untagged_serde_round_trip() {
        let values = vec![
            FieldValue::text("hi"),
            FieldValue::number(2.5),
            FieldValue::Bool(false),
        ];
        let json = serde_json::to_string(&values).unwrap();
        let back: Vec<FieldValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(values, back);
    }
}
