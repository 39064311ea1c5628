//! Generic element tree and the document reader that builds it.

use super::lexer::{Token, next_token};
use thiserror::Error;

/// Reasons a document could not be read into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("closing tag </{found}> does not match <{expected}>")]
    MismatchedTag { expected: String, found: String },

    #[error("closing tag </{0}> without a matching opening tag")]
    UnexpectedClose(String),

    #[error("element <{0}> is never closed")]
    UnclosedElement(String),

    #[error("document has no root element")]
    NoRootElement,

    #[error("element nesting exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// A labeled element: name, attributes in document order, ordered children.
///
/// Whitespace-only character data between elements is not kept as a child.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(&text.into());
        self
    }

    /// Attribute value by case-insensitive name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Element children, in order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// The text of the first child, if that child is text.
    pub fn first_text(&self) -> Option<&str> {
        match self.children.first() {
            Some(XmlNode::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// The first text found anywhere below this element, depth-first.
    pub fn find_text(&self) -> Option<&str> {
        let mut stack: Vec<&XmlNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                XmlNode::Text(text) => return Some(text.as_str()),
                XmlNode::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
        None
    }

    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }
}

/// Top-level elements of a document, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlDocument {
    pub roots: Vec<XmlElement>,
}

impl XmlDocument {
    /// First top-level element with the given name (case-insensitive).
    pub fn root(&self, name: &str) -> Option<&XmlElement> {
        self.roots
            .iter()
            .find(|element| element.name.eq_ignore_ascii_case(name))
    }
}

/// Read `input` into an element tree.
///
/// The reader keeps open elements on an explicit stack, so nesting depth never
/// grows the call stack. Nesting deeper than `max_depth` is rejected.
pub fn parse_document(input: &str, max_depth: usize) -> Result<XmlDocument, XmlError> {
    let mut remaining = input;
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut document = XmlDocument::default();

    while !remaining.is_empty() {
        let offset = input.len() - remaining.len();
        let token = next_token(&mut remaining).map_err(|_| XmlError::Syntax {
            offset,
            message: "unrecognized markup".to_string(),
        })?;

        match token {
            Token::Open {
                name,
                attributes,
                self_closing,
            } => {
                if stack.len() >= max_depth {
                    return Err(XmlError::DepthExceeded { limit: max_depth });
                }
                let mut element = XmlElement::new(name);
                for (key, raw) in attributes {
                    let value = decode_entities(raw).map_err(|message| XmlError::Syntax {
                        offset,
                        message,
                    })?;
                    element.attributes.push((key.to_string(), value));
                }
                if self_closing {
                    attach(&mut stack, &mut document, element);
                } else {
                    stack.push(element);
                }
            }
            Token::Close(name) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::UnexpectedClose(name.to_string()))?;
                if element.name != name {
                    return Err(XmlError::MismatchedTag {
                        expected: element.name,
                        found: name.to_string(),
                    });
                }
                attach(&mut stack, &mut document, element);
            }
            Token::Text(raw) => {
                if raw.trim().is_empty() {
                    continue;
                }
                let Some(parent) = stack.last_mut() else {
                    return Err(XmlError::Syntax {
                        offset,
                        message: "text outside of the root element".to_string(),
                    });
                };
                let text =
                    decode_entities(raw).map_err(|message| XmlError::Syntax { offset, message })?;
                parent.push_text(&text);
            }
            Token::CData(text) => {
                let Some(parent) = stack.last_mut() else {
                    return Err(XmlError::Syntax {
                        offset,
                        message: "CDATA outside of the root element".to_string(),
                    });
                };
                parent.push_text(text);
            }
            Token::Ignored => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::UnclosedElement(open.name));
    }
    if document.roots.is_empty() {
        return Err(XmlError::NoRootElement);
    }

    Ok(document)
}

fn attach(stack: &mut [XmlElement], document: &mut XmlDocument, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => document.roots.push(element),
    }
}

/// Decode the predefined entities and numeric character references.
fn decode_entities(raw: &str) -> Result<String, String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| format!("unterminated entity reference near '{}'", rest))?;
        let entity = &after[..semi];
        let decoded = match entity {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            _ => decode_char_reference(entity)
                .ok_or_else(|| format!("unknown entity '&{};'", entity))?,
        };
        out.push(decoded);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn decode_char_reference(entity: &str) -> Option<char> {
    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}
