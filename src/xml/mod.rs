//! Generic XML reader.
//!
//! Produces a plain labeled tree: element names (prefix kept, no namespace
//! resolution), attributes in document order, and ordered children.
//! Comments, processing instructions and DOCTYPE declarations are skipped.

mod lexer;
mod tree;

pub use tree::{XmlDocument, XmlElement, XmlError, XmlNode, parse_document};
