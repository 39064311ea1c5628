//! Compiler from OGC Filter Encoding XML to MapServer-style expressions.
//!
//! ```text
//! text -> xml::parse_document -> filter::parse_filter_encoding -> FilterNode
//!      -> filter::generate (expression) / filter::class_item (class item)
//! ```

pub mod config;
pub mod filter;
pub mod xml;

pub use config::CompilerConfig;
pub use filter::{
    CompiledFilter, FilterNode, ParseError, Rejection, class_item, compile, expression, generate,
    parse_filter_encoding,
};
