//! Markup tokenizer for the XML reader.

use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, delimited, opt, repeat};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_until, take_while};

/// A single markup token. Attribute values and text are still raw (entities
/// not yet decoded).
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// `<name a="1">` or `<name/>`
    Open {
        name: &'a str,
        attributes: Vec<(&'a str, &'a str)>,
        self_closing: bool,
    },
    /// `</name>`
    Close(&'a str),
    /// Character data between tags
    Text(&'a str),
    /// `<![CDATA[...]]>` contents, taken verbatim
    CData(&'a str),
    /// Comments, processing instructions and DOCTYPE declarations
    Ignored,
}

type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
}

/// Lex an element or attribute name (prefix included, e.g. `gml:Box`).
fn lex_name<'a>(input: &mut &'a str) -> PResult<&'a str> {
    (one_of(is_name_start), take_while(0.., is_name_char))
        .take()
        .parse_next(input)
}

fn lex_attr_value<'a>(input: &mut &'a str) -> PResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

fn lex_attribute<'a>(input: &mut &'a str) -> PResult<(&'a str, &'a str)> {
    multispace1.parse_next(input)?;
    let name = lex_name.parse_next(input)?;
    (multispace0, '=', multispace0).parse_next(input)?;
    let value = lex_attr_value.parse_next(input)?;
    Ok((name, value))
}

fn lex_open_tag<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    '<'.parse_next(input)?;
    let name = lex_name.parse_next(input)?;
    let attributes: Vec<(&str, &str)> = repeat(0.., lex_attribute).parse_next(input)?;
    multispace0.parse_next(input)?;
    let self_closing = opt('/').parse_next(input)?.is_some();
    '>'.parse_next(input)?;
    Ok(Token::Open {
        name,
        attributes,
        self_closing,
    })
}

fn lex_close_tag<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    let name = delimited("</", lex_name, (multispace0, '>')).parse_next(input)?;
    Ok(Token::Close(name))
}

fn lex_comment<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    delimited("<!--", take_until(0.., "-->"), "-->")
        .value(Token::Ignored)
        .parse_next(input)
}

fn lex_instruction<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    delimited("<?", take_until(0.., "?>"), "?>")
        .value(Token::Ignored)
        .parse_next(input)
}

// Internal DTD subsets are not supported: the declaration ends at the first '>'.
fn lex_doctype<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    ("<!DOCTYPE", take_till(0.., '>'), '>')
        .value(Token::Ignored)
        .parse_next(input)
}

fn lex_cdata<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    delimited("<![CDATA[", take_until(0.., "]]>"), "]]>")
        .map(Token::CData)
        .parse_next(input)
}

fn lex_text<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    take_till(1.., '<').map(Token::Text).parse_next(input)
}

/// Lex the next token. The caller stops once the input is empty.
pub fn next_token<'a>(input: &mut &'a str) -> PResult<Token<'a>> {
    alt((
        lex_comment,
        lex_cdata,
        lex_doctype,
        lex_instruction,
        lex_close_tag,
        lex_open_tag,
        lex_text,
    ))
    .parse_next(input)
}
