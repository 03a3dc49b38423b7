//! Nom-based parser for the `=NAME(arg, ...)` formula grammar.
//!
//! Arguments are cell references (`A1`), ranges (`A1:B3`, either corner
//! order), double-quoted strings, or bare text up to the next `,` or `)`.
//! References are case-insensitive. There are no operators or nested calls.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace0, one_of},
    combinator::{all_consuming, map, map_opt, peek, recognize},
    multi::separated_list0,
    sequence::{delimited, pair, separated_pair, terminated, tuple},
    IResult,
};
use sheetgrid_core::{col_from_label, CellPosition, CellRange};

use crate::ast::{Argument, FormulaCall};
use crate::error::FormulaError;

/// Skip whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parse a function name
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.'),
    ))(input)
}

/// Parse a cell reference (e.g., A1, aa10)
fn parse_cell_ref(input: &str) -> IResult<&str, CellPosition> {
    map_opt(
        pair(
            take_while1(|c: char| c.is_ascii_alphabetic()),
            take_while1(|c: char| c.is_ascii_digit()),
        ),
        |(letters, digits): (&str, &str)| {
            let col = col_from_label(letters)?;
            let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
            Some(CellPosition::new(row, col))
        },
    )(input)
}

/// Parse a range (e.g., A1:B10); corners may be given in any order
fn parse_range(input: &str) -> IResult<&str, CellRange> {
    map(
        separated_pair(parse_cell_ref, ws(char(':')), parse_cell_ref),
        |(a, b)| CellRange::from_corners(a, b),
    )(input)
}

/// A reference only counts when it is the whole argument
fn end_of_argument(input: &str) -> IResult<&str, char> {
    peek(ws(one_of(",)")))(input)
}

/// Parse a double-quoted string; `""` inside is an escaped quote
fn parse_quoted(input: &str) -> IResult<&str, String> {
    let (input, _) = char('"')(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != '"' {
            result.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '"'))) {
            result.push('"');
            chars.next();
            continue;
        }
        return Ok((&input[idx + 1..], result));
    }

    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Parse bare text up to the next separator
fn parse_bare(input: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| !matches!(c, ',' | '(' | ')' | '"')), |s: &str| {
        s.trim().to_string()
    })(input)
}

fn parse_argument(input: &str) -> IResult<&str, Argument> {
    alt((
        map(terminated(parse_quoted, end_of_argument), Argument::Literal),
        map(terminated(parse_range, end_of_argument), Argument::Range),
        map(terminated(parse_cell_ref, end_of_argument), Argument::Cell),
        map(parse_bare, Argument::Literal),
    ))(input)
}

fn parse_call(input: &str) -> IResult<&str, FormulaCall> {
    map(
        tuple((
            ws(char('=')),
            parse_identifier,
            ws(char('(')),
            separated_list0(char(','), ws(parse_argument)),
            ws(char(')')),
        )),
        |(_, name, _, args, _)| FormulaCall::new(name, args),
    )(input)
}

/// Parse a formula string
pub fn parse_formula(input: &str) -> Result<FormulaCall, FormulaError> {
    all_consuming(parse_call)(input)
        .map(|(_, call)| call)
        .map_err(|e| FormulaError::Syntax(e.to_string()))
}
