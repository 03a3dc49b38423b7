//! Comparator conditions for SUMIF/COUNTIF, e.g. `>5`, `<=-1.5`, `!=0`.
//!
//! The condition is parsed, never executed: an operator followed by a
//! numeric literal and nothing else.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::{all_consuming, map, map_res},
    number::complete::recognize_float,
    sequence::{delimited, pair},
    IResult,
};
use sheetgrid_core::parse_number;

use crate::error::FormulaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparator {
    fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::Lt => lhs < rhs,
            Comparator::Le => lhs <= rhs,
            Comparator::Gt => lhs > rhs,
            Comparator::Ge => lhs >= rhs,
            Comparator::Eq => lhs == rhs,
            Comparator::Ne => lhs != rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub op: Comparator,
    pub operand: f64,
}

fn parse_comparator(input: &str) -> IResult<&str, Comparator> {
    // Two-character operators first
    alt((
        map(tag("<="), |_| Comparator::Le),
        map(tag(">="), |_| Comparator::Ge),
        map(tag("=="), |_| Comparator::Eq),
        map(tag("!="), |_| Comparator::Ne),
        map(tag("<>"), |_| Comparator::Ne),
        map(tag("<"), |_| Comparator::Lt),
        map(tag(">"), |_| Comparator::Gt),
        map(tag("="), |_| Comparator::Eq),
    ))(input)
}

fn parse_operand(input: &str) -> IResult<&str, f64> {
    map_res(recognize_float, str::parse::<f64>)(input)
}

impl Condition {
    pub fn parse(input: &str) -> Result<Self, FormulaError> {
        all_consuming(delimited(
            multispace0,
            pair(parse_comparator, delimited(multispace0, parse_operand, multispace0)),
            multispace0,
        ))(input)
        .map(|(_, (op, operand))| Condition { op, operand })
        .map_err(|_| FormulaError::InvalidArgument(format!("condition {:?}", input)))
    }

    /// Whether a cell's text satisfies the condition. Non-numeric cells
    /// never do.
    pub fn matches(&self, text: &str) -> bool {
        parse_number(text).is_some_and(|n| self.op.apply(n, self.operand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        let cases = [
            (">5", Comparator::Gt, 5.0),
            ("<5", Comparator::Lt, 5.0),
            (">=2.5", Comparator::Ge, 2.5),
            ("<= -1", Comparator::Le, -1.0),
            ("==0", Comparator::Eq, 0.0),
            ("=3", Comparator::Eq, 3.0),
            ("!=4", Comparator::Ne, 4.0),
            ("<>4", Comparator::Ne, 4.0),
            (" > 1e3 ", Comparator::Gt, 1000.0),
        ];
        for (input, op, operand) in cases {
            assert_eq!(Condition::parse(input), Ok(Condition { op, operand }), "{input}");
        }
    }

    #[test]
    fn test_rejects_anything_else() {
        for input in ["", "5", ">", ">abc", ">5; alert(1)", "> 5 5", "=>5", "x>5", ">5)"] {
            assert!(Condition::parse(input).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn test_matches() {
        let cond = Condition::parse(">5").unwrap();
        assert!(cond.matches("10"));
        assert!(cond.matches(" 7 "));
        assert!(cond.matches("1,000"));
        assert!(!cond.matches("5"));
        assert!(!cond.matches("x"));
        assert!(!cond.matches(""));
    }
}
