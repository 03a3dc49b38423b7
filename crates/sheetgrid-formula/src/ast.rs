use sheetgrid_core::{CellPosition, CellRange};
use std::fmt;

/// One argument of a function call
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Single cell reference (e.g., B3)
    Cell(CellPosition),
    /// Range reference (e.g., A1:B10), normalized
    Range(CellRange),
    /// Anything else, taken as text (quotes removed, surrounding space trimmed)
    Literal(String),
}

impl Argument {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Argument::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// Area referenced by this argument; a cell is a one-cell range
    pub fn reference(&self) -> Option<CellRange> {
        match self {
            Argument::Cell(pos) => Some(CellRange::single(*pos)),
            Argument::Range(range) => Some(*range),
            Argument::Literal(_) => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Cell(pos) => write!(f, "{}", pos.to_a1()),
            Argument::Range(range) => write!(f, "{}", range.to_a1()),
            Argument::Literal(text) => write!(f, "{}", text),
        }
    }
}

/// A parsed `=NAME(arg, ...)` formula
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaCall {
    /// Upper-cased function name
    pub name: String,
    pub args: Vec<Argument>,
}

impl FormulaCall {
    pub fn new(name: impl Into<String>, args: Vec<Argument>) -> Self {
        Self {
            name: name.into().to_uppercase(),
            args,
        }
    }
}

impl fmt::Display for FormulaCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// Canonical formula for a one-click function over a range, e.g. `=SUM(A1:B2)`
pub fn quick_formula(name: &str, range: &CellRange) -> String {
    FormulaCall::new(name, vec![Argument::Range(range.normalized())]).to_string()
}
