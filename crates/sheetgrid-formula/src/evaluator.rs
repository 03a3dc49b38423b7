use std::marker::PhantomData;

use chrono::NaiveDate;
use sheetgrid_core::{parse_number, CellPosition, CellRange};

use crate::ast::{Argument, FormulaCall};
use crate::criteria::Condition;
use crate::error::FormulaError;
use crate::functions::{self, datetime, logical, lookup, math, text};
use crate::parser::parse_formula;
use crate::value::{FormulaResult, FormulaValue};

/// Evaluates formula input against a read-only view of the grid.
///
/// References are clipped to the grid size; cells outside it read as blank
/// and are never visited.
pub struct Evaluator<'a, F>
where
    F: Fn(usize, usize) -> Option<&'a str>,
{
    get_cell: F,
    rows: usize,
    cols: usize,
    today: NaiveDate,
    _cells: PhantomData<&'a str>,
}

impl<'a, F> Evaluator<'a, F>
where
    F: Fn(usize, usize) -> Option<&'a str>,
{
    pub fn new(rows: usize, cols: usize, get_cell: F) -> Self {
        Self {
            get_cell,
            rows,
            cols,
            today: chrono::Local::now().date_naive(),
            _cells: PhantomData,
        }
    }

    /// Fix the date TODAY() reports
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Evaluate whatever is in the formula box.
    ///
    /// - empty input previews the SUM of the drag range, if there is one
    /// - input without a leading `=` must be a plain number
    /// - anything else is a `=NAME(args)` call
    ///
    /// Every failure is "no result".
    pub fn evaluate_input(&self, input: &str, drag: Option<CellRange>) -> Option<FormulaResult> {
        let input = input.trim();

        if input.is_empty() {
            let range = drag?;
            let values = self.numbers(&[Argument::Range(range.normalized())]);
            return Some(FormulaResult::new(math::sum(&values), "SUM"));
        }

        if !input.starts_with('=') {
            return parse_number(input).map(|n| FormulaResult::new(FormulaValue::Number(n), ""));
        }

        match self.evaluate(input) {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::debug!(%err, formula = input, "formula has no result");
                None
            }
        }
    }

    /// Parse and evaluate a `=NAME(args)` formula
    pub fn evaluate(&self, formula: &str) -> Result<FormulaResult, FormulaError> {
        let call = parse_formula(formula)?;
        let value = self.evaluate_call(&call)?;
        Ok(FormulaResult::new(value, call.name))
    }

    pub fn evaluate_call(&self, call: &FormulaCall) -> Result<FormulaValue, FormulaError> {
        let args = call.args.as_slice();
        let name = call.name.as_str();

        match name {
            "SUM" => Ok(math::sum(&self.numbers(args))),
            "AVERAGE" | "AVG" => math::average(&self.numbers(args)),
            "COUNT" => Ok(math::count(&self.numbers(args))),
            "CONCAT" => Ok(text::concat(&self.texts(args))),

            "ABS" => math::abs(self.unary(name, args)?),
            "TRIM" => Ok(text::trim(self.unary(name, args)?)),
            "NOT" => Ok(logical::not(self.unary(name, args)?)),
            "AND" => Ok(logical::and(&self.texts(args))),
            "OR" => Ok(logical::or(&self.texts(args))),

            "SUMIF" | "COUNTIF" => {
                check_arity(name, args, 2, "2")?;
                let cells = self.reference_texts(name, &args[0])?;
                let condition = match Condition::parse(self.scalar(name, &args[1])?) {
                    Ok(condition) => condition,
                    Err(err) => {
                        // Malformed condition: nothing matches
                        tracing::debug!(%err, "ignoring condition");
                        return Ok(FormulaValue::Number(0.0));
                    }
                };
                Ok(if name == "SUMIF" {
                    math::sum_if(&cells, &condition)
                } else {
                    math::count_if(&cells, &condition)
                })
            }

            "VLOOKUP" => {
                check_arity(name, args, 3, "3")?;
                let search = self.scalar(name, &args[0])?;
                let range = args[1]
                    .reference()
                    .ok_or_else(|| FormulaError::InvalidArgument(name.into()))?;
                let offset = parse_number(self.scalar(name, &args[2])?)
                    .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                    .ok_or_else(|| FormulaError::InvalidArgument(name.into()))?;
                // Saturating cast; any offset past the last column reads blank
                let offset = offset as usize;
                Ok(match range.within(self.rows, self.cols) {
                    Some(range) => lookup::vlookup(search, &range, offset, &self.get_cell),
                    None => FormulaValue::Text(String::new()),
                })
            }

            "DATE" => {
                check_arity(name, args, 3, "3")?;
                Ok(datetime::date(
                    self.scalar(name, &args[0])?,
                    self.scalar(name, &args[1])?,
                    self.scalar(name, &args[2])?,
                ))
            }
            "TODAY" => {
                check_arity(name, args, 0, "0")?;
                Ok(datetime::today(self.today))
            }

            _ => {
                debug_assert!(!functions::is_known(name));
                Err(FormulaError::UnknownFunction(name.to_string()))
            }
        }
    }

    fn cell_text(&self, row: usize, col: usize) -> &'a str {
        (self.get_cell)(row, col).unwrap_or("")
    }

    /// In-grid cells referenced by `arg`, row by row
    fn cells(&self, arg: &Argument) -> impl Iterator<Item = CellPosition> {
        arg.reference()
            .and_then(|range| range.within(self.rows, self.cols))
            .into_iter()
            .flat_map(|range| range.cells())
    }

    /// Numeric values of every referenced cell and numeric literal, in
    /// argument order. Everything else is skipped.
    fn numbers(&self, args: &[Argument]) -> Vec<f64> {
        args.iter()
            .flat_map(|arg| match arg {
                Argument::Literal(text) => parse_number(text).into_iter().collect::<Vec<_>>(),
                _ => self
                    .cells(arg)
                    .filter_map(|pos| parse_number(self.cell_text(pos.row, pos.col)))
                    .collect(),
            })
            .collect()
    }

    /// Raw text of every referenced cell and literal, in argument order
    fn texts<'b>(&'b self, args: &'b [Argument]) -> Vec<&'b str> {
        let mut texts = Vec::new();
        for arg in args {
            match arg {
                Argument::Literal(text) => texts.push(text.as_str()),
                _ => texts.extend(self.cells(arg).map(|pos| self.cell_text(pos.row, pos.col))),
            }
        }
        texts
    }

    /// A single value: literal text, or the text of a one-cell reference
    fn scalar<'b>(&'b self, name: &str, arg: &'b Argument) -> Result<&'b str, FormulaError> {
        match arg {
            Argument::Literal(text) => Ok(text.as_str()),
            Argument::Cell(pos) => Ok(self.cell_text(pos.row, pos.col)),
            Argument::Range(range) if range.is_single_cell() => Ok(self.cell_text(range.r1, range.c1)),
            Argument::Range(_) => Err(FormulaError::InvalidArgument(name.to_string())),
        }
    }

    fn unary<'b>(&'b self, name: &str, args: &'b [Argument]) -> Result<&'b str, FormulaError> {
        check_arity(name, args, 1, "1")?;
        self.scalar(name, &args[0])
    }

    /// Texts of a cell or range argument; literals are not references
    fn reference_texts(&self, name: &str, arg: &Argument) -> Result<Vec<&'a str>, FormulaError> {
        match arg {
            Argument::Literal(_) => Err(FormulaError::InvalidArgument(name.to_string())),
            _ => Ok(self
                .cells(arg)
                .map(|pos| self.cell_text(pos.row, pos.col))
                .collect()),
        }
    }
}

fn check_arity(
    name: &str,
    args: &[Argument],
    expected: usize,
    label: &'static str,
) -> Result<(), FormulaError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(FormulaError::Arity {
            name: name.to_string(),
            expected: label,
            got: args.len(),
        })
    }
}
