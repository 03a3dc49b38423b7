pub mod ast;
pub mod criteria;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod value;

pub use ast::{quick_formula, Argument, FormulaCall};
pub use criteria::{Comparator, Condition};
pub use error::FormulaError;
pub use evaluator::Evaluator;
pub use functions::{FUNCTION_NAMES, QUICK_FUNCTIONS};
pub use parser::parse_formula;
pub use value::{FormulaResult, FormulaValue};

use sheetgrid_core::{CellRange, Grid};

/// Evaluate formula-box input against a grid
///
/// Returns `None` for anything that does not produce a value: malformed
/// syntax, unknown functions, bad arguments, or an empty box with no
/// drag range.
pub fn evaluate(input: &str, drag: Option<CellRange>, grid: &Grid) -> Option<FormulaResult> {
    Evaluator::new(grid.row_count(), grid.col_count(), |row, col| grid.get(row, col))
        .evaluate_input(input, drag)
}
