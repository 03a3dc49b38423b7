//! Built-in functions. Each takes already-resolved inputs; reference
//! resolution and arity checks live in the evaluator.

pub mod datetime;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod text;

/// Every function name the evaluator recognizes
pub const FUNCTION_NAMES: &[&str] = &[
    "SUM", "AVERAGE", "AVG", "COUNT", "CONCAT", "ABS", "TRIM", "NOT", "AND", "OR", "SUMIF",
    "COUNTIF", "VLOOKUP", "DATE", "TODAY",
];

/// Functions offered as one-click helpers over a selected range
pub const QUICK_FUNCTIONS: &[&str] = &["SUM", "AVERAGE", "COUNT", "CONCAT"];

pub fn is_known(name: &str) -> bool {
    FUNCTION_NAMES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
}
