use sheetgrid_core::parse_bool;

use crate::value::FormulaValue;

/// NOT - Negate a truthy literal
pub fn not(text: &str) -> FormulaValue {
    FormulaValue::Bool(!parse_bool(text))
}

/// AND - True when every input is truthy (and there is at least one)
pub fn and(texts: &[&str]) -> FormulaValue {
    FormulaValue::Bool(!texts.is_empty() && texts.iter().all(|t| parse_bool(t)))
}

/// OR - True when any input is truthy
pub fn or(texts: &[&str]) -> FormulaValue {
    FormulaValue::Bool(texts.iter().any(|t| parse_bool(t)))
}
