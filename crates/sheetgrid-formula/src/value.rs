use serde::{Deserialize, Serialize};
use sheetgrid_core::format_number;
use std::fmt;

/// The value a formula evaluates to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormulaValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl FormulaValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FormulaValue {
    /// The text written into a cell when the result is committed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaValue::Number(n) => write!(f, "{}", format_number(*n)),
            FormulaValue::Bool(true) => write!(f, "TRUE"),
            FormulaValue::Bool(false) => write!(f, "FALSE"),
            FormulaValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Evaluated formula plus the function that produced it (empty for a
/// plain number)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaResult {
    pub value: FormulaValue,
    pub function_name: String,
}

impl FormulaResult {
    pub fn new(value: FormulaValue, function_name: impl Into<String>) -> Self {
        Self {
            value,
            function_name: function_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FormulaValue::Number(20.0).to_string(), "20");
        assert_eq!(FormulaValue::Number(2.5).to_string(), "2.5");
        assert_eq!(FormulaValue::Bool(true).to_string(), "TRUE");
        assert_eq!(FormulaValue::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn test_result_json() {
        let result = FormulaResult::new(FormulaValue::Number(3.0), "SUM");
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"value":3.0,"functionName":"SUM"}"#
        );
    }
}
