use sheetgrid_core::parse_number;

use crate::criteria::Condition;
use crate::error::FormulaError;
use crate::value::FormulaValue;

/// SUM - Sum of the numeric values (0 when there are none)
pub fn sum(values: &[f64]) -> FormulaValue {
    FormulaValue::Number(values.iter().sum())
}

/// AVERAGE - Mean of the numeric values; undefined for an empty set
pub fn average(values: &[f64]) -> Result<FormulaValue, FormulaError> {
    if values.is_empty() {
        return Err(FormulaError::Empty("AVERAGE".into()));
    }
    Ok(FormulaValue::Number(
        values.iter().sum::<f64>() / values.len() as f64,
    ))
}

/// COUNT - Number of numeric values
pub fn count(values: &[f64]) -> FormulaValue {
    FormulaValue::Number(values.len() as f64)
}

/// ABS - Magnitude of a number given as text
pub fn abs(text: &str) -> Result<FormulaValue, FormulaError> {
    parse_number(text)
        .map(|n| FormulaValue::Number(n.abs()))
        .ok_or_else(|| FormulaError::InvalidArgument("ABS".into()))
}

/// SUMIF - Sum of the cells satisfying the condition
pub fn sum_if(cells: &[&str], condition: &Condition) -> FormulaValue {
    let total = cells
        .iter()
        .filter(|text| condition.matches(text))
        .filter_map(|text| parse_number(text))
        .sum();
    FormulaValue::Number(total)
}

/// COUNTIF - Number of cells satisfying the condition
pub fn count_if(cells: &[&str], condition: &Condition) -> FormulaValue {
    let n = cells.iter().filter(|text| condition.matches(text)).count();
    FormulaValue::Number(n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_count() {
        assert_eq!(sum(&[10.0, 20.0]), FormulaValue::Number(30.0));
        assert_eq!(sum(&[]), FormulaValue::Number(0.0));
        assert_eq!(count(&[]), FormulaValue::Number(0.0));
        assert_eq!(count(&[1.0, 2.0, 3.0]), FormulaValue::Number(3.0));
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[1.0, 2.0]), Ok(FormulaValue::Number(1.5)));
        assert!(average(&[]).is_err());
    }

    #[test]
    fn test_abs() {
        assert_eq!(abs("-4.5"), Ok(FormulaValue::Number(4.5)));
        assert_eq!(abs(" 3 "), Ok(FormulaValue::Number(3.0)));
        assert!(abs("x").is_err());
    }

    #[test]
    fn test_conditional_aggregates() {
        let cells = ["3", "10", "7", "x", ""];
        let cond = Condition::parse(">5").unwrap();
        assert_eq!(count_if(&cells, &cond), FormulaValue::Number(2.0));
        assert_eq!(sum_if(&cells, &cond), FormulaValue::Number(17.0));

        let cond = Condition::parse("!=10").unwrap();
        assert_eq!(count_if(&cells, &cond), FormulaValue::Number(2.0));
    }
}
