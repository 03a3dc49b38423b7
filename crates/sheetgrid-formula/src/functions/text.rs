use crate::value::FormulaValue;

/// CONCAT - Join the texts with no separator
pub fn concat(texts: &[&str]) -> FormulaValue {
    FormulaValue::Text(texts.concat())
}

/// TRIM - Strip leading and trailing whitespace
pub fn trim(text: &str) -> FormulaValue {
    FormulaValue::Text(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat() {
        assert_eq!(concat(&["a", "", "b c"]), FormulaValue::Text("ab c".into()));
        assert_eq!(concat(&[]), FormulaValue::Text(String::new()));
    }

    #[test]
    fn test_trim() {
        assert_eq!(trim("  hi there \t"), FormulaValue::Text("hi there".into()));
    }
}
