//! Interpretation helpers for raw cell text.
//!
//! Cells only ever store strings; these helpers give the numeric and
//! boolean readings used by formulas, sorting and conditional formats.

/// Parse cell text as a number.
///
/// Surrounding whitespace and thousands-separator commas are ignored
/// (`"1,234.5"` reads as `1234.5`). Text without digits, and values that
/// overflow to infinity, are not numbers.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|&c| c != ',').collect();

    // f64::from_str also accepts "inf" and "NaN"
    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number the way it is written back into a cell.
///
/// Integral values drop the fractional part (`20.0` -> `"20"`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Truthiness of a literal: `"true"` (any case) and `"1"` are true.
pub fn parse_bool(text: &str) -> bool {
    let text = text.trim();
    text.eq_ignore_ascii_case("true") || text == "1"
}

/// Whether a cell counts as unoccupied
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
