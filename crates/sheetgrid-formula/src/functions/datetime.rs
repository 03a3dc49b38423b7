use chrono::NaiveDate;
use sheetgrid_core::parse_number;

use crate::value::FormulaValue;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn whole_number(text: &str) -> Option<i64> {
    parse_number(text)
        .filter(|n| n.fract() == 0.0)
        .map(|n| n as i64)
}

/// DATE - Calendar date from year, month (1-12) and day, as `YYYY-MM-DD`.
///
/// Anything that does not name a real date gives empty text; out-of-range
/// months and days are not rolled over.
pub fn date(year: &str, month: &str, day: &str) -> FormulaValue {
    let built = (|| {
        let year = i32::try_from(whole_number(year)?).ok()?;
        let month = u32::try_from(whole_number(month)?).ok()?;
        let day = u32::try_from(whole_number(day)?).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })();

    FormulaValue::Text(
        built
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
    )
}

/// TODAY - The given date, as `YYYY-MM-DD`
pub fn today(today: NaiveDate) -> FormulaValue {
    FormulaValue::Text(today.format(DATE_FORMAT).to_string())
}
