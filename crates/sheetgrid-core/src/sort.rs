use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cell::{is_blank, parse_number};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort key derived from a cell's text
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Blank,
}

impl SortKey {
    fn of(text: &str) -> Self {
        if is_blank(text) {
            SortKey::Blank
        } else if let Some(n) = parse_number(text) {
            SortKey::Number(n)
        } else {
            SortKey::Text(text.to_lowercase())
        }
    }
}

/// Compare two cells for sorting.
///
/// Numbers come before text; blanks are always last, whichever direction
/// is requested.
pub fn compare_cells(a: &str, b: &str, order: SortOrder) -> Ordering {
    let (a, b) = (SortKey::of(a), SortKey::of(b));
    let ordering = match (&a, &b) {
        (SortKey::Blank, SortKey::Blank) => return Ordering::Equal,
        (SortKey::Blank, _) => return Ordering::Greater,
        (_, SortKey::Blank) => return Ordering::Less,
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
    };

    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

/// Stable ordering of `keys`: `result[i]` is the index of the key that
/// belongs at position `i`
pub fn sorted_order(keys: &[&str], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..keys.len()).collect();
    indices.sort_by(|&a, &b| compare_cells(keys[a], keys[b], order));
    indices
}
