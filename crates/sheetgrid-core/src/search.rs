use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::grid::Grid;
use crate::range::CellPosition;

/// Options for finding cells in the grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// The search query (literal string or regex pattern)
    pub query: String,
    /// Whether to match case-sensitively
    #[serde(default)]
    pub match_case: bool,
    /// Whether the entire cell value must match (vs. partial match)
    #[serde(default)]
    pub match_entire_cell: bool,
    /// Whether to interpret query as a regex pattern
    #[serde(default)]
    pub use_regex: bool,
}

impl SearchOptions {
    /// Case-insensitive substring search for `query`
    pub fn literal(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Compiled form of [`SearchOptions`].
///
/// Literal queries are escaped into a pattern so that both modes share one
/// case-folding and whole-cell implementation.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Option<Regex>,
    expand_captures: bool,
}

impl Matcher {
    pub fn new(options: &SearchOptions) -> Result<Self, SheetError> {
        if options.query.is_empty() {
            return Ok(Self {
                regex: None,
                expand_captures: false,
            });
        }

        let body = if options.use_regex {
            options.query.clone()
        } else {
            regex::escape(&options.query)
        };
        let body = if options.match_entire_cell {
            format!("^(?:{})$", body)
        } else {
            body
        };
        let pattern = if options.match_case {
            body
        } else {
            format!("(?i){}", body)
        };

        let regex = Regex::new(&pattern).map_err(|e| SheetError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            regex: Some(regex),
            expand_captures: options.use_regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => !text.is_empty() && regex.is_match(text),
            None => false,
        }
    }

    /// Replace every occurrence, returning `None` when nothing matched
    pub fn replace_all(&self, text: &str, replacement: &str) -> Option<String> {
        if !self.is_match(text) {
            return None;
        }
        let regex = self.regex.as_ref()?;
        let replaced = if self.expand_captures {
            regex.replace_all(text, replacement)
        } else {
            regex.replace_all(text, NoExpand(replacement))
        };
        Some(replaced.into_owned())
    }
}

/// Every matching position in row-major order
pub fn find_all(grid: &Grid, matcher: &Matcher) -> Vec<CellPosition> {
    grid.rows()
        .enumerate()
        .flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, text)| matcher.is_match(text))
                .map(move |(col, _)| CellPosition::new(row, col))
        })
        .collect()
}

/// First match strictly after `from` in row-major order, wrapping around
/// to the start of the grid. With no `from`, the first match overall.
pub fn find_next(grid: &Grid, matcher: &Matcher, from: Option<CellPosition>) -> Option<CellPosition> {
    let matches = find_all(grid, matcher);
    match from {
        Some(from) => matches
            .iter()
            .copied()
            .find(|&pos| pos > from)
            .or_else(|| matches.first().copied()),
        None => matches.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        Grid::from_rows(vec![
            vec!["Apple".into(), "banana".into()],
            vec!["pineapple".into(), "".into()],
            vec!["APPLE".into(), "cost $5".into()],
        ])
        .unwrap()
    }

    #[test]
    fn test_literal_case_insensitive() {
        let matcher = Matcher::new(&SearchOptions::literal("apple")).unwrap();
        assert_eq!(
            find_all(&sample(), &matcher),
            vec![
                CellPosition::new(0, 0),
                CellPosition::new(1, 0),
                CellPosition::new(2, 0)
            ]
        );
    }

    #[test]
    fn test_match_case_and_entire_cell() {
        let options = SearchOptions {
            query: "apple".into(),
            match_case: true,
            match_entire_cell: true,
            use_regex: false,
        };
        let matcher = Matcher::new(&options).unwrap();
        assert!(find_all(&sample(), &matcher).is_empty());

        let options = SearchOptions {
            match_case: false,
            ..options
        };
        let matcher = Matcher::new(&options).unwrap();
        assert_eq!(
            find_all(&sample(), &matcher),
            vec![CellPosition::new(0, 0), CellPosition::new(2, 0)]
        );
    }

    #[test]
    fn test_literal_query_is_not_a_pattern() {
        let matcher = Matcher::new(&SearchOptions::literal("$5")).unwrap();
        assert_eq!(find_all(&sample(), &matcher), vec![CellPosition::new(2, 1)]);
        assert_eq!(
            matcher.replace_all("cost $5", "$1").as_deref(),
            Some("cost $1")
        );
    }

    #[test]
    fn test_regex_replace_with_captures() {
        let options = SearchOptions {
            query: r"(\w+)apple".into(),
            use_regex: true,
            ..SearchOptions::default()
        };
        let matcher = Matcher::new(&options).unwrap();
        assert_eq!(
            matcher.replace_all("pineapple", "$1-fruit").as_deref(),
            Some("pine-fruit")
        );
        assert_eq!(matcher.replace_all("banana", "x"), None);
    }

    #[test]
    fn test_invalid_regex() {
        let options = SearchOptions {
            query: "(".into(),
            use_regex: true,
            ..SearchOptions::default()
        };
        assert!(matches!(
            Matcher::new(&options),
            Err(SheetError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let matcher = Matcher::new(&SearchOptions::literal("")).unwrap();
        assert!(find_all(&sample(), &matcher).is_empty());
    }

    #[test]
    fn test_find_next_wraps() {
        let matcher = Matcher::new(&SearchOptions::literal("apple")).unwrap();
        let grid = sample();
        assert_eq!(
            find_next(&grid, &matcher, Some(CellPosition::new(0, 0))),
            Some(CellPosition::new(1, 0))
        );
        assert_eq!(
            find_next(&grid, &matcher, Some(CellPosition::new(2, 0))),
            Some(CellPosition::new(0, 0))
        );
        assert_eq!(find_next(&grid, &matcher, None), Some(CellPosition::new(0, 0)));
    }
}
