use serde::{Deserialize, Serialize};

use crate::cell::{is_blank, parse_number};
use crate::range::{CellPosition, CellRange};

/// Predicate applied by a rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Gt,
    Lt,
    Eq,
    Contains,
}

/// A conditional formatting rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalFormatRule {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub value: String,
    #[serde(alias = "bg")]
    pub background_color: String,
    #[serde(default, alias = "color", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// `None` applies to the whole sheet
    #[serde(default)]
    pub scope: Option<CellRange>,
}

impl ConditionalFormatRule {
    pub fn new(kind: RuleKind, value: impl Into<String>, background_color: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            value: value.into(),
            background_color: background_color.into(),
            text_color: None,
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: CellRange) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_text_color(mut self, color: impl Into<String>) -> Self {
        self.text_color = Some(color.into());
        self
    }

    pub fn applies_to(&self, pos: CellPosition) -> bool {
        self.scope.map_or(true, |scope| scope.normalized().contains(pos))
    }

    /// Evaluate the predicate against a cell's text
    pub fn matches(&self, text: &str) -> bool {
        if is_blank(text) {
            return false;
        }

        match self.kind {
            RuleKind::Gt => compare_numbers(text, &self.value, |a, b| a > b),
            RuleKind::Lt => compare_numbers(text, &self.value, |a, b| a < b),
            RuleKind::Eq => match (parse_number(text), parse_number(&self.value)) {
                (Some(a), Some(b)) => a == b,
                _ => text.trim().to_lowercase() == self.value.trim().to_lowercase(),
            },
            RuleKind::Contains => {
                let needle = self.value.to_lowercase();
                !needle.is_empty() && text.to_lowercase().contains(&needle)
            }
        }
    }
}

fn compare_numbers(text: &str, operand: &str, op: impl Fn(f64, f64) -> bool) -> bool {
    match (parse_number(text), parse_number(operand)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

/// Colors contributed by the winning rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStyle<'a> {
    pub background_color: &'a str,
    pub text_color: Option<&'a str>,
}

/// Ordered rule list; earlier rules take precedence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionalFormats {
    rules: Vec<ConditionalFormatRule>,
    #[serde(skip)]
    next_id: u64,
}

impl ConditionalFormats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<ConditionalFormatRule>) -> Self {
        let mut formats = Self::new();
        for rule in rules {
            formats.add_rule(rule);
        }
        formats
    }

    pub fn rules(&self) -> &[ConditionalFormatRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a rule, assigning an id when it has none. Returns the id.
    pub fn add_rule(&mut self, mut rule: ConditionalFormatRule) -> String {
        if rule.id.is_empty() {
            loop {
                self.next_id += 1;
                let candidate = format!("rule-{}", self.next_id);
                if !self.rules.iter().any(|r| r.id == candidate) {
                    rule.id = candidate;
                    break;
                }
            }
        }
        let id = rule.id.clone();
        self.rules.push(rule);
        id
    }

    pub fn remove_rule(&mut self, id: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        self.rules.len() != before
    }

    pub fn clear_rules(&mut self) {
        self.rules.clear();
    }

    /// Style for a cell: the first in-scope rule whose predicate matches
    pub fn style_for(&self, pos: CellPosition, text: &str) -> Option<CellStyle<'_>> {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(pos) && rule.matches(text))
            .map(|rule| CellStyle {
                background_color: &rule.background_color,
                text_color: rule.text_color.as_deref(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_rules() {
        let gt = ConditionalFormatRule::new(RuleKind::Gt, "50", "#f00");
        assert!(gt.matches("100"));
        assert!(gt.matches("1,000"));
        assert!(!gt.matches("30"));
        assert!(!gt.matches("hello"));

        let lt = ConditionalFormatRule::new(RuleKind::Lt, "0", "#f00");
        assert!(lt.matches("-1"));
        assert!(!lt.matches("0"));
    }

    #[test]
    fn test_eq_numeric_or_text() {
        let rule = ConditionalFormatRule::new(RuleKind::Eq, "10", "#0f0");
        assert!(rule.matches("10.0"));
        assert!(!rule.matches("11"));

        let rule = ConditionalFormatRule::new(RuleKind::Eq, "Done", "#0f0");
        assert!(rule.matches("done"));
        assert!(!rule.matches("done!"));
    }

    #[test]
    fn test_contains() {
        let rule = ConditionalFormatRule::new(RuleKind::Contains, "err", "#f00");
        assert!(rule.matches("Error occurred"));
        assert!(!rule.matches("success"));

        let empty = ConditionalFormatRule::new(RuleKind::Contains, "", "#f00");
        assert!(!empty.matches("anything"));
    }

    #[test]
    fn test_blank_never_matches() {
        let rule = ConditionalFormatRule::new(RuleKind::Eq, "", "#f00");
        assert!(!rule.matches(""));
        assert!(!rule.matches("  "));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut formats = ConditionalFormats::new();
        formats.add_rule(ConditionalFormatRule::new(RuleKind::Gt, "100", "red"));
        formats.add_rule(ConditionalFormatRule::new(RuleKind::Gt, "10", "yellow").with_text_color("black"));

        let pos = CellPosition::new(0, 0);
        assert_eq!(formats.style_for(pos, "500").unwrap().background_color, "red");
        let style = formats.style_for(pos, "50").unwrap();
        assert_eq!(style.background_color, "yellow");
        assert_eq!(style.text_color, Some("black"));
        assert!(formats.style_for(pos, "5").is_none());
    }

    #[test]
    fn test_scope_limits_rule() {
        let mut formats = ConditionalFormats::new();
        formats.add_rule(
            ConditionalFormatRule::new(RuleKind::Contains, "x", "blue")
                .with_scope(CellRange::new(0, 0, 1, 1)),
        );
        assert!(formats.style_for(CellPosition::new(1, 1), "x").is_some());
        assert!(formats.style_for(CellPosition::new(2, 1), "x").is_none());
    }

    #[test]
    fn test_ids_assigned_and_removed() {
        let mut formats = ConditionalFormats::new();
        let a = formats.add_rule(ConditionalFormatRule::new(RuleKind::Gt, "1", "red"));
        let mut named = ConditionalFormatRule::new(RuleKind::Lt, "1", "red");
        named.id = "rule-2".into();
        formats.add_rule(named);
        let c = formats.add_rule(ConditionalFormatRule::new(RuleKind::Eq, "1", "red"));

        assert_eq!(a, "rule-1");
        assert_eq!(c, "rule-3");
        assert!(formats.remove_rule("rule-2"));
        assert!(!formats.remove_rule("rule-2"));
        assert_eq!(formats.len(), 2);

        formats.clear_rules();
        assert!(formats.is_empty());
    }

    #[test]
    fn test_rule_json_shape() {
        let json = r##"{"id":"a","type":"contains","value":"x","bg":"#fff","scope":null}"##;
        let rule: ConditionalFormatRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.kind, RuleKind::Contains);
        assert_eq!(rule.background_color, "#fff");
        assert!(rule.scope.is_none());
    }
}
