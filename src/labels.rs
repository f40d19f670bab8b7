//! Parsing of labels embedded at the start of commit messages.
//!
//! A commit message may begin with a parenthesized block of labels that
//! attach metadata to an otherwise free-text message:
//!
//! ```text
//! (md:1864 ignore review:"needs a second look") Fix the release script
//! ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^
//! # This is the label block
//! ```
//!
//! Each label is either a bare flag (`ignore`), a key with a plain value
//! (`md:1864`, everything after the first colon is the value) or a key with a
//! quoted value (`review:"..."`). Labels are separated by commas and/or
//! blanks.
//!
//! The block is only recognized at the very first character of the message.
//! A block holding a token that fits none of the three shapes (a bare `~`, an
//! unbalanced quote) is not a label block at all, so [`parse`] returns no
//! labels and [`strip`] leaves it in place.
//! Neither function ever fails.

use std::collections::{btree_map, BTreeMap};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Characters allowed in a label key.
const KEY_CHARS: &str = r"\w*+\-.#/";

/// Characters allowed in an unquoted value: anything but blanks, commas,
/// quotes and parentheses.
const VALUE_CHARS: &str = r#"^\s,()""#;

/// A single `key`, `key:value` or `key:"quoted value"` token.
static TOKEN_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r#"(?P<key>[{k}]+)(?::(?:"(?P<quoted>[^")]*)"|(?P<value>[{v}]*)))?"#,
        k = KEY_CHARS,
        v = VALUE_CHARS,
    );
    return Regex::new(&pattern).expect("label token expression is valid");
});

/// The whole label block, anchored at the start of the message.
static LABELS_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    let token = format!(
        r#"[{k}]+(?::(?:"[^")]*"|[{v}]*))?"#,
        k = KEY_CHARS,
        v = VALUE_CHARS,
    );
    let pattern = format!(r"^\((?:{t}(?:[, \t]+{t})*[, \t]*)?\)", t = token);
    return Regex::new(&pattern).expect("label block expression is valid");
});

/// The set of labels found on a single message.
///
/// Keys are unique, a repeated key keeps the value of its last occurrence.
/// Iteration is sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<String, String>);

impl Labels {
    /// Creates an empty label set.
    pub fn new() -> Self {
        return Self(BTreeMap::new());
    }

    /// Adds a label, replacing any previous value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Gets the value of a label. Flags have an empty value.
    /// ```
    /// # use release_email::labels;
    /// let labels = labels::parse("(md:1864 wip) Some message");
    /// assert_eq!(labels.get("md"), Some("1864"));
    /// assert_eq!(labels.get("wip"), Some(""));
    /// assert_eq!(labels.get("missing"), None);
    /// ```
    pub fn get(&self, key: &str) -> Option<&str> {
        return self.0.get(key).map(String::as_str);
    }

    /// Whether the label is present, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        return self.0.contains_key(key);
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        return self.0.len();
    }

    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        return self.0.is_empty();
    }

    /// Iterates over `(key, value)` pairs sorted by key.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        return self.0.iter();
    }

    /// Iterates over the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        return self.0.keys().map(String::as_str);
    }

    /// Renders the labels for display, sorted.
    /// Flags render as `key`, everything else as `key:value`.
    /// ```
    /// # use release_email::labels;
    /// let labels = labels::parse("(b:2 a) Some message");
    /// assert_eq!(labels.pretty(), vec!["a", "b:2"]);
    /// ```
    pub fn pretty(&self) -> Vec<String> {
        let mut pretty = self.0
            .iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    return key.to_owned();
                } else {
                    return format!("{key}:{value}");
                }
            })
            .collect::<Vec<String>>();
        pretty.sort();
        return pretty;
    }

    /// Splits the value of a label on commas.
    /// Blank items are dropped, a missing label yields nothing.
    /// ```
    /// # use release_email::labels;
    /// let labels = labels::parse(r#"(md:"123, 456") Some message"#);
    /// assert_eq!(labels.values_of("md"), vec!["123", "456"]);
    /// assert!(labels.values_of("jira").is_empty());
    /// ```
    pub fn values_of(&self, key: &str) -> Vec<String> {
        return match self.get(key) {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
            None => Vec::new(),
        };
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "({})", self.pretty().join(" "));
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        return self.iter();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Labels::new();
        for (key, value) in iter {
            labels.insert(key, value);
        }
        return labels;
    }
}

/// Finds the label block at the start of a message, parentheses included.
/// ```
/// # use release_email::labels::label_block;
/// assert_eq!(label_block("(a b) Message"), Some("(a b)"));
/// assert_eq!(label_block("Message (a b)"), None);
/// ```
pub fn label_block(message: &str) -> Option<&str> {
    return LABELS_EXPRESSION
        .find(message)
        .map(|block| block.as_str());
}

/// Gets the labels of a message.
/// Messages without a valid label block have no labels.
/// ```
/// # use release_email::labels;
/// let labels = labels::parse("(md:1864 xy:123:125 false -) A message");
/// assert_eq!(labels.get("md"), Some("1864"));
/// assert_eq!(labels.get("xy"), Some("123:125"));
/// assert_eq!(labels.get("false"), Some(""));
/// assert!(labels::parse("(invalid chars in labels ~)").is_empty());
/// ```
pub fn parse(message: &str) -> Labels {
    let block = match label_block(message) {
        Some(v) => v,
        None => return Labels::new(),
    };

    // Block is validated already, so tokens only need to be picked out.
    let inner = &block[1..block.len() - 1];
    return TOKEN_EXPRESSION
        .captures_iter(inner)
        .filter_map(|token| {
            let key = token.name("key")?.as_str();
            let value = token
                .name("quoted")
                .or_else(|| token.name("value"))
                .map_or("", |v| v.as_str());
            return Some((key, value));
        })
        .collect();
}

/// Removes the label block from a message and trims the rest.
/// ```
/// # use release_email::labels;
/// assert_eq!(labels::strip("(abc) Two sets (def ghi)"), "Two sets (def ghi)");
/// assert_eq!(labels::strip("() No real labels"), "No real labels");
/// assert_eq!(labels::strip("(bad ~) Kept as is "), "(bad ~) Kept as is");
/// ```
pub fn strip(message: &str) -> String {
    let rest = match label_block(message) {
        Some(block) => &message[block.len()..],
        None => message,
    };
    return rest.trim().to_owned();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(message: &str) -> Vec<String> {
        return parse(message).keys().map(str::to_owned).collect();
    }

    #[test]
    fn gets_alphanumeric_labels() {
        assert_eq!(keys("(one two three3) A test message"), vec!["one", "three3", "two"]);
    }

    #[test]
    fn gets_labels_with_special_characters() {
        assert_eq!(keys("(one two - _ *)"), vec!["*", "-", "_", "one", "two"]);
    }

    #[test]
    fn returns_nothing_for_unlabeled_messages() {
        for message in [
            "A message without labels",
            "( A malformed message",
            "(invalid chars in labels ~)",
            " (leading) whitespace",
            "Misplaced (abc def ghi) labels",
            "",
        ] {
            assert!(parse(message).is_empty(), "{message:?}");
        }
    }

    #[test]
    fn gets_arguments() {
        let labels = parse("(md:1864 xy:123:125 false -) A message with an argument");
        assert_eq!(labels.get("md"), Some("1864"));
        assert_eq!(labels.get("xy"), Some("123:125"));
        assert_eq!(labels.get("false"), Some(""));
        assert_eq!(labels.get("-"), Some(""));
        assert_eq!(labels.len(), 4);
    }

    #[test]
    fn distinguishes_flags_from_values() {
        let expected: Labels = [("a", ""), ("b", "1")].into_iter().collect();
        assert_eq!(parse("(a b:1) x"), expected);
    }

    #[test]
    fn keeps_quoted_values_whole() {
        let labels = parse(r#"(k:"x y, z") msg"#);
        assert_eq!(labels.get("k"), Some("x y, z"));
        assert_eq!(labels.len(), 1);

        // Blanks and commas are fine inside quotes
        let labels = parse(r#"(note:"~ anything: goes", md:12) msg"#);
        assert_eq!(labels.get("note"), Some("~ anything: goes"));
        assert_eq!(labels.get("md"), Some("12"));
    }

    #[test]
    fn rejects_unbalanced_quotes() {
        assert!(parse(r#"(k:"x y) msg"#).is_empty());
        assert!(parse(r#"(k:"x"y) msg"#).is_empty());
        assert_eq!(strip(r#"(k:"x y) msg"#), r#"(k:"x y) msg"#);
    }

    #[test]
    fn accepts_comma_and_tab_separators() {
        assert_eq!(keys("(a,b,\tc , d,) msg"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn later_duplicates_win() {
        assert_eq!(parse("(md:1 md:2) msg").get("md"), Some("2"));
    }

    #[test]
    fn empty_values_are_allowed() {
        assert_eq!(parse("(md:) msg").get("md"), Some(""));
    }

    #[test]
    fn empty_block_has_no_labels() {
        assert!(parse("() No real labels").is_empty());
        assert_eq!(label_block("() No real labels"), Some("()"));
    }

    #[test]
    fn strips_only_the_leading_block() {
        assert_eq!(strip("(abc) Two sets (def ghi)"), "Two sets (def ghi)");
        assert_eq!(strip("Misplaced (abc def ghi) labels"), "Misplaced (abc def ghi) labels");
        assert_eq!(strip("( A malformed message"), "( A malformed message");
        assert_eq!(strip("(invalid chars in labels ~)"), "(invalid chars in labels ~)");
        assert_eq!(strip("(md:1)"), "");
        assert_eq!(strip("  Untouched  "), "Untouched");
    }

    #[test]
    fn strip_is_idempotent() {
        for message in ["(a) text (b)", "(a b:1) x", "()", "plain", "( x", " (~) y "] {
            let once = strip(message);
            assert_eq!(strip(&once), once);
        }
    }

    #[test]
    fn strips_a_single_block() {
        // A second leading block is message text, not labels
        assert_eq!(strip("(a) (b) text"), "(b) text");
        assert_eq!(keys("(a) (b) text"), vec!["a"]);
    }

    #[test]
    fn values_take_any_punctuation() {
        assert_eq!(parse("(ref:https://x.org/a?b=1) msg").get("ref"), Some("https://x.org/a?b=1"));
        assert_eq!(parse("(v:1.0!) msg").get("v"), Some("1.0!"));
        assert_eq!(parse("(build:#12;rc) msg").get("build"), Some("#12;rc"));
        assert_eq!(strip("(ref:https://x.org/a?b=1) msg"), "msg");
    }

    #[test]
    fn tilde_is_only_valid_inside_values() {
        assert_eq!(parse("(md:1864~2) msg").get("md"), Some("1864~2"));
        assert_eq!(strip("(md:1864~2) msg"), "msg");

        assert!(parse("(md:1864 ~) msg").is_empty());
        assert!(parse("(md~2) msg").is_empty());
        assert_eq!(strip("(md:1864 ~) msg"), "(md:1864 ~) msg");
    }

    #[test]
    fn strip_removes_one_block_per_call() {
        assert_eq!(strip(&strip("(a) (b) x")), "x");
    }

    #[test]
    fn nested_parentheses_are_not_labels() {
        assert!(parse("((a)) msg").is_empty());
        assert!(parse("(a (b)) msg").is_empty());
        assert!(parse("(k:(b)) msg").is_empty());
    }

    #[test]
    fn non_ascii_keys_are_letters() {
        assert_eq!(parse("(revisión:sí) msg").get("revisión"), Some("sí"));
    }

    #[test]
    fn values_of_splits_on_commas() {
        let labels = parse(r#"(md:"1, 2,,3" one:4) msg"#);
        assert_eq!(labels.values_of("md"), vec!["1", "2", "3"]);
        assert_eq!(labels.values_of("one"), vec!["4"]);
    }

    #[test]
    fn displays_sorted() {
        assert_eq!(parse("(z a:1) msg").to_string(), "(a:1 z)");
    }
}
