//! # Rules Module
//!
//! Parsing of the numbered rules resource that configures the encounter
//! engine.
//!
//! The resource is line oriented. Each logical row looks like
//! `{50001}{20, First: 1042 2-4, MinLevel: 5}`: a numeric id followed by the
//! row text. Ids are sparse; the loader addresses groups of rows by reserved
//! id windows. Anything outside braces is a comment.

pub mod cursor;
pub mod loader;

pub use cursor::*;
pub use loader::*;

use crate::EncounterResult;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

/// Errors raised while loading the rules resource.
///
/// Any of these disables random encounters for the session.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A line has unbalanced braces or a non-numeric id
    #[error("malformed line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },

    /// A row is missing a required positional value
    #[error("row {row}: {reason}")]
    MalformedRow { row: i32, reason: String },

    /// A required row is absent
    #[error("row {row} is missing")]
    MissingRow { row: i32 },

    /// Two rows claim the same id
    #[error("row {row} is duplicated")]
    DuplicateRow { row: i32 },

    /// A chart window holds no rows
    #[error("empty encounter chart (first row {base:?})")]
    EmptyChart { base: Option<i32> },

    /// A table window has a gap before its last row
    #[error("encounter table is discontinuous at row {row}")]
    Discontinuous { row: i32 },

    /// An entry row has no `First:` creature clause
    #[error("row {row} has no creature clause")]
    MissingCreature { row: i32 },

    /// A field value lies outside its allowed range
    #[error("row {row}: {field} value {value} out of range")]
    OutOfRange {
        row: i32,
        field: &'static str,
        value: i64,
    },

    /// A symbolic value isn't in the accepted list
    #[error("row {row}: unknown value {token:?}")]
    UnknownValue { row: i32, token: String },
}

/// Parsed rules resource: a sparse map from row id to row text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesFile {
    rows: BTreeMap<i32, String>,
    duplicates: BTreeSet<i32>,
}

impl RulesFile {
    /// Creates an empty rules file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses a rules file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> EncounterResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(text.parse::<RulesFile>()?)
    }

    /// Adds a row. A second row with the same id is remembered as a
    /// duplicate; the first text is kept.
    pub fn insert(&mut self, id: i32, text: impl Into<String>) {
        if self.rows.contains_key(&id) {
            self.duplicates.insert(id);
        } else {
            self.rows.insert(id, text.into());
        }
    }

    /// Text of a row.
    pub fn get(&self, id: i32) -> Option<&str> {
        self.rows.get(&id).map(String::as_str)
    }

    /// Number of distinct row ids.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the file has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with ids in `start..start + len`, in id order.
    ///
    /// Fails if any id in the window was duplicated.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::RulesFile;
    ///
    /// let rules: RulesFile = "{100}{a}\n{103}{b}\n{200}{c}".parse().unwrap();
    /// let rows = rules.window(100, 100).unwrap();
    /// assert_eq!(rows, vec![(100, "a"), (103, "b")]);
    /// ```
    pub fn window(&self, start: i32, len: i32) -> Result<Vec<(i32, &str)>, ConfigError> {
        let end = start.saturating_add(len);
        if let Some(&row) = self.duplicates.range(start..end).next() {
            return Err(ConfigError::DuplicateRow { row });
        }
        Ok(self
            .rows
            .range(start..end)
            .map(|(id, text)| (*id, text.as_str()))
            .collect())
    }
}

impl FromStr for RulesFile {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut rules = RulesFile::new();
        for (index, line) in text.lines().enumerate() {
            if let Some((id, row)) = parse_line(line, index + 1)? {
                rules.insert(id, row);
            }
        }
        Ok(rules)
    }
}

/// Parses one `{id}{text}` line. Lines without an opening brace are comments.
fn parse_line(line: &str, number: usize) -> Result<Option<(i32, &str)>, ConfigError> {
    let malformed = || ConfigError::MalformedLine {
        line: number,
        text: line.to_string(),
    };

    let trimmed = line.trim();
    if trimmed.starts_with("//") {
        return Ok(None);
    }
    let Some(open) = trimmed.find('{') else {
        return Ok(None);
    };

    let rest = &trimmed[open + 1..];
    let close = rest.find('}').ok_or_else(malformed)?;
    let id = rest[..close].trim().parse::<i32>().map_err(|_| malformed())?;

    let rest = rest[close + 1..].trim_start();
    let body = rest.strip_prefix('{').ok_or_else(malformed)?;
    let close = body.find('}').ok_or_else(malformed)?;
    Ok(Some((id, body[..close].trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_and_comments() {
        let text = "// frequency chart\n{10000}{ 10, 20, 5, 80 }\n\nnotes outside braces\n{10001}{0,0,100,5}";
        let rules: RulesFile = text.parse().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.get(10000), Some("10, 20, 5, 80"));
        assert_eq!(rules.get(10001), Some("0,0,100,5"));
        assert_eq!(rules.get(10002), None);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            "{12}{unterminated".parse::<RulesFile>(),
            Err(ConfigError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            "{}\n{abc}{x}".parse::<RulesFile>(),
            Err(ConfigError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            "{5}{ok}\n{6} text".parse::<RulesFile>(),
            Err(ConfigError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicates_fail_only_their_window() {
        let rules: RulesFile = "{100}{a}\n{100}{b}\n{300}{c}".parse().unwrap();
        assert_eq!(rules.get(100), Some("a"));
        assert_eq!(rules.window(100, 100), Err(ConfigError::DuplicateRow { row: 100 }));
        assert_eq!(rules.window(300, 100).unwrap(), vec![(300, "c")]);
    }

    #[test]
    fn test_window_bounds() {
        let rules: RulesFile = "{99}{a}\n{100}{b}\n{199}{c}\n{200}{d}".parse().unwrap();
        let rows = rules.window(100, 100).unwrap();
        assert_eq!(rows, vec![(100, "b"), (199, "c")]);
        assert!(rules.window(1000, 100).unwrap().is_empty());
    }
}
