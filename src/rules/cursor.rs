//! # Row Cursor
//!
//! Left-to-right reader over the text of one rules row.
//!
//! Rows mix comma-separated positional values (`10, 20, 5, 80`), named
//! clauses (`MinLevel: 5`), count ranges (`2-4`) and symbolic tokens
//! (`powerful`). The cursor skips whitespace and commas between values.

/// Cursor over the unread part of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCursor<'a> {
    rest: &'a str,
}

impl<'a> RowCursor<'a> {
    /// Creates a cursor at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// The unread text.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    /// Whether only separators remain.
    pub fn is_exhausted(&self) -> bool {
        self.rest.trim_start_matches(is_separator).is_empty()
    }

    /// Reads a signed integer. Leaves the cursor untouched on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::RowCursor;
    ///
    /// let mut cursor = RowCursor::new(" 10, -20 ,x");
    /// assert_eq!(cursor.int(), Some(10));
    /// assert_eq!(cursor.int(), Some(-20));
    /// assert_eq!(cursor.int(), None);
    /// assert_eq!(cursor.word(), Some("x"));
    /// ```
    pub fn int(&mut self) -> Option<i64> {
        let text = self.rest.trim_start_matches(is_separator);
        let sign_len = usize::from(text.starts_with('-') || text.starts_with('+'));
        let digits = text[sign_len..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len() - sign_len);
        if digits == 0 {
            return None;
        }

        let end = sign_len + digits;
        let value = text[..end].parse().ok()?;
        self.rest = &text[end..];
        Some(value)
    }

    /// Reads a bare word up to the next separator.
    pub fn word(&mut self) -> Option<&'a str> {
        let text = self.rest.trim_start_matches(is_separator);
        let end = text.find(is_separator).unwrap_or(text.len());
        if end == 0 {
            return None;
        }
        self.rest = &text[end..];
        Some(&text[..end])
    }

    /// Reads a count range written as `n` or `low-high`.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::RowCursor;
    ///
    /// let mut cursor = RowCursor::new("2-4, 3");
    /// assert_eq!(cursor.range(), Some((2, 4)));
    /// assert_eq!(cursor.range(), Some((3, 3)));
    /// ```
    pub fn range(&mut self) -> Option<(i64, i64)> {
        let mut lookahead = *self;
        let low = lookahead.int()?;
        let high = match lookahead.rest.strip_prefix('-') {
            Some(after_dash) => {
                let mut upper = RowCursor::new(after_dash);
                let high = upper.int()?;
                lookahead = upper;
                high
            }
            None => low,
        };
        *self = lookahead;
        Some((low, high))
    }

    /// Advances past the next occurrence of `key`. Returns false, leaving the
    /// cursor untouched, when the key doesn't appear in the unread text.
    pub fn named(&mut self, key: &str) -> bool {
        match self.find_named(key) {
            Some(after) => {
                *self = after;
                true
            }
            None => false,
        }
    }

    /// A cursor positioned just after the next occurrence of `key`, without
    /// moving this one.
    ///
    /// # Examples
    ///
    /// ```
    /// use overworld_encounters::RowCursor;
    ///
    /// let cursor = RowCursor::new("MaxLevel: 9, MinLevel: 4");
    /// assert_eq!(cursor.find_named("MinLevel:").and_then(|mut at| at.int()), Some(4));
    /// assert!(cursor.find_named("GlobalFlag:").is_none());
    /// ```
    pub fn find_named(&self, key: &str) -> Option<RowCursor<'a>> {
        let at = self.rest.find(key)?;
        Some(RowCursor::new(&self.rest[at + key.len()..]))
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}
