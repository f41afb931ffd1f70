//! Cursor context: which word is under the cursor and what qualifies it.

use std::sync::LazyLock;

use regex::Regex;

/// `name.` or `name<spaces>` right before the word under the cursor.
static QUALIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""?([A-Za-z_][\w$#]*)"?(\.|\s+)$"#).expect("qualifier pattern is valid")
});

/// Identifier after a `function`/`procedure` keyword, optionally schema
/// qualified.
static DECLARED_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s+(?:"?[A-Za-z_][\w$#]*"?\s*\.\s*)?"?([A-Za-z_][\w$#]*)"?"#)
        .expect("declared name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorInfo {
    /// Word before the cursor word (a package qualifier or a keyword).
    pub previous_word: Option<String>,
    /// Word under the cursor; empty when the cursor sits right after a `.`.
    pub current_word: String,
    /// Whether a `.` separates `previous_word` from `current_word`.
    pub previous_dot: bool,
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#')
}

impl CursorInfo {
    /// Derive the context from one line of text and a 0-based byte column.
    ///
    /// A cursor directly after a word counts as being on it. When the word
    /// is `function` or `procedure`, the target is the name that follows it
    /// and `previous_word` is that keyword (declaration mode).
    pub fn from_line(line: &str, column: usize) -> CursorInfo {
        let mut column = column.min(line.len());
        while !line.is_char_boundary(column) {
            column -= 1;
        }

        let start = line[..column]
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_ident(c))
            .last()
            .map_or(column, |(i, _)| i);
        let end = line[column..]
            .char_indices()
            .find(|&(_, c)| !is_ident(c))
            .map_or(line.len(), |(i, _)| column + i);
        let word = &line[start..end];

        if (word.eq_ignore_ascii_case("function") || word.eq_ignore_ascii_case("procedure"))
            && let Some(caps) = DECLARED_NAME_RE.captures(&line[end..])
        {
            return CursorInfo {
                previous_word: Some(word.to_ascii_lowercase()),
                current_word: caps[1].to_string(),
                previous_dot: false,
            };
        }

        match QUALIFIER_RE.captures(&line[..start]) {
            Some(caps) => CursorInfo {
                previous_word: Some(caps[1].to_string()),
                current_word: word.to_string(),
                previous_dot: &caps[2] == ".",
            },
            None => CursorInfo {
                previous_word: None,
                current_word: word.to_string(),
                previous_dot: false,
            },
        }
    }

    /// True when the cursor is on a routine declaration header.
    pub fn is_declaration(&self) -> bool {
        self.previous_word
            .as_deref()
            .is_some_and(|w| w.eq_ignore_ascii_case("function") || w.eq_ignore_ascii_case("procedure"))
    }

    /// The package qualifier: `previous_word` when dotted, else empty.
    pub fn qualifier(&self) -> &str {
        match (&self.previous_word, self.previous_dot) {
            (Some(w), true) => w,
            _ => "",
        }
    }
}

/// The text of 1-based `line`, without its line terminator.
pub fn line_at(text: &str, line: usize) -> Option<&str> {
    let raw = text.split('\n').nth(line.checked_sub(1)?)?;
    Some(raw.strip_suffix('\r').unwrap_or(raw))
}

/// Byte offset of 1-based (`line`, `column`), with the column clamped to
/// the line length.
pub fn offset_of(text: &str, line: usize, column: usize) -> Option<usize> {
    let index = line.checked_sub(1)?;
    let mut start = 0;
    for (i, raw) in text.split('\n').enumerate() {
        if i == index {
            let content = raw.strip_suffix('\r').unwrap_or(raw);
            return Some(start + column.saturating_sub(1).min(content.len()));
        }
        start += raw.len() + 1;
    }
    None
}
