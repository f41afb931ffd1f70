//! Tokenizer for PL/SQL source text.
//!
//! One regex alternation splits the text into comments, string literals,
//! quoted identifiers, words, numbers and single punctuation characters.
//! Comments and strings are dropped before the parser sees anything, so a
//! keyword inside them can never open or close a scope. A `/** ... */`
//! comment directly in front of a token (only whitespace between) is kept
//! on that token as its documentation span.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)(?P<doc>/\*\*.*?\*/)",
        r"|(?P<block>/\*.*?\*/)",
        r"|(?P<line>--[^\n]*)",
        r"|(?P<qstr>[nN]?[qQ]'(?:\[.*?\]|\{.*?\}|\(.*?\)|<.*?>)')",
        r"|(?P<str>[nN]?'(?:[^']|'')*')",
        r#"|(?P<qid>"[^"\n]*")"#,
        r"|(?P<word>[A-Za-z_][A-Za-z0-9_$#]*)",
        r"|(?P<num>[0-9]+(?:\.[0-9]+)?)",
        r"|(?P<punct>\S)",
    ))
    .expect("token pattern is valid")
});

/// Token categories the parser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    QuotedIdent,
    Str,
    Number,
    Punct(char),
}

/// A significant (non-comment) token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Span of the doc comment immediately preceding this token.
    pub doc: Option<Range<usize>>,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    /// Case-insensitive keyword test.
    pub fn is_word(&self, src: &str, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text(src).eq_ignore_ascii_case(keyword)
    }

    /// Words and quoted identifiers.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::QuotedIdent)
    }

    /// Identifier text with surrounding double quotes removed.
    pub fn name<'a>(&self, src: &'a str) -> &'a str {
        let text = self.text(src);
        match self.kind {
            TokenKind::QuotedIdent => text.trim_matches('"'),
            _ => text,
        }
    }
}

/// Split `src` into significant tokens.
pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pending_doc: Option<Range<usize>> = None;

    for caps in TOKEN_RE.captures_iter(src) {
        let Some(m) = caps.get(0) else { continue };
        let range = m.range();

        let kind = if caps.name("doc").is_some() {
            pending_doc = Some(range);
            continue;
        } else if caps.name("block").is_some() || caps.name("line").is_some() {
            pending_doc = None;
            continue;
        } else if caps.name("qstr").is_some() || caps.name("str").is_some() {
            TokenKind::Str
        } else if caps.name("qid").is_some() {
            TokenKind::QuotedIdent
        } else if caps.name("word").is_some() {
            TokenKind::Word
        } else if caps.name("num").is_some() {
            TokenKind::Number
        } else {
            TokenKind::Punct(m.as_str().chars().next().unwrap_or(' '))
        };

        tokens.push(Token {
            kind,
            start: range.start,
            end: range.end,
            doc: pending_doc.take(),
        });
    }

    tokens
}
