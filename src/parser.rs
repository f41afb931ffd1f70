//! PL/SQL symbol extraction.
//!
//! Builds a [`Root`] symbol tree from source text without a full grammar.
//! The top level looks for `[create [or replace]] function|procedure|package
//! [body] name` headers; every header becomes a top-level symbol. From there
//! the parser finds the `is`/`as` that closes the header, scans the
//! declaration section (recursing into nested routines), and locates the end
//! of the scope with an end balancer that counts only `begin`/`case` against
//! `end`/`end case`.
//!
//! Parsing never fails. Malformed input stops a branch from growing and is
//! recorded as a [`ParseIssue`] on the returned tree.

use tracing::debug;

use crate::lexer::{self, Token, TokenKind};
use crate::types::{IssueKind, ParseIssue, Root, Symbol, SymbolId, SymbolKind};

/// Routines nested deeper than this are scanned for their extent only.
const MAX_EXTRACT_DEPTH: usize = 1;

/// Parse `text` into a symbol tree. Never fails; see [`Root::issues`].
pub fn parse(file_name: &str, text: &str) -> Root {
    let parser = Parser {
        src: text,
        toks: lexer::tokenize(text),
        nodes: Vec::new(),
        top: Vec::new(),
        issues: Vec::new(),
    };
    parser.run(file_name)
}

/// A recognized `function|procedure|package` header.
struct Header {
    /// Token index where the declaration starts (`create` or the keyword).
    start: usize,
    kind: SymbolKind,
    name: String,
    /// Token index just past the name.
    next: usize,
}

/// Where the `is`/`as` lookahead ended.
enum HeaderEnd {
    /// Token index of `is`/`as`.
    Body(usize),
    /// No body. `at` is the `;` or stop token; `semicolon` tells which.
    NoBody { at: usize, semicolon: bool },
}

/// Why a declaration section scan stopped (token indices).
enum Stop {
    Begin(usize),
    End(usize),
    /// The next unit starts before this one was closed.
    Create(usize),
    Eof,
}

/// Extent of a block as found by the end balancer.
struct Extent {
    /// Byte offset just past the terminating `end [name];`.
    end: usize,
    /// Token index to resume scanning from.
    next: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Spec,
    Body,
}

struct Parser<'t> {
    src: &'t str,
    toks: Vec<Token>,
    nodes: Vec<Symbol>,
    top: Vec<SymbolId>,
    issues: Vec<ParseIssue>,
}

impl<'t> Parser<'t> {
    fn run(mut self, file_name: &str) -> Root {
        let mut pos = 0;
        while pos < self.toks.len() {
            pos = match self.unit_header(pos) {
                Some(header) => self.block(None, header, 0, true),
                None => pos + 1,
            };
        }

        for issue in &self.issues {
            debug!(file = file_name, offset = issue.offset, kind = ?issue.kind, "parse issue");
        }
        Root::new(file_name, self.src, self.nodes, self.top, self.issues)
    }

    // -- token helpers -----------------------------------------------------

    fn kw(&self, i: usize, keyword: &str) -> bool {
        self.toks.get(i).is_some_and(|t| t.is_word(self.src, keyword))
    }

    fn punct(&self, i: usize, c: char) -> bool {
        self.toks.get(i).is_some_and(|t| t.kind == TokenKind::Punct(c))
    }

    fn is_name(&self, i: usize) -> bool {
        self.toks.get(i).is_some_and(Token::is_name)
    }

    /// Byte offset where token `i` starts, or the end of text.
    fn start_of(&self, i: usize) -> usize {
        self.toks.get(i).map_or(self.src.len(), |t| t.start)
    }

    fn text_between(&self, start: usize, end: usize) -> String {
        self.src[start..end.max(start)].trim_end().to_string()
    }

    fn issue(&mut self, offset: usize, kind: IssueKind) {
        self.issues.push(ParseIssue { offset, kind });
    }

    /// `name` or `schema.name`; returns the unquoted last part and the token
    /// index after it.
    fn qualified_name(&self, i: usize) -> Option<(String, usize)> {
        if !self.is_name(i) {
            return None;
        }
        if self.punct(i + 1, '.') && self.is_name(i + 2) {
            return Some((self.toks[i + 2].name(self.src).to_string(), i + 3));
        }
        Some((self.toks[i].name(self.src).to_string(), i + 1))
    }

    // -- top level ---------------------------------------------------------

    /// Recognize `[create [or replace] [editionable]] function|procedure|package [body] name`.
    fn unit_header(&self, i: usize) -> Option<Header> {
        let mut j = i;
        if self.kw(j, "create") {
            j += 1;
            if self.kw(j, "or") && self.kw(j + 1, "replace") {
                j += 2;
            }
            if self.kw(j, "editionable") || self.kw(j, "noneditionable") {
                j += 1;
            }
        }

        let kind = if self.kw(j, "function") {
            SymbolKind::Function
        } else if self.kw(j, "procedure") {
            SymbolKind::Procedure
        } else if self.kw(j, "package") {
            if self.kw(j + 1, "body") {
                j += 1;
                SymbolKind::PackageBody
            } else {
                SymbolKind::PackageSpec
            }
        } else {
            return None;
        };

        let (name, next) = self.qualified_name(j + 1)?;
        Some(Header { start: i, kind, name, next })
    }

    /// Look ahead from the end of a header for the `is`/`as` that opens the
    /// body. Parentheses are skipped; a `;` or a keyword that cannot appear in
    /// a header means there is no body.
    fn jump_as_is(&self, from: usize) -> HeaderEnd {
        let mut depth = 0usize;
        for j in from..self.toks.len() {
            if self.punct(j, '(') {
                depth += 1;
            } else if self.punct(j, ')') {
                depth = depth.saturating_sub(1);
            } else if depth > 0 {
                continue;
            } else if self.punct(j, ';') {
                return HeaderEnd::NoBody { at: j, semicolon: true };
            } else if self.kw(j, "is") || self.kw(j, "as") {
                return HeaderEnd::Body(j);
            } else if ["create", "begin", "end", "function", "procedure", "package"]
                .iter()
                .any(|k| self.kw(j, k))
            {
                return HeaderEnd::NoBody { at: j, semicolon: false };
            }
        }
        HeaderEnd::NoBody { at: self.toks.len(), semicolon: false }
    }

    /// Index of the next `;` at or after `from`, or the token count.
    fn find_semicolon(&self, from: usize) -> usize {
        (from..self.toks.len())
            .find(|&j| self.punct(j, ';'))
            .unwrap_or(self.toks.len())
    }

    fn emit(&mut self, parent: Option<SymbolId>, mut symbol: Symbol, at: usize) -> SymbolId {
        symbol.parent = parent;
        symbol.documentation = self.toks[at]
            .doc
            .clone()
            .map(|span| self.src[span].to_string());
        let id = SymbolId(self.nodes.len());
        self.nodes.push(symbol);
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.top.push(id),
        }
        id
    }

    // -- blocks ------------------------------------------------------------

    /// Parse one package or routine starting at `header`. Returns the token
    /// index to continue from. With `extract == false` the block is only
    /// walked to find its extent.
    fn block(&mut self, parent: Option<SymbolId>, header: Header, depth: usize, extract: bool) -> usize {
        let start = self.start_of(header.start);

        let is_as = match self.jump_as_is(header.next) {
            HeaderEnd::Body(j) => j,
            HeaderEnd::NoBody { at, semicolon } => {
                // Nested routines without a body are forward declarations.
                let kind = if depth > 0 {
                    header.kind.switched()
                } else {
                    if !semicolon {
                        self.issue(start, IssueKind::MissingBody);
                    }
                    header.kind
                };
                if extract {
                    let mut symbol = Symbol::new(header.name, kind, start);
                    symbol.definition = self.text_between(start, self.start_of(at));
                    self.emit(parent, symbol, header.start);
                }
                return if semicolon { at + 1 } else { at };
            }
        };

        let kind = header.kind;
        let id = if extract {
            let mut symbol = Symbol::new(header.name, kind, start);
            symbol.definition = self.text_between(start, self.start_of(is_as));
            Some(self.emit(parent, symbol, header.start))
        } else {
            None
        };

        // `is language ...` / `as external ...` call specifications.
        if self.kw(is_as + 1, "language") || self.kw(is_as + 1, "external") {
            let semi = self.find_semicolon(is_as + 1);
            let end = self.toks.get(semi).map_or(self.src.len(), |t| t.end);
            if let Some(id) = id {
                self.nodes[id.0].offset_end = Some(end);
            }
            return (semi + 1).min(self.toks.len());
        }

        let section = if kind == SymbolKind::PackageSpec {
            Section::Spec
        } else {
            Section::Body
        };
        let stop = self.declarations(id, is_as + 1, section, depth, extract);

        let (end, next) = match stop {
            Stop::Begin(b) => {
                let extent = self.balance(b + 1);
                (extent.end, extent.next)
            }
            Stop::End(e) => {
                let extent = self.balance(e);
                (extent.end, extent.next)
            }
            Stop::Create(c) => {
                let offset = self.start_of(c);
                self.issue(offset, IssueKind::UnterminatedBlock);
                (offset, c)
            }
            Stop::Eof => {
                self.issue(self.src.len(), IssueKind::UnterminatedBlock);
                (self.src.len(), self.toks.len())
            }
        };

        if let Some(id) = id {
            self.nodes[id.0].offset_end = Some(end);
        }
        next
    }

    /// Scan a declaration section until `begin`, `end` or `create`. Tokens
    /// that start no declaration are recorded and stepped over.
    fn declarations(
        &mut self,
        parent: Option<SymbolId>,
        from: usize,
        section: Section,
        depth: usize,
        extract: bool,
    ) -> Stop {
        let mut j = from;
        loop {
            let Some(tok) = self.toks.get(j) else {
                return Stop::Eof;
            };
            if tok.kind == TokenKind::Punct(';') {
                j += 1;
                continue;
            }
            if !tok.is_name() {
                j = self.skip_unexpected(j);
                continue;
            }

            // Quoted identifiers are never keywords.
            let word = match tok.kind {
                TokenKind::Word => tok.text(self.src).to_ascii_lowercase(),
                _ => String::new(),
            };
            j = match word.as_str() {
                "begin" => return Stop::Begin(j),
                "end" => return Stop::End(j),
                "create" => return Stop::Create(j),
                "pragma" => self.find_semicolon(j) + 1,
                "function" | "procedure" => {
                    let kind = if word == "function" {
                        SymbolKind::Function
                    } else {
                        SymbolKind::Procedure
                    };
                    let Some((name, next)) = self.qualified_name(j + 1) else {
                        j = self.skip_unexpected(j);
                        continue;
                    };
                    let header = Header { start: j, kind, name, next };
                    match section {
                        Section::Spec => self.simple_declaration(parent, header, extract),
                        Section::Body => {
                            let nested = depth + 1;
                            self.block(parent, header, nested, extract && nested <= MAX_EXTRACT_DEPTH)
                        }
                    }
                }
                "type" | "subtype" | "cursor" => {
                    let kind = match word.as_str() {
                        "type" => SymbolKind::Type,
                        "subtype" => SymbolKind::Subtype,
                        _ => SymbolKind::Cursor,
                    };
                    if !self.is_name(j + 1) {
                        j = self.skip_unexpected(j);
                        continue;
                    }
                    let name = self.toks[j + 1].name(self.src).to_string();
                    let header = Header { start: j, kind, name, next: j + 2 };
                    self.simple_declaration(parent, header, extract)
                }
                _ => {
                    let kind = if self.kw(j + 1, "constant") {
                        SymbolKind::Constant
                    } else if self.kw(j + 1, "exception") {
                        SymbolKind::Exception
                    } else {
                        SymbolKind::Variable
                    };
                    let name = self.toks[j].name(self.src).to_string();
                    let header = Header { start: j, kind, name, next: j + 1 };
                    self.simple_declaration(parent, header, extract)
                }
            };
        }
    }

    /// Record token `j` as unexpected and return where the declaration scan
    /// resumes.
    ///
    /// Conditional compilation directives (`$if ... $then`, `$else`, `$end`)
    /// are stepped over on their own so the declarations they guard are still
    /// seen. Anything else is skipped through the next `;`, stopping early at
    /// a `begin`, `end` or `create` that ends the section.
    fn skip_unexpected(&mut self, j: usize) -> usize {
        self.issue(self.start_of(j), IssueKind::UnexpectedToken);

        if self.punct(j, '$') && self.toks.get(j + 1).is_some_and(|t| t.kind == TokenKind::Word) {
            let closer = if self.kw(j + 1, "if") || self.kw(j + 1, "elsif") {
                "then"
            } else if self.kw(j + 1, "error") {
                "end"
            } else {
                return j + 2;
            };
            return (j + 2..self.toks.len())
                .find(|&k| self.punct(k, '$') && self.kw(k + 1, closer))
                .map_or(self.toks.len(), |k| k + 2);
        }

        let mut k = j + 1;
        while k < self.toks.len() {
            if self.punct(k, ';') {
                return k + 1;
            }
            let directive = self.punct(k - 1, '$');
            if !directive && (self.kw(k, "begin") || self.kw(k, "end") || self.kw(k, "create")) {
                return k;
            }
            k += 1;
        }
        k
    }

    /// A declaration that runs to the next `;`. Routine headers seen here
    /// become their spec kinds.
    fn simple_declaration(&mut self, parent: Option<SymbolId>, header: Header, extract: bool) -> usize {
        let semi = self.find_semicolon(header.next);
        if extract {
            let kind = if header.kind.is_routine() && !header.kind.is_spec() {
                header.kind.switched()
            } else {
                header.kind
            };
            let start = self.start_of(header.start);
            let mut symbol = Symbol::new(header.name, kind, start);
            symbol.definition = self.text_between(start, self.start_of(semi));
            self.emit(parent, symbol, header.start);
        }
        (semi + 1).min(self.toks.len())
    }

    /// Find where the current scope closes, starting with one open token.
    ///
    /// `begin` and `case` open; a bare `end` or `end case` closes. `end if`
    /// and `end loop` are consumed without counting because their openers
    /// never are. The scope closes when the count reaches zero, including
    /// on a surplus `end`. A `$end` directive is not an `end`.
    fn balance(&mut self, from: usize) -> Extent {
        let mut open = 1usize;
        let mut j = from;
        while j < self.toks.len() {
            if self.kw(j, "begin") || self.kw(j, "case") {
                open += 1;
                j += 1;
                continue;
            }
            if !self.kw(j, "end") || (j > 0 && self.punct(j - 1, '$')) {
                j += 1;
                continue;
            }
            if self.kw(j + 1, "if") || self.kw(j + 1, "loop") {
                j += 2;
                continue;
            }

            let mut k = if self.kw(j + 1, "case") { j + 2 } else { j + 1 };
            open -= 1;
            if open > 0 {
                j = k;
                continue;
            }

            // Terminating `end [label];`.
            if self.is_name(k) && self.punct(k + 1, ';') {
                k += 1;
            }
            if self.punct(k, ';') {
                return Extent { end: self.toks[k].end, next: k + 1 };
            }
            return Extent { end: self.toks[k - 1].end, next: k };
        }

        self.issue(self.src.len(), IssueKind::UnterminatedBlock);
        Extent { end: self.src.len(), next: self.toks.len() }
    }
}
