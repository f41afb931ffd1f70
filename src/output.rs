//! Output formatting: grep-compatible (default) and JSON Lines (`--json`).
//!
//! All result data flows through a [`Formatter`] which writes to an
//! arbitrary [`std::io::Write`] destination (typically stdout).
//! Hints and errors always go to stderr via [`print_hint`] and [`print_error`].

use std::io::Write;

use serde::Serialize;

use crate::errors::PlnavError;
use crate::types::{ParamKind, Parameter, Root, SymbolHandle, SymbolId, SymbolKind};

// ---------------------------------------------------------------------------
// Serializable output types
// ---------------------------------------------------------------------------

/// A navigation or completion result.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolOutput {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line: usize,
    pub col: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    pub definition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl SymbolOutput {
    pub fn from_handle(handle: &SymbolHandle) -> Self {
        let root = handle.root();
        let symbol = handle.symbol();
        let (line, col) = root.line_col(symbol.offset);
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind,
            file: root.file_name().to_string(),
            line,
            col,
            end_line: symbol.offset_end.map(|end| root.line_col(end).0),
            definition: symbol.definition.clone(),
            documentation: symbol.formatted_doc().map(str::to_string),
        }
    }
}

/// One line of a file outline (`plnav symbols`).
#[derive(Debug, Clone, Serialize)]
pub struct OutlineEntry {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub line: usize,
    pub col: usize,
    /// Nesting depth; top-level symbols are 0.
    pub depth: usize,
}

impl OutlineEntry {
    pub fn new(root: &Root, id: SymbolId) -> Self {
        let symbol = &root[id];
        let (line, col) = root.line_col(symbol.offset);
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind,
            file: root.file_name().to_string(),
            line,
            col,
            depth: root.depth(id),
        }
    }
}

/// One derived parameter (`plnav params`).
#[derive(Debug, Clone, Serialize)]
pub struct ParamOutput {
    pub routine: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: ParamKind,
    pub text: String,
}

impl ParamOutput {
    pub fn new(routine: &str, param: &Parameter) -> Self {
        Self {
            routine: routine.to_string(),
            name: param.name.clone(),
            type_name: param.type_name.clone(),
            kind: param.kind,
            text: param.text.clone(),
        }
    }
}

/// Output formatter that can render results in either grep-compatible text
/// or JSON Lines (one JSON object per line).
pub struct Formatter<W: Write> {
    writer: W,
    json: bool,
}

impl<W: Write> Formatter<W> {
    /// * `writer` - The destination for output (e.g. `std::io::stdout()`).
    /// * `json`   - When `true`, emit JSON Lines; otherwise, emit grep-style text.
    pub fn new(writer: W, json: bool) -> Self {
        Self { writer, json }
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> std::io::Result<()> {
        let line = serde_json::to_string(value).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// `file:line:col: kind name`
    pub fn format_symbol(&mut self, sym: &SymbolOutput) -> std::io::Result<()> {
        if self.json {
            self.write_json(sym)
        } else {
            writeln!(self.writer, "{}:{}:{}: {} {}", sym.file, sym.line, sym.col, sym.kind, sym.name)
        }
    }

    /// `file:line:col:  [indent]kind name`
    pub fn format_outline(&mut self, entry: &OutlineEntry) -> std::io::Result<()> {
        if self.json {
            self.write_json(entry)
        } else {
            // Two spaces base indent, then two more per nesting level.
            let padding = "  ".repeat(entry.depth + 1);
            writeln!(
                self.writer,
                "{}:{}:{}:{}{} {}",
                entry.file, entry.line, entry.col, padding, entry.kind, entry.name
            )
        }
    }

    /// `name kind type`, or `return type` for a function result.
    pub fn format_param(&mut self, param: &ParamOutput) -> std::io::Result<()> {
        if self.json {
            return self.write_json(param);
        }
        match param.kind {
            ParamKind::Return => writeln!(self.writer, "return {}", param.type_name),
            ParamKind::Unspecified => writeln!(self.writer, "{}", param.name),
            kind => writeln!(self.writer, "{} {} {}", param.name, kind, param.type_name),
        }
    }

    /// Indented documentation block under a grep-style symbol line.
    /// Nothing in JSON mode, where the text is a field of the symbol.
    pub fn format_documentation(&mut self, doc: &str) -> std::io::Result<()> {
        if self.json {
            return Ok(());
        }
        for line in doc.lines() {
            writeln!(self.writer, "    {line}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stderr helpers
// ---------------------------------------------------------------------------

/// Print a hint message to stderr (suppressed when `json` is true).
pub fn print_hint(msg: &str, json: bool) {
    if !json {
        eprintln!("hint: {msg}");
    }
}

/// Print an error message to stderr.
pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Format a [`PlnavError`] to stderr with structured `error:` / `hint:` lines
/// and return the process exit code.
pub fn format_error(err: &PlnavError, json: bool) -> i32 {
    print_error(&format!("{err}"));
    if let Some(hint) = err.hint() {
        print_hint(hint, json);
    }
    err.exit_code()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EXIT_ERROR, EXIT_USAGE, SearchError};
    use crate::parser;
    use std::sync::Arc;

    /// Helper: renders output into a String.
    fn render<F>(json: bool, f: F) -> String
    where
        F: FnOnce(&mut Formatter<&mut Vec<u8>>) -> std::io::Result<()>,
    {
        let mut buf = Vec::new();
        {
            let mut fmt = Formatter::new(&mut buf, json);
            f(&mut fmt).unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    const TEXT: &str = "/** Adds one. */
create function inc(p_val in number) return number is
begin
  return p_val + 1;
end inc;";

    fn inc() -> SymbolHandle {
        let root = Arc::new(parser::parse("db/inc.fnc", TEXT));
        let id = root.symbols()[0];
        SymbolHandle::new(root, id)
    }

    #[test]
    fn symbol_from_handle() {
        let out = SymbolOutput::from_handle(&inc());
        assert_eq!(out.file, "db/inc.fnc");
        assert_eq!((out.line, out.col), (2, 1));
        assert_eq!(out.end_line, Some(5));
        assert_eq!(out.documentation.as_deref(), Some("Adds one."));
    }

    #[test]
    fn symbol_grep_format() {
        let out = render(false, |fmt| fmt.format_symbol(&SymbolOutput::from_handle(&inc())));
        assert_eq!(out, "db/inc.fnc:2:1: function inc\n");
    }

    #[test]
    fn symbol_json_format() {
        let out = render(true, |fmt| fmt.format_symbol(&SymbolOutput::from_handle(&inc())));
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["name"], "inc");
        assert_eq!(v["kind"], "function");
        assert_eq!(v["line"], 2);
        assert_eq!(v["documentation"], "Adds one.");
    }

    #[test]
    fn outline_indents_by_depth() {
        let root = parser::parse("p.pks", "package p is\n  x number;\nend p;");
        let out = render(false, |fmt| {
            for id in crate::tree::symbols_from_root(&root) {
                fmt.format_outline(&OutlineEntry::new(&root, id))?;
            }
            Ok(())
        });
        assert_eq!(out, "p.pks:1:1:  packageSpec p\np.pks:2:3:    variable x\n");
    }

    #[test]
    fn outline_json_omits_nothing() {
        let root = parser::parse("p.pks", "package p is end p;");
        let out = render(true, |fmt| fmt.format_outline(&OutlineEntry::new(&root, root.symbols()[0])));
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["kind"], "packageSpec");
        assert_eq!(v["depth"], 0);
    }

    #[test]
    fn params_grep_and_json() {
        let handle = inc();
        let params: Vec<_> = handle
            .symbol()
            .params()
            .iter()
            .map(|p| ParamOutput::new("inc", p))
            .collect();
        let out = render(false, |fmt| params.iter().try_for_each(|p| fmt.format_param(p)));
        assert_eq!(out, "p_val in number\nreturn number\n");

        let out = render(true, |fmt| fmt.format_param(&params[0]));
        let v: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(v["type"], "number");
        assert_eq!(v["kind"], "in");
    }

    #[test]
    fn documentation_is_indented_in_grep_mode_only() {
        assert_eq!(render(false, |fmt| fmt.format_documentation("a\nb")), "    a\n    b\n");
        assert_eq!(render(true, |fmt| fmt.format_documentation("a\nb")), "");
    }

    #[test]
    fn format_error_returns_exit_codes() {
        let err = PlnavError::Search(SearchError::Walk("gone".into()));
        assert_eq!(format_error(&err, false), EXIT_ERROR);
        let err = PlnavError::Usage("bad arg".into());
        assert_eq!(format_error(&err, true), EXIT_USAGE);
    }
}
