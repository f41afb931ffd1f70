//! Shared types and data structures.
//!
//! A parsed file is a [`Root`]: an arena of [`Symbol`]s addressed by
//! [`SymbolId`], plus the ordered list of top-level symbols. Parent/child
//! links are ids into the same arena, so a tree is immutable once built
//! apart from the two lazily computed caches on each symbol.

use std::fmt;
use std::ops::Index;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::{doc, params};

/// The kind of a PL/SQL declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    PackageSpec,
    PackageBody,
    Function,
    FunctionSpec,
    Procedure,
    ProcedureSpec,
    Variable,
    Constant,
    Type,
    Subtype,
    Cursor,
    Exception,
}

/// Spec/body counterparts, as `(spec, body)` pairs.
const SWITCH_TABLE: &[(SymbolKind, SymbolKind)] = &[
    (SymbolKind::PackageSpec, SymbolKind::PackageBody),
    (SymbolKind::FunctionSpec, SymbolKind::Function),
    (SymbolKind::ProcedureSpec, SymbolKind::Procedure),
];

impl SymbolKind {
    /// The spec/body counterpart of this kind, or `self` when it has none.
    pub fn switched(self) -> SymbolKind {
        for &(spec, body) in SWITCH_TABLE {
            if self == spec {
                return body;
            }
            if self == body {
                return spec;
            }
        }
        self
    }

    /// Whether this kind takes part in the spec/body relation at all.
    pub fn has_counterpart(self) -> bool {
        self.switched() != self
    }

    pub fn is_spec(self) -> bool {
        matches!(
            self,
            SymbolKind::PackageSpec | SymbolKind::FunctionSpec | SymbolKind::ProcedureSpec
        )
    }

    pub fn is_package(self) -> bool {
        matches!(self, SymbolKind::PackageSpec | SymbolKind::PackageBody)
    }

    /// Functions and procedures, with or without a body.
    pub fn is_routine(self) -> bool {
        matches!(
            self,
            SymbolKind::Function
                | SymbolKind::FunctionSpec
                | SymbolKind::Procedure
                | SymbolKind::ProcedureSpec
        )
    }

    /// Kinds that own a syntactic scope closed by `end`.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            SymbolKind::PackageSpec
                | SymbolKind::PackageBody
                | SymbolKind::Function
                | SymbolKind::Procedure
        )
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::PackageSpec => "packageSpec",
            SymbolKind::PackageBody => "packageBody",
            SymbolKind::Function => "function",
            SymbolKind::FunctionSpec => "functionSpec",
            SymbolKind::Procedure => "procedure",
            SymbolKind::ProcedureSpec => "procedureSpec",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Type => "type",
            SymbolKind::Subtype => "subtype",
            SymbolKind::Cursor => "cursor",
            SymbolKind::Exception => "exception",
        };
        write!(f, "{s}")
    }
}

/// Index of a [`Symbol`] inside its owning [`Root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) usize);

/// A declaration extracted from PL/SQL source.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Identifier text, case preserved, quotes stripped.
    pub name: String,
    pub kind: SymbolKind,
    /// Byte offset of the declaration start (including any `create` prefix).
    pub offset: usize,
    /// Byte offset just past the end of the scope. `None` for non-block
    /// declarations and for blocks whose body was never found.
    pub offset_end: Option<usize>,
    /// Declaration text up to (not including) `is`/`as` or the terminating `;`.
    pub definition: String,
    /// Raw `/** ... */` comment immediately preceding the declaration.
    pub documentation: Option<String>,
    pub parent: Option<SymbolId>,
    pub children: Vec<SymbolId>,
    params: OnceLock<Vec<Parameter>>,
    formatted_doc: OnceLock<String>,
}

impl Symbol {
    pub(crate) fn new(name: String, kind: SymbolKind, offset: usize) -> Self {
        Self {
            name,
            kind,
            offset,
            offset_end: None,
            definition: String::new(),
            documentation: None,
            parent: None,
            children: Vec::new(),
            params: OnceLock::new(),
            formatted_doc: OnceLock::new(),
        }
    }

    /// Top-level symbols have no parent; their owner is the [`Root`] itself.
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    /// Case-insensitive name comparison, the only kind PL/SQL knows.
    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    /// Parameters derived from [`Symbol::definition`], computed on first use.
    pub fn params(&self) -> &[Parameter] {
        self.params.get_or_init(|| params::derive(self))
    }

    /// Markdown rendering of [`Symbol::documentation`], computed on first use.
    pub fn formatted_doc(&self) -> Option<&str> {
        let raw = self.documentation.as_deref()?;
        Some(self.formatted_doc.get_or_init(|| doc::format(raw)).as_str())
    }
}

// Structural equality: the lazy caches are derived data and never compared.
impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.offset == other.offset
            && self.offset_end == other.offset_end
            && self.definition == other.definition
            && self.documentation == other.documentation
            && self.parent == other.parent
            && self.children == other.children
    }
}

impl Eq for Symbol {}

/// Case-insensitive identifier comparison.
pub fn same_name(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// What a soft parse irregularity was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A top-level header with no `is`/`as` before the next unit.
    MissingBody,
    /// Text ran out, or the next `create` unit began, before the scope closed.
    UnterminatedBlock,
    /// A token in a declaration section that starts no declaration; the
    /// scan skipped past it.
    UnexpectedToken,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueKind::MissingBody => "declaration has no is/as body",
            IssueKind::UnterminatedBlock => "block is never closed",
            IssueKind::UnexpectedToken => "unexpected token in declaration section",
        })
    }
}

/// A non-fatal parse irregularity. The tree is still returned; these only
/// explain why parts of it may be inaccurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    pub offset: usize,
    pub kind: IssueKind,
}

/// One parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    file_name: String,
    nodes: Vec<Symbol>,
    symbols: Vec<SymbolId>,
    issues: Vec<ParseIssue>,
    line_starts: Vec<usize>,
}

impl Root {
    pub(crate) fn new(
        file_name: &str,
        text: &str,
        nodes: Vec<Symbol>,
        symbols: Vec<SymbolId>,
        issues: Vec<ParseIssue>,
    ) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            file_name: file_name.to_string(),
            nodes,
            symbols,
            issues,
            line_starts,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Top-level symbols in textual order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.nodes[id.0]
    }

    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Total number of symbols at every depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of ancestors above `id` (0 for top-level symbols).
    pub fn depth(&self, id: SymbolId) -> usize {
        let mut depth = 0;
        let mut cur = self.symbol(id).parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.symbol(p).parent;
        }
        depth
    }

    /// 1-based line and column of a byte offset in the parsed text.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line.saturating_sub(1)];
        (line.max(1), offset - start + 1)
    }
}

impl Index<SymbolId> for Root {
    type Output = Symbol;

    fn index(&self, id: SymbolId) -> &Symbol {
        self.symbol(id)
    }
}

/// A symbol together with the tree that owns it. This is what navigation
/// returns: it carries the file name, offsets, definition and documentation.
#[derive(Debug, Clone)]
pub struct SymbolHandle {
    root: Arc<Root>,
    id: SymbolId,
}

impl SymbolHandle {
    pub fn new(root: Arc<Root>, id: SymbolId) -> Self {
        Self { root, id }
    }

    pub fn root(&self) -> &Arc<Root> {
        &self.root
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn symbol(&self) -> &Symbol {
        self.root.symbol(self.id)
    }

    pub fn file_name(&self) -> &str {
        self.root.file_name()
    }
}

impl PartialEq for SymbolHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root) && self.id == other.id
    }
}

/// Direction of a routine parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    In,
    Out,
    InOut,
    /// The implicit parameter describing a function's return type.
    Return,
    /// A parameter entry without a type.
    #[serde(rename = "none")]
    Unspecified,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamKind::In => "in",
            ParamKind::Out => "out",
            ParamKind::InOut => "inout",
            ParamKind::Return => "return",
            ParamKind::Unspecified => "none",
        };
        write!(f, "{s}")
    }
}

/// A routine parameter derived from a symbol's definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// The raw parameter text, trimmed.
    pub text: String,
    /// Empty for the return parameter.
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: ParamKind,
}
