//! Go to definition, spec/body switching and member completion.
//!
//! The navigator first tries to answer from the tree of the file being
//! edited. When the answer lives elsewhere it asks a [`CandidateSource`]
//! for files whose names contain the qualifier or the cursor word, then
//! parses and tests them strictly one after another. The first accepted
//! file wins; a match whose spec/body-ness is not the preferred one is only
//! kept as a fallback while the scan goes on.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cursor::CursorInfo;
use crate::errors::SearchError;
use crate::source::CandidateSource;
use crate::tree;
use crate::types::{Root, SymbolHandle, SymbolId, SymbolKind};

// ---------------------------------------------------------------------------
// Package name translation
// ---------------------------------------------------------------------------

/// Maps a qualifier as written to the package name to search for
/// (synonyms, aliases).
pub trait PackageNameTranslator: Send + Sync {
    fn translate(&self, name: &str) -> String;
}

/// Leaves names unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl PackageNameTranslator for Identity {
    fn translate(&self, name: &str) -> String {
        name.to_string()
    }
}

impl<F> PackageNameTranslator for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn translate(&self, name: &str) -> String {
        self(name)
    }
}

/// Case-insensitive alias table, usually the `[synonyms]` config section.
#[derive(Debug, Default, Clone)]
pub struct Synonyms {
    map: HashMap<String, String>,
}

impl Synonyms {
    pub fn new(table: &BTreeMap<String, String>) -> Self {
        Self {
            map: table
                .iter()
                .map(|(alias, target)| (alias.to_ascii_lowercase(), target.clone()))
                .collect(),
        }
    }
}

impl PackageNameTranslator for Synonyms {
    fn translate(&self, name: &str) -> String {
        self.map
            .get(&name.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Outcome of testing one candidate file.
enum Verdict<R> {
    Accept(R),
    /// Usable, but of the wrong spec/body flavour; keep looking.
    Tentative(R),
    Reject,
}

pub struct Navigator<S, T = Identity> {
    source: S,
    translator: T,
}

impl<S: CandidateSource> Navigator<S> {
    pub fn new(source: S) -> Self {
        Navigator {
            source,
            translator: Identity,
        }
    }
}

impl<S, T> Navigator<S, T> {
    pub fn with_translator<U: PackageNameTranslator>(self, translator: U) -> Navigator<S, U> {
        Navigator {
            source: self.source,
            translator,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: CandidateSource, T: PackageNameTranslator> Navigator<S, T> {
    /// Resolve the word under the cursor to its definition.
    ///
    /// `offset` is the cursor position in `root`'s text. `want_spec` picks
    /// the declaration over the implementation when both exist. `Ok(None)`
    /// means there is nothing to navigate to.
    pub async fn goto(
        &self,
        cursor: &CursorInfo,
        offset: usize,
        root: &Arc<Root>,
        want_spec: bool,
    ) -> Result<Option<SymbolHandle>, SearchError> {
        if cursor.current_word.is_empty() {
            return Ok(None);
        }
        if cursor.is_declaration() {
            let Some(id) = tree::find_declaration_at(root, &cursor.current_word, offset) else {
                debug!(word = %cursor.current_word, "no declaration at cursor");
                return Ok(None);
            };
            self.counterpart_of(root, id, want_spec).await
        } else {
            self.goto_call(cursor, offset, root, want_spec).await
        }
    }

    /// Jump between spec and body of the routine or package at the cursor.
    pub async fn switch(
        &self,
        cursor: &CursorInfo,
        offset: usize,
        root: &Arc<Root>,
    ) -> Result<Option<SymbolHandle>, SearchError> {
        let target = if cursor.is_declaration() {
            tree::find_declaration_at(root, &cursor.current_word, offset)
        } else {
            tree::enclosing_symbol(root, offset)
        };
        let Some(id) = target else {
            return Ok(None);
        };

        let kind = root[id].kind;
        if !kind.is_package() {
            return self.counterpart_of(root, id, !kind.is_spec()).await;
        }

        let local = tree::switch_symbol(root, id);
        if local != id {
            return Ok(Some(SymbolHandle::new(Arc::clone(root), local)));
        }
        let name = root[id].name.clone();
        let wanted = kind.switched();
        self.scan(vec![name.clone()], |candidate| {
            match tree::find_by_name_kind(candidate, candidate.symbols(), &name, &[wanted], false) {
                Some(found) => Verdict::Accept(SymbolHandle::new(Arc::clone(candidate), found)),
                None => Verdict::Reject,
            }
        })
        .await
    }

    /// Members of the package named by the word before the cursor.
    ///
    /// Only the first package spec whose name matches exactly is used; the
    /// qualifier is never dropped. `Ok(None)` without a previous word.
    pub async fn complete(&self, cursor: &CursorInfo) -> Result<Option<Vec<SymbolHandle>>, SearchError> {
        let Some(previous) = cursor.previous_word.as_deref() else {
            return Ok(None);
        };
        let qualifier = self.translator.translate(previous);
        debug!(%qualifier, "completing members");

        let hints = vec![qualifier.clone(), cursor.current_word.clone()];
        self.scan(hints, |candidate| {
            let spec = candidate
                .symbols()
                .iter()
                .copied()
                .find(|&top| candidate[top].kind == SymbolKind::PackageSpec && candidate[top].is_named(&qualifier));
            match spec {
                Some(top) => Verdict::Accept(
                    candidate[top]
                        .children
                        .iter()
                        .map(|&child| SymbolHandle::new(Arc::clone(candidate), child))
                        .collect(),
                ),
                None => Verdict::Reject,
            }
        })
        .await
    }

    /// Declaration mode: the spec/body counterpart of routine `id`.
    async fn counterpart_of(
        &self,
        root: &Arc<Root>,
        id: SymbolId,
        want_spec: bool,
    ) -> Result<Option<SymbolHandle>, SearchError> {
        let symbol = &root[id];
        let Some(parent) = symbol.parent else {
            trace!(name = %symbol.name, "top-level routine has no counterpart");
            return Ok(None);
        };
        if want_spec && symbol.kind.is_spec() {
            return Ok(None);
        }
        let wanted = symbol.kind.switched();
        let handle = |found: SymbolId| SymbolHandle::new(Arc::clone(root), found);

        // Forward declaration and body inside the same package body.
        if root[parent].kind != SymbolKind::PackageSpec
            && let Some(&found) = root[parent]
                .children
                .iter()
                .find(|&&c| c != id && root[c].kind == wanted && root[c].is_named(&symbol.name))
        {
            return Ok(Some(handle(found)));
        }

        let other = tree::switch_symbol(root, parent);
        if other != parent {
            let found = tree::find_by_name_kind(root, &root[other].children, &symbol.name, &[wanted], false);
            return Ok(found.map(handle));
        }

        if !root[parent].is_top_level() {
            return Ok(None);
        }
        let qualifier = root[parent].name.clone();
        debug!(%qualifier, name = %symbol.name, "counterpart lives in another file");
        self.search_definition(qualifier, &symbol.name, wanted.is_spec()).await
    }

    /// Call mode: an ordinary identifier use.
    async fn goto_call(
        &self,
        cursor: &CursorInfo,
        offset: usize,
        root: &Arc<Root>,
        want_spec: bool,
    ) -> Result<Option<SymbolHandle>, SearchError> {
        let word = cursor.current_word.as_str();
        let enclosing = tree::enclosing_symbol(root, offset);
        if let Some(e) = enclosing
            && root[e].kind == SymbolKind::PackageSpec
        {
            trace!("cursor inside a package spec");
            return Ok(None);
        }

        let mut qualifier = match &cursor.previous_word {
            Some(previous) if cursor.previous_dot => self.translator.translate(previous),
            _ => String::new(),
        };

        if let Some(e) = enclosing {
            let top = tree::top_level_of(root, e);
            let other = tree::switch_symbol(root, top);
            let handle = |found: SymbolId| SymbolHandle::new(Arc::clone(root), found);

            let local = tree::ancestors(root, e)
                .filter(|&scope| qualifier.is_empty() || root[scope].is_named(&qualifier))
                .find_map(|scope| resolve_in(root, scope, word, want_spec));
            let in_counterpart = || {
                (other != top && (qualifier.is_empty() || root[other].is_named(&qualifier)))
                    .then(|| resolve_in(root, other, word, want_spec))
                    .flatten()
            };

            match local {
                Some(found) if !mismatched(root[found].kind, want_spec) => return Ok(Some(handle(found))),
                Some(found) => return Ok(Some(handle(in_counterpart().unwrap_or(found)))),
                None => {
                    if let Some(found) = in_counterpart() {
                        return Ok(Some(handle(found)));
                    }
                }
            }

            if qualifier.is_empty() && root[top].kind == SymbolKind::PackageBody && other == top {
                qualifier = root[top].name.clone();
                debug!(%qualifier, "assuming the package spec lives in another file");
            }
        }

        self.search_definition(qualifier, word, want_spec).await
    }

    /// External search for `word`, narrowed to packages named `qualifier`.
    /// Retried once without the qualifier when nothing matches, since the
    /// qualifier may have been a schema name.
    async fn search_definition(
        &self,
        qualifier: String,
        word: &str,
        want_spec: bool,
    ) -> Result<Option<SymbolHandle>, SearchError> {
        let hints = vec![qualifier.clone(), word.to_string()];
        let found = self
            .scan(hints, |candidate| match_definition(candidate, &qualifier, word, want_spec))
            .await?;
        if found.is_some() || qualifier.is_empty() {
            return Ok(found);
        }

        debug!(%qualifier, word, "no match, retrying without qualifier");
        self.scan(vec![word.to_string()], |candidate| {
            match_definition(candidate, "", word, want_spec)
        })
        .await
    }

    /// Enumerate candidates once and test them in order.
    async fn scan<R, F>(&self, hints: Vec<String>, mut matcher: F) -> Result<Option<R>, SearchError>
    where
        F: FnMut(&Arc<Root>) -> Verdict<R>,
    {
        let candidates = self.source.candidates(&hints).await?;
        debug!(?hints, count = candidates.len(), "scanning candidates");

        let mut fallback = None;
        for path in candidates {
            let root = self.source.load(&path).await?;
            match matcher(&root) {
                Verdict::Accept(found) => {
                    trace!(path = %path.display(), "accepted");
                    return Ok(Some(found));
                }
                Verdict::Tentative(found) => {
                    trace!(path = %path.display(), "kept as fallback");
                    fallback.get_or_insert(found);
                }
                Verdict::Reject => trace!(path = %path.display(), "rejected"),
            }
        }
        Ok(fallback)
    }
}

fn mismatched(kind: SymbolKind, want_spec: bool) -> bool {
    kind.has_counterpart() && kind.is_spec() != want_spec
}

/// Find `name` in the subtree of `scope` (inclusive). A hit of the wrong
/// spec/body flavour is swapped for its counterpart in the same subtree
/// when there is one.
fn resolve_in(root: &Root, scope: SymbolId, name: &str, want_spec: bool) -> Option<SymbolId> {
    let found = tree::find_by_name_offset(root, &[scope], name, 0, true)?;
    let kind = root[found].kind;
    if mismatched(kind, want_spec)
        && let Some(better) = tree::find_by_name_kind(root, &[scope], name, &[kind.switched()], true)
    {
        return Some(better);
    }
    Some(found)
}

/// Per-file test for go to definition.
fn match_definition(
    candidate: &Arc<Root>,
    qualifier: &str,
    word: &str,
    want_spec: bool,
) -> Verdict<SymbolHandle> {
    let mut tentative = None;
    for &top in candidate.symbols() {
        let accepted = qualifier.is_empty()
            || (candidate[top].kind.is_package() && candidate[top].is_named(qualifier));
        if !accepted {
            continue;
        }
        let Some(found) = resolve_in(candidate, top, word, want_spec) else {
            continue;
        };
        let handle = SymbolHandle::new(Arc::clone(candidate), found);
        if !mismatched(candidate[found].kind, want_spec) {
            return Verdict::Accept(handle);
        }
        tentative.get_or_insert(handle);
    }
    match tentative {
        Some(handle) => Verdict::Tentative(handle),
        None => Verdict::Reject,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::source::MemorySource;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Wraps a [`MemorySource`] and records every file it loads.
    #[derive(Default)]
    struct Recording {
        inner: MemorySource,
        loaded: Mutex<Vec<String>>,
    }

    impl Recording {
        fn new(files: &[(&str, &str)]) -> Self {
            let inner = files
                .iter()
                .fold(MemorySource::new(), |src, (path, text)| src.with_file(*path, *text));
            Self {
                inner,
                loaded: Mutex::new(Vec::new()),
            }
        }

        fn loaded(&self) -> Vec<String> {
            self.loaded.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CandidateSource for Recording {
        async fn candidates(&self, hints: &[String]) -> Result<Vec<PathBuf>, SearchError> {
            self.inner.candidates(hints).await
        }

        async fn read(&self, path: &Path) -> Result<String, SearchError> {
            self.loaded.lock().unwrap().push(path.to_string_lossy().into_owned());
            self.inner.read(path).await
        }
    }

    /// Every candidate fails to read.
    struct Broken;

    #[async_trait]
    impl CandidateSource for Broken {
        async fn candidates(&self, _hints: &[String]) -> Result<Vec<PathBuf>, SearchError> {
            Ok(vec![PathBuf::from("a.pks"), PathBuf::from("b.pks")])
        }

        async fn read(&self, path: &Path) -> Result<String, SearchError> {
            Err(SearchError::Read {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    fn parse(name: &str, text: &str) -> Arc<Root> {
        Arc::new(parser::parse(name, text))
    }

    /// Cursor on the `nth` occurrence (0-based) of `needle`, one byte in.
    fn cursor_at(text: &str, needle: &str, nth: usize) -> (CursorInfo, usize) {
        let offset = text.match_indices(needle).nth(nth).map(|(i, _)| i).unwrap() + 1;
        let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[offset..].find('\n').map_or(text.len(), |i| offset + i);
        let cursor = CursorInfo::from_line(&text[line_start..line_end], offset - line_start);
        (cursor, offset)
    }

    fn described(h: &SymbolHandle) -> (String, String, SymbolKind) {
        (h.file_name().to_string(), h.symbol().name.clone(), h.symbol().kind)
    }

    const UTIL_SPEC: &str = "create or replace package pkg_util is
  c_max constant number := 10;
  function get_name(p_id number) return varchar2;
end pkg_util;";

    const UTIL_BODY: &str = "create or replace package body pkg_util is
  function get_name(p_id number) return varchar2 is
  begin
    return 'x';
  end get_name;
end pkg_util;";

    const APP_BODY: &str = "create or replace package body app is
  g_count number;
  procedure helper is
  begin
    null;
  end helper;
  procedure run is
    l_name varchar2(100);
  begin
    helper;
    g_count := pkg_util.c_max;
    l_name := pkg_util.get_name(1);
    l_name := u.get_name(2);
  end run;
end app;";

    #[tokio::test]
    async fn local_definition_needs_no_search() {
        let source = Recording::new(&[("pkg_util.pks", UTIL_SPEC)]);
        let nav = Navigator::new(source);
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "helper;", 1);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(described(&found), ("app.pkb".into(), "helper".into(), SymbolKind::Procedure));

        let (cursor, offset) = cursor_at(APP_BODY, "g_count :=", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(found.symbol().kind, SymbolKind::Variable);

        assert!(nav.source().loaded().is_empty());
    }

    #[tokio::test]
    async fn qualified_call_prefers_body_from_later_file() {
        let source = Recording::new(&[("pkg_util.pks", UTIL_SPEC), ("pkg_util.pkb", UTIL_BODY)]);
        let nav = Navigator::new(source);
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "get_name(1)", 0);
        assert_eq!(cursor.qualifier(), "pkg_util");
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pkb".into(), "get_name".into(), SymbolKind::Function));
        assert_eq!(nav.source().loaded(), vec!["pkg_util.pks", "pkg_util.pkb"]);
    }

    #[tokio::test]
    async fn qualified_call_wanting_spec_stops_at_first_file() {
        let source = Recording::new(&[("pkg_util.pks", UTIL_SPEC), ("pkg_util.pkb", UTIL_BODY)]);
        let nav = Navigator::new(source);
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "get_name(1)", 0);
        let found = nav.goto(&cursor, offset, &root, true).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pks".into(), "get_name".into(), SymbolKind::FunctionSpec));
        assert_eq!(nav.source().loaded(), vec!["pkg_util.pks"]);
    }

    #[tokio::test]
    async fn mismatched_match_is_kept_as_fallback() {
        let source = Recording::new(&[("pkg_util.pks", UTIL_SPEC)]);
        let nav = Navigator::new(source);
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "get_name(1)", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(found.symbol().kind, SymbolKind::FunctionSpec);
    }

    #[tokio::test]
    async fn constants_resolve_from_the_spec_file() {
        let source = Recording::new(&[("pkg_util.pks", UTIL_SPEC), ("pkg_util.pkb", UTIL_BODY)]);
        let nav = Navigator::new(source);
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "c_max", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pks".into(), "c_max".into(), SymbolKind::Constant));
    }

    #[tokio::test]
    async fn translator_maps_synonyms() {
        let source = Recording::new(&[("pkg_util.pkb", UTIL_BODY)]);
        let mut table = BTreeMap::new();
        table.insert("U".to_string(), "pkg_util".to_string());
        let nav = Navigator::new(source).with_translator(Synonyms::new(&table));
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "get_name(2)", 0);
        assert_eq!(cursor.qualifier(), "u");
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(found.file_name(), "pkg_util.pkb");
    }

    #[tokio::test]
    async fn closures_translate_too() {
        let source = Recording::new(&[("pkg_util.pkb", UTIL_BODY)]);
        let nav = Navigator::new(source).with_translator(|name: &str| {
            if name == "u" { "PKG_UTIL".to_string() } else { name.to_string() }
        });
        let root = parse("app.pkb", APP_BODY);

        let (cursor, offset) = cursor_at(APP_BODY, "get_name(2)", 0);
        assert!(nav.goto(&cursor, offset, &root, false).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn qualifier_is_dropped_once_when_nothing_matches() {
        let inc = "create function inc(p_val number) return number is begin return p_val + 1; end;";
        let source = Recording::new(&[("inc.fnc", inc)]);
        let nav = Navigator::new(source);
        let text = "procedure main is x number; begin x := app_owner.inc(1); end;";
        let root = parse("main.prc", text);

        let (cursor, offset) = cursor_at(text, "inc(1)", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(described(&found), ("inc.fnc".into(), "inc".into(), SymbolKind::Function));
        // Scanned once with the qualifier, once without.
        assert_eq!(nav.source().loaded(), vec!["inc.fnc", "inc.fnc"]);
    }

    #[tokio::test]
    async fn unknown_symbol_is_none_not_error() {
        let nav = Navigator::new(Recording::new(&[("pkg_util.pks", UTIL_SPEC)]));
        let text = "procedure main is begin nothing_here; end;";
        let root = parse("main.prc", text);
        let (cursor, offset) = cursor_at(text, "nothing_here", 0);
        assert!(nav.goto(&cursor, offset, &root, false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn package_spec_cursor_goes_nowhere() {
        let nav = Navigator::new(Recording::new(&[("pkg_util.pkb", UTIL_BODY)]));
        let root = parse("pkg_util.pks", UTIL_SPEC);
        let (cursor, offset) = cursor_at(UTIL_SPEC, "varchar2", 0);
        assert!(nav.goto(&cursor, offset, &root, false).await.unwrap().is_none());
        assert!(nav.source().loaded().is_empty());
    }

    #[tokio::test]
    async fn package_body_without_local_spec_searches_by_own_name() {
        let spec = "package app is c_limit constant number := 5; end app;";
        let body = "package body app is
  procedure run is
  begin
    dbms_output.put_line(c_limit);
  end run;
end app;";
        let nav = Navigator::new(Recording::new(&[("app.pks", spec)]));
        let root = parse("app.pkb", body);
        let (cursor, offset) = cursor_at(body, "c_limit", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(described(&found), ("app.pks".into(), "c_limit".into(), SymbolKind::Constant));
    }

    #[tokio::test]
    async fn search_failure_aborts_the_query() {
        let nav = Navigator::new(Broken);
        let text = "procedure main is begin pkg.f; end;";
        let root = parse("main.prc", text);
        let (cursor, offset) = cursor_at(text, "f;", 0);
        let err = nav.goto(&cursor, offset, &root, false).await.unwrap_err();
        assert!(matches!(err, SearchError::Read { .. }));
    }

    // -- declaration mode ----------------------------------------------------

    #[tokio::test]
    async fn declaration_jumps_to_spec_in_other_file() {
        let nav = Navigator::new(Recording::new(&[("pkg_util.pkb", UTIL_BODY), ("pkg_util.pks", UTIL_SPEC)]));
        let root = parse("pkg_util.pkb", UTIL_BODY);
        let (cursor, offset) = cursor_at(UTIL_BODY, "function", 0);
        assert!(cursor.is_declaration());

        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pks".into(), "get_name".into(), SymbolKind::FunctionSpec));
    }

    #[tokio::test]
    async fn declaration_counterpart_in_same_file() {
        let text = "package p is
  procedure x;
end p;
package body p is
  procedure x is begin null; end x;
end p;";
        let nav = Navigator::new(Recording::new(&[]));
        let root = parse("p.sql", text);

        let (cursor, offset) = cursor_at(text, "procedure x is", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(found.symbol().kind, SymbolKind::ProcedureSpec);

        let (cursor, offset) = cursor_at(text, "procedure x;", 0);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(found.symbol().kind, SymbolKind::Procedure);

        // Already on the spec and asking for the spec: nothing to do.
        assert!(nav.goto(&cursor, offset, &root, true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn forward_declaration_in_same_body() {
        let text = "package body p is
  function f return number;
  function f return number is begin return 1; end;
end p;";
        let nav = Navigator::new(Recording::new(&[]));
        let root = parse("p.pkb", text);
        let (cursor, offset) = cursor_at(text, "function f", 1);
        let found = nav.goto(&cursor, offset, &root, false).await.unwrap().unwrap();
        assert_eq!(found.symbol().kind, SymbolKind::FunctionSpec);
        assert_eq!(found.symbol().offset, text.find("function f").unwrap());
    }

    #[tokio::test]
    async fn top_level_routine_has_nothing_to_jump_to() {
        let text = "function inc(p number) return number is begin return p + 1; end;";
        let nav = Navigator::new(Recording::new(&[("inc.fnc", text)]));
        let root = parse("inc.fnc", text);
        let (cursor, offset) = cursor_at(text, "function", 0);
        assert!(nav.goto(&cursor, offset, &root, false).await.unwrap().is_none());
        assert!(nav.source().loaded().is_empty());
    }

    // -- switch --------------------------------------------------------------

    #[tokio::test]
    async fn switch_package_and_routine() {
        let nav = Navigator::new(Recording::new(&[("pkg_util.pks", UTIL_SPEC), ("pkg_util.pkb", UTIL_BODY)]));
        let root = parse("pkg_util.pkb", UTIL_BODY);

        // Inside the routine body.
        let (cursor, offset) = cursor_at(UTIL_BODY, "return 'x'", 0);
        let found = nav.switch(&cursor, offset, &root).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pks".into(), "get_name".into(), SymbolKind::FunctionSpec));

        // On the package line: package spec in the other file.
        let (cursor, offset) = cursor_at(UTIL_BODY, "pkg_util is", 0);
        let found = nav.switch(&cursor, offset, &root).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pks".into(), "pkg_util".into(), SymbolKind::PackageSpec));
    }

    #[tokio::test]
    async fn switch_from_spec_goes_to_body() {
        let nav = Navigator::new(Recording::new(&[("pkg_util.pks", UTIL_SPEC), ("pkg_util.pkb", UTIL_BODY)]));
        let root = parse("pkg_util.pks", UTIL_SPEC);
        let (cursor, offset) = cursor_at(UTIL_SPEC, "function", 0);
        let found = nav.switch(&cursor, offset, &root).await.unwrap().unwrap();
        assert_eq!(described(&found), ("pkg_util.pkb".into(), "get_name".into(), SymbolKind::Function));
    }

    // -- completion ----------------------------------------------------------

    #[tokio::test]
    async fn completion_uses_first_file_declaring_the_spec() {
        let decoy = "package body q is procedure m is begin null; end; end q;";
        let spec = "package q is
  m constant number := 1;
  procedure other_m;
end q;";
        let later = "package q is z number; end q;";
        let source = Recording::new(&[("q_impl.pkb", decoy), ("q.pks", spec), ("q_old.pks", later)]);
        let nav = Navigator::new(source);

        let cursor = CursorInfo::from_line("  q.", 4);
        let members = nav.complete(&cursor).await.unwrap().unwrap();
        let names: Vec<_> = members.iter().map(|h| h.symbol().name.clone()).collect();
        assert_eq!(names, vec!["m", "other_m"]);
        assert!(members.iter().all(|h| h.file_name() == "q.pks"));
        // File #1 was rejected, file #3 never opened.
        assert_eq!(nav.source().loaded(), vec!["q_impl.pkb", "q.pks"]);
    }

    #[tokio::test]
    async fn completion_without_previous_word_is_none() {
        let nav = Navigator::new(Recording::new(&[("q.pks", "package q is m number; end;")]));
        let cursor = CursorInfo::from_line("m", 1);
        assert!(nav.complete(&cursor).await.unwrap().is_none());
        assert!(nav.source().loaded().is_empty());
    }

    #[tokio::test]
    async fn completion_never_drops_the_qualifier() {
        let nav = Navigator::new(Recording::new(&[("misc.pks", "package misc is m number; end;")]));
        let cursor = CursorInfo::from_line("nope.m", 6);
        assert!(nav.complete(&cursor).await.unwrap().is_none());
    }

    #[test]
    fn identity_and_synonym_translation() {
        assert_eq!(Identity.translate("Pkg"), "Pkg");
        let mut table = BTreeMap::new();
        table.insert("Util".to_string(), "PKG_UTIL".to_string());
        let syn = Synonyms::new(&table);
        assert_eq!(syn.translate("UTIL"), "PKG_UTIL");
        assert_eq!(syn.translate("other"), "other");
    }
}
