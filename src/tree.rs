//! Read-only queries over a parsed symbol tree.
//!
//! Every search walks in pre-order (parent before children, children in
//! textual order) and compares names case-insensitively. `scope` arguments
//! are the symbols to start from; with `recursive == false` only those
//! symbols themselves are considered.

use crate::types::{Root, Symbol, SymbolId, SymbolKind};

/// Pre-order iterator over a scope.
pub struct Preorder<'a> {
    root: &'a Root,
    stack: Vec<SymbolId>,
    recursive: bool,
}

impl Iterator for Preorder<'_> {
    type Item = SymbolId;

    fn next(&mut self) -> Option<SymbolId> {
        let id = self.stack.pop()?;
        if self.recursive {
            self.stack.extend(self.root[id].children.iter().rev());
        }
        Some(id)
    }
}

pub fn walk<'a>(root: &'a Root, scope: &[SymbolId], recursive: bool) -> Preorder<'a> {
    Preorder {
        root,
        stack: scope.iter().rev().copied().collect(),
        recursive,
    }
}

/// Visit every symbol under `scope` in pre-order.
pub fn for_each_symbol<F>(root: &Root, scope: &[SymbolId], mut f: F)
where
    F: FnMut(SymbolId, &Symbol),
{
    for id in walk(root, scope, true) {
        f(id, &root[id]);
    }
}

/// Every symbol in the file, flattened in pre-order.
pub fn symbols_from_root(root: &Root) -> Vec<SymbolId> {
    walk(root, root.symbols(), true).collect()
}

/// Flattened declarations that are neither packages nor routines
/// (variables, constants, types, cursors, exceptions).
pub fn declarations(root: &Root) -> Vec<SymbolId> {
    walk(root, root.symbols(), true)
        .filter(|&id| {
            let kind = root[id].kind;
            !kind.is_package() && !kind.is_routine()
        })
        .collect()
}

/// First symbol named `name` whose offset is at or after `min_offset`.
pub fn find_by_name_offset(
    root: &Root,
    scope: &[SymbolId],
    name: &str,
    min_offset: usize,
    recursive: bool,
) -> Option<SymbolId> {
    walk(root, scope, recursive).find(|&id| root[id].is_named(name) && root[id].offset >= min_offset)
}

/// Last symbol, in pre-order, that starts strictly before `offset`.
pub fn find_near_offset(
    root: &Root,
    scope: &[SymbolId],
    offset: usize,
    recursive: bool,
) -> Option<SymbolId> {
    walk(root, scope, recursive)
        .filter(|&id| root[id].offset < offset)
        .last()
}

/// First symbol named `name` whose kind is one of `kinds`.
pub fn find_by_name_kind(
    root: &Root,
    scope: &[SymbolId],
    name: &str,
    kinds: &[SymbolKind],
    recursive: bool,
) -> Option<SymbolId> {
    walk(root, scope, recursive).find(|&id| root[id].is_named(name) && kinds.contains(&root[id].kind))
}

/// The package counterpart of `id` among the file's top-level symbols, or
/// `id` itself when it is not a package or has no counterpart here.
pub fn switch_symbol(root: &Root, id: SymbolId) -> SymbolId {
    let symbol = &root[id];
    if !symbol.kind.is_package() {
        return id;
    }
    find_by_name_kind(root, root.symbols(), &symbol.name, &[symbol.kind.switched()], false).unwrap_or(id)
}

/// Kind-level spec/body mapping; identity for kinds without a counterpart.
pub fn switch_symbol_kind(kind: SymbolKind) -> SymbolKind {
    kind.switched()
}

pub fn is_symbol_spec(root: &Root, id: SymbolId) -> bool {
    root[id].kind.is_spec()
}

/// The top-level ancestor of `id` (or `id` itself).
pub fn top_level_of(root: &Root, id: SymbolId) -> SymbolId {
    let mut cur = id;
    while let Some(parent) = root[cur].parent {
        cur = parent;
    }
    cur
}

/// `id` followed by its ancestors, innermost first.
pub fn ancestors(root: &Root, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
    std::iter::successors(Some(id), move |&cur| root[cur].parent)
}

/// The innermost package or routine whose scope contains `offset`.
///
/// Starts from the nearest preceding symbol and climbs until it reaches a
/// block that has not closed before `offset`.
pub fn enclosing_symbol(root: &Root, offset: usize) -> Option<SymbolId> {
    let near = find_near_offset(root, root.symbols(), offset, true)?;
    ancestors(root, near).find(|&id| {
        let symbol = &root[id];
        symbol.kind.is_block() && symbol.offset_end.is_none_or(|end| offset < end)
    })
}

/// The package or routine named `name` whose declaration starts closest
/// before `offset`.
pub fn find_declaration_at(root: &Root, name: &str, offset: usize) -> Option<SymbolId> {
    walk(root, root.symbols(), true)
        .filter(|&id| {
            let symbol = &root[id];
            (symbol.kind.is_routine() || symbol.kind.is_package())
                && symbol.is_named(name)
                && symbol.offset <= offset
        })
        .max_by_key(|&id| root[id].offset)
}
