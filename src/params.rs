//! Routine parameters, derived on demand from a symbol's definition text.

use crate::lexer::{self, Token, TokenKind};
use crate::types::{ParamKind, Parameter, Symbol};

/// Words that may follow a return type but are not part of it.
const ROUTINE_MODIFIERS: &[&str] = &[
    "pipelined",
    "deterministic",
    "parallel_enable",
    "result_cache",
    "authid",
    "aggregate",
    "accessible",
];

/// Parameters of a routine symbol; empty for every other kind.
pub fn derive(symbol: &Symbol) -> Vec<Parameter> {
    if !symbol.kind.is_routine() {
        return Vec::new();
    }
    from_definition(&symbol.definition)
}

/// Parse `function|procedure name [(params)] [return type ...]`.
///
/// Entries without an explicit mode are `in`. A function's return type is
/// appended as a parameter of kind [`ParamKind::Return`] with an empty name.
pub fn from_definition(def: &str) -> Vec<Parameter> {
    let toks = lexer::tokenize(def);
    let Some(keyword) = toks
        .iter()
        .position(|t| t.is_word(def, "function") || t.is_word(def, "procedure"))
    else {
        return Vec::new();
    };

    let mut i = keyword + 1;
    if toks.get(i).is_some_and(Token::is_name) {
        i += 1;
        if is_punct(&toks, i, '.') && toks.get(i + 1).is_some_and(Token::is_name) {
            i += 2;
        }
    }

    let mut params = Vec::new();
    if is_punct(&toks, i, '(') {
        let mut depth = 0usize;
        let mut entry_start = i + 1;
        let mut j = i;
        while j < toks.len() {
            match toks[j].kind {
                TokenKind::Punct('(') => depth += 1,
                TokenKind::Punct(')') => {
                    depth -= 1;
                    if depth == 0 {
                        params.extend(entry(def, &toks[entry_start..j]));
                        j += 1;
                        break;
                    }
                }
                TokenKind::Punct(',') if depth == 1 => {
                    params.extend(entry(def, &toks[entry_start..j]));
                    entry_start = j + 1;
                }
                _ => {}
            }
            j += 1;
        }
        i = j;
    }

    if toks.get(i).is_some_and(|t| t.is_word(def, "return")) {
        let type_start = i + 1;
        let type_end = (type_start..toks.len())
            .find(|&j| ROUTINE_MODIFIERS.iter().any(|m| toks[j].is_word(def, m)))
            .unwrap_or(toks.len());
        if type_start < type_end {
            params.push(Parameter {
                text: def[toks[i].start..toks[type_end - 1].end].to_string(),
                name: String::new(),
                type_name: def[toks[type_start].start..toks[type_end - 1].end].to_string(),
                kind: ParamKind::Return,
            });
        }
    }

    params
}

fn is_punct(toks: &[Token], i: usize, c: char) -> bool {
    toks.get(i).is_some_and(|t| t.kind == TokenKind::Punct(c))
}

/// One `name [in|out|in out] [nocopy] type [default ...|:= ...]` entry.
fn entry(def: &str, toks: &[Token]) -> Option<Parameter> {
    let (first, last) = (toks.first()?, toks.last()?);
    let text = def[first.start..last.end].to_string();
    let name = first.name(def).to_string();

    let word = |k: usize, w: &str| toks.get(k).is_some_and(|t| t.is_word(def, w));
    let (kind, mut k) = if word(1, "in") {
        if word(2, "out") {
            (ParamKind::InOut, 3)
        } else {
            (ParamKind::In, 2)
        }
    } else if word(1, "out") {
        (ParamKind::Out, 2)
    } else {
        (ParamKind::In, 1)
    };
    if word(k, "nocopy") {
        k += 1;
    }

    let end = (k..toks.len())
        .find(|&j| word(j, "default") || (is_punct(toks, j, ':') && is_punct(toks, j + 1, '=')))
        .unwrap_or(toks.len());
    if k >= end {
        return Some(Parameter {
            text,
            name,
            type_name: String::new(),
            kind: ParamKind::Unspecified,
        });
    }

    Some(Parameter {
        text,
        name,
        type_name: def[toks[k].start..toks[end - 1].end].to_string(),
        kind,
    })
}
