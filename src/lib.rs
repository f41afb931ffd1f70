//! PL/SQL symbol extraction and cross-file navigation.
//!
//! [`parser::parse`] turns source text into a [`types::Root`] symbol tree;
//! [`tree`] answers read-only queries over it; [`navigator::Navigator`]
//! resolves go-to-definition, spec/body switching and member completion,
//! searching other files through a [`source::CandidateSource`].

pub mod cache;
pub mod cli;
pub mod config;
pub mod cursor;
pub mod doc;
pub mod errors;
pub mod lexer;
pub mod navigator;
pub mod output;
pub mod params;
pub mod parser;
pub mod router;
pub mod source;
pub mod tree;
pub mod types;
pub mod walker;

pub use cursor::CursorInfo;
pub use errors::{PlnavError, SearchError};
pub use navigator::{Identity, Navigator, PackageNameTranslator, Synonyms};
pub use parser::parse;
pub use source::{CandidateSource, MemorySource, WorkspaceSource};
pub use types::{Parameter, ParamKind, Root, Symbol, SymbolHandle, SymbolId, SymbolKind};
