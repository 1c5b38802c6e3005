//! Path selectors for markdown documents.
//!
//! A selector such as `guide::heading:h2[1]/block:code` is tokenized by
//! [`lexer`], parsed into a [`ast::SelectorAst`] by [`parser`], and resolved
//! against one document tree by [`resolver`] or a namespaced collection by
//! [`multi`]. Failures carry ranked "did you mean" corrections from
//! [`suggest`].

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod levenshtein;
pub mod lexer;
pub mod markdown;
pub mod multi;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod suggest;
pub mod token;
pub mod tree;

pub use ast::SelectorAst;
pub use error::Error;
pub use multi::{Document, resolve_multi};
pub use parser::parse;
pub use resolver::{ResolutionError, ResolutionResult, ResolveOptions, resolve_single};
pub use tree::Node;
