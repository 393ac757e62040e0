//! Filter engine module
//!
//! Parses rendered selection clauses and sort orders and evaluates them
//! against stored records.

/// Abstract Syntax Tree types
#[allow(missing_docs)]
pub mod ast;
/// Clause evaluation
#[allow(missing_docs)]
pub mod eval;
/// Clause lexer
#[allow(missing_docs)]
pub mod lexer;
/// Clause parser
#[allow(missing_docs)]
pub mod parser;

// Re-export main types
pub use ast::*;
pub use eval::{compare_values, like_match, parse_sort_order, sort_records, Filter};
pub use lexer::{Lexer, LexerError, Token};
pub use parser::{ParseError, Parser};
