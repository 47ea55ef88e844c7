//! Source-text front-end: characters in, prefix [`TokenStream`] out.
//!
//! [`TokenStream`]: crate::solver::TokenStream

mod keywords;
mod lexer;
mod parser;
mod string_literal;

pub use keywords::Keywords;
pub use lexer::Lexer;
pub use parser::{Parser, parse};
pub use string_literal::{UnescapeError, escape_string, unescape_string};
