//! Front end of the pylite scripting language: scanner, syntax tree and
//! recursive-descent parser.

pub mod ast;
pub mod lexer;
pub mod parser;
