//! Match expression compiling and evaluation
//!
//! This module turns a small boolean matching language into an immutable
//! expression tree and evaluates that tree against parsed log records.
//!
//! # Syntax
//!
//! ```text
//! field=/value/        Field equals value exactly (case-sensitive)
//! field~/regex/        Regex finds a match anywhere in the field
//! a && b               Both must match
//! a || b               Either must match
//! -a                   Negation, binds tighter than && and ||
//! ( ... )              Grouping
//! ```
//!
//! `&&` binds tighter than `||`; both are left-associative. Inside a
//! `/pattern/`, `\/` stands for a literal slash.
//!
//! # Examples
//!
//! ```text
//! method=/GET/                                  # GET requests
//! code~/^5/ && -url~/^\/health/                 # server errors outside health checks
//! (method=/POST/ || method=/PUT/) && size~/\d{7,}/
//! ```

pub mod error;
pub mod lexer;
pub mod matcher;
pub mod parser;
pub mod pattern;
pub mod token;
pub mod tree;

pub use error::{CompileErrors, ErrorCategory, FilterError};
pub use lexer::Tokenizer;
pub use matcher::{AnomalySink, EvalAnomaly, LogSink, evaluate, evaluate_with};
pub use parser::{MAX_DEPTH, Parser, compile, parse_match_spec};
pub use token::{Token, TokenKind};
pub use tree::{ExpressionNode, FieldRef};
