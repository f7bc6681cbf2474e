use super::token::Token;
use std::fmt;
use thiserror::Error;

/// Errors that can occur when compiling filter expressions
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("incomplete operator {lexeme:?} at offset {offset}, expected \"&&\" or \"||\"")]
    IncompleteOperator { lexeme: String, offset: usize },

    #[error("unterminated pattern starting at offset {offset}")]
    UnterminatedPattern { offset: usize },

    #[error("wanted {expected}, got {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: Token,
    },

    #[error("group opened at offset {opened_at} is not closed: wanted RPAREN, got {found}")]
    UnclosedGroup { opened_at: usize, found: Token },

    #[error("field '{field}' must be followed by '=' or '~', got {found}")]
    MissingMatchOperator { field: String, found: Token },

    #[error("match on field '{field}' is missing its /pattern/, got {found}")]
    MissingPattern { field: String, found: Token },

    #[error("unexpected trailing input: {found}")]
    TrailingInput { found: Token },

    #[error("expression nests deeper than {limit} levels at {found}")]
    NestingTooDeep { limit: usize, found: Token },

    #[error("no field named '{0}' available for matching")]
    UnknownField(String),

    #[error("invalid regular expression /{pattern}/ for field '{field}': {source}")]
    InvalidRegex {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid match '{0}', expected field=value or field~regex")]
    InvalidMatchSpec(String),
}

/// Broad classification of a [`FilterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
}

impl FilterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FilterError::UnexpectedCharacter { .. }
            | FilterError::IncompleteOperator { .. }
            | FilterError::UnterminatedPattern { .. } => ErrorCategory::Lexical,
            FilterError::UnexpectedToken { .. }
            | FilterError::UnclosedGroup { .. }
            | FilterError::MissingMatchOperator { .. }
            | FilterError::MissingPattern { .. }
            | FilterError::TrailingInput { .. }
            | FilterError::NestingTooDeep { .. }
            | FilterError::InvalidMatchSpec(_) => ErrorCategory::Syntax,
            FilterError::UnknownField(_) | FilterError::InvalidRegex { .. } => {
                ErrorCategory::Semantic
            }
        }
    }
}

/// Every problem found while compiling one expression.
///
/// Never empty: a compilation that produced no errors produced a tree.
#[derive(Debug, Error)]
pub struct CompileErrors {
    errors: Vec<FilterError>,
}

impl CompileErrors {
    pub(crate) fn new(errors: Vec<FilterError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub fn errors(&self) -> &[FilterError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterError> {
        self.errors.iter()
    }

    pub fn first(&self) -> &FilterError {
        &self.errors[0]
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl From<FilterError> for CompileErrors {
    fn from(error: FilterError) -> Self {
        Self::new(vec![error])
    }
}

impl IntoIterator for CompileErrors {
    type Item = FilterError;
    type IntoIter = std::vec::IntoIter<FilterError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a CompileErrors {
    type Item = &'a FilterError;
    type IntoIter = std::slice::Iter<'a, FilterError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
