use super::error::FilterError;
use super::token::{Token, TokenKind};

/// Pull-based scanner over an expression string.
///
/// The parser drives it with [`peek`](Tokenizer::peek) and
/// [`advance`](Tokenizer::advance). At most one token is lexed ahead of the
/// parser: `peek` materializes the current token on first call and keeps
/// returning it until `advance` discards it.
///
/// Lexical problems do not stop scanning. They are recorded, the offending
/// input is skipped, and the parser collects them with
/// [`take_errors`](Tokenizer::take_errors) once it is done.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    current: Option<Token>,
    errors: Vec<FilterError>,
    exhausted: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            current: None,
            errors: Vec::new(),
            exhausted: false,
        }
    }

    /// Current token, without consuming it
    pub fn peek(&mut self) -> &Token {
        let token = match self.current.take() {
            Some(token) => token,
            None => self.scan(),
        };
        self.current.insert(token)
    }

    /// Discard the current token. Must follow a `peek`.
    pub fn advance(&mut self) {
        debug_assert!(self.current.is_some(), "advance() called without peek()");
        self.current = None;
    }

    /// Lexical errors recorded so far
    pub fn take_errors(&mut self) -> Vec<FilterError> {
        std::mem::take(&mut self.errors)
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.current_char() {
            match c {
                ' ' | '\t' | '\r' | '"' | '\'' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn scan(&mut self) -> Token {
        loop {
            self.skip_blanks();
            let start = self.pos;
            let Some(c) = self.current_char() else {
                return Token::new(TokenKind::EndOfInput, "", self.input.len());
            };

            match c {
                '(' => return self.single(TokenKind::LeftParen),
                ')' => return self.single(TokenKind::RightParen),
                '-' => return self.single(TokenKind::Not),
                '=' | '~' => return self.single(TokenKind::MatchOp),
                '\n' => return self.single(TokenKind::EndOfLine),
                '&' | '|' => {
                    if self.next_char() == Some(c) {
                        let kind = if c == '&' {
                            TokenKind::And
                        } else {
                            TokenKind::Or
                        };
                        self.pos += 2;
                        return Token::new(kind, &self.input[start..self.pos], start);
                    }
                    self.pos += 1;
                    self.errors.push(FilterError::IncompleteOperator {
                        lexeme: c.to_string(),
                        offset: start,
                    });
                }
                '/' => return self.pattern(),
                c if c.is_alphabetic() => return self.field(),
                other => {
                    self.pos += other.len_utf8();
                    self.errors.push(FilterError::UnexpectedCharacter {
                        ch: other,
                        offset: start,
                    });
                }
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        // every single-character token is ASCII
        self.pos += 1;
        Token::new(kind, &self.input[start..self.pos], start)
    }

    fn field(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        Token::new(TokenKind::Field, &self.input[start..self.pos], start)
    }

    fn pattern(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;

        let mut escaping = false;
        let mut terminated = false;
        while let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
            if escaping {
                escaping = false;
                continue;
            }
            match c {
                '\\' => escaping = true,
                '/' => {
                    terminated = true;
                    break;
                }
                _ => {}
            }
        }

        if !terminated {
            self.errors
                .push(FilterError::UnterminatedPattern { offset: start });
        }
        Token::new(TokenKind::Pattern, &self.input[start..self.pos], start)
    }
}

/// Yields every token up to and including `EndOfInput`.
impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.peek().clone();
        self.advance();
        if token.is(TokenKind::EndOfInput) {
            self.exhausted = true;
        }
        Some(token)
    }
}
