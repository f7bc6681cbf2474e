use super::error::{CompileErrors, FilterError};
use super::lexer::Tokenizer;
use super::pattern::{escape_delimiters, strip_delimiters};
use super::token::{Token, TokenKind};
use super::tree::{ExpressionNode, FieldRef};
use crate::schema::FieldSchema;

// expr    -> term { OR term }
// term    -> factor { AND factor }
// factor  -> '(' expr ')' | NOT factor | boolean
// boolean -> FIELD match-op PATTERN

/// Deepest tree `compile` builds, and deepest nesting of `(` and `-` it
/// follows. Every tree walk is recursive, so this bounds their stack use.
pub const MAX_DEPTH: usize = 256;

/// A parsed subtree and its depth, a lone leaf being 1
type Parsed = (ExpressionNode, usize);

/// Recursive-descent parser with one method per grammar rule.
///
/// Each rule returns `None` when it failed and records why in `errors`; the
/// enclosing rules keep going so one pass reports every independent problem.
/// Exceeding [`MAX_DEPTH`] is the exception: the rest of the input is skipped.
pub struct Parser<'a> {
    lexer: Tokenizer<'a>,
    schema: &'a FieldSchema,
    errors: Vec<FilterError>,
    nesting: usize,
    abandoned: bool,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Tokenizer<'a>, schema: &'a FieldSchema) -> Self {
        Self {
            lexer,
            schema,
            errors: Vec::new(),
            nesting: 0,
            abandoned: false,
        }
    }

    /// Parse the whole input. Yields a tree only if nothing went wrong.
    pub fn parse(mut self) -> Result<ExpressionNode, CompileErrors> {
        let tree = self.expr();
        self.finish();

        let mut errors = self.lexer.take_errors();
        errors.append(&mut self.errors);

        match tree {
            Some((tree, _)) if errors.is_empty() => Ok(tree),
            _ => Err(CompileErrors::new(errors)),
        }
    }

    fn expr(&mut self) -> Option<Parsed> {
        let mut node = self.term();
        while !self.abandoned && self.lexer.peek().is(TokenKind::Or) {
            let op = self.lexer.peek().clone();
            self.lexer.advance();
            let right = self.term();
            node = match (node, right) {
                (Some((left, ld)), Some((right, rd))) => {
                    self.joined(ExpressionNode::or(left, right), ld.max(rd) + 1, op)
                }
                _ => None,
            };
        }
        node
    }

    fn term(&mut self) -> Option<Parsed> {
        let mut node = self.factor();
        while !self.abandoned && self.lexer.peek().is(TokenKind::And) {
            let op = self.lexer.peek().clone();
            self.lexer.advance();
            let right = self.factor();
            node = match (node, right) {
                (Some((left, ld)), Some((right, rd))) => {
                    self.joined(ExpressionNode::and(left, right), ld.max(rd) + 1, op)
                }
                _ => None,
            };
        }
        node
    }

    fn factor(&mut self) -> Option<Parsed> {
        if self.abandoned {
            return None;
        }
        let token = self.lexer.peek().clone();
        match token.kind {
            TokenKind::Not | TokenKind::LeftParen if self.nesting >= MAX_DEPTH => {
                self.abandon(token);
                None
            }
            TokenKind::Not => {
                self.lexer.advance();
                self.nesting += 1;
                let operand = self.factor();
                self.nesting -= 1;
                let (operand, depth) = operand?;
                self.joined(ExpressionNode::not(operand), depth + 1, token)
            }
            TokenKind::Field => self.boolean(),
            TokenKind::LeftParen => {
                self.lexer.advance();
                self.nesting += 1;
                let inner = self.expr();
                self.nesting -= 1;
                if self.abandoned {
                    return None;
                }
                let closing = self.lexer.peek().clone();
                if closing.is(TokenKind::RightParen) {
                    self.lexer.advance();
                    inner
                } else {
                    self.errors.push(FilterError::UnclosedGroup {
                        opened_at: token.offset,
                        found: closing,
                    });
                    None
                }
            }
            _ => {
                self.errors.push(FilterError::UnexpectedToken {
                    expected: "NOT, FIELD or LPAREN",
                    found: token,
                });
                None
            }
        }
    }

    fn boolean(&mut self) -> Option<Parsed> {
        let name = self.lexer.peek().lexeme.clone();
        self.lexer.advance();
        let field = self.resolve_field(&name);

        let op = self.lexer.peek().clone();
        if !op.is(TokenKind::MatchOp) {
            self.errors
                .push(FilterError::MissingMatchOperator { field: name, found: op });
            self.synchronize();
            return None;
        }
        self.lexer.advance();

        let pattern = self.lexer.peek().clone();
        if !pattern.is(TokenKind::Pattern) {
            self.errors
                .push(FilterError::MissingPattern { field: name, found: pattern });
            self.synchronize();
            return None;
        }
        self.lexer.advance();

        let field = field?;
        let text = strip_delimiters(&pattern.lexeme);
        if op.lexeme == "=" {
            return Some((ExpressionNode::exact(field, text), 1));
        }
        match ExpressionNode::regex(field, text) {
            Ok(node) => Some((node, 1)),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    fn resolve_field(&mut self, name: &str) -> Option<FieldRef> {
        match self.schema.index_of(name) {
            Some(index) => Some(FieldRef::new(index, name)),
            None => {
                self.errors.push(FilterError::UnknownField(name.to_string()));
                None
            }
        }
    }

    fn joined(&mut self, node: ExpressionNode, depth: usize, at: Token) -> Option<Parsed> {
        if depth > MAX_DEPTH {
            self.abandon(at);
            return None;
        }
        Some((node, depth))
    }

    /// Skip the rest of a broken comparison: up to the next `&&`, `||` or
    /// unmatched `)` at the same nesting level.
    fn synchronize(&mut self) {
        let mut open = 0usize;
        loop {
            let kind = self.lexer.peek().kind;
            match kind {
                TokenKind::EndOfInput | TokenKind::EndOfLine => return,
                TokenKind::And | TokenKind::Or | TokenKind::RightParen if open == 0 => return,
                TokenKind::LeftParen => open += 1,
                TokenKind::RightParen => open -= 1,
                _ => {}
            }
            self.lexer.advance();
        }
    }

    /// Report excessive nesting and drop the remaining input
    fn abandon(&mut self, found: Token) {
        self.errors.push(FilterError::NestingTooDeep {
            limit: MAX_DEPTH,
            found,
        });
        self.abandoned = true;
        while !self.lexer.peek().is(TokenKind::EndOfInput) {
            self.lexer.advance();
        }
    }

    /// Allow trailing newlines, then require the end of input.
    fn finish(&mut self) {
        while self.lexer.peek().is(TokenKind::EndOfLine) {
            self.lexer.advance();
        }
        let token: &Token = self.lexer.peek();
        // a leftover token after a failed rule was already reported there
        if !token.is(TokenKind::EndOfInput) && self.errors.is_empty() {
            let found = token.clone();
            self.errors.push(FilterError::TrailingInput { found });
        }
    }
}

/// Compile a boolean match expression against `schema`
pub fn compile(expression: &str, schema: &FieldSchema) -> Result<ExpressionNode, CompileErrors> {
    let tree = Parser::new(Tokenizer::new(expression), schema).parse()?;
    log::debug!("compiled match expression: {tree}");
    Ok(tree)
}

/// Parse a single comparison of the form `field=value` or `field~regex`.
///
/// Slashes around the value are optional here.
pub fn parse_match_spec(spec: &str, schema: &FieldSchema) -> Result<ExpressionNode, FilterError> {
    let (name, value, exact) = if spec.matches('=').count() == 1 {
        let (name, value) = spec.split_once('=').unwrap_or((spec, ""));
        (name, value, true)
    } else if spec.matches('~').count() == 1 {
        let (name, value) = spec.split_once('~').unwrap_or((spec, ""));
        (name, value, false)
    } else {
        return Err(FilterError::InvalidMatchSpec(spec.to_string()));
    };

    let name = name.trim();
    let index = schema
        .index_of(name)
        .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
    let field = FieldRef::new(index, name);
    let value = value.trim_start_matches('/').trim_end_matches('/');

    if exact {
        Ok(ExpressionNode::exact(field, value))
    } else {
        ExpressionNode::regex(field, escape_delimiters(value))
    }
}
