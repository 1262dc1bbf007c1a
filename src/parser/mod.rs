//! Parser for the declaration language
//!
//! A recursive descent parser that produces a [`Model`] from a token stream.
//!
//! ```text
//! model      := (declaration (NEWLINE | ';'))*
//! declaration:= IDENT type ('=' expr)? ('[[' expr ']]')?
//! type       := type_term (('*' | '/') type_term)*
//! type_term  := ( IDENT | '1' | '(' type ')' ) ('**' '-'? INT)?
//! ```

use crate::ast::*;
use crate::common::{IdGenerator, NodeId, Span};
use crate::diagnostics::{CompileError, SourceFile};
use crate::lexer::{Token, TokenKind};
use miette::Result;

/// Parse a token stream into a model
pub fn parse(tokens: &[Token], source: &str) -> Result<Model> {
    let mut parser = Parser::new(tokens, source);
    parser.parse_model()
}

/// Parse a single expression, which must be the whole input
pub fn parse_expr(tokens: &[Token], source: &str) -> Result<Expr> {
    let mut parser = Parser::new(tokens, source);
    let expr = parser.parse_expr()?;
    parser.skip_terminators();
    parser.expect(TokenKind::Eof)?;
    Ok(expr)
}

/// Parser state
struct Parser<'a> {
    tokens: &'a [Token],
    source: &'a str,
    pos: usize,
    id_gen: IdGenerator,
    /// End offset of the last consumed token
    prev_end: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], source: &'a str) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
            id_gen: IdGenerator::new(),
            prev_end: 0,
        }
    }

    fn next_id(&mut self) -> NodeId {
        self.id_gen.next()
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should have at least EOF")
        })
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> &Token {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        let tok = &self.tokens[self.pos.saturating_sub(1)];
        self.prev_end = tok.span.end;
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.as_str()))
        }
    }

    fn unexpected(&self, expected: &str) -> miette::Report {
        let tok = self.current();
        CompileError::UnexpectedToken {
            expected: expected.to_string(),
            found: tok.kind.to_string(),
            span: tok.span.into(),
            src: SourceFile::new("<input>", self.source).to_named_source(),
        }
        .into()
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end)
    }

    fn skip_terminators(&mut self) {
        while self.at(TokenKind::Newline) || self.at(TokenKind::Semi) {
            self.advance();
        }
    }

    // ==================== DECLARATIONS ====================

    fn parse_model(&mut self) -> Result<Model> {
        let mut declarations = Vec::new();

        self.skip_terminators();
        while !self.at(TokenKind::Eof) {
            declarations.push(self.parse_declaration()?);
            if !self.peek().is_terminator() {
                return Err(self.unexpected("end of declaration"));
            }
            self.skip_terminators();
        }

        Ok(Model { declarations })
    }

    fn parse_declaration(&mut self) -> Result<Declaration> {
        let start = self.current().span.start;
        let name_tok = self.expect(TokenKind::Ident)?;
        let name = name_tok.text.clone();
        let name_span = name_tok.span;

        let ty = self.parse_type()?;

        let init = if self.at(TokenKind::Eq) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };

        let invariant = if self.at(TokenKind::LInvariant) {
            self.advance();
            let expr = self.parse_expr()?;
            self.expect(TokenKind::RInvariant)?;
            Some(expr)
        } else {
            None
        };

        Ok(Declaration {
            id: self.next_id(),
            name,
            name_span,
            ty,
            init,
            invariant,
            span: self.span_from(start),
        })
    }

    // ==================== TYPES ====================

    fn parse_type(&mut self) -> Result<TypeExpr> {
        let start = self.current().span.start;
        let mut left = self.parse_type_term()?;

        loop {
            let is_mul = match self.peek() {
                TokenKind::Star => true,
                TokenKind::Slash => false,
                _ => break,
            };
            self.advance();
            let right = self.parse_type_term()?;
            let span = self.span_from(start);
            left = if is_mul {
                TypeExpr::Mul {
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }
            } else {
                TypeExpr::Div {
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }
            };
        }

        Ok(left)
    }

    fn parse_type_term(&mut self) -> Result<TypeExpr> {
        let start = self.current().span.start;
        let atom = match self.peek() {
            TokenKind::Ident => {
                let tok = self.advance();
                TypeExpr::Named {
                    name: tok.text.clone(),
                    span: tok.span,
                }
            }
            TokenKind::IntLit if self.current().text == "1" => {
                let span = self.advance().span;
                TypeExpr::One { span }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            _ => return Err(self.unexpected("a type")),
        };

        if !self.at(TokenKind::StarStar) {
            return Ok(atom);
        }
        self.advance();
        let negative = if self.at(TokenKind::Minus) {
            self.advance();
            true
        } else {
            false
        };
        let tok = self.expect(TokenKind::IntLit)?;
        let (text, span) = (tok.text.clone(), tok.span);
        let value: i32 = text.parse().map_err(|_| self.invalid_literal(&text, span))?;
        Ok(TypeExpr::Pow {
            base: Box::new(atom),
            exponent: if negative { -value } else { value },
            span: self.span_from(start),
        })
    }

    fn invalid_literal(&self, text: &str, span: Span) -> miette::Report {
        CompileError::InvalidLiteral {
            text: text.to_string(),
            span: span.into(),
            src: SourceFile::new("<input>", self.source).to_named_source(),
        }
        .into()
    }

    // ==================== EXPRESSIONS ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_with_precedence(0)
    }

    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> Result<Expr> {
        let start = self.current().span.start;
        let mut left = self.parse_unary()?;

        // all binary operators here are left-associative; `**` is parsed below
        while let Some((op, prec)) = self.binary_op_info() {
            if prec < min_prec {
                break;
            }

            self.advance();
            let right = self.parse_expr_with_precedence(prec + 1)?;

            left = Expr::Binary {
                id: self.next_id(),
                op,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            };
        }

        Ok(left)
    }

    fn binary_op_info(&self) -> Option<(BinaryOp, u8)> {
        let (op, prec) = match self.peek() {
            TokenKind::Or => (BinaryOp::Or, 1),
            TokenKind::And => (BinaryOp::And, 2),
            TokenKind::EqEq => (BinaryOp::Eq, 4),
            TokenKind::Ne => (BinaryOp::Ne, 4),
            TokenKind::Lt => (BinaryOp::Lt, 4),
            TokenKind::Le => (BinaryOp::Le, 4),
            TokenKind::Gt => (BinaryOp::Gt, 4),
            TokenKind::Ge => (BinaryOp::Ge, 4),
            TokenKind::Plus => (BinaryOp::Add, 5),
            TokenKind::Minus => (BinaryOp::Sub, 5),
            TokenKind::Star => (BinaryOp::Mul, 6),
            TokenKind::Slash => (BinaryOp::Div, 6),
            TokenKind::Percent => (BinaryOp::Rem, 6),
            _ => return None,
        };
        Some((op, prec))
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let start = self.current().span.start;
        let (op, operand) = match self.peek() {
            // `not a > b` negates the comparison
            TokenKind::Not => {
                self.advance();
                (UnaryOp::Not, self.parse_expr_with_precedence(3)?)
            }
            TokenKind::Minus => {
                self.advance();
                (UnaryOp::Neg, self.parse_unary()?)
            }
            TokenKind::Plus => {
                self.advance();
                (UnaryOp::Plus, self.parse_unary()?)
            }
            _ => return self.parse_power(),
        };
        Ok(Expr::Unary {
            id: self.next_id(),
            op,
            operand: Box::new(operand),
            span: self.span_from(start),
        })
    }

    /// `**` binds tighter than unary minus on its left and is right-associative
    fn parse_power(&mut self) -> Result<Expr> {
        let start = self.current().span.start;
        let base = self.parse_primary()?;

        if !self.at(TokenKind::StarStar) {
            return Ok(base);
        }
        self.advance();
        let exponent = self.parse_unary()?;
        Ok(Expr::Pow {
            id: self.next_id(),
            base: Box::new(base),
            exponent: Box::new(exponent),
            span: self.span_from(start),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let start = self.current().span.start;
        match self.peek() {
            // Literals
            TokenKind::IntLit => {
                let tok = self.advance();
                let (text, span) = (tok.text.clone(), tok.span);
                let value: i64 = text.parse().map_err(|_| self.invalid_literal(&text, span))?;
                self.finish_numeric(Literal::Int(value), start)
            }
            TokenKind::FloatLit => {
                let tok = self.advance();
                let (text, span) = (tok.text.clone(), tok.span);
                let value: f64 = text.parse().map_err(|_| self.invalid_literal(&text, span))?;
                self.finish_numeric(Literal::Float(value), start)
            }
            TokenKind::StringLit => {
                let text = self.advance().text.clone();
                // Remove quotes
                let value = text[1..text.len() - 1].to_string();
                Ok(self.literal(Literal::String(value), start))
            }
            TokenKind::True => {
                self.advance();
                Ok(self.literal(Literal::Bool(true), start))
            }
            TokenKind::False => {
                self.advance();
                Ok(self.literal(Literal::Bool(false), start))
            }

            TokenKind::Ident => {
                let name = self.advance().text.clone();
                Ok(Expr::Variable {
                    id: self.next_id(),
                    name,
                    span: self.span_from(start),
                })
            }

            // Grouped expression
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren {
                    id: self.next_id(),
                    inner: Box::new(inner),
                    span: self.span_from(start),
                })
            }

            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Numeric literal with an optional unit name right after it (`10 mV`)
    fn finish_numeric(&mut self, value: Literal, start: usize) -> Result<Expr> {
        let unit = if self.at(TokenKind::Ident) {
            Some(self.advance().text.clone())
        } else {
            None
        };
        Ok(Expr::Literal {
            id: self.next_id(),
            value,
            unit,
            span: self.span_from(start),
        })
    }

    fn literal(&mut self, value: Literal, start: usize) -> Expr {
        Expr::Literal {
            id: self.next_id(),
            value,
            unit: None,
            span: self.span_from(start),
        }
    }
}
