//! Recursive-descent JSON parser (§4.3): turns a [`Lexer`] token stream
//! into a [`Value`](crate::value) tree, one item at a time, bounded by the
//! same [`DecodeLimits`](crate::cbor::DecodeLimits) depth guard the CBOR
//! decoder uses.

use crate::arena::{Arena, ValueId};
use crate::cbor::DecodeLimits;
use crate::error::{Error, Result};
use crate::json::lexer::{JsonFlags, Lexer, Token, TokenKind};

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    limits: &'a DecodeLimits,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, flags: JsonFlags, limits: &'a DecodeLimits) -> Self {
        Self { lexer: Lexer::new(input, flags), peeked: None, limits, depth: 0 }
    }

    pub fn offset(&self) -> usize {
        self.lexer.offset()
    }

    fn advance(&mut self) -> Result<Token> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.lexer.next_token(),
        }
    }

    fn peek(&mut self) -> Result<&Token> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        let tok = self.advance()?;
        if std::mem::discriminant(&tok.kind) != std::mem::discriminant(kind) {
            return Err(Error::UnexpectedChar { found: '\0', line: tok.line, column: tok.column });
        }
        Ok(tok)
    }

    pub fn parse_value(&mut self, arena: &mut Arena) -> Result<ValueId> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            self.depth -= 1;
            return Err(Error::DepthExceeded { limit: self.limits.max_depth });
        }
        let result = self.parse_value_inner(arena);
        self.depth -= 1;
        result
    }

    fn parse_value_inner(&mut self, arena: &mut Arena) -> Result<ValueId> {
        let tok = self.advance()?;
        match tok.kind {
            TokenKind::LBrace => self.parse_object(arena),
            TokenKind::LBracket => self.parse_array(arena),
            TokenKind::String(bytes) => Ok(arena.text(bytes)),
            TokenKind::Integer(i) => Ok(arena.integer(i)),
            TokenKind::Real(f) => Ok(arena.real(f)),
            TokenKind::Bool(b) => Ok(arena.boolean(b)),
            TokenKind::Null => Ok(arena.null()),
            TokenKind::Eof => Err(Error::UnexpectedChar { found: '\0', line: tok.line, column: tok.column }),
            TokenKind::RBrace | TokenKind::RBracket | TokenKind::Colon | TokenKind::Comma => {
                Err(Error::UnexpectedChar { found: '\0', line: tok.line, column: tok.column })
            }
        }
    }

    fn parse_object(&mut self, arena: &mut Arena) -> Result<ValueId> {
        let map = arena.map();
        if matches!(self.peek()?.kind, TokenKind::RBrace) {
            self.advance()?;
            return Ok(map);
        }
        loop {
            let key_tok = self.advance()?;
            let key_bytes = match key_tok.kind {
                TokenKind::String(bytes) => bytes,
                _ => {
                    arena.release(map);
                    return Err(Error::UnexpectedChar {
                        found: '\0',
                        line: key_tok.line,
                        column: key_tok.column,
                    });
                }
            };
            if let Err(e) = self.expect(&TokenKind::Colon) {
                arena.release(map);
                return Err(e);
            }
            let value = match self.parse_value(arena) {
                Ok(v) => v,
                Err(e) => {
                    arena.release(map);
                    return Err(e);
                }
            };
            let key = arena.text(key_bytes);
            let pair = arena.pair(key, value).expect("key/value are fresh and free");
            arena.insert_tail(map, pair).expect("fresh map accepts any free pair");

            let tok = match self.advance() {
                Ok(t) => t,
                Err(e) => {
                    arena.release(map);
                    return Err(e);
                }
            };
            match tok.kind {
                TokenKind::Comma => continue,
                TokenKind::RBrace => return Ok(map),
                _ => {
                    arena.release(map);
                    return Err(Error::UnexpectedChar { found: '\0', line: tok.line, column: tok.column });
                }
            }
        }
    }

    fn parse_array(&mut self, arena: &mut Arena) -> Result<ValueId> {
        let array = arena.array();
        if matches!(self.peek()?.kind, TokenKind::RBracket) {
            self.advance()?;
            return Ok(array);
        }
        loop {
            let item = match self.parse_value(arena) {
                Ok(v) => v,
                Err(e) => {
                    arena.release(array);
                    return Err(e);
                }
            };
            arena.insert_tail(array, item).expect("fresh array accepts any free value");

            let tok = match self.advance() {
                Ok(t) => t,
                Err(e) => {
                    arena.release(array);
                    return Err(e);
                }
            };
            match tok.kind {
                TokenKind::Comma => continue,
                TokenKind::RBracket => return Ok(array),
                _ => {
                    arena.release(array);
                    return Err(Error::UnexpectedChar { found: '\0', line: tok.line, column: tok.column });
                }
            }
        }
    }
}
