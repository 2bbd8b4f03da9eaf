//! Tolerant JSON lexer (§4.3): a cursor over UTF-8 text, tracking
//! `line`/`column` for diagnostics, emitting one [`Token`] per call to
//! [`Lexer::next_token`].

use bitflags::bitflags;

use crate::error::{Error, Result};

bitflags! {
    /// Decoder tolerance toggles. Default is strict RFC 7159.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct JsonFlags: u8 {
        const ALLOW_COMMENT = 1 << 0;
        const ALLOW_INF = 1 << 1;
        const ALLOW_NAN = 1 << 2;
        const REPORT_ERROR = 1 << 3;
    }
}

impl Default for JsonFlags {
    fn default() -> Self {
        JsonFlags::empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    String(Vec<u8>),
    Integer(i64),
    Real(f64),
    Bool(bool),
    Null,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    flags: JsonFlags,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, flags: JsonFlags) -> Self {
        Self { input, pos: 0, line: 1, column: 1, flags }
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.current_char() {
                Some(c) if c.is_whitespace() => self.advance(),
                Some('#') if self.flags.contains(JsonFlags::ALLOW_COMMENT) => {
                    while !matches!(self.current_char(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.flags.contains(JsonFlags::ALLOW_COMMENT)
                    && self.peek_char(1) == Some('/') =>
                {
                    while !matches!(self.current_char(), None | Some('\n')) {
                        self.advance();
                    }
                }
                Some('/') if self.flags.contains(JsonFlags::ALLOW_COMMENT)
                    && self.peek_char(1) == Some('*') =>
                {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    let mut depth = 1usize;
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('/'), Some('*')) => {
                                self.advance();
                                self.advance();
                                depth += 1;
                            }
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => {
                                return Err(Error::UnexpectedChar { found: '\0', line, column })
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn err_char(&self, found: char) -> Error {
        Error::UnexpectedChar { found, line: self.line, column: self.column }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;
        let (line, column) = (self.line, self.column);
        let c = match self.current_char() {
            Some(c) => c,
            None => return Ok(Token { kind: TokenKind::Eof, line, column }),
        };
        let kind = match c {
            '{' => {
                self.advance();
                TokenKind::LBrace
            }
            '}' => {
                self.advance();
                TokenKind::RBrace
            }
            '[' => {
                self.advance();
                TokenKind::LBracket
            }
            ']' => {
                self.advance();
                TokenKind::RBracket
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            ',' => {
                self.advance();
                TokenKind::Comma
            }
            '"' => return self.read_string(line, column),
            c if c.is_ascii_digit() || c == '-' => return self.read_number(line, column),
            c if c.is_ascii_alphabetic() => return self.read_keyword(line, column),
            c => return Err(self.err_char(c)),
        };
        Ok(Token { kind, line, column })
    }

    fn read_literal(&mut self, word: &str) -> Result<()> {
        for expected in word.chars() {
            match self.current_char() {
                Some(c) if c.eq_ignore_ascii_case(&expected) => self.advance(),
                _ => {
                    return Err(Error::CharacterSequence {
                        expected: literal_name(word),
                        line: self.line,
                        column: self.column,
                    })
                }
            }
        }
        Ok(())
    }

    fn read_keyword(&mut self, line: usize, column: usize) -> Result<Token> {
        let kind = match self.current_char() {
            Some('t') | Some('T') => {
                self.read_literal("true")?;
                TokenKind::Bool(true)
            }
            Some('f') | Some('F') => {
                self.read_literal("false")?;
                TokenKind::Bool(false)
            }
            Some('n') | Some('N') => {
                if self.flags.contains(JsonFlags::ALLOW_NAN)
                    && matches!(self.peek_char(1), Some('a') | Some('A'))
                {
                    self.read_literal("nan")?;
                    TokenKind::Real(f64::NAN)
                } else {
                    self.read_literal("null")?;
                    TokenKind::Null
                }
            }
            Some('i') | Some('I') if self.flags.contains(JsonFlags::ALLOW_INF) => {
                if self.matches_ahead("infinity") {
                    self.read_literal("infinity")?;
                } else {
                    self.read_literal("inf")?;
                }
                TokenKind::Real(f64::INFINITY)
            }
            Some(c) => return Err(self.err_char(c)),
            None => unreachable!("caller checked a char is present"),
        };
        self.reject_trailing_identifier(line, column)?;
        Ok(Token { kind, line, column })
    }

    fn matches_ahead(&self, word: &str) -> bool {
        self.input[self.pos..].chars().zip(word.chars()).filter(|(a, b)| a.eq_ignore_ascii_case(b)).count()
            == word.chars().count()
    }

    fn reject_trailing_identifier(&self, line: usize, column: usize) -> Result<()> {
        match self.current_char() {
            Some(c) if c.is_alphanumeric() || c == '_' => {
                Err(Error::UnexpectedChar { found: c, line, column })
            }
            _ => Ok(()),
        }
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<Token> {
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        loop {
            match self.current_char() {
                None => return Err(Error::StringInfinity { line, column }),
                Some('"') => {
                    self.advance();
                    return Ok(Token { kind: TokenKind::String(bytes), line, column });
                }
                Some('\r') | Some('\n') => {
                    return Err(Error::StringBreakline { line: self.line, column: self.column })
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut bytes)?;
                }
                Some(c) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    self.advance();
                }
            }
        }
    }

    fn read_escape(&mut self, bytes: &mut Vec<u8>) -> Result<()> {
        let (line, column) = (self.line, self.column);
        match self.current_char() {
            Some('n') => {
                bytes.push(b'\n');
                self.advance();
            }
            Some('r') => {
                bytes.push(b'\r');
                self.advance();
            }
            Some('t') => {
                bytes.push(b'\t');
                self.advance();
            }
            Some('f') => {
                bytes.push(0x0C);
                self.advance();
            }
            Some('b') => {
                bytes.push(0x08);
                self.advance();
            }
            Some('\\') => {
                bytes.push(b'\\');
                self.advance();
            }
            Some('/') => {
                bytes.push(b'/');
                self.advance();
            }
            Some('"') => {
                bytes.push(b'"');
                self.advance();
            }
            Some('u') => {
                self.advance();
                let hi = self.read_hex4()?;
                let scalar = if (0xD800..=0xDBFF).contains(&hi) {
                    if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
                        return Err(Error::Utf16 { line, column });
                    }
                    self.advance();
                    self.advance();
                    let lo = self.read_hex4()?;
                    if !(0xDC00..=0xDFFF).contains(&lo) {
                        return Err(Error::Utf16 { line, column });
                    }
                    0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)
                } else if (0xDC00..=0xDFFF).contains(&hi) {
                    return Err(Error::Utf16 { line, column });
                } else {
                    hi
                };
                let ch = char::from_u32(scalar)
                    .ok_or(Error::StringCodepoint { line, column })?;
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            _ => return Err(Error::UnexpectedChar { found: self.current_char().unwrap_or('\0'), line, column }),
        }
        Ok(())
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let (line, column) = (self.line, self.column);
        let mut value = 0u32;
        for _ in 0..4 {
            let c = self.current_char().ok_or(Error::HexValue { line, column })?;
            let digit = c.to_digit(16).ok_or(Error::HexValue { line, column })?;
            value = (value << 4) | digit;
            self.advance();
        }
        Ok(value)
    }

    fn read_number(&mut self, line: usize, column: usize) -> Result<Token> {
        let start = self.pos;
        let mut is_real = false;

        if self.current_char() == Some('-') {
            self.advance();
        }
        match self.current_char() {
            Some('0') => self.advance(),
            Some(c) if c.is_ascii_digit() => {
                while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
            }
            _ => {
                return Err(Error::ConvertNumber {
                    text: self.input[start..self.pos].to_string(),
                    line,
                    column,
                })
            }
        }
        if self.current_char() == Some('.') {
            is_real = true;
            self.advance();
            if !matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                return Err(Error::ConvertNumber { text: self.input[start..self.pos].to_string(), line, column });
            }
            while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.current_char(), Some('e') | Some('E')) {
            is_real = true;
            self.advance();
            if matches!(self.current_char(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                return Err(Error::ConvertNumber { text: self.input[start..self.pos].to_string(), line, column });
            }
            while matches!(self.current_char(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = &self.input[start..self.pos];
        if let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' {
                return Err(Error::UnexpectedChar { found: c, line: self.line, column: self.column });
            }
        }

        if is_real {
            let value = text
                .parse::<f64>()
                .map_err(|_| Error::ConvertNumber { text: text.to_string(), line, column })?;
            Ok(Token { kind: TokenKind::Real(value), line, column })
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(Token { kind: TokenKind::Integer(value), line, column }),
                Err(_) => {
                    let value = text
                        .parse::<f64>()
                        .map_err(|_| Error::ConvertNumber { text: text.to_string(), line, column })?;
                    Ok(Token { kind: TokenKind::Real(value), line, column })
                }
            }
        }
    }
}

fn literal_name(word: &str) -> &'static str {
    match word {
        "true" => "true",
        "false" => "false",
        "null" => "null",
        "nan" => "nan",
        "inf" => "inf",
        "infinity" => "infinity",
        _ => "literal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str, flags: JsonFlags) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src, flags);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            let done = matches!(tok.kind, TokenKind::Eof);
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_basic_object() {
        let kinds = tokens(r#"{"a": 1, "b": true}"#, JsonFlags::empty());
        assert_eq!(
            kinds,
            vec![
                TokenKind::LBrace,
                TokenKind::String(b"a".to_vec()),
                TokenKind::Colon,
                TokenKind::Integer(1),
                TokenKind::Comma,
                TokenKind::String(b"b".to_vec()),
                TokenKind::Colon,
                TokenKind::Bool(true),
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn rejects_leading_zero() {
        let mut lexer = Lexer::new("012", JsonFlags::empty());
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn single_zero_is_valid() {
        let kinds = tokens("0", JsonFlags::empty());
        assert_eq!(kinds, vec![TokenKind::Integer(0), TokenKind::Eof]);
    }

    #[test]
    fn surrogate_pair_decodes_to_supplementary_scalar() {
        let kinds = tokens(r#""😀""#, JsonFlags::empty());
        match &kinds[0] {
            TokenKind::String(bytes) => {
                assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "\u{1F600}");
            }
            other => panic!("expected string token, got {other:?}"),
        }
    }

    #[test]
    fn comments_require_flag() {
        assert!(Lexer::new("// hi\n1", JsonFlags::empty()).next_token().is_err());
        assert!(Lexer::new("// hi\n1", JsonFlags::ALLOW_COMMENT).next_token().is_ok());
    }
}
