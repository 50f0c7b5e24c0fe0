//! A small offset-preserving JSON reader.
//!
//! Language front ends bring their own parsers and feed the core through
//! [`TreeBuilder`]; this reader exists so that tests, examples and the CLI
//! can build documents from plain JSON text. It is strict: no comments, no
//! trailing commas, no recovery.
use crate::ast::{Document, NodeId, TreeBuilder};
use std::error::Error;
use std::fmt;

// far above what fixtures need, far below the thread stack
const MAX_NESTING: u32 = 128;

/// Failure to read a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Byte offset the reader stopped at.
    pub offset: u32,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl Error for ParseError {}

/// Read `text` into a [`Document`] whose nodes carry accurate offsets.
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let mut parser = Parser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        builder: TreeBuilder::new(),
    };
    parser.skip_whitespace();
    let root = parser.value(0)?;
    parser.skip_whitespace();
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("Unexpected trailing characters"));
    }
    Ok(parser.builder.build(root))
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    builder: TreeBuilder,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            offset: self.pos as u32,
            message: message.into(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("Expected `{}`", byte as char)))
        }
    }

    fn value(&mut self, nesting: u32) -> Result<NodeId, ParseError> {
        if nesting >= MAX_NESTING {
            return Err(self.error("Too deeply nested"));
        }
        match self.peek() {
            Some(b'{') => self.object(nesting),
            Some(b'[') => self.array(nesting),
            Some(b'"') => {
                let (offset, length, value) = self.string()?;
                Ok(self.builder.string(offset, length, value))
            }
            Some(b't') => {
                let offset = self.literal("true")?;
                Ok(self.builder.boolean(offset, 4, true))
            }
            Some(b'f') => {
                let offset = self.literal("false")?;
                Ok(self.builder.boolean(offset, 5, false))
            }
            Some(b'n') => {
                let offset = self.literal("null")?;
                Ok(self.builder.null(offset, 4))
            }
            Some(c) if c == b'-' || c.is_ascii_digit() => self.number(),
            Some(c) => Err(self.error(format!("Unexpected character `{}`", c as char))),
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn literal(&mut self, keyword: &str) -> Result<u32, ParseError> {
        let start = self.pos;
        if self.text[self.pos..].starts_with(keyword) {
            self.pos += keyword.len();
            Ok(start as u32)
        } else {
            Err(self.error(format!("Expected `{}`", keyword)))
        }
    }

    fn number(&mut self) -> Result<NodeId, ParseError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.digits()?;
        // the lexical form decides `is_integer`
        let mut is_integer = true;
        if self.peek() == Some(b'.') {
            is_integer = false;
            self.pos += 1;
            self.digits()?;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_integer = false;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.digits()?;
        }
        let literal = &self.text[start..self.pos];
        let value = literal.parse::<f64>().map_err(|_| ParseError {
            offset: start as u32,
            message: format!("Invalid number `{}`", literal),
        })?;
        Ok(self
            .builder
            .number(start as u32, (self.pos - start) as u32, value, is_integer))
    }

    fn digits(&mut self) -> Result<(), ParseError> {
        let mut any = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
            any = true;
        }
        if any {
            Ok(())
        } else {
            Err(self.error("Expected a digit"))
        }
    }

    /// Returns the span (including the quotes) and the decoded value.
    fn string(&mut self) -> Result<(u32, u32, String), ParseError> {
        let start = self.pos;
        self.expect(b'"')?;
        let mut decoded = String::new();
        let mut run_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error("Unterminated string")),
                Some(b'"') => {
                    decoded.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    return Ok((start as u32, (self.pos - start) as u32, decoded));
                }
                Some(b'\\') => {
                    decoded.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    self.escape(&mut decoded)?;
                    run_start = self.pos;
                }
                Some(c) if c < 0x20 => return Err(self.error("Unescaped control character")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn escape(&mut self, decoded: &mut String) -> Result<(), ParseError> {
        let escape = match self.peek() {
            Some(escape) => escape,
            None => return Err(self.error("Unterminated escape")),
        };
        self.pos += 1;
        match escape {
            b'"' => decoded.push('"'),
            b'\\' => decoded.push('\\'),
            b'/' => decoded.push('/'),
            b'b' => decoded.push('\u{0008}'),
            b'f' => decoded.push('\u{000c}'),
            b'n' => decoded.push('\n'),
            b'r' => decoded.push('\r'),
            b't' => decoded.push('\t'),
            b'u' => {
                let unit = self.hex4()?;
                let ch = if (0xD800..=0xDBFF).contains(&unit) {
                    // high surrogate, a `\uXXXX` low surrogate must follow
                    self.expect(b'\\')?;
                    self.expect(b'u')?;
                    let low = self.hex4()?;
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(self.error("Invalid low surrogate"));
                    }
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(combined)
                } else if (0xDC00..=0xDFFF).contains(&unit) {
                    return Err(self.error("Unexpected low surrogate"));
                } else {
                    char::from_u32(unit)
                };
                match ch {
                    Some(ch) => decoded.push(ch),
                    None => return Err(self.error("Invalid unicode escape")),
                }
            }
            _ => return Err(self.error("Invalid escape sequence")),
        }
        Ok(())
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = self
                .peek()
                .and_then(|c| (c as char).to_digit(16))
                .ok_or_else(|| self.error("Invalid unicode escape"))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        Ok(value)
    }

    fn array(&mut self, nesting: u32) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.expect(b'[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                items.push(self.value(nesting + 1)?);
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b']') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("Expected `,` or `]`")),
                }
            }
        }
        Ok(self
            .builder
            .array(start as u32, (self.pos - start) as u32, items))
    }

    fn object(&mut self, nesting: u32) -> Result<NodeId, ParseError> {
        let start = self.pos;
        self.expect(b'{')?;
        let mut properties = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.pos += 1;
        } else {
            loop {
                self.skip_whitespace();
                let (key_offset, key_length, key) = self.string()?;
                let key_node = self.builder.string(key_offset, key_length, key);
                self.skip_whitespace();
                let colon_offset = self.pos as i32;
                self.expect(b':')?;
                self.skip_whitespace();
                let value = self.value(nesting + 1)?;
                let length = self.builder.end_of(value) - key_offset;
                properties.push(self.builder.property(
                    key_offset,
                    length,
                    key_node,
                    Some(value),
                    colon_offset,
                ));
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b'}') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("Expected `,` or `}`")),
                }
            }
        }
        Ok(self
            .builder
            .object(start as u32, (self.pos - start) as u32, properties))
    }
}
