//! Hand-written lexer for the Kal language.
//!
//! Tokens are pulled one at a time from an injected byte source. The lexer
//! keeps a single byte of lookahead between calls, so a caller can interleave
//! it with an interactive input stream. Literal payloads are left in the
//! `identifier` / `int_val` / `fp_val` / `str_val` slots of the most recent
//! matching token.

use crate::errors::{self, Phase};

/// A lexical token. Any single byte the lexer does not recognise comes back
/// as `Char`, which is how `(`, `)`, `,` and the operator characters travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Eof,

    // ── keywords ────────────────────────────────────────────────
    Def,
    Extern,
    If,
    Then,
    Else,
    For,
    In,
    Return,
    Var,

    // ── literals (payload in the lexer's slots) ─────────────────
    Identifier,
    IntLit,
    FpLit,
    StrLit,

    // ── structure ───────────────────────────────────────────────
    BlockOpen,
    BlockClose,
    Semi,

    /// Any other ASCII byte, returned verbatim.
    Char(u8),
}

pub struct Lexer<'src> {
    input: Box<dyn Iterator<Item = u8> + 'src>,
    /// One byte of lookahead. A previous call may have read a byte it did
    /// not consume; `None` means the source is exhausted.
    lookahead: Option<u8>,

    /// Filled in for `Token::Identifier`.
    pub identifier: String,
    /// Filled in for `Token::IntLit`.
    pub int_val: i64,
    /// Filled in for `Token::FpLit`.
    pub fp_val: f64,
    /// Filled in for `Token::StrLit`. Raw bytes; `\x` literals arrive decoded.
    pub str_val: Vec<u8>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: impl Iterator<Item = u8> + 'src) -> Self {
        Self {
            input: Box::new(input),
            // Pretend the previous token left a space behind so the first
            // call starts by reading real input.
            lookahead: Some(b' '),
            identifier: String::new(),
            int_val: 0,
            fp_val: 0.0,
            str_val: Vec::new(),
        }
    }

    /// Return the next token from the source.
    pub fn next_token(&mut self) -> Token {
        while matches!(self.lookahead, Some(c) if c.is_ascii_whitespace()) {
            self.bump();
        }

        let Some(c) = self.lookahead else {
            // Don't consume past the end; every later call sees Eof again.
            return Token::Eof;
        };

        if c.is_ascii_alphabetic() || c == b'_' {
            return self.lex_identifier();
        }
        if c.is_ascii_digit() || c == b'.' {
            return self.lex_number();
        }

        match c {
            b'"' => self.lex_string(),
            b'{' => {
                self.bump();
                Token::BlockOpen
            }
            b'}' => {
                self.bump();
                Token::BlockClose
            }
            b';' => {
                self.bump();
                Token::Semi
            }
            b'#' => {
                // Comment until end of line.
                while !matches!(self.lookahead, None | Some(b'\n') | Some(b'\r')) {
                    self.bump();
                }
                self.next_token()
            }
            other => {
                self.bump();
                Token::Char(other)
            }
        }
    }

    fn bump(&mut self) {
        self.lookahead = self.input.next();
    }

    /// identifier: [A-Za-z_][A-Za-z0-9_]*
    fn lex_identifier(&mut self) -> Token {
        self.identifier.clear();
        while let Some(c) = self.lookahead {
            if !(c.is_ascii_alphanumeric() || c == b'_') {
                break;
            }
            self.identifier.push(c as char);
            self.bump();
        }

        match self.identifier.as_str() {
            "def" => Token::Def,
            "extern" => Token::Extern,
            "if" => Token::If,
            "then" => Token::Then,
            "else" => Token::Else,
            "for" => Token::For,
            "in" => Token::In,
            "return" => Token::Return,
            "var" => Token::Var,
            _ => Token::Identifier,
        }
    }

    /// number: [0-9.]+; a run containing a dot is a double, else an integer.
    fn lex_number(&mut self) -> Token {
        let mut text = String::new();
        while let Some(c) = self.lookahead {
            if !(c.is_ascii_digit() || c == b'.') {
                break;
            }
            text.push(c as char);
            self.bump();
        }

        if text.contains('.') {
            self.fp_val = text.parse().unwrap_or_else(|_| {
                errors::error(Phase::Lexer, format!("malformed number literal '{text}'"));
                0.0
            });
            Token::FpLit
        } else {
            self.int_val = text.parse().unwrap_or_else(|_| {
                errors::error(Phase::Lexer, format!("malformed number literal '{text}'"));
                0
            });
            Token::IntLit
        }
    }

    /// string: '"' bytes '"'. Contents starting with `\x` are uppercase-hex
    /// digit pairs and decode to raw bytes; anything else is taken verbatim.
    fn lex_string(&mut self) -> Token {
        self.bump(); // eat the opening '"'
        self.str_val.clear();

        let mut raw = Vec::new();
        loop {
            match self.lookahead {
                None => {
                    errors::error(Phase::Lexer, "unterminated string literal");
                    return Token::StrLit;
                }
                Some(b'"') => {
                    self.bump(); // eat the closing '"'
                    break;
                }
                Some(c) => {
                    raw.push(c);
                    self.bump();
                }
            }
        }

        if raw.starts_with(br"\x") {
            match decode_hex(&raw[2..]) {
                Some(bytes) => self.str_val = bytes,
                None => {
                    errors::error_with_hint(
                        Phase::Lexer,
                        "malformed hex string literal",
                        r#"\x literals need an even number of uppercase hex digits, e.g. "\x4142""#,
                    );
                }
            }
        } else {
            self.str_val = raw;
        }
        Token::StrLit
    }
}

/// Decode pairs of uppercase hex digits. At least one pair is required.
fn decode_hex(digits: &[u8]) -> Option<Vec<u8>> {
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(digits.len() / 2);
    for pair in digits.chunks(2) {
        bytes.push(hex_digit(pair[0])? << 4 | hex_digit(pair[1])?);
    }
    Some(bytes)
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
