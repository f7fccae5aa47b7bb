//! Tokenizer for the brace/semicolon input files.
//!
//! `//` starts a line comment, whitespace is insignificant, and every word
//! is case-folded. Tokens carry their line for diagnostics.

use crate::{IoResult, ParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    LBrace,
    RBrace,
    Colon,
    Semi,
    Word(String),
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::LBrace => "{".into(),
            Tok::RBrace => "}".into(),
            Tok::Colon => ":".into(),
            Tok::Semi => ";".into(),
            Tok::Word(w) => w.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub tok: Tok,
    pub line: usize,
}

pub fn lex(file: &'static str, text: &str) -> IoResult<Vec<Token>> {
    let mut out = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            line += 1;
                            break;
                        }
                    }
                } else {
                    return Err(ParseError::Unexpected {
                        file,
                        line,
                        found: "/".into(),
                        expected: "a '//' comment",
                    });
                }
            }
            '{' => {
                out.push(Token { tok: Tok::LBrace, line });
                chars.next();
            }
            '}' => {
                out.push(Token { tok: Tok::RBrace, line });
                chars.next();
            }
            ':' => {
                out.push(Token { tok: Tok::Colon, line });
                chars.next();
            }
            ';' => {
                out.push(Token { tok: Tok::Semi, line });
                chars.next();
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '{' | '}' | ':' | ';' | '/') {
                        break;
                    }
                    word.push(c.to_ascii_lowercase());
                    chars.next();
                }
                out.push(Token {
                    tok: Tok::Word(word),
                    line,
                });
            }
        }
    }
    Ok(out)
}

/// Token cursor with the `expect` helpers the file parsers share.
pub struct Cursor {
    file: &'static str,
    toks: Vec<Token>,
    pos: usize,
}

impl Cursor {
    pub fn new(file: &'static str, text: &str) -> IoResult<Self> {
        Ok(Self {
            file,
            toks: lex(file, text)?,
            pos: 0,
        })
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }

    pub fn line(&self) -> usize {
        self.peek().map_or_else(
            || self.toks.last().map_or(1, |t| t.line),
            |t| t.line,
        )
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn unexpected(&self, found: Option<Token>, expected: &'static str) -> ParseError {
        ParseError::Unexpected {
            file: self.file,
            line: found.as_ref().map_or_else(|| self.line(), |t| t.line),
            found: found.map_or_else(|| "end of file".into(), |t| t.tok.describe()),
            expected,
        }
    }

    pub fn expect(&mut self, tok: Tok, expected: &'static str) -> IoResult<()> {
        match self.next() {
            Some(t) if t.tok == tok => Ok(()),
            other => Err(self.unexpected(other, expected)),
        }
    }

    pub fn expect_word(&mut self, expected: &'static str) -> IoResult<(String, usize)> {
        match self.next() {
            Some(Token {
                tok: Tok::Word(w),
                line,
            }) => Ok((w, line)),
            other => Err(self.unexpected(other, expected)),
        }
    }

    /// True (and consumed) when the next token closes the current block.
    pub fn eat_rbrace(&mut self) -> bool {
        if matches!(self.peek(), Some(t) if t.tok == Tok::RBrace) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Parse one `tag: value;` entry.
    pub fn entry(&mut self) -> IoResult<(String, String, usize)> {
        let (tag, line) = self.expect_word("a tag")?;
        self.expect(Tok::Colon, "':'")?;
        let (value, _) = self.expect_word("a value")?;
        self.expect(Tok::Semi, "';'")?;
        Ok((tag, value, line))
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    pub fn expect_end(&mut self) -> IoResult<()> {
        match self.next() {
            None => Ok(()),
            other => Err(self.unexpected(other, "end of file")),
        }
    }
}

/// Parse a numeric value, mapping failures to a located diagnostic.
pub fn number(file: &'static str, line: usize, field: &str, value: &str) -> IoResult<f64> {
    value.parse::<f64>().map_err(|_| ParseError::Malformed {
        file,
        line,
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Parse a positive integer value.
pub fn count(file: &'static str, line: usize, field: &str, value: &str) -> IoResult<usize> {
    value.parse::<usize>().map_err(|_| ParseError::Malformed {
        file,
        line,
        field: field.to_string(),
        value: value.to_string(),
    })
}
