//! Law expression lexer — tokenizes the body of a DEFINE/REPLACE/SELECT law.
//!
//! Syntax example:
//! ```text
//! ((a-1)*(a-2))/2 + 1
//! 1 if b<=a else 0
//! math.floor((a+1)/3)
//! 'nested' if a<b else 'separated'
//! ```

use crate::errors::{OplawError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    Str(String),
    Ident(String),

    // Keywords
    If,
    Else,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    StarStar,   // **
    Slash,      // /
    SlashSlash, // //
    Percent,    // %
    Lt,         // <
    Le,         // <=
    Gt,         // >
    Ge,         // >=
    EqEq,       // ==
    Ne,         // !=

    // Punctuation
    LParen,
    RParen,
    Comma,
    Dot,

    Eof,
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        while self.pos < self.input.len() {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }

            let ch = self.input[self.pos];
            match ch {
                '(' => { self.tokens.push(Token::LParen); self.pos += 1; }
                ')' => { self.tokens.push(Token::RParen); self.pos += 1; }
                ',' => { self.tokens.push(Token::Comma); self.pos += 1; }
                '.' if !self.peek_digit() => { self.tokens.push(Token::Dot); self.pos += 1; }
                '+' => { self.tokens.push(Token::Plus); self.pos += 1; }
                '-' => { self.tokens.push(Token::Minus); self.pos += 1; }
                '%' => { self.tokens.push(Token::Percent); self.pos += 1; }
                '*' => {
                    self.pos += 1;
                    if self.peek() == Some('*') {
                        self.pos += 1;
                        self.tokens.push(Token::StarStar);
                    } else {
                        self.tokens.push(Token::Star);
                    }
                }
                '/' => {
                    self.pos += 1;
                    if self.peek() == Some('/') {
                        self.pos += 1;
                        self.tokens.push(Token::SlashSlash);
                    } else {
                        self.tokens.push(Token::Slash);
                    }
                }
                '<' => {
                    self.pos += 1;
                    if self.peek() == Some('=') {
                        self.pos += 1;
                        self.tokens.push(Token::Le);
                    } else {
                        self.tokens.push(Token::Lt);
                    }
                }
                '>' => {
                    self.pos += 1;
                    if self.peek() == Some('=') {
                        self.pos += 1;
                        self.tokens.push(Token::Ge);
                    } else {
                        self.tokens.push(Token::Gt);
                    }
                }
                '=' => {
                    self.pos += 1;
                    if self.peek() == Some('=') {
                        self.pos += 1;
                        self.tokens.push(Token::EqEq);
                    } else {
                        return Err(OplawError::BadDirective(
                            "single '=' is not a law operator (use '==')".into(),
                        ));
                    }
                }
                '!' => {
                    self.pos += 1;
                    if self.peek() == Some('=') {
                        self.pos += 1;
                        self.tokens.push(Token::Ne);
                    } else {
                        return Err(OplawError::BadDirective(
                            "unexpected '!' in law expression".into(),
                        ));
                    }
                }
                '\'' | '"' => self.read_string(ch)?,
                _ if ch.is_ascii_digit() || ch == '.' => self.read_number()?,
                _ if ch.is_ascii_alphabetic() || ch == '_' => self.read_ident(),
                _ => {
                    return Err(OplawError::BadDirective(format!(
                        "unexpected character '{ch}' in law expression"
                    )));
                }
            }
        }
        self.tokens.push(Token::Eof);
        Ok(self.tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_digit(&self) -> bool {
        self.input.get(self.pos + 1).map_or(false, |c| c.is_ascii_digit())
    }

    fn read_string(&mut self, quote: char) -> Result<()> {
        self.pos += 1; // skip opening quote
        let mut s = String::new();
        while self.pos < self.input.len() && self.input[self.pos] != quote {
            s.push(self.input[self.pos]);
            self.pos += 1;
        }
        if self.pos >= self.input.len() {
            return Err(OplawError::BadDirective(
                "unterminated string literal in law expression".into(),
            ));
        }
        self.pos += 1; // skip closing quote
        self.tokens.push(Token::Str(s));
        Ok(())
    }

    fn read_number(&mut self) -> Result<()> {
        let start = self.pos;
        while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos < self.input.len() && self.input[self.pos] == '.' {
            self.pos += 1;
            while self.pos < self.input.len() && self.input[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text: String = self.input[start..self.pos].iter().collect();
        match text.parse::<f64>() {
            Ok(n) => {
                self.tokens.push(Token::Number(n));
                Ok(())
            }
            Err(_) => Err(OplawError::BadDirective(format!(
                "bad numeric literal '{text}' in law expression"
            ))),
        }
    }

    fn read_ident(&mut self) {
        let start = self.pos;
        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_alphanumeric() || self.input[self.pos] == '_')
        {
            self.pos += 1;
        }
        let word: String = self.input[start..self.pos].iter().collect();
        let token = match word.as_str() {
            "if" => Token::If,
            "else" => Token::Else,
            _ => Token::Ident(word),
        };
        self.tokens.push(token);
    }
}
