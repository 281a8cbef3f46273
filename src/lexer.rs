use thiserror::Error;

/// Tokens found between the `((` and `))` of an operator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -10
    /// ```
    Integer(i64),

    /// Floating point literal
    Float(f64),

    /// Quoted string, either `"..."` or `'...'`
    String(String),

    Boolean(bool),

    /// `nil`, `null` or `~`
    Null,

    /// `$NAME`
    EnvVar(String),

    /// Anything else: a reference such as `meta.azs` or `jobs[0].name`
    Word(String),

    /// `||`
    Or,

    Comma,
    LParen,
    RParen,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence '\\{ch}' at position {position}")]
    InvalidEscape { ch: char, position: usize },

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(LexError::InvalidEscape {
                                ch,
                                position: self.position,
                            });
                        }
                        None => return Err(LexError::UnterminatedString(start)),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString(start))
    }

    fn read_bare(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || matches!(ch, ',' | '(' | ')' | '"' | '\'' | '|') {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    fn classify(bare: String) -> Token {
        match bare.as_str() {
            "true" => return Token::Boolean(true),
            "false" => return Token::Boolean(false),
            "nil" | "null" | "~" => return Token::Null,
            _ => {}
        }

        if let Some(name) = bare.strip_prefix('$')
            && name.starts_with(|c: char| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        {
            return Token::EnvVar(name.to_string());
        }

        let numeric = bare
            .strip_prefix('-')
            .unwrap_or(bare.as_str())
            .starts_with(|c: char| c.is_ascii_digit());
        if numeric {
            if let Ok(n) = bare.parse::<i64>() {
                return Token::Integer(n);
            }
            if let Ok(n) = bare.parse::<f64>() {
                return Token::Float(n);
            }
        }

        Token::Word(bare)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.advance();
                    self.advance();
                    Token::Or
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '|',
                        position: self.position,
                    });
                }
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('"') => Token::String(self.read_string('"')?),
            Some('\'') => Token::String(self.read_string('\'')?),
            Some(_) => Self::classify(self.read_bare()),
        };

        Ok(token)
    }
}
