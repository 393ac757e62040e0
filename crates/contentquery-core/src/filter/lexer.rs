/// Lexer for selection clauses and sort orders
///
/// Converts raw clause text into a stream of tokens for parsing.
use std::fmt;

/// Token types produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    And,
    Or,
    Not,
    Like,
    In,
    Is,
    Asc,
    Desc,

    // Operators
    Eq, // =
    Ne, // != or <>
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=

    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,

    // Identifiers
    Identifier(String),

    // Punctuation
    Comma,       // ,
    LeftParen,   // (
    RightParen,  // )
    Placeholder, // ?

    // End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::In => write!(f, "IN"),
            Token::Is => write!(f, "IS"),
            Token::Asc => write!(f, "ASC"),
            Token::Desc => write!(f, "DESC"),
            Token::Eq => write!(f, "="),
            Token::Ne => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::Le => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::Ge => write!(f, ">="),
            Token::Integer(i) => write!(f, "{}", i),
            Token::Float(fl) => write!(f, "{}", fl),
            Token::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Null => write!(f, "NULL"),
            Token::Identifier(id) => write!(f, "{}", id),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Placeholder => write!(f, "?"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Lexer state
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer from input string
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        // Single-character tokens
        match ch {
            ',' => {
                self.advance();
                return Ok(Token::Comma);
            }
            '(' => {
                self.advance();
                return Ok(Token::LeftParen);
            }
            ')' => {
                self.advance();
                return Ok(Token::RightParen);
            }
            '?' => {
                self.advance();
                return Ok(Token::Placeholder);
            }
            '=' => {
                self.advance();
                // `==` is accepted as a synonym
                if self.next_is('=') {
                    self.advance();
                }
                return Ok(Token::Eq);
            }
            '<' => {
                self.advance();
                if self.next_is('=') {
                    self.advance();
                    return Ok(Token::Le);
                }
                if self.next_is('>') {
                    self.advance();
                    return Ok(Token::Ne);
                }
                return Ok(Token::Lt);
            }
            '>' => {
                self.advance();
                if self.next_is('=') {
                    self.advance();
                    return Ok(Token::Ge);
                }
                return Ok(Token::Gt);
            }
            '!' => {
                self.advance();
                if self.next_is('=') {
                    self.advance();
                    return Ok(Token::Ne);
                }
                return Err(LexerError::UnexpectedCharacter(ch));
            }
            '\'' => return self.read_string(),
            '-' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                return self.read_number();
            }
            _ => {}
        }

        // Numbers
        if ch.is_ascii_digit() {
            return self.read_number();
        }

        // Identifiers and keywords
        if ch.is_alphabetic() || ch == '_' {
            return self.read_identifier_or_keyword();
        }

        Err(LexerError::UnexpectedCharacter(ch))
    }

    /// Tokenize entire input into vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn next_is(&self, expected: char) -> bool {
        self.position < self.input.len() && self.current_char() == expected
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let start = self.position;
        let mut has_dot = false;

        if self.current_char() == '-' {
            self.advance();
        }

        while self.position < self.input.len() {
            let ch = self.current_char();
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' && !has_dot && self.peek_char().is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let num_str: String = self.input[start..self.position].iter().collect();

        if has_dot {
            num_str
                .parse::<f64>()
                .map(Token::Float)
                .map_err(|_| LexerError::InvalidNumber(num_str))
        } else {
            num_str
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| LexerError::InvalidNumber(num_str))
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        self.advance(); // skip opening quote
        let mut string = String::new();

        loop {
            if self.position >= self.input.len() {
                return Err(LexerError::UnterminatedString);
            }
            let ch = self.current_char();
            self.advance();
            if ch != '\'' {
                string.push(ch);
                continue;
            }
            // '' is an escaped quote
            if self.next_is('\'') {
                self.advance();
                string.push('\'');
            } else {
                break;
            }
        }

        Ok(Token::String(string))
    }

    fn read_identifier_or_keyword(&mut self) -> Result<Token, LexerError> {
        let start = self.position;

        while self.position < self.input.len() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.position].iter().collect();
        let uppercase = text.to_uppercase();

        let token = match uppercase.as_str() {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            "LIKE" => Token::Like,
            "IN" => Token::In,
            "IS" => Token::Is,
            "ASC" => Token::Asc,
            "DESC" => Token::Desc,
            "TRUE" => Token::Boolean(true),
            "FALSE" => Token::Boolean(false),
            "NULL" => Token::Null,
            _ => Token::Identifier(text),
        };

        Ok(token)
    }
}

/// Lexer errors
#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    UnexpectedCharacter(char),
    InvalidNumber(String),
    UnterminatedString,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::UnexpectedCharacter(ch) => write!(f, "Unexpected character: '{}'", ch),
            LexerError::InvalidNumber(s) => write!(f, "Invalid number: '{}'", s),
            LexerError::UnterminatedString => write!(f, "Unterminated string literal"),
        }
    }
}

impl std::error::Error for LexerError {}
