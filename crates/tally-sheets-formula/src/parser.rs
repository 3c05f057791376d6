//! Formula parser
//!
//! A hand-written scanner and recursive descent parser with standard
//! operator precedence.

use tally_sheets_core::{ParseError, Position};

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};

/// Parse a formula body (the text after the leading `=`) into an AST
pub fn parse_expression(source: &str) -> Result<FormulaExpr, ParseError> {
    let mut parser = FormulaParser::new(source);
    let expr = parser.parse_expression()?;

    // The whole input must be consumed
    match parser.current_token() {
        Token::Eof => Ok(expr),
        Token::Invalid(message) => Err(ParseError::new(message.clone())),
        token => Err(ParseError::new(format!(
            "Unexpected token after expression: {token:?}"
        ))),
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Number literal
    Number(f64),
    /// Cell reference, possibly out of range
    CellRef(Position),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    /// Unscannable input; the message surfaces when the parser reaches it
    Invalid(String),
    Eof,
}

/// Formula parser state
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Option<Token>,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Self {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: None,
        };
        parser.advance_token();
        parser
    }

    // === Token scanning ===

    fn advance_token(&mut self) {
        let token = self.scan_token();
        self.current_token = Some(token);
    }

    fn scan_token(&mut self) -> Token {
        self.skip_whitespace();

        if self.is_at_end() {
            return Token::Eof;
        }

        let c = self.peek_char().unwrap();

        match c {
            '+' => {
                self.advance();
                return Token::Plus;
            }
            '-' => {
                self.advance();
                return Token::Minus;
            }
            '*' => {
                self.advance();
                return Token::Star;
            }
            '/' => {
                self.advance();
                return Token::Slash;
            }
            '(' => {
                self.advance();
                return Token::LeftParen;
            }
            ')' => {
                self.advance();
                return Token::RightParen;
            }
            _ => {}
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() {
            return self.scan_reference();
        }

        self.advance();
        Token::Invalid(format!("Unexpected character '{c}'"))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent marker counts only when digits actually follow it
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let mark = self.pos;
            self.advance();
            if self.peek_char().map_or(false, |c| c == '+' || c == '-') {
                self.advance();
            }
            if self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                self.pos = mark;
            }
        }

        let text = &self.input[start..self.pos];
        match text.parse::<f64>() {
            Ok(number) if number.is_finite() => Token::Number(number),
            _ => Token::Invalid(format!("Number literal out of range: '{text}'")),
        }
    }

    fn scan_reference(&mut self) -> Token {
        let start = self.pos;

        while self.peek_char().map_or(false, |c| c.is_ascii_alphanumeric()) {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        match Position::parse_reference(text) {
            Some(position) => Token::CellRef(position),
            None => Token::Invalid(format!("Invalid cell reference '{text}'")),
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_token(&self) -> &Token {
        self.current_token.as_ref().unwrap_or(&Token::Eof)
    }

    fn consume(&mut self) -> Token {
        let token = self.current_token.take().unwrap_or(Token::Eof);
        self.advance_token();
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.current_token() == expected {
            self.consume();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    // === Expression parsing ===
    // Precedence from lowest to highest: additive, multiplicative, unary,
    // primary.

    fn parse_expression(&mut self) -> Result<FormulaExpr, ParseError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<FormulaExpr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume();
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<FormulaExpr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume();
            let right = self.parse_unary()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<FormulaExpr, ParseError> {
        if matches!(self.current_token(), Token::Minus) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(operand),
            });
        }

        if matches!(self.current_token(), Token::Plus) {
            self.consume();
            let operand = self.parse_unary()?;
            return Ok(FormulaExpr::UnaryOp {
                op: UnaryOperator::Plus,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<FormulaExpr, ParseError> {
        match self.current_token().clone() {
            Token::Number(number) => {
                self.consume();
                Ok(FormulaExpr::Number(number))
            }

            Token::CellRef(position) => {
                self.consume();
                Ok(FormulaExpr::CellRef(position))
            }

            Token::LeftParen => {
                self.consume();
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::Invalid(message) => Err(ParseError::new(message)),

            token => Err(ParseError::new(format!("Unexpected token: {token:?}"))),
        }
    }
}
