/// Parser for selection clauses and sort orders
///
/// Converts a stream of tokens into an Abstract Syntax Tree (AST).
use super::ast::*;
use super::lexer::{Lexer, LexerError, Token};
use std::fmt;

/// Maximum nesting of parentheses and `NOT` prefixes in one clause.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parser for selection clauses
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    placeholders: usize,
    depth: usize,
}

impl Parser {
    /// Create a new parser from clause text
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let tokens = lexer.tokenize().map_err(ParseError::LexerError)?;
        Ok(Self {
            tokens,
            position: 0,
            placeholders: 0,
            depth: 0,
        })
    }

    /// Parse a complete boolean clause, e.g. `a=? AND b IN (1,2)`
    pub fn parse_condition(&mut self) -> Result<Expression, ParseError> {
        if self.current_token() == &Token::Eof {
            return Err(ParseError::EmptyInput);
        }
        let expr = self.parse_expression()?;
        self.expect_token(Token::Eof)?;
        Ok(expr)
    }

    /// Parse a sort order such as `name ASC, age DESC`
    pub fn parse_order_by(&mut self) -> Result<Vec<OrderByColumn>, ParseError> {
        if self.current_token() == &Token::Eof {
            return Err(ParseError::EmptyInput);
        }

        let mut columns = Vec::new();

        loop {
            let column = if let Token::Identifier(name) = self.current_token().clone() {
                self.advance();
                name
            } else {
                return Err(ParseError::UnexpectedToken {
                    expected: "column name".to_string(),
                    found: self.current_token().clone(),
                });
            };

            let direction = if self.current_token() == &Token::Desc {
                self.advance();
                OrderDirection::Desc
            } else {
                if self.current_token() == &Token::Asc {
                    self.advance();
                }
                OrderDirection::Asc
            };

            columns.push(OrderByColumn { column, direction });

            if self.current_token() == &Token::Comma {
                self.advance();
            } else {
                break;
            }
        }

        self.expect_token(Token::Eof)?;
        Ok(columns)
    }

    /// Number of `?` placeholders consumed so far
    pub fn placeholder_count(&self) -> usize {
        self.placeholders
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.current_token() == &Token::Or {
            self.advance();
            let right = self.parse_logical_and()?;
            left = Expression::LogicalOp {
                left: Box::new(left),
                op: LogicalOperator::Or,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_not()?;

        while self.current_token() == &Token::And {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::LogicalOp {
                left: Box::new(left),
                op: LogicalOperator::And,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expression, ParseError> {
        if self.current_token() == &Token::Not {
            self.advance();
            self.enter()?;
            let expr = self.parse_not()?;
            self.depth -= 1;
            return Ok(Expression::Not(Box::new(expr)));
        }

        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let left = self.parse_primary()?;

        // Handle IS [NOT]
        if self.current_token() == &Token::Is {
            self.advance();
            let negated = self.consume(&Token::Not);
            let right = self.parse_primary()?;
            return Ok(Expression::Is {
                expr: Box::new(left),
                negated,
                right: Box::new(right),
            });
        }

        // NOT only continues a comparison when followed by LIKE or IN
        let negated = self.current_token() == &Token::Not
            && matches!(self.peek_token(), Token::Like | Token::In);
        if negated {
            self.advance();
        }

        // Handle LIKE
        if self.current_token() == &Token::Like {
            self.advance();
            let pattern = self.parse_primary()?;
            return Ok(Expression::Like {
                expr: Box::new(left),
                negated,
                pattern: Box::new(pattern),
            });
        }

        // Handle IN
        if self.current_token() == &Token::In {
            self.advance();
            self.expect_token(Token::LeftParen)?;

            let mut values = Vec::new();
            if self.current_token() != &Token::RightParen {
                loop {
                    values.push(self.parse_primary()?);

                    if self.current_token() == &Token::Comma {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }

            self.expect_token(Token::RightParen)?;

            return Ok(Expression::In {
                expr: Box::new(left),
                negated,
                values,
            });
        }

        // Handle comparison operators
        let op = match self.current_token() {
            Token::Eq => BinaryOperator::Eq,
            Token::Ne => BinaryOperator::Ne,
            Token::Lt => BinaryOperator::Lt,
            Token::Le => BinaryOperator::Le,
            Token::Gt => BinaryOperator::Gt,
            Token::Ge => BinaryOperator::Ge,
            _ => return Ok(left),
        };

        self.advance();
        let right = self.parse_primary()?;

        Ok(Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.current_token().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Expression::Column(name))
            }
            Token::Placeholder => {
                self.advance();
                let index = self.placeholders;
                self.placeholders += 1;
                Ok(Expression::Placeholder(index))
            }
            Token::Integer(i) => {
                self.advance();
                Ok(Expression::Literal(Literal::Integer(i)))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expression::Literal(Literal::Float(f)))
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::String(s)))
            }
            Token::Boolean(b) => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(b)))
            }
            Token::Null => {
                self.advance();
                Ok(Expression::Literal(Literal::Null))
            }
            Token::LeftParen => {
                self.advance();
                self.enter()?;
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                self.depth -= 1;
                Ok(expr)
            }
            token => Err(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                found: token,
            }),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> &Token {
        self.tokens
            .get(self.position + 1)
            .unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.current_token() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_token(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current_token() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{}", expected),
                found: self.current_token().clone(),
            })
        }
    }
}

/// Parser errors
#[derive(Debug, Clone)]
pub enum ParseError {
    LexerError(LexerError),
    UnexpectedToken { expected: String, found: Token },
    EmptyInput,
    TooDeep { limit: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LexerError(e) => write!(f, "Lexer error: {}", e),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "Expected {}, found {}", expected, found)
            }
            ParseError::EmptyInput => write!(f, "Input is empty"),
            ParseError::TooDeep { limit } => {
                write!(f, "Expression nested deeper than {} levels", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expression {
        Parser::new(input).unwrap().parse_condition().unwrap()
    }

    #[test]
    fn test_simple_comparison() {
        let expr = parse("age > 18");
        assert_eq!(
            expr,
            Expression::BinaryOp {
                left: Box::new(Expression::Column("age".to_string())),
                op: BinaryOperator::Gt,
                right: Box::new(Expression::Literal(Literal::Integer(18))),
            }
        );
    }

    #[test]
    fn test_placeholders_are_numbered() {
        let mut parser = Parser::new("a=? AND (b LIKE ? OR c LIKE ?)").unwrap();
        let expr = parser.parse_condition().unwrap();

        assert_eq!(parser.placeholder_count(), 3);
        assert_eq!(expr.to_string(), "((a = ?1) AND (b LIKE ?2 OR c LIKE ?3))");
    }

    #[test]
    fn test_is_not_null() {
        let expr = parse("a IS NOT NULL");
        assert!(matches!(expr, Expression::Is { negated: true, .. }));
    }

    #[test]
    fn test_not_in_and_not_like() {
        assert!(matches!(
            parse("c NOT IN (1,2,3)"),
            Expression::In { negated: true, ref values, .. } if values.len() == 3
        ));
        assert!(matches!(
            parse("c NOT LIKE '%x%'"),
            Expression::Like { negated: true, .. }
        ));
        assert!(matches!(parse("NOT c = 1"), Expression::Not(_)));
    }

    #[test]
    fn test_empty_in_list() {
        assert!(matches!(
            parse("c IN ()"),
            Expression::In { ref values, .. } if values.is_empty()
        ));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("a=1 OR b=2 AND c=3");
        assert!(matches!(
            expr,
            Expression::LogicalOp {
                op: LogicalOperator::Or,
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let err = Parser::new("a=1 b=2").unwrap().parse_condition();
        assert!(matches!(err, Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_order_by_list() {
        let columns = Parser::new("name, age DESC, city asc")
            .unwrap()
            .parse_order_by()
            .unwrap();

        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].direction, OrderDirection::Asc);
        assert_eq!(columns[1].column, "age");
        assert_eq!(columns[1].direction, OrderDirection::Desc);
        assert_eq!(columns[2].direction, OrderDirection::Asc);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            Parser::new("   ").unwrap().parse_condition(),
            Err(ParseError::EmptyInput)
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| {
            format!("{}a=1{}", "(".repeat(depth), ")".repeat(depth))
        };

        assert!(Parser::new(&nested(MAX_NESTING_DEPTH))
            .unwrap()
            .parse_condition()
            .is_ok());
        assert!(matches!(
            Parser::new(&nested(1000)).unwrap().parse_condition(),
            Err(ParseError::TooDeep { limit: MAX_NESTING_DEPTH })
        ));

        let negations = format!("{}a=1", "NOT ".repeat(1000));
        assert!(matches!(
            Parser::new(&negations).unwrap().parse_condition(),
            Err(ParseError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_expression_display() {
        assert_eq!(parse("a IS NOT NULL").to_string(), "a IS NOT NULL");
        assert_eq!(parse("b NOT LIKE ?").to_string(), "b NOT LIKE ?1");
        assert_eq!(parse("c IN (1, 'x')").to_string(), "c IN (1, 'x')");
        assert_eq!(parse("NOT d = 2").to_string(), "NOT ((d = 2))");
    }
}
