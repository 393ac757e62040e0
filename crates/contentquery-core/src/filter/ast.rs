/// Abstract Syntax Tree (AST) node types for selection clauses
///
/// Defines boolean filter expressions and sort order columns.
use std::fmt;

/// Boolean expression for a selection clause
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Column reference
    Column(String),
    /// Literal value
    Literal(Literal),
    /// Positional `?` argument, numbered from zero in left-to-right order
    Placeholder(usize),
    /// Binary operation: column = value, column > value, etc.
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// Logical AND/OR
    LogicalOp {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    /// NOT expression
    Not(Box<Expression>),
    /// Null-safe equality: expr IS [NOT] right
    Is {
        expr: Box<Expression>,
        negated: bool,
        right: Box<Expression>,
    },
    /// [NOT] LIKE pattern matching
    Like {
        expr: Box<Expression>,
        negated: bool,
        pattern: Box<Expression>,
    },
    /// [NOT] IN (value1, value2, ...)
    In {
        expr: Box<Expression>,
        negated: bool,
        values: Vec<Expression>,
    },
}

impl Expression {
    /// Column names referenced anywhere in the expression, in order of
    /// appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expression::Column(name) => out.push(name),
            Expression::Literal(_) | Expression::Placeholder(_) => {}
            Expression::BinaryOp { left, right, .. }
            | Expression::LogicalOp { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expression::Not(expr) => expr.collect_columns(out),
            Expression::Is { expr, right, .. } => {
                expr.collect_columns(out);
                right.collect_columns(out);
            }
            Expression::Like { expr, pattern, .. } => {
                expr.collect_columns(out);
                pattern.collect_columns(out);
            }
            Expression::In { expr, values, .. } => {
                expr.collect_columns(out);
                for value in values {
                    value.collect_columns(out);
                }
            }
        }
    }
}

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Eq, // =
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Literal values in clauses
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// A column in ORDER BY
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByColumn {
    pub column: String,
    pub direction: OrderDirection,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

// Display implementations for debugging and error messages

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(name) => write!(f, "{}", name),
            Expression::Literal(lit) => write!(f, "{}", lit),
            Expression::Placeholder(idx) => write!(f, "?{}", idx + 1),
            Expression::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
            Expression::LogicalOp { left, op, right } => {
                write!(f, "({} {} {})", left, op, right)
            }
            Expression::Not(expr) => write!(f, "NOT ({})", expr),
            Expression::Is {
                expr,
                negated,
                right,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{} IS{} {}", expr, not, right)
            }
            Expression::Like {
                expr,
                negated,
                pattern,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{}{} LIKE {}", expr, not, pattern)
            }
            Expression::In {
                expr,
                negated,
                values,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{}{} IN (", expr, not)?;
                for (i, val) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Eq => write!(f, "="),
            BinaryOperator::Ne => write!(f, "!="),
            BinaryOperator::Lt => write!(f, "<"),
            BinaryOperator::Le => write!(f, "<="),
            BinaryOperator::Gt => write!(f, ">"),
            BinaryOperator::Ge => write!(f, ">="),
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(fl) => write!(f, "{}", fl),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "NULL"),
        }
    }
}

impl fmt::Display for OrderByColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}
