/// Filter evaluation
///
/// Binds positional arguments to a parsed clause and evaluates it against
/// stored records using SQL three-valued logic.
use super::ast::*;
use super::parser::Parser;
use crate::error::{Error, Result};
use crate::value::{ContentValues, Value};
use std::cmp::Ordering;

/// A parsed clause with its arguments bound.
#[derive(Debug, Clone)]
pub struct Filter {
    condition: Option<Expression>,
    args: Vec<Value>,
}

impl Filter {
    /// Parse `clause` and bind `args` to its placeholders.
    ///
    /// Text arguments bind as strings (compared with numeric affinity against
    /// numeric columns); `None` binds SQL NULL. The argument count must match
    /// the placeholder count exactly.
    pub fn compile(clause: Option<&str>, args: &[Option<String>]) -> Result<Self> {
        let condition = match clause {
            Some(text) if !text.trim().is_empty() => {
                let mut parser = Parser::new(text)?;
                let expr = parser.parse_condition()?;
                if parser.placeholder_count() != args.len() {
                    return Err(Error::ArgumentCount {
                        expected: parser.placeholder_count(),
                        found: args.len(),
                    });
                }
                Some(expr)
            }
            _ => {
                if !args.is_empty() {
                    return Err(Error::ArgumentCount {
                        expected: 0,
                        found: args.len(),
                    });
                }
                None
            }
        };

        let args = args
            .iter()
            .map(|arg| match arg {
                Some(text) => Value::String(text.clone()),
                None => Value::Null,
            })
            .collect();

        Ok(Self { condition, args })
    }

    /// Columns referenced by the clause.
    pub fn columns(&self) -> Vec<&str> {
        self.condition
            .as_ref()
            .map(Expression::columns)
            .unwrap_or_default()
    }

    /// Returns `true` when the clause evaluates to true for `record`.
    /// NULL (unknown) results do not match.
    pub fn matches(&self, record: &ContentValues) -> bool {
        match &self.condition {
            Some(expr) => self.truth(record, expr) == Some(true),
            None => true,
        }
    }

    fn truth(&self, record: &ContentValues, expr: &Expression) -> Option<bool> {
        match expr {
            Expression::Column(_) | Expression::Literal(_) | Expression::Placeholder(_) => {
                value_truth(&self.value(record, expr))
            }
            Expression::BinaryOp { left, op, right } => {
                let left_val = self.value(record, left);
                let right_val = self.value(record, right);
                let ordering = compare_values(&left_val, &right_val)?;
                Some(match op {
                    BinaryOperator::Eq => ordering == Ordering::Equal,
                    BinaryOperator::Ne => ordering != Ordering::Equal,
                    BinaryOperator::Lt => ordering == Ordering::Less,
                    BinaryOperator::Le => ordering != Ordering::Greater,
                    BinaryOperator::Gt => ordering == Ordering::Greater,
                    BinaryOperator::Ge => ordering != Ordering::Less,
                })
            }
            Expression::LogicalOp { left, op, right } => {
                let left_result = self.truth(record, left);
                let right_result = self.truth(record, right);

                match op {
                    LogicalOperator::And => match (left_result, right_result) {
                        (Some(false), _) | (_, Some(false)) => Some(false),
                        (Some(true), Some(true)) => Some(true),
                        _ => None,
                    },
                    LogicalOperator::Or => match (left_result, right_result) {
                        (Some(true), _) | (_, Some(true)) => Some(true),
                        (Some(false), Some(false)) => Some(false),
                        _ => None,
                    },
                }
            }
            Expression::Not(expr) => self.truth(record, expr).map(|b| !b),
            Expression::Is {
                expr,
                negated,
                right,
            } => {
                let left_val = self.value(record, expr);
                let right_val = self.value(record, right);
                let same = match (left_val.is_null(), right_val.is_null()) {
                    (true, true) => true,
                    (false, false) => {
                        compare_values(&left_val, &right_val) == Some(Ordering::Equal)
                    }
                    _ => false,
                };
                Some(same != *negated)
            }
            Expression::Like {
                expr,
                negated,
                pattern,
            } => {
                let text = self.value(record, expr);
                let pattern = self.value(record, pattern);
                if text.is_null() || pattern.is_null() {
                    return None;
                }
                let matched = like_match(&text.to_arg(), &pattern.to_arg());
                Some(matched != *negated)
            }
            Expression::In {
                expr,
                negated,
                values,
            } => {
                let needle = self.value(record, expr);
                if needle.is_null() {
                    return None;
                }

                let mut saw_null = false;
                for candidate in values {
                    let candidate = self.value(record, candidate);
                    if candidate.is_null() {
                        saw_null = true;
                    } else if compare_values(&needle, &candidate) == Some(Ordering::Equal) {
                        return Some(!*negated);
                    }
                }

                if saw_null {
                    None
                } else {
                    Some(*negated)
                }
            }
        }
    }

    fn value(&self, record: &ContentValues, expr: &Expression) -> Value {
        match expr {
            Expression::Column(name) => record.get(name).cloned().unwrap_or(Value::Null),
            Expression::Literal(lit) => literal_to_value(lit),
            Expression::Placeholder(idx) => self.args.get(*idx).cloned().unwrap_or(Value::Null),
            other => match self.truth(record, other) {
                Some(b) => Value::Boolean(b),
                None => Value::Null,
            },
        }
    }
}

/// Parse a raw sort order such as `name ASC, age DESC`.
pub fn parse_sort_order(text: &str) -> Result<Vec<OrderByColumn>> {
    Ok(Parser::new(text)?.parse_order_by()?)
}

/// Stable sort of `records` by the given columns. NULLs sort first.
pub fn sort_records(records: &mut [&ContentValues], columns: &[OrderByColumn]) {
    records.sort_by(|a, b| {
        for col in columns {
            let a_val = a.get(&col.column).unwrap_or(&Value::Null);
            let b_val = b.get(&col.column).unwrap_or(&Value::Null);

            let ordering = match (a_val.is_null(), b_val.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => compare_values(a_val, b_val).unwrap_or(Ordering::Equal),
            };

            let ordering = match col.direction {
                OrderDirection::Asc => ordering,
                OrderDirection::Desc => ordering.reverse(),
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// SQL `LIKE`: `%` matches any run, `_` any single character, ASCII
/// case-insensitive.
pub fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();

    let (mut ti, mut pi) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < text.len() {
        if pi < pattern.len() && pattern[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < pattern.len() && (pattern[pi] == '_' || pattern[pi] == text[ti]) {
            ti += 1;
            pi += 1;
        } else if let Some((star, mark)) = backtrack {
            backtrack = Some((star, mark + 1));
            pi = star + 1;
            ti = mark + 1;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '%' {
        pi += 1;
    }
    pi == pattern.len()
}

/// Compare two non-null values. Returns `None` if either side is NULL.
///
/// Text that parses as a number compares numerically against numeric
/// values, and booleans compare against text by their `true`/`false` form.
/// Otherwise numbers order before text.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }

    let (a, b) = coerce(a, b);
    match (&a, &b) {
        (Value::Integer(x), Value::Integer(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Some(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
            // numbers before text
            (Some(_), None) => Some(Ordering::Less),
            (None, Some(_)) => Some(Ordering::Greater),
            (None, None) => Some(Ordering::Equal),
        },
    }
}

fn coerce(a: &Value, b: &Value) -> (Value, Value) {
    match (a, b) {
        (Value::String(s), Value::Boolean(flag)) => (
            Value::String(s.to_ascii_lowercase()),
            Value::String(flag.to_string()),
        ),
        (Value::Boolean(flag), Value::String(s)) => (
            Value::String(flag.to_string()),
            Value::String(s.to_ascii_lowercase()),
        ),
        (Value::String(s), other) if other.as_f64().is_some() => {
            (numeric_text(s).unwrap_or_else(|| a.clone()), other.clone())
        }
        (other, Value::String(s)) if other.as_f64().is_some() => {
            (other.clone(), numeric_text(s).unwrap_or_else(|| b.clone()))
        }
        _ => (a.clone(), b.clone()),
    }
}

fn numeric_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::Integer(i));
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::Float)
}

fn value_truth(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Boolean(b) => Some(*b),
        Value::String(s) => Some(numeric_text(s).and_then(|v| v.as_f64()).unwrap_or(0.0) != 0.0),
        other => other.as_f64().map(|f| f != 0.0),
    }
}

fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ContentValues {
        ContentValues::new()
            .with("_id", 7)
            .with("name", "Alice Smith")
            .with("age", 30)
            .with("score", 4.5)
            .with("active", true)
            .with("nickname", Value::Null)
    }

    fn eval(clause: &str, args: &[Option<&str>]) -> bool {
        let args: Vec<Option<String>> = args.iter().map(|a| a.map(str::to_string)).collect();
        Filter::compile(Some(clause), &args)
            .unwrap()
            .matches(&record())
    }

    #[test]
    fn test_numeric_affinity() {
        assert!(eval("age=?", &[Some("30")]));
        assert!(eval("age>?", &[Some("29")]));
        assert!(!eval("age<?", &[Some("30")]));
        assert!(eval("score>=?", &[Some("4.5")]));
        assert!(eval("_id=?", &[Some("7")]));
    }

    #[test]
    fn test_boolean_text() {
        assert!(eval("active=?", &[Some("true")]));
        assert!(!eval("active=?", &[Some("false")]));
    }

    #[test]
    fn test_null_handling() {
        assert!(eval("nickname IS NULL", &[]));
        assert!(!eval("nickname IS NOT NULL", &[]));
        assert!(eval("missing IS NULL", &[]));
        // comparisons against NULL are unknown, and so is their negation
        assert!(!eval("nickname=?", &[Some("x")]));
        assert!(!eval("NOT nickname=?", &[Some("x")]));
        // a bound NULL is a real NULL
        assert!(eval("nickname IS ?", &[None]));
        // the text "null" is not NULL
        assert!(!eval("nickname IS ?", &[Some("null")]));
        assert!(eval("name IS NOT ?", &[Some("null")]));
    }

    #[test]
    fn test_three_valued_logic() {
        assert!(eval("nickname=? OR age=?", &[Some("x"), Some("30")]));
        assert!(!eval("nickname=? AND age=?", &[Some("x"), Some("30")]));
    }

    #[test]
    fn test_like() {
        assert!(eval("name LIKE ?", &[Some("%smith%")]));
        assert!(eval("name LIKE ?", &[Some("A_ice%")]));
        assert!(!eval("name LIKE ?", &[Some("%bob%")]));
        assert!(eval("name NOT LIKE ?", &[Some("%bob%")]));
        assert!(eval("age LIKE ?", &[Some("3%")]));
    }

    #[test]
    fn test_in_lists() {
        assert!(eval("age IN (10,20,30)", &[]));
        assert!(!eval("age NOT IN (10,20,30)", &[]));
        assert!(!eval("age IN ()", &[]));
        assert!(eval("age NOT IN ()", &[]));
        assert!(!eval("age NOT IN (1,NULL)", &[]));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let err = Filter::compile(Some("a=? AND b=?"), &[Some("1".to_string())]).unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentCount {
                expected: 2,
                found: 1
            }
        ));

        let err = Filter::compile(None, &[None]).unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { expected: 0, .. }));
    }

    #[test]
    fn test_columns() {
        let filter = Filter::compile(Some("a=1 AND (b LIKE 'x' OR c IN (1,d))"), &[]).unwrap();
        assert_eq!(filter.columns(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_like_match_edges() {
        assert!(like_match("", "%"));
        assert!(like_match("abc", "%%c"));
        assert!(like_match("100%", "100%"));
        assert!(!like_match("ab", "a"));
        assert!(like_match("mississippi", "%iss%ppi"));
    }

    #[test]
    fn test_sort_records() {
        let a = ContentValues::new().with("n", 2).with("s", "b");
        let b = ContentValues::new().with("n", 1).with("s", "b");
        let c = ContentValues::new().with("s", "a");
        let mut records = vec![&a, &b, &c];

        sort_records(&mut records, &parse_sort_order("s DESC, n").unwrap());
        assert_eq!(records, vec![&b, &a, &c]);
    }
}
