//! Selection expression builder.
//!
//! Accumulates `WHERE`-clause predicates and their positional arguments and
//! renders them, optionally ANDed with a free-text search across several
//! columns.
//!
//! ```rust
//! use contentquery_core::selection::Selection;
//!
//! let rendered = Selection::new()
//!     .where_equals("kind", "note")
//!     .where_greater_than("size", 10)
//!     .set_search_columns(["title", "body"])
//!     .set_search_query(Some("rust"))
//!     .render();
//!
//! assert_eq!(
//!     rendered.clause.as_deref(),
//!     Some("kind=? AND size>? AND (title LIKE ? OR body LIKE ?)")
//! );
//! assert_eq!(rendered.args.len(), 4);
//! ```

use crate::value::Value;

/// Argument text pushed for a null comparison value.
pub const NULL_ARG: &str = "null";

/// Conventional row identifier column.
pub const ID_COLUMN: &str = "_id";

/// A rendered clause together with its bound arguments.
///
/// `clause` is `None` when there is nothing to filter on. `args` holds one
/// entry per `?` placeholder in left-to-right order; `None` entries bind SQL
/// NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSelection {
    /// The boolean expression, without the `WHERE` keyword
    pub clause: Option<String>,
    /// Positional arguments for the clause placeholders
    pub args: Vec<Option<String>>,
}

impl RenderedSelection {
    /// Number of `?` placeholders in the clause.
    pub fn placeholder_count(&self) -> usize {
        self.clause
            .as_deref()
            .map(|c| c.matches('?').count())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparison {
    fn operator(self, null: bool) -> &'static str {
        match (self, null) {
            (Comparison::Eq, true) => " IS ?",
            (Comparison::Ne, true) => " IS NOT ?",
            (Comparison::Eq, false) => "=?",
            (Comparison::Ne, false) => "!=?",
            (Comparison::Gt, _) => ">?",
            (Comparison::Ge, _) => ">=?",
            (Comparison::Lt, _) => "<?",
            (Comparison::Le, _) => "<=?",
        }
    }
}

/// Fluent builder for a parameterized selection clause.
///
/// Predicates are joined with ` AND `; the only `OR` appears inside the
/// generated search expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    clause: String,
    args: Vec<Option<String>>,
    search_columns: Vec<String>,
    search_tokens: Vec<String>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires [`ID_COLUMN`] to equal `id`.
    pub fn where_id(mut self, id: i64) -> Self {
        self.ready();
        self.clause.push_str(ID_COLUMN);
        self.clause.push_str("=?");
        self.args.push(Some(id.to_string()));
        self
    }

    /// `column=?`, or `column IS ?` when `value` is null.
    pub fn where_equals<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.compare(column, Comparison::Eq, value.into())
    }

    /// `column!=?`, or `column IS NOT ?` when `value` is null.
    pub fn where_not_equals<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.compare(column, Comparison::Ne, value.into())
    }

    /// `column>?`
    pub fn where_greater_than<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.compare(column, Comparison::Gt, value.into())
    }

    /// `column>=?`
    pub fn where_greater_or_equal<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.compare(column, Comparison::Ge, value.into())
    }

    /// `column<?`
    pub fn where_less_than<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.compare(column, Comparison::Lt, value.into())
    }

    /// `column<=?`
    pub fn where_less_or_equal<V: Into<Value>>(self, column: &str, value: V) -> Self {
        self.compare(column, Comparison::Le, value.into())
    }

    /// `column IS NULL`
    pub fn where_is_null(mut self, column: &str) -> Self {
        self.ready();
        self.clause.push_str(column);
        self.clause.push_str(" IS NULL");
        self
    }

    /// `column IS NOT NULL`
    pub fn where_is_not_null(mut self, column: &str) -> Self {
        self.ready();
        self.clause.push_str(column);
        self.clause.push_str(" IS NOT NULL");
        self
    }

    /// `column IN (v1,v2,...)`.
    ///
    /// Members are inlined as literal text and are not bound as arguments.
    /// Only pass values that cannot carry SQL, such as numbers or trusted
    /// identifiers.
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inline_set(column, " IN (", values)
    }

    /// `column NOT IN (v1,v2,...)`, inlined like [`Selection::where_in`].
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inline_set(column, " NOT IN (", values)
    }

    /// Appends `fragment` verbatim and binds `args` in order.
    ///
    /// Null arguments bind SQL NULL rather than the `null` text used by the
    /// comparison predicates.
    pub fn add_raw_predicate<I, V>(mut self, fragment: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.ready();
        self.clause.push_str(fragment);
        self.args.extend(args.into_iter().map(|arg| match arg.into() {
            Value::Null => None,
            value => Some(value.to_arg()),
        }));
        self
    }

    /// Replaces the free-text search columns.
    pub fn set_search_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the search tokens with the whitespace-separated words of
    /// `query`. An empty or absent query clears them.
    pub fn set_search_query(mut self, query: Option<&str>) -> Self {
        self.search_tokens = query
            .map(|q| q.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        self
    }

    /// Current free-text search columns.
    pub fn search_columns(&self) -> &[String] {
        &self.search_columns
    }

    /// Current search tokens.
    pub fn search_tokens(&self) -> &[String] {
        &self.search_tokens
    }

    /// Returns `true` when neither predicates nor an applicable search exist.
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty() && !self.has_search()
    }

    /// Renders the clause and its arguments.
    ///
    /// The search expression is one parenthesized `OR` group per token,
    /// the groups joined with ` AND `. Its arguments follow the accumulated
    /// ones: `%token%` once per column, tokens outermost.
    pub fn render(&self) -> RenderedSelection {
        let mut clause = self.clause.clone();
        let mut args = self.args.clone();

        if self.has_search() {
            if !clause.is_empty() {
                clause.push_str(" AND ");
            }

            let group = self
                .search_columns
                .iter()
                .map(|column| format!("{} LIKE ?", column))
                .collect::<Vec<_>>()
                .join(" OR ");
            let groups = vec![format!("({})", group); self.search_tokens.len()];
            clause.push_str(&groups.join(" AND "));

            for token in &self.search_tokens {
                let pattern = format!("%{}%", token);
                args.extend(
                    std::iter::repeat(Some(pattern)).take(self.search_columns.len()),
                );
            }
        }

        RenderedSelection {
            clause: (!clause.is_empty()).then_some(clause),
            args,
        }
    }

    fn has_search(&self) -> bool {
        !self.search_columns.is_empty() && !self.search_tokens.is_empty()
    }

    fn compare(mut self, column: &str, comparison: Comparison, value: Value) -> Self {
        self.ready();
        self.clause.push_str(column);
        self.clause.push_str(comparison.operator(value.is_null()));
        self.args.push(Some(match value {
            Value::Null => NULL_ARG.to_string(),
            value => value.to_arg(),
        }));
        self
    }

    fn inline_set<I, V>(mut self, column: &str, opening: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.ready();
        self.clause.push_str(column);
        self.clause.push_str(opening);
        let members = values
            .into_iter()
            .map(|v| v.into().to_arg())
            .collect::<Vec<_>>()
            .join(",");
        self.clause.push_str(&members);
        self.clause.push(')');
        self
    }

    fn ready(&mut self) {
        if !self.clause.is_empty() {
            self.clause.push_str(" AND ");
        }
    }
}
