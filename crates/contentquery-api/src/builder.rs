//! Query facade tying a selection to a projection, a sort order and a gateway.

use std::sync::Arc;
use std::thread::JoinHandle;

use contentquery_core::{ContentValues, Error, RenderedSelection, Result, Row, Selection, Value};
use tracing::{debug, trace};

use crate::gateway::{ContentGateway, Operation};

/// Builds a selection plus projection and sort order, then runs reads,
/// updates and deletes through a [`ContentGateway`].
///
/// # Examples
///
/// ```rust
/// use contentquery::{ContentValues, MemoryProvider, QueryBuilder};
///
/// let provider = MemoryProvider::new();
/// provider.insert("notes", ContentValues::new().with("title", "Groceries").with("done", false))?;
/// provider.insert("notes", ContentValues::new().with("title", "Taxes").with("done", true))?;
///
/// let rows = QueryBuilder::new()
///     .select(["_id", "title"])
///     .where_equals("done", false)
///     .order_by("title")
///     .query(&provider, "notes")?;
///
/// assert_eq!(rows.len(), 1);
/// # Ok::<(), contentquery::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryBuilder {
    selection: Selection,
    projection: Vec<String>,
    sort_order: Option<String>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing selection.
    pub fn from_selection(selection: Selection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Requires the `_id` column to equal `id`.
    pub fn where_id(mut self, id: i64) -> Self {
        self.selection = self.selection.where_id(id);
        self
    }

    /// See [`Selection::where_equals`].
    pub fn where_equals<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.selection = self.selection.where_equals(column, value);
        self
    }

    /// See [`Selection::where_not_equals`].
    pub fn where_not_equals<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.selection = self.selection.where_not_equals(column, value);
        self
    }

    /// See [`Selection::where_greater_than`].
    pub fn where_greater_than<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.selection = self.selection.where_greater_than(column, value);
        self
    }

    /// See [`Selection::where_greater_or_equal`].
    pub fn where_greater_or_equal<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.selection = self.selection.where_greater_or_equal(column, value);
        self
    }

    /// See [`Selection::where_less_than`].
    pub fn where_less_than<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.selection = self.selection.where_less_than(column, value);
        self
    }

    /// See [`Selection::where_less_or_equal`].
    pub fn where_less_or_equal<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.selection = self.selection.where_less_or_equal(column, value);
        self
    }

    /// `column IS NULL`
    pub fn where_is_null(mut self, column: &str) -> Self {
        self.selection = self.selection.where_is_null(column);
        self
    }

    /// `column IS NOT NULL`
    pub fn where_is_not_null(mut self, column: &str) -> Self {
        self.selection = self.selection.where_is_not_null(column);
        self
    }

    /// See [`Selection::where_in`]. Members are inlined, not bound.
    pub fn where_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.selection = self.selection.where_in(column, values);
        self
    }

    /// See [`Selection::where_not_in`]. Members are inlined, not bound.
    pub fn where_not_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.selection = self.selection.where_not_in(column, values);
        self
    }

    /// See [`Selection::add_raw_predicate`].
    pub fn add_raw_predicate<I, V>(mut self, fragment: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.selection = self.selection.add_raw_predicate(fragment, args);
        self
    }

    /// Replaces the free-text search columns.
    pub fn set_search_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = self.selection.set_search_columns(columns);
        self
    }

    /// Replaces the search query. Each whitespace-separated token must
    /// occur in at least one search column for a row to match.
    pub fn set_search_query(mut self, query: Option<&str>) -> Self {
        self.selection = self.selection.set_search_query(query);
        self
    }

    /// Replaces the projection. Reads fail with
    /// [`Error::MissingProjection`] until at least one column is selected.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the sort order. The text is passed through verbatim as
    /// what follows `ORDER BY`.
    pub fn order_by(mut self, sort_order: &str) -> Self {
        self.sort_order = Some(sort_order.to_string());
        self
    }

    /// The accumulated selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The current projection.
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    /// The current sort order.
    pub fn sort_order(&self) -> Option<&str> {
        self.sort_order.as_deref()
    }

    /// Renders the selection clause and its arguments.
    pub fn build_selection(&self) -> RenderedSelection {
        self.selection.render()
    }

    /// Captures a validated, re-runnable read against `uri`.
    pub fn prepare(&self, uri: &str) -> Result<PreparedQuery> {
        self.validate_for_query()?;
        Ok(PreparedQuery {
            uri: uri.to_string(),
            projection: self.projection.clone(),
            selection: self.build_selection(),
            sort_order: self.sort_order.clone(),
        })
    }

    /// Runs the read against `uri` through `gateway`.
    pub fn query<G: ContentGateway + ?Sized>(&self, gateway: &G, uri: &str) -> Result<Vec<Row>> {
        self.prepare(uri)?.run(gateway)
    }

    /// Runs the read on a worker thread and hands the result to `callback`.
    ///
    /// The projection is checked before the thread is spawned, so a
    /// missing projection is reported here and the callback never runs.
    pub fn query_async<G, F>(&self, gateway: Arc<G>, uri: &str, callback: F) -> Result<JoinHandle<()>>
    where
        G: ContentGateway + Send + Sync + 'static,
        F: FnOnce(Result<Vec<Row>>) + Send + 'static,
    {
        let prepared = self.prepare(uri)?;
        let handle = std::thread::Builder::new()
            .name("contentquery-query".to_string())
            .spawn(move || {
                let result = prepared.run(gateway.as_ref());
                trace!(ok = result.is_ok(), "async query completed");
                callback(result);
            })?;
        Ok(handle)
    }

    /// Wraps this builder in a [`SearchFilter`] bound to `uri`.
    pub fn search_filter(self, uri: &str) -> SearchFilter {
        SearchFilter {
            builder: self,
            uri: uri.to_string(),
        }
    }

    /// Updates every matching row of `uri` with `values`.
    pub fn update<G: ContentGateway + ?Sized>(
        &self,
        gateway: &G,
        uri: &str,
        values: &ContentValues,
    ) -> Result<usize> {
        let selection = self.build_selection();
        debug!(uri, clause = ?selection.clause, args = selection.args.len(), "update");
        gateway.update(uri, values, &selection)
    }

    /// Deletes every matching row of `uri`.
    pub fn delete<G: ContentGateway + ?Sized>(&self, gateway: &G, uri: &str) -> Result<usize> {
        let selection = self.build_selection();
        debug!(uri, clause = ?selection.clause, args = selection.args.len(), "delete");
        gateway.delete(uri, &selection)
    }

    /// An update of the matching rows, for [`ContentGateway::apply_batch`].
    pub fn update_operation(&self, uri: &str, values: ContentValues) -> Operation {
        Operation::Update {
            uri: uri.to_string(),
            values,
            selection: self.build_selection(),
        }
    }

    /// A delete of the matching rows, for [`ContentGateway::apply_batch`].
    pub fn delete_operation(&self, uri: &str) -> Operation {
        Operation::Delete {
            uri: uri.to_string(),
            selection: self.build_selection(),
        }
    }

    fn validate_for_query(&self) -> Result<()> {
        if self.projection.is_empty() {
            return Err(Error::MissingProjection);
        }
        Ok(())
    }
}

/// A validated read: resource, projection, rendered selection and sort
/// order, ready to run against any gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    uri: String,
    projection: Vec<String>,
    selection: RenderedSelection,
    sort_order: Option<String>,
}

impl PreparedQuery {
    /// Target resource.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Columns returned.
    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    /// Rendered clause and arguments.
    pub fn selection(&self) -> &RenderedSelection {
        &self.selection
    }

    /// Raw sort order.
    pub fn sort_order(&self) -> Option<&str> {
        self.sort_order.as_deref()
    }

    /// Executes the read.
    pub fn run<G: ContentGateway + ?Sized>(&self, gateway: &G) -> Result<Vec<Row>> {
        debug!(
            uri = %self.uri,
            clause = ?self.selection.clause,
            args = self.selection.args.len(),
            "query"
        );
        gateway.query(
            &self.uri,
            &self.projection,
            &self.selection,
            self.sort_order.as_deref(),
        )
    }
}

/// Re-runs a query with a changing free-text constraint, as a type-ahead
/// filter would.
#[derive(Debug, Clone)]
pub struct SearchFilter {
    builder: QueryBuilder,
    uri: String,
}

impl SearchFilter {
    /// Sets the search query to `constraint` (empty or absent clears it)
    /// and runs the query.
    pub fn run<G: ContentGateway + ?Sized>(
        &mut self,
        gateway: &G,
        constraint: Option<&str>,
    ) -> Result<Vec<Row>> {
        let constraint = constraint.filter(|c| !c.is_empty());
        self.builder = std::mem::take(&mut self.builder).set_search_query(constraint);
        self.builder.query(gateway, &self.uri)
    }

    /// The wrapped builder.
    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Records how often it was called and fails every call.
    #[derive(Default)]
    struct CountingGateway {
        calls: Cell<usize>,
    }

    impl ContentGateway for CountingGateway {
        fn query(
            &self,
            _uri: &str,
            _projection: &[String],
            _selection: &RenderedSelection,
            _sort_order: Option<&str>,
        ) -> Result<Vec<Row>> {
            self.calls.set(self.calls.get() + 1);
            Err(Error::Gateway("offline".to_string()))
        }

        fn update(
            &self,
            _uri: &str,
            _values: &ContentValues,
            _selection: &RenderedSelection,
        ) -> Result<usize> {
            self.calls.set(self.calls.get() + 1);
            Ok(3)
        }

        fn delete(&self, _uri: &str, _selection: &RenderedSelection) -> Result<usize> {
            self.calls.set(self.calls.get() + 1);
            Ok(2)
        }
    }

    #[test]
    fn test_missing_projection_fails_before_gateway() {
        let gateway = CountingGateway::default();
        let err = QueryBuilder::new()
            .where_equals("a", 1)
            .query(&gateway, "items")
            .unwrap_err();

        assert!(matches!(err, Error::MissingProjection));
        assert_eq!(gateway.calls.get(), 0);

        let empty: [&str; 0] = [];
        let err = QueryBuilder::new().select(empty).prepare("items").unwrap_err();
        assert!(matches!(err, Error::MissingProjection));
    }

    #[test]
    fn test_gateway_errors_pass_through() {
        let gateway = CountingGateway::default();
        let err = QueryBuilder::new()
            .select(["a"])
            .query(&gateway, "items")
            .unwrap_err();

        assert!(matches!(err, Error::Gateway(ref msg) if msg == "offline"));
        assert_eq!(gateway.calls.get(), 1);
    }

    #[test]
    fn test_writes_do_not_need_projection() {
        let gateway = CountingGateway::default();
        let builder = QueryBuilder::new().where_id(4);

        assert_eq!(builder.update(&gateway, "items", &ContentValues::new()).unwrap(), 3);
        assert_eq!(builder.delete(&gateway, "items").unwrap(), 2);
    }

    #[test]
    fn test_default_batch_is_sequential() {
        let gateway = CountingGateway::default();
        let builder = QueryBuilder::new().where_equals("kind", "x");
        let ops = vec![
            builder.update_operation("items", ContentValues::new().with("kind", "y")),
            builder.delete_operation("items"),
        ];

        assert_eq!(gateway.apply_batch(&ops).unwrap(), vec![3, 2]);
        assert_eq!(gateway.calls.get(), 2);
    }

    #[test]
    fn test_prepare_snapshots_state() {
        let builder = QueryBuilder::new()
            .select(["a", "b"])
            .where_greater_than("a", 1)
            .order_by("b DESC");
        let prepared = builder.prepare("items").unwrap();

        assert_eq!(prepared.uri(), "items");
        assert_eq!(prepared.projection().to_vec(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(prepared.selection().clause.as_deref(), Some("a>?"));
        assert_eq!(prepared.sort_order(), Some("b DESC"));
    }

    #[test]
    fn test_operations_carry_selection() {
        let op = QueryBuilder::new().where_id(9).delete_operation("items");
        assert_eq!(op.uri(), "items");
        assert_eq!(op.selection().args, vec![Some("9".to_string())]);
    }
}
