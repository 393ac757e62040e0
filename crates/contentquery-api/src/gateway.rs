//! The data-query gateway consumed by [`QueryBuilder`](crate::QueryBuilder).

use contentquery_core::{ContentValues, RenderedSelection, Result, Row};
use tracing::debug;

/// A backend able to read, update and delete rows addressed by a resource
/// locator, filtered by a rendered selection.
///
/// Errors raised by an implementation are handed back to the caller
/// unchanged.
pub trait ContentGateway {
    /// Returns the rows of `uri` matching `selection`, restricted to
    /// `projection` and ordered by `sort_order` when given.
    fn query(
        &self,
        uri: &str,
        projection: &[String],
        selection: &RenderedSelection,
        sort_order: Option<&str>,
    ) -> Result<Vec<Row>>;

    /// Applies `values` to every matching row. Returns the affected count.
    fn update(
        &self,
        uri: &str,
        values: &ContentValues,
        selection: &RenderedSelection,
    ) -> Result<usize>;

    /// Removes every matching row. Returns the affected count.
    fn delete(&self, uri: &str, selection: &RenderedSelection) -> Result<usize>;

    /// Applies `operations` in order, returning one affected count per
    /// operation.
    ///
    /// The default runs them one by one and stops at the first error;
    /// implementations that can do better should apply the batch atomically.
    fn apply_batch(&self, operations: &[Operation]) -> Result<Vec<usize>> {
        debug!(operations = operations.len(), "applying batch sequentially");
        operations.iter().map(|op| op.apply(self)).collect()
    }
}

impl<G: ContentGateway + ?Sized> ContentGateway for &G {
    fn query(
        &self,
        uri: &str,
        projection: &[String],
        selection: &RenderedSelection,
        sort_order: Option<&str>,
    ) -> Result<Vec<Row>> {
        (**self).query(uri, projection, selection, sort_order)
    }

    fn update(
        &self,
        uri: &str,
        values: &ContentValues,
        selection: &RenderedSelection,
    ) -> Result<usize> {
        (**self).update(uri, values, selection)
    }

    fn delete(&self, uri: &str, selection: &RenderedSelection) -> Result<usize> {
        (**self).delete(uri, selection)
    }

    fn apply_batch(&self, operations: &[Operation]) -> Result<Vec<usize>> {
        (**self).apply_batch(operations)
    }
}

/// A write operation captured for batch application.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Update matching rows with new values
    Update {
        /// Target resource
        uri: String,
        /// Column values to write
        values: ContentValues,
        /// Rows to update
        selection: RenderedSelection,
    },
    /// Delete matching rows
    Delete {
        /// Target resource
        uri: String,
        /// Rows to delete
        selection: RenderedSelection,
    },
}

impl Operation {
    /// The resource this operation targets.
    pub fn uri(&self) -> &str {
        match self {
            Operation::Update { uri, .. } | Operation::Delete { uri, .. } => uri,
        }
    }

    /// The selection this operation applies to.
    pub fn selection(&self) -> &RenderedSelection {
        match self {
            Operation::Update { selection, .. } | Operation::Delete { selection, .. } => {
                selection
            }
        }
    }

    /// Runs this operation against `gateway`.
    pub fn apply<G: ContentGateway + ?Sized>(&self, gateway: &G) -> Result<usize> {
        match self {
            Operation::Update {
                uri,
                values,
                selection,
            } => gateway.update(uri, values, selection),
            Operation::Delete { uri, selection } => gateway.delete(uri, selection),
        }
    }
}
