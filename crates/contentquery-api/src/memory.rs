//! In-memory [`ContentGateway`] backed by the core filter engine.

use std::collections::HashMap;
use std::sync::RwLock;

use contentquery_core::filter::{parse_sort_order, sort_records, Filter};
use contentquery_core::{ContentValues, Error, RenderedSelection, Result, Row, Value, ID_COLUMN};
use tracing::{debug, trace};

use crate::gateway::{ContentGateway, Operation};

#[derive(Debug, Clone)]
struct Table {
    columns: Vec<String>,
    records: Vec<ContentValues>,
    next_id: i64,
}

impl Table {
    fn new() -> Self {
        Self {
            columns: vec![ID_COLUMN.to_string()],
            records: Vec::new(),
            next_id: 1,
        }
    }

    fn add_columns(&mut self, values: &ContentValues) {
        for column in values.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
    }

    fn check_columns<'a, I: IntoIterator<Item = &'a str>>(&self, columns: I) -> Result<()> {
        for column in columns {
            if !self.columns.iter().any(|c| c == column) {
                return Err(Error::UnknownColumn(column.to_string()));
            }
        }
        Ok(())
    }

    fn compile(&self, selection: &RenderedSelection) -> Result<Filter> {
        let filter = Filter::compile(selection.clause.as_deref(), &selection.args)?;
        self.check_columns(filter.columns())?;
        Ok(filter)
    }

    fn update(&mut self, values: &ContentValues, selection: &RenderedSelection) -> Result<usize> {
        if values.contains_key(ID_COLUMN) {
            return Err(Error::InvalidOperation(format!(
                "{} cannot be updated",
                ID_COLUMN
            )));
        }
        let filter = self.compile(selection)?;
        self.add_columns(values);

        let mut affected = 0;
        for record in self.records.iter_mut().filter(|r| filter.matches(r)) {
            record.merge(values);
            affected += 1;
        }
        Ok(affected)
    }

    fn delete(&mut self, selection: &RenderedSelection) -> Result<usize> {
        let filter = self.compile(selection)?;
        let before = self.records.len();
        self.records.retain(|r| !filter.matches(r));
        Ok(before - self.records.len())
    }
}

/// A thread-safe in-memory content store.
///
/// Tables are created on first insert and keyed by resource locator. Every
/// record gets an integer `_id`, assigned from a per-table counter unless
/// the inserted values carry one.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record into `uri`, creating the table if needed.
    /// Returns the record's `_id`.
    pub fn insert(&self, uri: &str, values: ContentValues) -> Result<i64> {
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        let table = tables.entry(uri.to_string()).or_insert_with(Table::new);

        let mut record = values;
        let id = match record.get(ID_COLUMN) {
            Some(Value::Integer(id)) => *id,
            Some(other) => {
                return Err(Error::InvalidOperation(format!(
                    "{} must be an integer, got {}",
                    ID_COLUMN, other
                )))
            }
            None => table.next_id,
        };
        if table
            .records
            .iter()
            .any(|r| r.get(ID_COLUMN) == Some(&Value::Integer(id)))
        {
            return Err(Error::InvalidOperation(format!(
                "duplicate {} {} in {}",
                ID_COLUMN, id, uri
            )));
        }

        let after = id.checked_add(1).ok_or_else(|| {
            Error::InvalidOperation(format!("{} {} leaves no room for further ids", ID_COLUMN, id))
        })?;

        record.put(ID_COLUMN, id);
        table.next_id = table.next_id.max(after);
        table.add_columns(&record);
        table.records.push(record);

        trace!(uri, id, "inserted record");
        Ok(id)
    }

    /// Number of records stored under `uri`.
    pub fn count(&self, uri: &str) -> Result<usize> {
        let tables = self.tables.read().map_err(|_| Error::LockPoisoned)?;
        tables
            .get(uri)
            .map(|t| t.records.len())
            .ok_or_else(|| Error::UnknownResource(uri.to_string()))
    }

    /// Names of all known resources, sorted.
    pub fn resources(&self) -> Result<Vec<String>> {
        let tables = self.tables.read().map_err(|_| Error::LockPoisoned)?;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn table_mut<'a>(tables: &'a mut HashMap<String, Table>, uri: &str) -> Result<&'a mut Table> {
    tables
        .get_mut(uri)
        .ok_or_else(|| Error::UnknownResource(uri.to_string()))
}

impl ContentGateway for MemoryProvider {
    fn query(
        &self,
        uri: &str,
        projection: &[String],
        selection: &RenderedSelection,
        sort_order: Option<&str>,
    ) -> Result<Vec<Row>> {
        let tables = self.tables.read().map_err(|_| Error::LockPoisoned)?;
        let table = tables
            .get(uri)
            .ok_or_else(|| Error::UnknownResource(uri.to_string()))?;

        let filter = table.compile(selection)?;
        table.check_columns(projection.iter().map(String::as_str))?;

        let mut matched: Vec<&ContentValues> =
            table.records.iter().filter(|r| filter.matches(r)).collect();

        if let Some(order) = sort_order.filter(|s| !s.trim().is_empty()) {
            let columns = parse_sort_order(order)?;
            table.check_columns(columns.iter().map(|c| c.column.as_str()))?;
            sort_records(&mut matched, &columns);
        }

        let rows: Vec<Row> = matched
            .into_iter()
            .map(|record| Row {
                columns: projection.to_vec(),
                values: projection
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect(),
            })
            .collect();

        debug!(uri, rows = rows.len(), "query matched");
        Ok(rows)
    }

    fn update(
        &self,
        uri: &str,
        values: &ContentValues,
        selection: &RenderedSelection,
    ) -> Result<usize> {
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        let affected = table_mut(&mut tables, uri)?.update(values, selection)?;
        debug!(uri, affected, "update applied");
        Ok(affected)
    }

    fn delete(&self, uri: &str, selection: &RenderedSelection) -> Result<usize> {
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        let affected = table_mut(&mut tables, uri)?.delete(selection)?;
        debug!(uri, affected, "delete applied");
        Ok(affected)
    }

    /// Applies the batch atomically: either every operation takes effect or
    /// none does.
    fn apply_batch(&self, operations: &[Operation]) -> Result<Vec<usize>> {
        let mut tables = self.tables.write().map_err(|_| Error::LockPoisoned)?;
        let mut staged = tables.clone();

        let mut results = Vec::with_capacity(operations.len());
        for op in operations {
            let affected = match op {
                Operation::Update {
                    uri,
                    values,
                    selection,
                } => table_mut(&mut staged, uri)?.update(values, selection)?,
                Operation::Delete { uri, selection } => {
                    table_mut(&mut staged, uri)?.delete(selection)?
                }
            };
            results.push(affected);
        }

        *tables = staged;
        debug!(operations = operations.len(), "batch committed");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_ids() {
        let provider = MemoryProvider::new();
        assert_eq!(provider.insert("t", ContentValues::new().with("a", 1)).unwrap(), 1);
        assert_eq!(provider.insert("t", ContentValues::new().with("_id", 10)).unwrap(), 10);
        assert_eq!(provider.insert("t", ContentValues::new()).unwrap(), 11);
        assert_eq!(provider.count("t").unwrap(), 3);
    }

    #[test]
    fn test_insert_rejects_duplicate_and_non_integer_ids() {
        let provider = MemoryProvider::new();
        provider.insert("t", ContentValues::new().with("_id", 1)).unwrap();

        let err = provider
            .insert("t", ContentValues::new().with("_id", 1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));

        let err = provider
            .insert("t", ContentValues::new().with("_id", "x"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));
    }

    #[test]
    fn test_insert_rejects_id_at_upper_bound() {
        let provider = MemoryProvider::new();
        let err = provider
            .insert("t", ContentValues::new().with("_id", i64::MAX))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOperation(_)));

        // nothing stored and the lock is still usable
        assert_eq!(provider.count("t").unwrap(), 0);
        assert_eq!(provider.insert("t", ContentValues::new()).unwrap(), 1);
        assert_eq!(
            provider
                .insert("t", ContentValues::new().with("_id", i64::MAX - 1))
                .unwrap(),
            i64::MAX - 1
        );
    }

    #[test]
    fn test_unknown_resource() {
        let provider = MemoryProvider::new();
        let err = provider
            .query("nope", &["_id".to_string()], &RenderedSelection::default(), None)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownResource(ref uri) if uri == "nope"));
        assert!(matches!(provider.count("nope"), Err(Error::UnknownResource(_))));
    }

    #[test]
    fn test_resources_sorted() {
        let provider = MemoryProvider::new();
        provider.insert("b", ContentValues::new()).unwrap();
        provider.insert("a", ContentValues::new()).unwrap();
        assert_eq!(provider.resources().unwrap(), vec!["a", "b"]);
    }
}
