#![no_main]

use arbitrary::Arbitrary;
use contentquery_core::filter::Filter;
use contentquery_core::{Selection, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Arg {
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Null,
}

impl From<Arg> for Value {
    fn from(arg: Arg) -> Self {
        match arg {
            Arg::Integer(i) => Value::Integer(i),
            Arg::Float(f) => Value::Float(f),
            Arg::Text(s) => Value::String(s),
            Arg::Boolean(b) => Value::Boolean(b),
            Arg::Null => Value::Null,
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Op {
    Id(i64),
    Equals(Arg),
    NotEquals(Arg),
    GreaterThan(Arg),
    LessOrEqual(Arg),
    IsNull,
    IsNotNull,
    In(Vec<i64>),
    Search(Vec<u8>, String),
}

const COLUMNS: [&str; 4] = ["name", "age", "city", "note"];

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 64 {
        return;
    }

    let mut selection = Selection::new();
    for (i, op) in ops.into_iter().enumerate() {
        let column = COLUMNS[i % COLUMNS.len()];
        selection = match op {
            Op::Id(id) => selection.where_id(id),
            Op::Equals(arg) => selection.where_equals(column, arg),
            Op::NotEquals(arg) => selection.where_not_equals(column, arg),
            Op::GreaterThan(arg) => selection.where_greater_than(column, arg),
            Op::LessOrEqual(arg) => selection.where_less_or_equal(column, arg),
            Op::IsNull => selection.where_is_null(column),
            Op::IsNotNull => selection.where_is_not_null(column),
            Op::In(values) => selection.where_in(column, values),
            Op::Search(picks, query) => selection
                .set_search_columns(picks.iter().map(|p| COLUMNS[*p as usize % COLUMNS.len()]))
                .set_search_query(Some(&query)),
        };
    }

    let rendered = selection.render();
    assert_eq!(rendered, selection.render());
    assert_eq!(rendered.placeholder_count(), rendered.args.len());

    // Every builder-produced selection must be accepted by the filter engine
    if let Err(err) = Filter::compile(rendered.clause.as_deref(), &rendered.args) {
        panic!("rendered selection rejected: {} ({:?})", err, rendered);
    }
});
