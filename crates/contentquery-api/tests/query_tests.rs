use contentquery::{ContentValues, Error, MemoryProvider, QueryBuilder, Value};

fn contacts() -> MemoryProvider {
    let provider = MemoryProvider::new();
    let people = [
        ("Ada Lovelace", "London", 36, Some("ada")),
        ("Alan Turing", "London", 41, None),
        ("Grace Hopper", "New York", 85, Some("amazing grace")),
        ("Edsger Dijkstra", "Rotterdam", 72, None),
    ];
    for (name, city, age, nickname) in people {
        provider
            .insert(
                "contacts",
                ContentValues::new()
                    .with("name", name)
                    .with("city", city)
                    .with("age", age)
                    .with("nickname", nickname),
            )
            .unwrap();
    }
    provider
}

fn names(rows: &[contentquery::Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.get("name").and_then(Value::as_str).unwrap().to_string())
        .collect()
}

#[test]
fn test_select_all_rows() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["_id", "name"])
        .query(&provider, "contacts")
        .unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].columns, vec!["_id".to_string(), "name".to_string()]);
    assert_eq!(rows[0].get("_id"), Some(&Value::Integer(1)));
}

#[test]
fn test_where_equals_and_comparisons() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .where_equals("city", "London")
        .where_greater_than("age", 40)
        .query(&provider, "contacts")
        .unwrap();

    assert_eq!(names(&rows), vec!["Alan Turing"]);
}

#[test]
fn test_where_id() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .where_id(3)
        .query(&provider, "contacts")
        .unwrap();

    assert_eq!(names(&rows), vec!["Grace Hopper"]);
}

#[test]
fn test_null_checks() {
    let provider = contacts();
    let with_nickname = QueryBuilder::new()
        .select(["name"])
        .where_is_not_null("nickname")
        .order_by("name")
        .query(&provider, "contacts")
        .unwrap();
    assert_eq!(names(&with_nickname), vec!["Ada Lovelace", "Grace Hopper"]);

    let without = QueryBuilder::new()
        .select(["name"])
        .where_is_null("nickname")
        .query(&provider, "contacts")
        .unwrap();
    assert_eq!(without.len(), 2);
}

#[test]
fn test_null_equality_binds_null_text() {
    // where_equals(col, NULL) renders `col IS ?` bound to the text "null",
    // which never equals a stored NULL
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .where_equals("nickname", Value::Null)
        .query(&provider, "contacts")
        .unwrap();
    assert!(rows.is_empty());

    let rows = QueryBuilder::new()
        .select(["name"])
        .where_not_equals("nickname", Value::Null)
        .query(&provider, "contacts")
        .unwrap();
    // IS NOT is null-safe, so stored NULLs differ from the text too
    assert_eq!(rows.len(), 4);
}

#[test]
fn test_in_and_not_in() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .where_in("_id", [1, 4])
        .query(&provider, "contacts")
        .unwrap();
    assert_eq!(names(&rows), vec!["Ada Lovelace", "Edsger Dijkstra"]);

    let rows = QueryBuilder::new()
        .select(["name"])
        .where_not_in("age", [36, 41, 85])
        .query(&provider, "contacts")
        .unwrap();
    assert_eq!(names(&rows), vec!["Edsger Dijkstra"]);
}

#[test]
fn test_raw_predicate() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .add_raw_predicate("(city=? OR age<?)", [Value::from("Rotterdam"), Value::from(40)])
        .order_by("age DESC")
        .query(&provider, "contacts")
        .unwrap();

    assert_eq!(names(&rows), vec!["Edsger Dijkstra", "Ada Lovelace"]);
}

#[test]
fn test_free_text_search_every_token_must_match() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .set_search_columns(["name", "city"])
        .set_search_query(Some("london ALAN"))
        .query(&provider, "contacts")
        .unwrap();
    assert_eq!(names(&rows), vec!["Alan Turing"]);

    let rows = QueryBuilder::new()
        .select(["name"])
        .set_search_columns(["name", "nickname"])
        .set_search_query(Some("grace"))
        .query(&provider, "contacts")
        .unwrap();
    assert_eq!(names(&rows), vec!["Grace Hopper"]);
}

#[test]
fn test_search_combined_with_predicates() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name"])
        .where_less_than("age", 80)
        .set_search_columns(["name"])
        .set_search_query(Some("a"))
        .order_by("age")
        .query(&provider, "contacts")
        .unwrap();

    assert_eq!(
        names(&rows),
        vec!["Ada Lovelace", "Alan Turing", "Edsger Dijkstra"]
    );
}

#[test]
fn test_sort_order_multiple_columns() {
    let provider = contacts();
    let rows = QueryBuilder::new()
        .select(["name", "city"])
        .order_by("city ASC, age DESC")
        .query(&provider, "contacts")
        .unwrap();

    assert_eq!(
        names(&rows),
        vec!["Alan Turing", "Ada Lovelace", "Grace Hopper", "Edsger Dijkstra"]
    );
}

#[test]
fn test_missing_projection() {
    let provider = contacts();
    let err = QueryBuilder::new()
        .where_id(1)
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(err, Error::MissingProjection));
}

#[test]
fn test_unknown_columns_rejected() {
    let provider = contacts();

    let err = QueryBuilder::new()
        .select(["email"])
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn(ref c) if c == "email"));

    let err = QueryBuilder::new()
        .select(["name"])
        .where_equals("email", "x")
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn(_)));

    let err = QueryBuilder::new()
        .select(["name"])
        .order_by("email")
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn(_)));
}

#[test]
fn test_bad_clause_and_sort_are_parse_errors() {
    let provider = contacts();

    let err = QueryBuilder::new()
        .select(["name"])
        .add_raw_predicate("name ==== ?", ["x"])
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));

    let err = QueryBuilder::new()
        .select(["name"])
        .order_by("name DESC;")
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn test_raw_predicate_argument_mismatch() {
    let provider = contacts();
    let no_args: [Value; 0] = [];
    let err = QueryBuilder::new()
        .select(["name"])
        .add_raw_predicate("age>?", no_args)
        .query(&provider, "contacts")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ArgumentCount {
            expected: 1,
            found: 0
        }
    ));
}

#[test]
fn test_prepared_query_reruns_against_current_data() {
    let provider = contacts();
    let prepared = QueryBuilder::new()
        .select(["name"])
        .where_equals("city", "London")
        .prepare("contacts")
        .unwrap();

    assert_eq!(prepared.run(&provider).unwrap().len(), 2);

    provider
        .insert(
            "contacts",
            ContentValues::new().with("name", "Tim Berners-Lee").with("city", "London"),
        )
        .unwrap();
    assert_eq!(prepared.run(&provider).unwrap().len(), 3);
}

#[test]
fn test_search_filter_reruns_with_constraint() {
    let provider = contacts();
    let mut filter = QueryBuilder::new()
        .select(["name"])
        .set_search_columns(["name"])
        .search_filter("contacts");

    assert_eq!(filter.run(&provider, Some("hopper")).unwrap().len(), 1);
    assert_eq!(filter.run(&provider, Some("")).unwrap().len(), 4);
    assert_eq!(filter.run(&provider, Some("a")).unwrap().len(), 4);
    assert_eq!(filter.run(&provider, Some("ed dij")).unwrap().len(), 1);
    assert_eq!(filter.run(&provider, None).unwrap().len(), 4);
    assert!(filter.builder().selection().search_tokens().is_empty());
}
