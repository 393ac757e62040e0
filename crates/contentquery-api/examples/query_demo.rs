/// Query Builder Demo
///
/// Builds selections with predicates, free-text search and sort orders and
/// runs them against an in-memory provider.
use contentquery::{ContentValues, MemoryProvider, QueryBuilder, Row, Selection, Value};

fn print_rows(rows: &[Row]) {
    for row in rows {
        let cells: Vec<String> = row
            .columns
            .iter()
            .zip(&row.values)
            .map(|(column, value)| format!("{}={}", column, value))
            .collect();
        println!("  {}", cells.join(", "));
    }
    println!("  ({} rows)\n", rows.len());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== contentquery Query Demo ===\n");

    let provider = MemoryProvider::new();
    for (name, email, city, age) in [
        ("Alice", "alice@example.com", "NYC", 30),
        ("Bob", "bob@example.com", "SF", 25),
        ("Charlie", "charlie@mail.net", "NYC", 35),
        ("Diana", "diana@example.com", "LA", 28),
    ] {
        provider.insert(
            "content://contacts",
            ContentValues::new()
                .with("name", name)
                .with("email", email)
                .with("city", city)
                .with("age", age),
        )?;
    }

    // 1. Rendering only
    println!("1. Rendered selection:");
    let rendered = Selection::new()
        .where_equals("city", "NYC")
        .where_in("age", [30, 35])
        .set_search_columns(["name", "email"])
        .set_search_query(Some("ali example"))
        .render();
    println!("  clause: {}", rendered.clause.as_deref().unwrap_or("<none>"));
    println!("  args:   {:?}\n", rendered.args);

    // 2. Simple filter
    println!("2. Contacts in NYC:");
    let rows = QueryBuilder::new()
        .select(["_id", "name", "age"])
        .where_equals("city", "NYC")
        .query(&provider, "content://contacts")?;
    print_rows(&rows);

    // 3. Comparisons plus sort
    println!("3. Contacts aged 28 or older, oldest first:");
    let rows = QueryBuilder::new()
        .select(["name", "age"])
        .where_greater_or_equal("age", 28)
        .order_by("age DESC")
        .query(&provider, "content://contacts")?;
    print_rows(&rows);

    // 4. Free-text search
    println!("4. Search \"example\" over name and email:");
    let rows = QueryBuilder::new()
        .select(["name", "email"])
        .set_search_columns(["name", "email"])
        .set_search_query(Some("example"))
        .order_by("name")
        .query(&provider, "content://contacts")?;
    print_rows(&rows);

    // 5. Type-ahead filter
    println!("5. Type-ahead over names:");
    let mut filter = QueryBuilder::new()
        .select(["name"])
        .set_search_columns(["name"])
        .search_filter("content://contacts");
    for typed in ["c", "ch", "cha", ""] {
        let rows = filter.run(&provider, Some(typed))?;
        println!("  {:>5?} -> {} rows", typed, rows.len());
    }
    println!();

    // 6. Update and delete
    println!("6. Moving SF contacts to LA, then deleting everyone under 29:");
    let moved = QueryBuilder::new()
        .where_equals("city", "SF")
        .update(&provider, "content://contacts", &ContentValues::new().with("city", "LA"))?;
    let deleted = QueryBuilder::new()
        .where_less_than("age", 29)
        .delete(&provider, "content://contacts")?;
    println!("  moved {}, deleted {}", moved, deleted);

    let rows = QueryBuilder::new()
        .select(["name", "city"])
        .add_raw_predicate("city IN ('LA', 'NYC') AND age > ?", [Value::from(0)])
        .query(&provider, "content://contacts")?;
    print_rows(&rows);

    println!("=== Demo Complete ===");
    Ok(())
}
