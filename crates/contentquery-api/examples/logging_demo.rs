use std::sync::Arc;

use contentquery::logging::LogConfig;
use contentquery::{ContentGateway, ContentValues, MemoryProvider, QueryBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug level shows every rendered clause; RUST_LOG overrides it
    let _guard = LogConfig::debug().init();

    println!("=== contentquery Logging Demo ===\n");

    let provider = Arc::new(MemoryProvider::new());

    println!("1. Inserting data...");
    for (title, done) in [("Groceries", false), ("Taxes", true), ("Dentist", false)] {
        provider.insert("notes", ContentValues::new().with("title", title).with("done", done))?;
    }

    println!("\n2. Querying...");
    let rows = QueryBuilder::new()
        .select(["_id", "title"])
        .where_equals("done", false)
        .order_by("title")
        .query(provider.as_ref(), "notes")?;
    println!("Found {} open notes", rows.len());

    println!("\n3. Querying on a worker thread...");
    let handle = QueryBuilder::new()
        .select(["title"])
        .set_search_columns(["title"])
        .set_search_query(Some("tax"))
        .query_async(Arc::clone(&provider), "notes", |result| match result {
            Ok(rows) => println!("Worker found {} rows", rows.len()),
            Err(err) => eprintln!("Worker failed: {}", err),
        })?;
    let _ = handle.join();

    println!("\n4. Applying a batch...");
    let open = QueryBuilder::new().where_equals("done", false);
    let finished = QueryBuilder::new().where_equals("done", true);
    let counts = provider.apply_batch(&[
        finished.delete_operation("notes"),
        open.update_operation("notes", ContentValues::new().with("done", true)),
    ])?;
    println!("Batch affected {:?}", counts);

    println!("\n=== Demo Complete ===");
    println!("Check the logs above to see tracing output!");

    Ok(())
}
