//! # contentquery
//!
//! Fluent selection building for content-provider style data access.
//!
//! A [`QueryBuilder`] accumulates `WHERE` predicates and their positional
//! arguments, an optional free-text search across several columns, a
//! projection and a sort order. The rendered selection is handed to any
//! [`ContentGateway`] to read, update or delete rows, or captured as an
//! [`Operation`] for batch application.
//!
//! ## Quick Start
//!
//! ```rust
//! use contentquery::{ContentValues, MemoryProvider, QueryBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = MemoryProvider::new();
//!     provider.insert("contacts", ContentValues::new().with("name", "Ada Lovelace").with("starred", true))?;
//!     provider.insert("contacts", ContentValues::new().with("name", "Alan Turing").with("starred", false))?;
//!
//!     let rows = QueryBuilder::new()
//!         .select(["_id", "name"])
//!         .set_search_columns(["name"])
//!         .set_search_query(Some("ada"))
//!         .query(&provider, "contacts")?;
//!     assert_eq!(rows.len(), 1);
//!
//!     // Writes use the same selection
//!     let starred = QueryBuilder::new()
//!         .where_equals("starred", false)
//!         .update(&provider, "contacts", &ContentValues::new().with("starred", true))?;
//!     assert_eq!(starred, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Selections without a gateway
//!
//! ```rust
//! use contentquery::Selection;
//!
//! let rendered = Selection::new()
//!     .where_equals("kind", 3)
//!     .where_in("state", [1, 2])
//!     .render();
//! assert_eq!(rendered.clause.as_deref(), Some("kind=? AND state IN (1,2)"));
//! assert_eq!(rendered.args, vec![Some("3".to_string())]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod gateway;
mod memory;

pub mod logging;

// Re-export core types
pub use contentquery_core::filter;
pub use contentquery_core::{
    ContentValues, Error, RenderedSelection, Result, Row, Selection, Value, ID_COLUMN, NULL_ARG,
};

pub use builder::{PreparedQuery, QueryBuilder, SearchFilter};
pub use gateway::{ContentGateway, Operation};
pub use memory::MemoryProvider;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
