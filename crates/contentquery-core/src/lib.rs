//! # contentquery core
//!
//! Core types for contentquery: typed values, the selection expression
//! builder, and the filter engine used to evaluate rendered selections.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod selection;
#[allow(missing_docs)]
pub mod value;

pub use error::{Error, Result};
pub use selection::{RenderedSelection, Selection, ID_COLUMN, NULL_ARG};
pub use value::{ContentValues, Row, Value};
