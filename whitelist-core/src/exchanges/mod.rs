//! Exchange identifiers and data source errors

pub mod types;
pub mod errors;

pub use types::{Symbol, Exchange, DataSource, QUOTE_CURRENCY};
pub use errors::{SourceError, SourceResult, ErrorKind};
