//! Error types for the depth view engine
//!
//! The aggregation pipeline itself never fails: recoverable conditions are
//! represented as data (empty rows, sentinel values) because it runs on
//! every market-data tick. The only fallible surface is construction of
//! typed primitives at the boundary.

use thiserror::Error;

/// Errors constructing or parsing numeric primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("unparseable decimal: {input}")]
    Unparseable { input: String },

    #[error("value must be strictly positive: {value}")]
    NotPositive { value: String },
}
