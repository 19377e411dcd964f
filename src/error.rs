//! Error types for the aggregation engine and its inputs.

use thiserror::Error;

/// Input-validation failures raised while aggregating a feed snapshot.
///
/// Any of these aborts the whole run; there is no row-skipping mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("invalid date {value:?} for region {region:?}: expected DD-Mon-YY")]
    DateParse { value: String, region: String },

    #[error("invalid count {value:?} for region {region:?} on {date}")]
    CountParse {
        value: String,
        region: String,
        date: String,
    },

    #[error("case counts for region {region:?} overflow on {date}")]
    CountOverflow { region: String, date: String },

    #[error("unknown region code {0:?}")]
    UnknownRegion(String),

    #[error("duplicate {status} record for region {region:?} on {date}")]
    DuplicateRecord {
        date: String,
        status: String,
        region: String,
    },
}

/// Problems found while validating a region code table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionTableError {
    #[error("region table entry {index} has an empty code")]
    EmptyCode { index: usize },

    #[error("region {0:?} has an empty display name")]
    EmptyName(String),

    #[error("region code {0:?} appears more than once")]
    DuplicateCode(String),
}

/// Failures decoding a feed file into flat records.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed feed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("feed entry {index} is missing the {field:?} field")]
    MissingField { index: usize, field: &'static str },

    #[error("feed entry {index} has unsupported value for {field:?}")]
    InvalidValue { index: usize, field: String },

    #[error("unknown case status {0:?}")]
    UnknownStatus(String),

    #[error("cannot infer feed format from {0:?}; pass --format")]
    UnknownFormat(String),
}
