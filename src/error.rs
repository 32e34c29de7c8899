//! Error taxonomy.
//!
//! Each stage of the pipeline has its own error enum so callers can match
//! on the failure kind. Application glue in `main` wraps these with `anyhow`.

use thiserror::Error;

/// Failures of the award search request.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network unreachable, connection refused, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("remote error: HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The body could not be read as `{"results": [...]}`.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The search succeeded but matched nothing.
    #[error("no results found for {agency}")]
    EmptyResult { agency: String },
}

impl FetchError {
    /// Whether another attempt might succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Remote { status, .. } => *status >= 500,
            FetchError::MalformedResponse(_) | FetchError::EmptyResult { .. } => false,
        }
    }
}

/// Preconditions of the aggregator that the record set did not meet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("cannot aggregate an empty record set")]
    EmptyInput,

    #[error("no award has a positive amount; the smallest award is undefined")]
    NoPositiveAward,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

/// Failures while rendering a report. Nothing is rendered partially.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),
}

/// Failures of the text-generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no credential configured (set {env_var})")]
    MissingCredential { env_var: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("service returned an empty answer")]
    EmptyResponse,

    #[error("no answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("could not parse service response: {0}")]
    Parse(String),
}

/// Invalid user-supplied filter values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid fiscal year '{0}': expected a four-digit year")]
    InvalidFiscalYear(String),

    #[error("at least one award type code is required")]
    EmptyAwardTypes,
}
