use thiserror::Error;

/// Parse and extraction failures.
///
/// Any of these aborts the whole run: for a scraped collector, emitting
/// inconsistent partial metrics is worse than emitting none and letting
/// the scrape go stale.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("malformed report: {0}")]
    MalformedReport(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("malformed size string: {0:?}")]
    MalformedSize(String),

    #[error("unsupported size unit: {0:?}")]
    UnsupportedSizeUnit(char),
}
