//! Error types for the unstmt library.

use std::io;
use thiserror::Error;

/// Result type alias for unstmt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing statement layouts.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The layout XML could not be parsed into a fragment tree.
    #[error("layout XML parse error: {0}")]
    Xml(String),

    /// A JSON-serialized fragment tree could not be deserialized.
    #[error("layout JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input extension is not a recognized layout-tree format.
    #[error("unsupported input format: {0}")]
    UnsupportedInput(String),

    /// Neither statement layout matched the fragment tree.
    ///
    /// The caller may retry with a forced layout if it knows better.
    #[error("statement layout not recognized")]
    UnrecognizedLayout,

    /// Error serializing transactions to CSV.
    #[error("CSV projection error: {0}")]
    Csv(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnrecognizedLayout;
        assert_eq!(err.to_string(), "statement layout not recognized");

        let err = Error::UnsupportedInput("pdf".to_string());
        assert_eq!(err.to_string(), "unsupported input format: pdf");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
