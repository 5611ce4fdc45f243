//! All error types for the xlfsync crate.
//!
//! These are returned from all fallible operations (parsing, serialization, reconciliation, import, etc.).
//! Per-unit data-quality findings are not errors; they are recorded on the unit itself.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("corrupt cache entry: {0}")]
    CorruptCache(String),

    #[error("duplicate trans-unit id `{id}` in {document}")]
    DuplicateId { id: String, document: String },

    #[error("not available in {mode} mode: {message}")]
    InvalidMode { mode: String, message: String },

    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Creates a new invalid resource error
    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Error::InvalidResource(message.into())
    }

    /// Attaches a file path to an error raised while handling that file.
    pub fn in_file(self, path: &std::path::Path) -> Self {
        let path = path.display();
        match self {
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path, e))),
            Error::XmlParse(e) => Error::InvalidResource(format!("{}: {}", path, e)),
            Error::InvalidResource(msg) => Error::InvalidResource(format!("{}: {}", path, msg)),
            Error::DataMismatch(msg) => Error::DataMismatch(format!("{}: {}", path, msg)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_parse_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{ invalid json }").unwrap_err();
        let error = Error::Parse(json_error);
        assert!(error.to_string().contains("parse error"));
    }

    #[test]
    fn test_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::Io(io_error);
        assert!(error.to_string().contains("I/O error"));
    }

    #[test]
    fn test_duplicate_id_error() {
        let error = Error::DuplicateId {
            id: "Table 1 - Field 2".to_string(),
            document: "sv-SE.xlf".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "duplicate trans-unit id `Table 1 - Field 2` in sv-SE.xlf"
        );
    }

    #[test]
    fn test_invalid_mode_error() {
        let error = Error::InvalidMode {
            mode: "tag".to_string(),
            message: "import requires reference-service mode".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "not available in tag mode: import requires reference-service mode"
        );
    }

    #[test]
    fn test_in_file_prefixes_path() {
        let error = Error::invalid_resource("trans-unit missing 'id'").in_file(Path::new("a.xlf"));
        assert_eq!(error.to_string(), "invalid resource: a.xlf: trans-unit missing 'id'");

        let io_error = Error::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).in_file(Path::new("b.xlf"));
        assert!(io_error.to_string().contains("b.xlf: gone"));
    }

    #[test]
    fn test_validation_error() {
        let error = Error::validation_error("Validation failed");
        assert_eq!(error.to_string(), "validation error: Validation failed");
    }
}
