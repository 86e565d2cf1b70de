//! Typed error hierarchy for junit-checks.
//!
//! Two top-level enums cover the two subsystems:
//! - `ReportError`: reading, parsing and aggregating one report document
//! - `PublishError`: resolving and updating a check run on the review surface

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning one report file into a summary.
///
/// Every variant is fatal for the whole run.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read report file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse report {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Suite '{suite}' has non-numeric {attribute}=\"{value}\"")]
    InvalidNumber {
        suite: String,
        attribute: &'static str,
        value: String,
    },

    #[error("Total {attribute} overflows after adding suite '{suite}'")]
    CountOverflow {
        suite: String,
        attribute: &'static str,
    },
}

impl ReportError {
    /// Attach a file path to a parse failure raised by the document reader.
    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Errors from the check-run lookup and update calls.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Missing {0}; it is required to publish check-run annotations")]
    MissingContext(&'static str),

    #[error("GitHub API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_error_read_carries_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ReportError::Read {
            path: PathBuf::from("reports/TEST-a.xml"),
            source: io_err,
        };
        match &err {
            ReportError::Read { path, source } => {
                assert_eq!(path, &PathBuf::from("reports/TEST-a.xml"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("Expected Read"),
        }
        assert!(err.to_string().contains("reports/TEST-a.xml"));
    }

    #[test]
    fn report_error_invalid_number_names_attribute() {
        let err = ReportError::InvalidNumber {
            suite: "pkg.FooTest".to_string(),
            attribute: "time",
            value: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("pkg.FooTest"));
        assert!(msg.contains("time=\"abc\""));
    }

    #[test]
    fn report_error_count_overflow_names_suite() {
        let err = ReportError::CountOverflow {
            suite: "pkg.FooTest".to_string(),
            attribute: "tests",
        };
        assert_eq!(
            err.to_string(),
            "Total tests overflows after adding suite 'pkg.FooTest'"
        );
    }

    #[test]
    fn report_error_parse_helper_builds_variant() {
        let err = ReportError::parse("a.xml", "unexpected end of file");
        assert!(matches!(err, ReportError::Parse { .. }));
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn publish_error_api_carries_status() {
        let err = PublishError::Api {
            status: 422,
            body: "Validation Failed".to_string(),
        };
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("Validation Failed"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ReportError::parse("x", "y"));
        assert_std_error(&PublishError::MissingContext("GITHUB_SHA"));
    }
}
