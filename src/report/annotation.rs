//! Per-failure annotations.
//!
//! An [`Annotation`] mirrors the check-run annotation object of the GitHub
//! REST API, so it serializes straight into an update request.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::suite::{CaseNode, SuiteNode};

/// Severity of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationLevel {
    Notice,
    Failure,
}

impl fmt::Display for AnnotationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationLevel::Notice => write!(f, "notice"),
            AnnotationLevel::Failure => write!(f, "failure"),
        }
    }
}

/// One reviewable finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Source path as recorded by the runner, after prefix stripping.
    /// `None` when the runner did not record a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
    pub end_column: u32,
    #[serde(rename = "annotation_level")]
    pub level: AnnotationLevel,
    pub title: String,
    pub message: String,
}

/// Builds failure annotations for the suites of one document.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationBuilder<'a> {
    strip_from_path: &'a str,
}

impl<'a> AnnotationBuilder<'a> {
    pub fn new(strip_from_path: &'a str) -> Self {
        Self { strip_from_path }
    }

    /// Annotations for every failed case, in suite then case order.
    pub fn build(&self, suites: &[SuiteNode<'_>]) -> Vec<Annotation> {
        suites
            .iter()
            .filter(|suite| suite.is_flagged())
            .flat_map(|suite| self.for_suite(suite))
            .collect()
    }

    /// Annotations for one suite.
    ///
    /// A suite whose counts flag problems but whose cases carry no
    /// `<failure>` payload yields nothing.
    pub fn for_suite(&self, suite: &SuiteNode<'_>) -> Vec<Annotation> {
        suite
            .cases()
            .filter_map(|case| self.for_case(suite.name(), &case))
            .collect()
    }

    fn for_case(&self, suite_name: &str, case: &CaseNode<'_>) -> Option<Annotation> {
        let message = case.failure_message()?;
        let line = normalize_line(case.line());

        Some(Annotation {
            path: case.file().map(|file| self.strip_path(file)),
            start_line: line,
            end_line: line,
            start_column: 0,
            end_column: 0,
            level: AnnotationLevel::Failure,
            title: format!("{}::{}", suite_name, case.name()),
            message: message.to_string(),
        })
    }

    /// Remove the first occurrence of the configured strip string.
    ///
    /// The match is not anchored: `"/src/"` is removed from the middle of a
    /// path just as from its start.
    pub fn strip_path(&self, file: &str) -> String {
        if self.strip_from_path.is_empty() {
            file.to_string()
        } else {
            file.replacen(self.strip_from_path, "", 1)
        }
    }
}

/// Resolve a case's `line` attribute to a 1-based line number.
///
/// Absent, `"0"` and unparseable values all map to line 1.
pub fn normalize_line(line: Option<&str>) -> u32 {
    let Some(raw) = line else {
        return 1;
    };
    match raw.trim().parse::<u32>() {
        Ok(0) => 1,
        Ok(n) => n,
        Err(_) => {
            warn!(line = raw, "Ignoring non-numeric line attribute");
            1
        }
    }
}
