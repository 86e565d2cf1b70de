//! Run verdict and the summary annotation that heads every annotation list.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::annotation::{Annotation, AnnotationLevel};
use super::summary::Summary;

pub const SUMMARY_PATH: &str = "test";
pub const SUMMARY_TITLE: &str = "Test summary";

/// Binary classification of a processed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// At least one error or failure was counted.
    Failure,
    /// Nothing failed.
    Notice,
}

impl Verdict {
    pub fn from_summary(summary: &Summary) -> Self {
        if summary.problem_count() > 0 {
            Verdict::Failure
        } else {
            Verdict::Notice
        }
    }

    pub fn level(self) -> AnnotationLevel {
        match self {
            Verdict::Failure => AnnotationLevel::Failure,
            Verdict::Notice => AnnotationLevel::Notice,
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Verdict::Failure)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// One-line description of a summary, e.g.
/// `Junit Results ran 3 in 1.5 seconds 0 Errored, 0 Failed, 0 Skipped`.
pub fn summary_message(summary: &Summary) -> String {
    format!(
        "Junit Results ran {} in {} seconds {} Errored, {} Failed, {} Skipped",
        summary.test_count,
        summary.total_duration,
        summary.error_count,
        summary.failure_count,
        summary.skipped_count
    )
}

/// The annotation describing the whole document; lines and columns are 0.
pub fn summary_annotation(summary: &Summary, verdict: Verdict) -> Annotation {
    Annotation {
        path: Some(SUMMARY_PATH.to_string()),
        start_line: 0,
        end_line: 0,
        start_column: 0,
        end_column: 0,
        level: verdict.level(),
        title: SUMMARY_TITLE.to_string(),
        message: summary_message(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_notice_when_clean() {
        let summary = Summary {
            test_count: 10,
            ..Summary::default()
        };
        assert_eq!(Verdict::from_summary(&summary), Verdict::Notice);
    }

    #[test]
    fn test_verdict_failure_on_failures_or_errors() {
        let failed = Summary {
            failure_count: 1,
            ..Summary::default()
        };
        let errored = Summary {
            error_count: 2,
            ..Summary::default()
        };
        assert_eq!(Verdict::from_summary(&failed), Verdict::Failure);
        assert_eq!(Verdict::from_summary(&errored), Verdict::Failure);
        assert!(Verdict::from_summary(&errored).is_failure());
    }

    #[test]
    fn test_summary_message_format() {
        let summary = Summary {
            test_count: 3,
            total_duration: 1.5,
            ..Summary::default()
        };
        assert_eq!(
            summary_message(&summary),
            "Junit Results ran 3 in 1.5 seconds 0 Errored, 0 Failed, 0 Skipped"
        );
    }

    #[test]
    fn test_whole_second_duration_has_no_fraction() {
        let summary = Summary {
            test_count: 1,
            total_duration: 2.0,
            ..Summary::default()
        };
        assert!(summary_message(&summary).contains("in 2 seconds"));
    }

    #[test]
    fn test_summary_annotation_fields() {
        let summary = Summary {
            test_count: 2,
            failure_count: 1,
            total_duration: 0.5,
            ..Summary::default()
        };
        let annotation = summary_annotation(&summary, Verdict::Failure);
        assert_eq!(annotation.path.as_deref(), Some("test"));
        assert_eq!(annotation.title, "Test summary");
        assert_eq!(annotation.level, AnnotationLevel::Failure);
        assert_eq!(annotation.start_line, 0);
        assert_eq!(annotation.end_line, 0);
        assert!(annotation.message.contains("1 Failed"));
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Failure.to_string(), "failure");
        assert_eq!(Verdict::Notice.to_string(), "notice");
    }
}
