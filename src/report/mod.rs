//! Report aggregation and annotation derivation.
//!
//! One report document flows through four stages:
//!
//! | Stage                | Module        | Output                         |
//! |----------------------|---------------|--------------------------------|
//! | Parse                | `document`    | generic element tree           |
//! | Flatten              | `suite`       | uniform `SuiteNode` sequence   |
//! | Aggregate            | `summary`     | immutable `Summary`            |
//! | Annotate + decide    | `annotation`, `verdict` | ordered `Annotation`s |
//!
//! [`analyze_document`] runs the last three; [`analyze_file`] adds reading
//! and parsing. Every document is analysed on its own and nothing carries
//! over between documents.

pub mod annotation;
pub mod document;
pub mod suite;
pub mod summary;
pub mod verdict;

use std::path::Path;

use serde::Serialize;
use tracing::debug;

pub use annotation::{Annotation, AnnotationBuilder, AnnotationLevel};
pub use document::{Document, Element};
pub use summary::Summary;
pub use verdict::Verdict;

use crate::errors::ReportError;

/// Result of analysing one report document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportAnalysis {
    pub summary: Summary,
    pub verdict: Verdict,
    /// The summary annotation first, then one entry per failed case in
    /// suite/case visiting order.
    pub annotations: Vec<Annotation>,
}

impl ReportAnalysis {
    pub fn summary_annotation(&self) -> Option<&Annotation> {
        self.annotations.first()
    }

    pub fn failure_annotations(&self) -> &[Annotation] {
        self.annotations.get(1..).unwrap_or_default()
    }
}

/// Analyse a parsed document.
///
/// Returns `Ok(None)` for a document without a suite collection.
pub fn analyze_document(
    document: &Document,
    strip_from_path: &str,
) -> Result<Option<ReportAnalysis>, ReportError> {
    let Some(suites) = suite::flatten_suites(document) else {
        return Ok(None);
    };

    let summary = Summary::aggregate(&suites)?;
    let verdict = Verdict::from_summary(&summary);

    let mut annotations = vec![verdict::summary_annotation(&summary, verdict)];
    annotations.extend(AnnotationBuilder::new(strip_from_path).build(&suites));

    debug!(
        suites = suites.len(),
        annotations = annotations.len(),
        %verdict,
        "Analysed report: {:?}",
        annotations
    );

    Ok(Some(ReportAnalysis {
        summary,
        verdict,
        annotations,
    }))
}

/// Parse raw report bytes and analyse them. `path` is only used in errors.
pub fn analyze_bytes(
    path: &Path,
    bytes: &[u8],
    strip_from_path: &str,
) -> Result<Option<ReportAnalysis>, ReportError> {
    let document = Document::parse(bytes).map_err(|e| ReportError::parse(path, e))?;
    analyze_document(&document, strip_from_path)
}

/// Read, parse and analyse one report file.
pub async fn analyze_file(
    path: &Path,
    strip_from_path: &str,
) -> Result<Option<ReportAnalysis>, ReportError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    analyze_bytes(path, &bytes, strip_from_path)
}
