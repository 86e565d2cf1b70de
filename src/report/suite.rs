//! Typed views over suite and case elements, and the suite flattener.
//!
//! Runners disagree on how a report is shaped. Some wrap every suite in an
//! intermediate `<testsuite>` grouping, others list `<testcase>` elements
//! directly under the top-level suite entry. [`SuiteEntry::classify`] names
//! the shape explicitly and [`flatten_suites`] resolves either one into a
//! uniform sequence of [`SuiteNode`]s.

use super::document::{Document, Element};
use crate::errors::ReportError;

pub const SUITES_TAG: &str = "testsuites";
pub const SUITE_TAG: &str = "testsuite";
pub const CASE_TAG: &str = "testcase";
pub const FAILURE_TAG: &str = "failure";

/// The two shapes a top-level suite entry can take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuiteEntry<'a> {
    /// The entry groups further `<testsuite>` elements; its own counts are
    /// not aggregated.
    Nested(&'a Element),
    /// The entry holds cases directly (or nothing at all) and stands for
    /// itself as a single suite.
    CasesOnly(&'a Element),
}

impl<'a> SuiteEntry<'a> {
    pub fn classify(element: &'a Element) -> Self {
        if element.has_child(CASE_TAG) || !element.has_child(SUITE_TAG) {
            SuiteEntry::CasesOnly(element)
        } else {
            SuiteEntry::Nested(element)
        }
    }

    fn collect_into(self, out: &mut Vec<SuiteNode<'a>>) {
        match self {
            SuiteEntry::CasesOnly(element) => out.push(SuiteNode::new(element)),
            SuiteEntry::Nested(element) => {
                for child in element.children_named(SUITE_TAG) {
                    SuiteEntry::classify(child).collect_into(out);
                }
            }
        }
    }
}

/// Resolve a document's top-level suite collection into a flat suite list.
///
/// Returns `None` when the document has no `<testsuites>` root or the root
/// holds no suites; such a document is skipped rather than reported.
pub fn flatten_suites(document: &Document) -> Option<Vec<SuiteNode<'_>>> {
    if document.root.name != SUITES_TAG || !document.root.has_child(SUITE_TAG) {
        return None;
    }

    let mut suites = Vec::new();
    for entry in document.root.children_named(SUITE_TAG) {
        SuiteEntry::classify(entry).collect_into(&mut suites);
    }
    Some(suites)
}

/// One `<testsuite>` record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuiteNode<'a> {
    element: &'a Element,
}

impl<'a> SuiteNode<'a> {
    pub fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn name(&self) -> &'a str {
        self.element.attr("name").unwrap_or_default()
    }

    /// Suite duration in seconds. A missing or blank attribute counts as zero.
    pub fn time(&self) -> Result<f64, ReportError> {
        match self.numeric_text("time") {
            None => Ok(0.0),
            Some(raw) => raw.parse::<f64>().map_err(|_| self.invalid("time", raw)),
        }
    }

    pub fn tests(&self) -> Result<u64, ReportError> {
        self.count("tests")
    }

    pub fn errors(&self) -> Result<u64, ReportError> {
        self.count("errors")
    }

    pub fn failures(&self) -> Result<u64, ReportError> {
        self.count("failures")
    }

    /// Whether the suite's attributes flag any error or failure.
    ///
    /// This compares the raw attribute text against `"0"`, so an absent
    /// attribute counts as flagged.
    pub fn is_flagged(&self) -> bool {
        self.element.attr("errors") != Some("0") || self.element.attr("failures") != Some("0")
    }

    pub fn cases(&self) -> impl Iterator<Item = CaseNode<'a>> + 'a {
        self.element.children_named(CASE_TAG).map(CaseNode::new)
    }

    fn count(&self, attribute: &'static str) -> Result<u64, ReportError> {
        match self.numeric_text(attribute) {
            None => Ok(0),
            Some(raw) => parse_count(raw).ok_or_else(|| self.invalid(attribute, raw)),
        }
    }

    fn numeric_text(&self, attribute: &str) -> Option<&'a str> {
        self.element
            .attr(attribute)
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }

    fn invalid(&self, attribute: &'static str, raw: &str) -> ReportError {
        ReportError::InvalidNumber {
            suite: self.name().to_string(),
            attribute,
            value: raw.to_string(),
        }
    }
}

/// Parse a non-negative whole count. Integral decimal and exponent forms
/// such as `3.0` or `1e2` are accepted; fractions and negatives are not.
fn parse_count(raw: &str) -> Option<u64> {
    if let Ok(count) = raw.parse::<u64>() {
        return Some(count);
    }
    let value = raw.parse::<f64>().ok()?;
    let integral = value.is_finite() && value >= 0.0 && value.fract() == 0.0;
    (integral && value < u64::MAX as f64).then_some(value as u64)
}

/// One `<testcase>` record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaseNode<'a> {
    element: &'a Element,
}

impl<'a> CaseNode<'a> {
    pub fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn name(&self) -> &'a str {
        self.element.attr("name").unwrap_or_default()
    }

    pub fn file(&self) -> Option<&'a str> {
        self.element.attr("file")
    }

    pub fn line(&self) -> Option<&'a str> {
        self.element.attr("line")
    }

    /// The first `<failure>` payload, if the case failed.
    pub fn failure(&self) -> Option<&'a Element> {
        self.element.child(FAILURE_TAG)
    }

    /// Body text of the failure payload, falling back to its `message`
    /// attribute when the body is blank.
    pub fn failure_message(&self) -> Option<&'a str> {
        let failure = self.failure()?;
        Some(
            failure
                .text()
                .or_else(|| failure.attr("message"))
                .unwrap_or_default(),
        )
    }
}
