//! Aggregation of suite counts into a per-document [`Summary`].

use serde::{Deserialize, Serialize};

use super::suite::SuiteNode;
use crate::errors::ReportError;

/// Totals for one report document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub test_count: u64,
    pub error_count: u64,
    pub failure_count: u64,
    pub skipped_count: u64,
    /// Sum of all suite durations, in seconds.
    pub total_duration: f64,
}

impl Summary {
    /// Fold every suite into a fresh summary.
    ///
    /// The first malformed numeric attribute aborts the fold.
    pub fn aggregate<'s, 'd: 's, I>(suites: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = &'s SuiteNode<'d>>,
    {
        suites
            .into_iter()
            .try_fold(Summary::default(), |summary, suite| summary.absorb(suite))
    }

    /// Return a new summary with `suite`'s counts added.
    ///
    /// The suite's `skipped` attribute is not accumulated; `skipped_count`
    /// stays at zero.
    pub fn absorb(self, suite: &SuiteNode<'_>) -> Result<Self, ReportError> {
        let add = |total: u64, count: u64, attribute: &'static str| {
            total
                .checked_add(count)
                .ok_or_else(|| ReportError::CountOverflow {
                    suite: suite.name().to_string(),
                    attribute,
                })
        };

        Ok(Self {
            total_duration: self.total_duration + suite.time()?,
            test_count: add(self.test_count, suite.tests()?, "tests")?,
            error_count: add(self.error_count, suite.errors()?, "errors")?,
            failure_count: add(self.failure_count, suite.failures()?, "failures")?,
            skipped_count: self.skipped_count,
        })
    }

    /// Errors and failures together.
    pub fn problem_count(&self) -> u64 {
        self.failure_count.saturating_add(self.error_count)
    }
}
