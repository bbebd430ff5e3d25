//! Flat index from global batch number to owning case.

use serde::{Deserialize, Serialize};

/// Batch count produced by one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// Case identifier
    pub case_id: String,

    /// Number of batches persisted for the case
    pub steps: usize,
}

impl CaseSummary {
    pub fn new(case_id: impl Into<String>, steps: usize) -> Self {
        Self {
            case_id: case_id.into(),
            steps,
        }
    }
}

/// Where a global batch lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLocation<'a> {
    /// Case that owns the batch
    pub case_id: &'a str,

    /// Batch offset within that case
    pub local: usize,
}

/// One entry per batch, in processing order.
///
/// Position `n` holds the id of the case that owns global batch `n`; a
/// contiguous run of the same id gives that case's batch count. The index
/// serializes as a plain JSON array of case ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseIndex {
    entries: Vec<String>,
}

impl CaseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of batches across all cases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Case id at a global batch position.
    pub fn get(&self, global: usize) -> Option<&str> {
        self.entries.get(global).map(String::as_str)
    }

    /// Resolve a global batch number to its case and local offset.
    ///
    /// The local offset is the number of entries with the same id directly
    /// preceding `global` in the same run.
    pub fn locate(&self, global: usize) -> Option<BatchLocation<'_>> {
        let case_id = self.entries.get(global)?;
        let local = self.entries[..global]
            .iter()
            .rev()
            .take_while(|id| *id == case_id)
            .count();
        Some(BatchLocation {
            case_id: case_id.as_str(),
            local,
        })
    }

    /// Run-length view of the index: `(case_id, batches)` per run.
    pub fn batch_counts(&self) -> Vec<CaseSummary> {
        let mut runs: Vec<CaseSummary> = Vec::new();
        for id in &self.entries {
            match runs.last_mut() {
                Some(run) if &run.case_id == id => run.steps += 1,
                _ => runs.push(CaseSummary::new(id.clone(), 1)),
            }
        }
        runs
    }

    fn push_case(&mut self, summary: CaseSummary) {
        let CaseSummary { case_id, steps } = summary;
        self.entries.extend(std::iter::repeat(case_id).take(steps));
    }
}

impl Extend<CaseSummary> for CaseIndex {
    fn extend<I: IntoIterator<Item = CaseSummary>>(&mut self, iter: I) {
        for summary in iter {
            self.push_case(summary);
        }
    }
}

impl FromIterator<CaseSummary> for CaseIndex {
    fn from_iter<I: IntoIterator<Item = CaseSummary>>(iter: I) -> Self {
        let mut index = CaseIndex::new();
        index.extend(iter);
        index
    }
}
