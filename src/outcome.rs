//! # Result Classification
//!
//! Aggregate classification of per-unit boolean results.
//!
//! Per-unit failures never abort a batch; they are absorbed where they
//! happen and only surface here, as the overall shape of the run.

/// Aggregate result of a batch of per-unit ban applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every unit succeeded (vacuously true for an empty batch)
    FullSuccess,
    /// Some units succeeded, some did not
    Partial,
    /// No unit succeeded anywhere
    NoneSucceeded,
}

impl BatchOutcome {
    /// Classify a sequence of per-unit results.
    pub fn classify<I>(results: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut any = false;
        let mut all = true;
        for result in results {
            any |= result;
            all &= result;
        }

        if all {
            BatchOutcome::FullSuccess
        } else if any {
            BatchOutcome::Partial
        } else {
            BatchOutcome::NoneSucceeded
        }
    }
}

/// Outcome of importing a ban list into a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every supplied ID was already banned; no remote call was made
    NothingNew,
    /// The new IDs were applied, with this aggregate result
    Applied(BatchOutcome),
}
