//! Best-effort undo for writes that span the relational store and the blob
//! store.
//!
//! Each completed step registers a compensation. `commit` discards them;
//! `rollback` runs them newest first and reports the outcome against the error
//! that triggered it.

use std::future::Future;

use coach_core::{CoachError, CoachResult};
use futures::future::BoxFuture;
use futures::FutureExt;

type Compensation = BoxFuture<'static, CoachResult<()>>;

pub struct Saga {
    name: &'static str,
    compensations: Vec<(&'static str, Compensation)>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            compensations: Vec::new(),
        }
    }

    /// Register the undo of a step that just succeeded. Nothing runs until
    /// [`Saga::rollback`].
    pub fn on_rollback<Fut>(&mut self, label: &'static str, undo: Fut)
    where
        Fut: Future<Output = CoachResult<()>> + Send + 'static,
    {
        self.compensations.push((label, undo.boxed()));
    }

    pub fn len(&self) -> usize {
        self.compensations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compensations.is_empty()
    }

    pub fn commit(self) {
        tracing::debug!(saga = self.name, steps = self.compensations.len(), "saga committed");
    }

    /// Undo every registered step, newest first.
    ///
    /// All compensations are attempted even after one fails. Returns
    /// `original` when all succeed, otherwise `CompensationFailed` carrying
    /// `original` and the first compensation error.
    pub async fn rollback(self, original: CoachError) -> CoachError {
        tracing::warn!(saga = self.name, error = %original, "rolling back");

        let mut first_failure = None;
        for (label, undo) in self.compensations.into_iter().rev() {
            match undo.await {
                Ok(()) => tracing::warn!(saga = self.name, step = label, "compensated"),
                Err(err) => {
                    tracing::error!(saga = self.name, step = label, error = %err, "compensation failed");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        match first_failure {
            None => original,
            Some(compensation) => {
                tracing::error!(
                    saga = self.name,
                    original = %original,
                    compensation = %compensation,
                    "partial write left in place"
                );
                CoachError::compensation_failed(original, compensation)
            }
        }
    }
}
