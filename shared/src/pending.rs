//! Joins a network completion with its minimum loading-display timer.
//!
//! An operation is ready only once both halves have arrived, in either order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ValentineId, ValentineImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpId(Uuid);

impl OpId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OpId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completed {
    Uploaded(ValentineImage),
    Created(ValentineId),
    Deleted(ValentineId),
}

/// Failures carry the message to show on the originating screen.
pub type Outcome = Result<Completed, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    pub op: OpId,
    pub origin: String,
    pub visit: u64,
    pub outcome: Outcome,
}

#[derive(Debug)]
struct PendingOp {
    origin: String,
    visit: u64,
    outcome: Option<Outcome>,
    elapsed: bool,
}

#[derive(Debug, Default)]
pub struct PendingOps {
    ops: HashMap<OpId, PendingOp>,
}

impl PendingOps {
    /// `visit` identifies the screen instance that asked, see `ScreenRouter::visit`.
    pub fn start(&mut self, origin: impl Into<String>, visit: u64) -> OpId {
        let op = OpId::new();
        self.ops.insert(
            op,
            PendingOp {
                origin: origin.into(),
                visit,
                outcome: None,
                elapsed: false,
            },
        );
        op
    }

    pub fn record_response(&mut self, op: OpId, outcome: Outcome) -> Option<Ready> {
        let entry = self.ops.get_mut(&op)?;
        entry.outcome = Some(outcome);
        self.take_if_ready(op)
    }

    pub fn record_elapsed(&mut self, op: OpId) -> Option<Ready> {
        let entry = self.ops.get_mut(&op)?;
        entry.elapsed = true;
        self.take_if_ready(op)
    }

    fn take_if_ready(&mut self, op: OpId) -> Option<Ready> {
        let entry = self.ops.get(&op)?;
        if !entry.elapsed || entry.outcome.is_none() {
            return None;
        }
        let entry = self.ops.remove(&op)?;
        Some(Ready {
            op,
            origin: entry.origin,
            visit: entry.visit,
            outcome: entry.outcome?,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_then_timer() {
        let mut pending = PendingOps::default();
        let op = pending.start("form/check", 4);
        assert!(pending
            .record_response(op, Ok(Completed::Created(ValentineId(3))))
            .is_none());
        let ready = pending.record_elapsed(op).unwrap();
        assert_eq!(ready.origin, "form/check");
        assert_eq!(ready.visit, 4);
        assert_eq!(ready.outcome, Ok(Completed::Created(ValentineId(3))));
        assert!(pending.is_empty());
    }

    #[test]
    fn timer_then_failure() {
        let mut pending = PendingOps::default();
        let op = pending.start("my-valentines-delete", 1);
        assert!(pending.record_elapsed(op).is_none());
        let ready = pending.record_response(op, Err("boom".into())).unwrap();
        assert_eq!(ready.outcome, Err("boom".to_string()));
    }

    #[test]
    fn unknown_op_is_ignored() {
        let mut pending = PendingOps::default();
        assert!(pending.record_elapsed(OpId::new()).is_none());
        let op = pending.start("x", 1);
        pending.record_elapsed(op);
        pending.record_response(op, Err("late".into()));
        assert!(pending.record_elapsed(op).is_none());
    }
}
