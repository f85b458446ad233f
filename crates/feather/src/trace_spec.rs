//! Variable trace records (`trace` command, §4.9 "at minimum").
//!
//! A trace spec lives on the storage slot it watches — a [`crate::frame::Frame`]'s
//! local `traces` table for a plain local, or a [`crate::nstree::Namespace`]'s for a
//! `global`/`variable`-linked name — rather than in one interpreter-wide table,
//! so that two unrelated locals named `x` in different frames never collide.

/// One `trace add variable` registration: which operations it fires on and
/// the command to invoke (receives `name1 name2 op` appended, per TCL's
/// trace callback convention; `name2` is always empty since Feather has no
/// array-element-level tracing).
#[derive(Debug, Clone)]
pub struct TraceSpec {
    pub ops: String,
    pub command: String,
}

impl TraceSpec {
    #[must_use]
    pub fn fires_on(&self, op: char) -> bool {
        self.ops.contains(op)
    }
}
