//! Resource limits: recursion depth, instruction count, wall-clock budget.
//!
//! Mirrors the teacher's `ResourceTracker` split: a `NoLimitTracker` whose
//! checks are trivial no-ops (used by embeddings that trust their scripts)
//! and a `LimitedTracker` that enforces a configured budget. §5 is explicit
//! that there are no cancellation/timeout primitives *inside* the language; a
//! host that wants wall-clock timeouts enforces them by bounding how long it
//! lets a callback run. The `LimitedTracker` here gives embedders the same
//! instruction/time budget mechanism the teacher exposes, without requiring
//! it. `Interp` holds its tracker behind `Box<dyn ResourceTracker>` rather
//! than a generic type parameter: `Command::Host` closures and namespace
//! command tables would otherwise need to carry the tracker type through
//! every signature, for no benefit — a tree-walking dispatcher is already
//! dominated by hash-map lookups and `Rc` clones, not by this one vtable
//! call per command. `NoLimitTracker` is the default for `Interp::new()`.

use std::time::{Duration, Instant};

use crate::error::{ExcKind, RaisedError, RunError};

/// Default recursion depth before the dispatcher raises
/// "too many nested evaluations (infinite loop?)" (§4.4).
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1000;

/// Trait implemented by resource trackers. `Interp` holds one behind
/// `Box<dyn ResourceTracker>` (see its field doc); a no-limit embedding still
/// pays only a vtable call per command, not a monomorphized no-op, since the
/// tracker type is erased at construction time.
pub trait ResourceTracker {
    /// Called once per command dispatch. Returns an error if the budget is exhausted.
    fn on_command(&mut self) -> Result<(), RaisedError>;
    /// Checks whether pushing one more call frame would exceed the recursion limit.
    fn check_recursion_depth(&self, depth: usize) -> Result<(), RaisedError>;
}

/// No-op tracker: all checks compile away. Default for `Interp::new()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    #[inline]
    fn on_command(&mut self) -> Result<(), RaisedError> {
        Ok(())
    }

    #[inline]
    fn check_recursion_depth(&self, _depth: usize) -> Result<(), RaisedError> {
        Ok(())
    }
}

/// Configured limits for a `LimitedTracker`.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub max_recursion_depth: usize,
    pub max_commands: Option<u64>,
    pub max_time: Option<Duration>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_commands: None,
            max_time: None,
        }
    }
}

/// Enforces recursion depth, an optional instruction count, and an optional
/// wall-clock budget.
#[derive(Debug, Clone)]
pub struct LimitedTracker {
    limits: ResourceLimits,
    commands_run: u64,
    start: Instant,
}

impl LimitedTracker {
    #[must_use]
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            commands_run: 0,
            start: Instant::now(),
        }
    }
}

impl ResourceTracker for LimitedTracker {
    fn on_command(&mut self) -> Result<(), RaisedError> {
        self.commands_run += 1;
        if let Some(limit) = self.limits.max_commands
            && self.commands_run > limit
        {
            return Err(RaisedError::new(
                ExcKind::RecursionLimit,
                format!("operation limit exceeded: {} > {limit}", self.commands_run),
            ));
        }
        if let Some(limit) = self.limits.max_time
            && self.start.elapsed() > limit
        {
            return Err(RaisedError::new(
                ExcKind::RecursionLimit,
                format!("time limit exceeded: {:?} > {limit:?}", self.start.elapsed()),
            ));
        }
        Ok(())
    }

    fn check_recursion_depth(&self, depth: usize) -> Result<(), RaisedError> {
        if depth > self.limits.max_recursion_depth {
            return Err(RaisedError::new(
                ExcKind::RecursionLimit,
                "too many nested evaluations (infinite loop?)",
            ));
        }
        Ok(())
    }
}

impl From<RaisedError> for RunError {
    fn from(err: RaisedError) -> Self {
        Self::Exc(Box::new(err))
    }
}
