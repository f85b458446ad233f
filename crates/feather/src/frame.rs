//! Call frames and link resolution (§3 "Call frame", §4.6).
//!
//! A frame owns its locals outright; cross-frame references (`upvar`,
//! `global`, `variable`) are modeled as non-owning `(level, name)` or
//! `(namespace path, name)` pairs resolved on every access rather than
//! materialized pointers, per §9's guidance against back-references that
//! could form cycles.

use ahash::AHashMap;

use crate::{obj::Obj, trace_spec::TraceSpec};

/// A link installed by `upvar`, `global`, or `variable` (§4.6).
#[derive(Debug, Clone)]
pub enum Link {
    /// Aliases a local name to `target_name` in the frame `levels_up` callers
    /// back from the frame that owns this link (absolute level resolved to a
    /// relative one at install time).
    Upvar { target_frame: usize, target_name: String },
    /// Aliases a local name to a variable in a namespace's variable table.
    Namespace { path: String, target_name: String },
}

/// One call-stack entry (§3 "Call frame").
#[derive(Debug, Clone)]
pub struct Frame {
    /// Name of the command that pushed this frame, for `info level`/stack traces.
    pub caller_command: String,
    /// The full argument vector the callee was invoked with.
    pub caller_args: Vec<Obj>,
    /// Local variable storage, used unless [`Self::uses_namespace_vars`] is set.
    pub vars: AHashMap<String, Obj>,
    pub links: AHashMap<String, Link>,
    /// Trace specs for locals in this frame's own `vars` table (§4.9 `trace`).
    pub traces: AHashMap<String, Vec<TraceSpec>>,
    /// Fully-qualified path of the namespace active while this frame runs.
    pub namespace: String,
    /// When set, variable reads/writes/unsets against this frame's *unlinked*
    /// names bypass `vars` entirely and go straight to `namespace`'s variable
    /// table (§4.6 "frame 0 IS the root namespace's variable table, one
    /// storage location, two views"; `namespace eval` installs the same
    /// swap for its own namespace). A plain `HashMap` can't alias another
    /// one's storage, so this flag is the substitute for "swapping the vars
    /// table handle": both read paths end up at the same `Namespace::vars`.
    pub uses_namespace_vars: bool,
    pub line: u32,
}

impl Frame {
    #[must_use]
    pub fn new(caller_command: impl Into<String>, caller_args: Vec<Obj>, namespace: impl Into<String>) -> Self {
        Self {
            caller_command: caller_command.into(),
            caller_args,
            vars: AHashMap::new(),
            links: AHashMap::new(),
            traces: AHashMap::new(),
            namespace: namespace.into(),
            uses_namespace_vars: false,
            line: 0,
        }
    }

    /// A frame whose locals are the given namespace's variable table (the
    /// global frame, and every `namespace eval` frame, §4.6/§4.7).
    #[must_use]
    pub fn for_namespace(caller_command: impl Into<String>, caller_args: Vec<Obj>, namespace: impl Into<String>) -> Self {
        Self {
            uses_namespace_vars: true,
            ..Self::new(caller_command, caller_args, namespace)
        }
    }
}

/// The frame stack plus the index of the currently active frame. `uplevel`
/// and `namespace eval` temporarily repoint `active` without popping frames
/// (§4.6, §4.7), which is why it is tracked separately from `frames.len()`.
#[derive(Debug, Default)]
pub struct FrameStack {
    pub frames: Vec<Frame>,
    pub active: usize,
}

impl FrameStack {
    #[must_use]
    pub fn new(global: Frame) -> Self {
        Self {
            frames: vec![global],
            active: 0,
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: Frame) -> usize {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "must never pop the global frame");
        self.frames.pop();
    }

    #[must_use]
    pub fn active(&self) -> &Frame {
        &self.frames[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.active]
    }

    /// Resolves `#N` (absolute) or a bare relative count to an absolute frame
    /// index, per `upvar`/`uplevel`'s `?level?` argument (§4.6).
    #[must_use]
    pub fn resolve_level(&self, level: &str, from: usize) -> Option<usize> {
        if let Some(abs) = level.strip_prefix('#') {
            let n: usize = abs.parse().ok()?;
            return (n < self.frames.len()).then_some(n);
        }
        let n: usize = level.parse().ok()?;
        from.checked_sub(n)
    }
}
