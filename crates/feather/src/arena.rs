//! Handle table (§3, §4.1, §9 "handle tables").
//!
//! Two fixed-growth tables coexist per interpreter: `scratch`, cleared when
//! the outermost top-level evaluation returns, and `permanent`, holding
//! materialized values reachable from variables, namespaces, procedure
//! bodies, and return options. Handles from the two spaces are disjoint by
//! construction (the high bit of the index selects the space), so a stray
//! handle from the wrong table is caught immediately rather than silently
//! aliasing the wrong slot.
//!
//! Internally the evaluator passes `Obj` by value (cheap: list/dict/foreign
//! payloads are `Rc`-backed, so a clone is a refcount bump) rather than
//! threading handles through every frame and namespace table — handles exist
//! at the boundary this module models, used by the host-facing API (§6) so
//! that embedders get the documented "small integer identifies a value,
//! invalid outside its top-level evaluation" contract without the core
//! evaluator needing to look anything up through an extra indirection.

const PERMANENT_BIT: u32 = 1 << 31;

/// An opaque, nonzero handle into one interpreter's arena (§3 "Handle").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    #[must_use]
    pub fn is_permanent(self) -> bool {
        self.0 & PERMANENT_BIT != 0
    }

    fn index(self) -> usize {
        (self.0 & !PERMANENT_BIT) as usize
    }
}

use crate::obj::Obj;

/// The scratch/permanent handle table for one interpreter instance.
///
/// `eval_depth` tracks re-entrant top-level evaluations (a host callback
/// invoked from inside a command can itself call back into the interpreter,
/// §5): the scratch table is only cleared when the outermost evaluation
/// returns, i.e. when `eval_depth` drops back to zero, so nested evaluations
/// never observe their caller's handles going stale mid-flight.
#[derive(Debug, Default)]
pub struct Arena {
    scratch: Vec<Option<Obj>>,
    scratch_free: Vec<u32>,
    permanent: Vec<Option<Obj>>,
    permanent_free: Vec<u32>,
    eval_depth: u32,
}

impl Arena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call on entry to a top-level evaluation; pairs with [`Self::leave_eval`].
    pub fn enter_eval(&mut self) {
        self.eval_depth += 1;
    }

    /// Call on exit from a top-level evaluation. Clears the scratch table
    /// only once the outermost evaluation has returned.
    pub fn leave_eval(&mut self) {
        debug_assert!(self.eval_depth > 0, "leave_eval without matching enter_eval");
        self.eval_depth = self.eval_depth.saturating_sub(1);
        if self.eval_depth == 0 {
            self.scratch.clear();
            self.scratch_free.clear();
        }
    }

    /// Registers a scratch value, valid only until the current top-level
    /// evaluation (and any nested re-entries) finish.
    pub fn alloc_scratch(&mut self, value: Obj) -> Handle {
        if let Some(idx) = self.scratch_free.pop() {
            self.scratch[idx as usize] = Some(value);
            return Handle(idx);
        }
        let idx = u32::try_from(self.scratch.len()).expect("scratch arena overflow");
        self.scratch.push(Some(value));
        Handle(idx)
    }

    /// Deep-materializes a value into the permanent table (the "materialize"
    /// operation of §4.1), returning a handle stable across evaluations.
    pub fn materialize(&mut self, value: Obj) -> Handle {
        let idx = if let Some(idx) = self.permanent_free.pop() {
            self.permanent[idx as usize] = Some(value);
            idx
        } else {
            let idx = u32::try_from(self.permanent.len()).expect("permanent arena overflow");
            self.permanent.push(Some(value));
            idx
        };
        Handle(idx | PERMANENT_BIT)
    }

    /// Registers a permanent value as a fresh scratch handle for the current
    /// evaluation (the "wrap" operation of §4.1).
    pub fn wrap(&mut self, handle: Handle) -> Option<Handle> {
        let value = self.get(handle)?.clone();
        Some(self.alloc_scratch(value))
    }

    /// Releases a permanent slot (e.g. a destroyed foreign instance or an
    /// explicitly freed return-option value).
    pub fn free_permanent(&mut self, handle: Handle) {
        if handle.is_permanent()
            && let Some(slot) = self.permanent.get_mut(handle.index())
        {
            *slot = None;
            self.permanent_free.push(handle.0 & !PERMANENT_BIT);
        }
    }

    #[must_use]
    pub fn get(&self, handle: Handle) -> Option<&Obj> {
        let table = if handle.is_permanent() { &self.permanent } else { &self.scratch };
        table.get(handle.index())?.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Obj> {
        let table = if handle.is_permanent() { &mut self.permanent } else { &mut self.scratch };
        table.get_mut(handle.index())?.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_resets_only_at_outermost_eval() {
        let mut arena = Arena::new();
        arena.enter_eval();
        let h = arena.alloc_scratch(Obj::from_str("hello"));
        arena.enter_eval(); // simulated re-entrant host callback
        arena.leave_eval();
        assert!(arena.get(h).is_some(), "nested leave must not reset scratch");
        arena.leave_eval();
        assert!(arena.get(h).is_none(), "outermost leave must reset scratch");
    }

    #[test]
    fn permanent_handles_survive_scratch_reset() {
        let mut arena = Arena::new();
        let h = arena.materialize(Obj::from_str("kept"));
        arena.enter_eval();
        arena.leave_eval();
        assert_eq!(arena.get(h).unwrap().to_display_string(), "kept");
    }

    #[test]
    fn handle_spaces_are_disjoint() {
        let mut arena = Arena::new();
        let s = arena.alloc_scratch(Obj::from_str("s"));
        let p = arena.materialize(Obj::from_str("p"));
        assert!(!s.is_permanent());
        assert!(p.is_permanent());
    }
}
