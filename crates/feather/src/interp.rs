//! The interpreter state and its host-facing embedding API (§3 "Interpreter
//! state", §6 "Embedding API").

use std::rc::Rc;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::{
    arena::Arena,
    builtins,
    command::{Command, ForeignCommand, Param, ProcDef},
    error::{ExcKind, RaisedError, ReturnCode, RunError, RunResult},
    frame::{Frame, FrameStack, Link},
    hostvalue::HostValue,
    nstree::NamespaceTree,
    obj::{ForeignObj, Obj},
    parser::{parse_script, ParseOutcome, ParsedCommand},
    resource::{LimitedTracker, NoLimitTracker, ResourceLimits, ResourceTracker},
    subst,
    trace_spec::TraceSpec,
    tracer::{NoopTracer, Tracer},
};

/// Outcome of [`Interp::eval_partial`], the REPL-facing parse/eval split
/// (§6 "parse-only").
pub enum EvalOutcome {
    Ok(Obj),
    Incomplete,
    Error(RaisedError),
}

/// One host-registered foreign-type constructor record (§6).
struct ForeignType {
    command: Rc<ForeignCommand>,
}

/// Identifies where a variable's traces actually live once links and
/// `namespace eval` redirection are resolved (§4.9).
enum TraceOwner {
    Frame(usize),
    Namespace(usize),
}

/// Root interpreter object (§3 "Interpreter state").
pub struct Interp {
    pub(crate) arena: Arena,
    pub(crate) namespaces: NamespaceTree,
    pub(crate) frames: FrameStack,
    pub(crate) result: Obj,
    pub(crate) script_path: Option<String>,
    pub(crate) recursion_depth: usize,
    tracker: Box<dyn ResourceTracker>,
    tracer: Box<dyn Tracer>,
    unknown_handler: Option<String>,
    foreign_types: AHashMap<String, ForeignType>,
    next_foreign_id: u64,
    pub(crate) usage_specs: AHashMap<String, Vec<Param>>,
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

impl Interp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tracker(Box::new(NoLimitTracker))
    }

    #[must_use]
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self::with_tracker(Box::new(LimitedTracker::new(limits)))
    }

    fn with_tracker(tracker: Box<dyn ResourceTracker>) -> Self {
        let namespaces = NamespaceTree::new();
        let global = Frame::for_namespace("::", Vec::new(), "::");
        let mut interp = Self {
            arena: Arena::new(),
            namespaces,
            frames: FrameStack::new(global),
            result: Obj::from_str(""),
            script_path: None,
            recursion_depth: 0,
            tracker,
            tracer: Box::new(NoopTracer),
            unknown_handler: None,
            foreign_types: AHashMap::new(),
            next_foreign_id: 1,
            usage_specs: AHashMap::new(),
        };
        builtins::register_all(&mut interp);
        interp
    }

    pub fn set_tracer(&mut self, tracer: Box<dyn Tracer>) {
        self.tracer = tracer;
    }

    pub(crate) fn tracer_mut(&mut self) -> &mut dyn Tracer {
        self.tracer.as_mut()
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut dyn ResourceTracker {
        self.tracker.as_mut()
    }

    #[must_use]
    pub fn result(&self) -> &Obj {
        &self.result
    }

    pub fn set_unknown_handler(&mut self, name: impl Into<String>) {
        self.unknown_handler = Some(name.into());
    }

    #[must_use]
    pub fn script_path(&self) -> Option<&str> {
        self.script_path.as_deref()
    }

    pub fn set_script_path(&mut self, path: impl Into<String>) {
        self.script_path = Some(path.into());
    }

    // ---- embedding API (§6) ----------------------------------------------

    /// Evaluates a complete script. A script that ends mid-construct is a
    /// `RunError::Exc` with `ExcKind::ParseIncomplete`; REPLs should instead
    /// call [`Self::eval_partial`] to distinguish that case from a hard error.
    pub fn eval(&mut self, src: &str) -> RunResult<Obj> {
        match self.eval_partial(src) {
            EvalOutcome::Ok(v) => Ok(v),
            EvalOutcome::Incomplete => Err(RunError::Exc(Box::new(RaisedError::new(ExcKind::ParseIncomplete, "incomplete script")))),
            EvalOutcome::Error(e) => Err(RunError::Exc(Box::new(e))),
        }
    }

    /// Like [`Self::eval`] but returns the result materialized as a
    /// handle-free [`HostValue`], for hosts that never touch `Obj` directly
    /// (§10.5).
    pub fn eval_host(&mut self, src: &str) -> RunResult<HostValue> {
        self.eval(src).map(|v| HostValue::from_obj(&v))
    }

    /// Parses then evaluates `src`, classifying OK/INCOMPLETE/ERROR explicitly
    /// so a REPL can decide whether to accumulate more input (§6).
    pub fn eval_partial(&mut self, src: &str) -> EvalOutcome {
        let commands = match parse_script(src) {
            ParseOutcome::Complete(cmds) => cmds,
            ParseOutcome::Incomplete => return EvalOutcome::Incomplete,
            ParseOutcome::Error(e) => return EvalOutcome::Error(e),
        };
        match self.eval_commands(&commands) {
            Ok(v) => EvalOutcome::Ok(v),
            Err(RunError::Exc(e)) => EvalOutcome::Error(*e),
            Err(RunError::Return { value, .. }) => EvalOutcome::Ok(value),
            Err(RunError::Break | RunError::Continue) => {
                EvalOutcome::Error(RaisedError::new(ExcKind::ControlFlowEscape, "invoked \"break\" or \"continue\" outside of a loop"))
            }
        }
    }

    /// Evaluates an already-parsed sequence of commands (used internally by
    /// `namespace eval`/`uplevel`/loop bodies as well as by `eval_partial`).
    pub(crate) fn eval_commands(&mut self, commands: &[ParsedCommand]) -> RunResult<Obj> {
        self.arena.enter_eval();
        let result = (|| {
            let mut last = Obj::from_str("");
            for cmd in commands {
                last = self.eval_one_command(cmd)?;
            }
            Ok(last)
        })();
        self.arena.leave_eval();
        if let Ok(v) = &result {
            self.result = v.clone();
        }
        result
    }

    fn eval_one_command(&mut self, cmd: &ParsedCommand) -> RunResult<Obj> {
        if cmd.words.is_empty() {
            return Ok(Obj::from_str(""));
        }
        let mut words: SmallVec<[Obj; 4]> = SmallVec::with_capacity(cmd.words.len());
        for word in &cmd.words {
            let mut value = subst::substitute_word(self, &word.fragments)?;
            if word.expand {
                let items = value.as_list()?;
                words.extend(items.iter().cloned());
            } else {
                words.push(value);
            }
        }
        self.tracer_mut().on_dispatch(self.frames.depth(), &words);
        self.tracker_mut().on_command().map_err(RunError::from)?;
        self.dispatch(&words)
    }

    /// Dispatches a pre-substituted command vector. Bypasses re-parsing
    /// (§6 "call a command by name with pre-built Obj arguments").
    pub fn call(&mut self, words: &[Obj]) -> RunResult<Obj> {
        self.tracker_mut().on_command().map_err(RunError::from)?;
        self.dispatch(words)
    }

    fn dispatch(&mut self, words: &[Obj]) -> RunResult<Obj> {
        let name = words[0].display_string_owned();
        let current_ns = self.current_namespace_id();
        if let Some((_, command)) = self.namespaces.lookup_command(current_ns, &name) {
            return self.invoke(command.clone(), &name, words);
        }
        if let Some(handler) = self.unknown_handler.clone() {
            let mut forwarded = vec![Obj::from_str(&handler)];
            forwarded.extend_from_slice(words);
            if let Some((_, command)) = self.namespaces.lookup_command(current_ns, &handler) {
                return self.invoke(command.clone(), &handler, &forwarded);
            }
        }
        Err(RunError::name_error(format!("invalid command name \"{name}\"")))
    }

    fn invoke(&mut self, command: Command, name: &str, words: &[Obj]) -> RunResult<Obj> {
        match command {
            Command::Builtin(f) => f(self, words),
            Command::Host(f) => f(self, words),
            Command::Procedure(procdef) => self.invoke_procedure(&procdef, words),
            Command::Foreign(fc, id) => (fc.invoke)(self, id, &words[1..]),
        }
        .map_err(|mut e| {
            e.add_trace(format!("while executing \"{name}\""));
            e
        })
    }

    fn invoke_procedure(&mut self, procdef: &ProcDef, words: &[Obj]) -> RunResult<Obj> {
        self.tracker_mut().check_recursion_depth(self.frames.depth()).map_err(RunError::from)?;
        let args = &words[1..];
        let required = procdef.required_count();
        if args.len() < required || (!procdef.has_variadic() && args.len() > procdef.params.len()) {
            return Err(RunError::arity_error(format!("wrong # args: should be \"{}\"", procdef.usage_string())));
        }
        let mut frame = Frame::new(procdef.name.clone(), words.to_vec(), procdef.namespace.clone());
        let mut idx = 0;
        for param in &procdef.params {
            match param {
                Param::Required(pname) => {
                    frame.vars.insert(pname.clone(), args[idx].clone());
                    idx += 1;
                }
                Param::Optional(pname, default) => {
                    let value = args.get(idx).cloned().unwrap_or_else(|| default.clone());
                    frame.vars.insert(pname.clone(), value);
                    idx += 1;
                }
                Param::Variadic => {
                    let rest: Vec<Obj> = args[idx.min(args.len())..].to_vec();
                    frame.vars.insert("args".to_owned(), Obj::from_list(rest));
                    idx = args.len();
                }
            }
        }
        self.tracer_mut().on_frame_push(self.frames.depth(), &procdef.name);
        let prev_active = self.frames.active;
        self.frames.push(frame);
        self.frames.active = self.frames.frames.len() - 1;
        let body_result = match parse_script(&procdef.body) {
            ParseOutcome::Complete(cmds) => self.eval_commands_no_reset(&cmds),
            ParseOutcome::Incomplete | ParseOutcome::Error(_) => Err(RunError::parse_error("invalid procedure body")),
        };
        self.frames.pop();
        self.frames.active = prev_active.min(self.frames.frames.len() - 1);
        self.tracer_mut().on_frame_pop(self.frames.depth());
        match body_result {
            Ok(v) => Ok(v),
            Err(RunError::Return { value, level, code }) => {
                if level > 0 {
                    return Err(RunError::Return { value, level: level - 1, code });
                }
                match code {
                    ReturnCode::Ok | ReturnCode::Return => Ok(value),
                    ReturnCode::Error => Err(RunError::Exc(Box::new(RaisedError::new(ExcKind::UserError, value.display_string_owned())))),
                    ReturnCode::Break => Err(RunError::Break),
                    ReturnCode::Continue => Err(RunError::Continue),
                    ReturnCode::Custom(_) => Ok(value),
                }
            }
            other => other,
        }
    }

    /// Invokes an anonymous (`apply`) or freshly-looked-up procedure body
    /// directly, without a namespace command-table entry.
    pub(crate) fn call_procedure(&mut self, procdef: &ProcDef, words: &[Obj]) -> RunResult<Obj> {
        self.invoke_procedure(procdef, words)
    }

    /// Pops the currently active call frame early, for `tailcall` (§4.8). A
    /// no-op at the global frame, which must never be popped.
    pub(crate) fn pop_for_tailcall(&mut self) {
        if self.frames.active != 0 && self.frames.active == self.frames.depth() - 1 {
            self.frames.pop();
            self.frames.active = self.frames.depth() - 1;
        }
    }

    /// Like [`Self::eval_commands`] but does not manage the arena's
    /// eval-depth counter — used for bodies evaluated inside an already
    ///-running top-level evaluation (procedure bodies, loop bodies, `eval`).
    pub(crate) fn eval_commands_no_reset(&mut self, commands: &[ParsedCommand]) -> RunResult<Obj> {
        let mut last = Obj::from_str("");
        for cmd in commands {
            last = self.eval_one_command(cmd)?;
        }
        Ok(last)
    }

    pub(crate) fn eval_body_str(&mut self, body: &str) -> RunResult<Obj> {
        match parse_script(body) {
            ParseOutcome::Complete(cmds) => self.eval_commands_no_reset(&cmds),
            ParseOutcome::Incomplete => Err(RunError::Exc(Box::new(RaisedError::new(ExcKind::ParseIncomplete, "incomplete script")))),
            ParseOutcome::Error(e) => Err(RunError::Exc(Box::new(e))),
        }
    }

    // ---- namespace/variable helpers used across builtins -----------------

    #[must_use]
    pub fn current_namespace_id(&self) -> usize {
        self.namespaces.find_path(self.namespaces.root(), self.frames.active().namespace.as_str()).unwrap_or_else(|| self.namespaces.root())
    }

    #[must_use]
    pub fn current_namespace_path(&self) -> String {
        self.frames.active().namespace.clone()
    }

    /// Variable resolution per §4.6: links are checked first, then (for a
    /// namespace-backed frame, i.e. global scope or a `namespace eval` body)
    /// the active namespace's table, and only then the frame's own locals.
    pub fn get_var(&mut self, name: &str) -> RunResult<Obj> {
        self.get_var_in(self.frames.active, name)
    }

    fn get_var_in(&mut self, frame_idx: usize, name: &str) -> RunResult<Obj> {
        if let Some(link) = self.frames.frames[frame_idx].links.get(name).cloned() {
            return match link {
                Link::Upvar { target_frame, target_name } => self.get_var_in(target_frame, &target_name),
                Link::Namespace { path, target_name } => self.get_namespace_var(&path, &target_name),
            };
        }
        if self.frames.frames[frame_idx].uses_namespace_vars {
            let path = self.frames.frames[frame_idx].namespace.clone();
            return self.get_namespace_var(&path, name);
        }
        let specs = self.frames.frames[frame_idx].traces.get(name).cloned().unwrap_or_default();
        self.fire_traces(&specs, name, 'r')?;
        self.frames.frames[frame_idx]
            .vars
            .get(name)
            .cloned()
            .ok_or_else(|| RunError::name_error(format!("can't read \"{name}\": no such variable")))
    }

    pub fn set_var(&mut self, name: &str, value: Obj) -> RunResult<Obj> {
        self.set_var_in(self.frames.active, name, value)
    }

    fn set_var_in(&mut self, frame_idx: usize, name: &str, value: Obj) -> RunResult<Obj> {
        if let Some(link) = self.frames.frames[frame_idx].links.get(name).cloned() {
            return match link {
                Link::Upvar { target_frame, target_name } => self.set_var_in(target_frame, &target_name, value),
                Link::Namespace { path, target_name } => self.set_namespace_var(&path, &target_name, value),
            };
        }
        if self.frames.frames[frame_idx].uses_namespace_vars {
            let path = self.frames.frames[frame_idx].namespace.clone();
            return self.set_namespace_var(&path, name, value);
        }
        self.frames.frames[frame_idx].vars.insert(name.to_owned(), value.clone());
        let specs = self.frames.frames[frame_idx].traces.get(name).cloned().unwrap_or_default();
        self.fire_traces(&specs, name, 'w')?;
        Ok(value)
    }

    pub fn unset_var(&mut self, name: &str) -> RunResult<()> {
        let frame_idx = self.frames.active;
        if self.frames.frames[frame_idx].links.remove(name).is_some() {
            return Ok(());
        }
        if self.frames.frames[frame_idx].uses_namespace_vars {
            let path = self.frames.frames[frame_idx].namespace.clone();
            return self.unset_namespace_var(&path, name);
        }
        self.frames.frames[frame_idx]
            .vars
            .remove(name)
            .ok_or_else(|| RunError::name_error(format!("can't unset \"{name}\": no such variable")))?;
        let specs = self.frames.frames[frame_idx].traces.remove(name).unwrap_or_default();
        self.fire_traces(&specs, name, 'u')
    }

    #[must_use]
    pub fn var_exists(&self, name: &str) -> bool {
        let frame = &self.frames.frames[self.frames.active];
        if let Some(link) = frame.links.get(name) {
            return match link {
                Link::Upvar { target_frame, target_name } => self
                    .frames
                    .frames
                    .get(*target_frame)
                    .is_some_and(|f| f.vars.contains_key(target_name) || f.links.contains_key(target_name)),
                Link::Namespace { path, target_name } => self
                    .namespaces
                    .find_path(self.current_namespace_id(), path)
                    .is_some_and(|ns| self.namespaces.node(ns).vars.contains_key(target_name)),
            };
        }
        if frame.uses_namespace_vars {
            return self
                .namespaces
                .find_path(self.namespaces.root(), &frame.namespace)
                .is_some_and(|ns| self.namespaces.node(ns).vars.contains_key(name));
        }
        frame.vars.contains_key(name)
    }

    pub fn get_namespace_var(&mut self, path: &str, name: &str) -> RunResult<Obj> {
        let ns = self
            .namespaces
            .find_path(self.current_namespace_id(), path)
            .ok_or_else(|| RunError::name_error(format!("unknown namespace \"{path}\"")))?;
        let specs = self.namespaces.node(ns).traces.get(name).cloned().unwrap_or_default();
        self.fire_traces(&specs, name, 'r')?;
        self.namespaces
            .node(ns)
            .vars
            .get(name)
            .cloned()
            .ok_or_else(|| RunError::name_error(format!("can't read \"{name}\": no such variable")))
    }

    pub fn set_namespace_var(&mut self, path: &str, name: &str, value: Obj) -> RunResult<Obj> {
        let current = self.current_namespace_id();
        let ns = self.namespaces.ensure_path(current, path);
        self.namespaces.node_mut(ns).vars.insert(name.to_owned(), value.clone());
        let specs = self.namespaces.node(ns).traces.get(name).cloned().unwrap_or_default();
        self.fire_traces(&specs, name, 'w')?;
        Ok(value)
    }

    pub fn unset_namespace_var(&mut self, path: &str, name: &str) -> RunResult<()> {
        let ns = self
            .namespaces
            .find_path(self.current_namespace_id(), path)
            .ok_or_else(|| RunError::name_error(format!("unknown namespace \"{path}\"")))?;
        self.namespaces
            .node_mut(ns)
            .vars
            .remove(name)
            .ok_or_else(|| RunError::name_error(format!("can't unset \"{name}\": no such variable")))?;
        let specs = self.namespaces.node_mut(ns).traces.remove(name).unwrap_or_default();
        self.fire_traces(&specs, name, 'u')
    }

    /// Runs the command half of every matching trace spec, in registration
    /// order, stopping at the first one that raises an error (§4.9).
    fn fire_traces(&mut self, specs: &[TraceSpec], name: &str, op: char) -> RunResult<()> {
        for spec in specs {
            if spec.fires_on(op) {
                let words = vec![Obj::from_str(&spec.command), Obj::from_str(name), Obj::from_str(""), Obj::from_str(op.to_string().as_str())];
                self.call(&words)?;
            }
        }
        Ok(())
    }

    /// Resolves where a name's traces live: the frame/namespace actually
    /// holding the value, following `upvar`/`global`/`variable` links and
    /// `namespace eval` redirection the same way variable access does.
    fn resolve_trace_owner(&self, frame_idx: usize, name: &str) -> (TraceOwner, String) {
        if let Some(link) = self.frames.frames[frame_idx].links.get(name).cloned() {
            return match link {
                Link::Upvar { target_frame, target_name } => self.resolve_trace_owner(target_frame, &target_name),
                Link::Namespace { path, target_name } => {
                    let ns = self.namespaces.find_path(self.current_namespace_id(), &path).unwrap_or_else(|| self.namespaces.root());
                    (TraceOwner::Namespace(ns), target_name)
                }
            };
        }
        if self.frames.frames[frame_idx].uses_namespace_vars {
            let ns = self
                .namespaces
                .find_path(self.namespaces.root(), &self.frames.frames[frame_idx].namespace)
                .unwrap_or_else(|| self.namespaces.root());
            return (TraceOwner::Namespace(ns), name.to_owned());
        }
        (TraceOwner::Frame(frame_idx), name.to_owned())
    }

    pub fn trace_add(&mut self, name: &str, ops: &str, command: &str) {
        let (owner, target) = self.resolve_trace_owner(self.frames.active, name);
        let spec = TraceSpec { ops: ops.to_owned(), command: command.to_owned() };
        match owner {
            TraceOwner::Frame(f) => self.frames.frames[f].traces.entry(target).or_default().push(spec),
            TraceOwner::Namespace(ns) => self.namespaces.node_mut(ns).traces.entry(target).or_default().push(spec),
        }
    }

    pub fn trace_remove(&mut self, name: &str, ops: &str, command: &str) {
        let (owner, target) = self.resolve_trace_owner(self.frames.active, name);
        let table = match owner {
            TraceOwner::Frame(f) => &mut self.frames.frames[f].traces,
            TraceOwner::Namespace(ns) => &mut self.namespaces.node_mut(ns).traces,
        };
        if let Some(specs) = table.get_mut(&target) {
            specs.retain(|s| !(s.ops == ops && s.command == command));
        }
    }

    #[must_use]
    pub fn trace_list(&self, name: &str) -> Vec<(String, String)> {
        let (owner, target) = self.resolve_trace_owner(self.frames.active, name);
        let specs = match owner {
            TraceOwner::Frame(f) => self.frames.frames[f].traces.get(&target),
            TraceOwner::Namespace(ns) => self.namespaces.node(ns).traces.get(&target),
        };
        specs.map(|v| v.iter().map(|s| (s.ops.clone(), s.command.clone())).collect()).unwrap_or_default()
    }

    /// Reads a variable into a handle-free [`HostValue`] (§10.5).
    pub fn get_var_host(&mut self, name: &str) -> RunResult<HostValue> {
        self.get_var(name).map(|v| HostValue::from_obj(&v))
    }

    /// Sets a variable from a handle-free [`HostValue`] (§10.5).
    pub fn set_var_host(&mut self, name: &str, value: &HostValue) -> RunResult<()> {
        self.set_var(name, value.to_obj()).map(|_| ())
    }

    pub fn install_upvar_link(&mut self, local_name: &str, level: &str, target_name: &str) -> RunResult<()> {
        let from = self.frames.active;
        let target_frame = self
            .frames
            .resolve_level(level, from)
            .ok_or_else(|| RunError::name_error(format!("bad level \"{level}\"")))?;
        self.frames.active_mut().links.insert(
            local_name.to_owned(),
            Link::Upvar { target_frame, target_name: target_name.to_owned() },
        );
        Ok(())
    }

    pub fn install_global_link(&mut self, local_name: &str) {
        self.frames.active_mut().links.insert(
            local_name.to_owned(),
            Link::Namespace { path: "::".to_owned(), target_name: local_name.to_owned() },
        );
    }

    pub fn install_namespace_link(&mut self, local_name: &str) {
        let path = self.current_namespace_path();
        self.frames.active_mut().links.insert(local_name.to_owned(), Link::Namespace { path, target_name: local_name.to_owned() });
    }

    /// Runs `body` with `level` temporarily made the active frame (`uplevel`, §4.6).
    pub fn with_uplevel(&mut self, level: &str, body: &str) -> RunResult<Obj> {
        let target = self.frames.resolve_level(level, self.frames.active).ok_or_else(|| RunError::name_error(format!("bad level \"{level}\"")))?;
        let prev = self.frames.active;
        self.frames.active = target;
        let result = self.eval_body_str(body);
        self.frames.active = prev;
        result
    }

    /// Runs `body` with `path` active as a namespace-backed frame (`namespace eval`, §4.7).
    pub fn with_namespace_eval(&mut self, path: &str, body: &str) -> RunResult<Obj> {
        let current = self.current_namespace_id();
        let ns = self.namespaces.ensure_path(current, path);
        let ns_path = self.namespaces.path_of(ns).to_owned();
        let frame = Frame::for_namespace("namespace eval", Vec::new(), ns_path);
        self.frames.push(frame);
        let prev_active = self.frames.active;
        self.frames.active = self.frames.frames.len() - 1;
        let result = self.eval_body_str(body);
        self.frames.pop();
        self.frames.active = prev_active.min(self.frames.frames.len() - 1);
        result
    }

    pub fn define_procedure(&mut self, name: &str, procdef: ProcDef) {
        let current = self.current_namespace_id();
        let (_, segments) = NamespaceTree::split_path(name);
        if segments.len() > 1 {
            let leaf = segments.last().copied().unwrap_or(name);
            let ns_path = segments[..segments.len() - 1].join("::");
            let ns = self.namespaces.ensure_path(current, &ns_path);
            self.namespaces.set_command(ns, leaf, Command::Procedure(Rc::new(procdef)));
        } else {
            self.namespaces.set_command(current, name, Command::Procedure(Rc::new(procdef)));
        }
    }

    pub fn rename_command(&mut self, old: &str, new: &str) -> RunResult<()> {
        let current = self.current_namespace_id();
        let (ns, command) = self
            .namespaces
            .lookup_command(current, old)
            .map(|(ns, c)| (ns, c.clone()))
            .ok_or_else(|| RunError::name_error(format!("can't rename \"{old}\": command doesn't exist")))?;
        self.namespaces.remove_command(ns, old.rsplit("::").next().unwrap_or(old));
        if !new.is_empty() {
            self.namespaces.set_command(current, new, command);
        }
        Ok(())
    }

    /// Registers a declarative parameter spec for `name`, used by the
    /// `usage` command to render a canonical usage string and validate call
    /// arity the same way a `proc` definition would (§6 "Feather extension").
    pub fn define_usage(&mut self, name: &str, params: Vec<Param>) {
        self.usage_specs.insert(name.to_owned(), params);
    }

    /// Renders the `name usage ...` string for a registered spec.
    #[must_use]
    pub fn usage_string(&self, name: &str) -> Option<String> {
        let params = self.usage_specs.get(name)?;
        let mut parts = vec![name.to_owned()];
        for p in params {
            match p {
                Param::Required(n) => parts.push(n.clone()),
                Param::Optional(n, _) => parts.push(format!("?{n}?")),
                Param::Variadic => parts.push("?args?".to_owned()),
            }
        }
        Some(parts.join(" "))
    }

    /// Validates `args` (the full word vector including the command name)
    /// against a registered usage spec, the way the procedure dispatcher
    /// validates `proc` arity (§4.8).
    pub fn check_usage(&self, name: &str, args: &[Obj]) -> RunResult<()> {
        let Some(params) = self.usage_specs.get(name) else {
            return Err(RunError::name_error(format!("no usage spec registered for \"{name}\"")));
        };
        let required = params.iter().filter(|p| matches!(p, Param::Required(_))).count();
        let variadic = matches!(params.last(), Some(Param::Variadic));
        let given = args.len().saturating_sub(1);
        let max = params.len();
        if given < required || (!variadic && given > max) {
            let usage = self.usage_string(name).unwrap_or_default();
            return Err(RunError::arity_error(format!("wrong # args: should be \"{usage}\"")));
        }
        Ok(())
    }

    // ---- host registration (§6) -------------------------------------------

    pub fn register_command(&mut self, name: &str, f: BuiltinFnAlias) {
        self.namespaces.set_command(self.namespaces.root(), name, Command::Builtin(f));
    }

    pub fn register_host_command(&mut self, name: &str, f: Rc<dyn Fn(&mut Self, &[Obj]) -> RunResult<Obj>>) {
        self.namespaces.set_command(self.namespaces.root(), name, Command::Host(f));
    }

    pub fn register_foreign_type(&mut self, type_name: &str, invoke: Rc<dyn Fn(&mut Self, u64, &[Obj]) -> RunResult<Obj>>) {
        self.foreign_types.insert(
            type_name.to_owned(),
            ForeignType {
                command: Rc::new(ForeignCommand { type_name: Rc::from(type_name), invoke }),
            },
        );
    }

    /// Constructs a new foreign instance of a registered type, returning the
    /// handle value scripts will stringify and dispatch through (§6).
    pub fn new_foreign_instance(&mut self, type_name: &str) -> RunResult<Obj> {
        let foreign_type = self
            .foreign_types
            .get(type_name)
            .ok_or_else(|| RunError::name_error(format!("unknown foreign type \"{type_name}\"")))?;
        let id = self.next_foreign_id;
        self.next_foreign_id += 1;
        let handle_name = format!("{type_name}{id}");
        self.namespaces.set_command(self.namespaces.root(), &handle_name, Command::Foreign(Rc::clone(&foreign_type.command), id));
        Ok(Obj::from_foreign(ForeignObj { type_name: Rc::from(type_name), payload: id }))
    }
}

pub type BuiltinFnAlias = crate::command::BuiltinFn;
