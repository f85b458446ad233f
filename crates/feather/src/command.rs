//! Command bindings and dispatch precedence (§3 "Command", §4.4, §9 ensembles).

use std::{fmt, rc::Rc};

use crate::{error::RunResult, interp::Interp, obj::Obj};

/// One parameter in a procedure's parameter spec (§4.8).
#[derive(Debug, Clone)]
pub enum Param {
    /// A bare name: required.
    Required(String),
    /// A two-element `{name default}` entry.
    Optional(String, Obj),
    /// The literal final `args` entry: binds remaining arguments as a list.
    Variadic,
}

/// A user-defined procedure or `apply` lambda body (§4.8).
#[derive(Debug, Clone)]
pub struct ProcDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: String,
    /// Namespace the procedure's body evaluates in (its own, or, for
    /// `apply {params body ns}`, the caller-specified one).
    pub namespace: String,
}

impl ProcDef {
    /// Number of required parameters, used for the default arity-error message.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| matches!(p, Param::Required(_))).count()
    }

    #[must_use]
    pub fn has_variadic(&self) -> bool {
        matches!(self.params.last(), Some(Param::Variadic))
    }

    /// Renders the canonical usage string used in arity-error messages.
    #[must_use]
    pub fn usage_string(&self) -> String {
        let mut parts = vec![self.name.clone()];
        for p in &self.params {
            match p {
                Param::Required(name) => parts.push(name.clone()),
                Param::Optional(name, _) => parts.push(format!("?{name}?")),
                Param::Variadic => parts.push("?args?".to_owned()),
            }
        }
        parts.join(" ")
    }
}

/// Host-implemented foreign-object method table (§6 "foreign-object handle
/// syntax"): the value produced by a registered constructor stringifies to a
/// handle that is itself a command dispatching to `invoke`.
pub struct ForeignCommand {
    pub type_name: Rc<str>,
    pub invoke: Rc<dyn Fn(&mut Interp, u64, &[Obj]) -> RunResult<Obj>>,
}

impl fmt::Debug for ForeignCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignCommand").field("type_name", &self.type_name).finish_non_exhaustive()
    }
}

pub type BuiltinFn = fn(&mut Interp, &[Obj]) -> RunResult<Obj>;

/// A binding in a namespace's command table (§3 "Command").
#[derive(Clone)]
pub enum Command {
    /// A command implemented in this crate (`set`, `list`, `dict`, …).
    Builtin(BuiltinFn),
    /// A command registered by the host at runtime (§6 embedding API).
    Host(Rc<dyn Fn(&mut Interp, &[Obj]) -> RunResult<Obj>>),
    /// A `proc`/`apply`-defined procedure.
    Procedure(Rc<ProcDef>),
    /// A foreign-object instance's method dispatcher, bound to one instance
    /// by its `payload` id.
    Foreign(Rc<ForeignCommand>, u64),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(_) => f.write_str("Command::Builtin"),
            Self::Host(_) => f.write_str("Command::Host"),
            Self::Procedure(p) => f.debug_tuple("Command::Procedure").field(&p.name).finish(),
            Self::Foreign(c, id) => f.debug_tuple("Command::Foreign").field(&c.type_name).field(id).finish(),
        }
    }
}

impl Command {
    #[cfg(test)]
    #[must_use]
    pub fn builtin_placeholder() -> Self {
        Self::Builtin(|_interp, _args| Ok(Obj::from_str("")))
    }
}
