#![doc = include_str!("../../../README.md")]

mod arena;
mod builtins;
mod command;
mod error;
mod expr;
mod fmt;
mod frame;
mod glob;
mod hostvalue;
mod interp;
mod nstree;
mod obj;
mod parser;
mod resource;
mod subst;
mod trace_spec;
mod tracer;

pub use crate::{
    arena::Handle,
    command::{BuiltinFn, Command, ForeignCommand, Param, ProcDef},
    error::{ExcKind, RaisedError, ReturnCode, RunError, RunResult},
    hostvalue::HostValue,
    interp::{EvalOutcome, Interp},
    obj::{ForeignObj, Obj, ObjDict},
    resource::{DEFAULT_MAX_RECURSION_DEPTH, LimitedTracker, NoLimitTracker, ResourceLimits, ResourceTracker},
    tracer::{NoopTracer, StderrTracer, Tracer},
};
