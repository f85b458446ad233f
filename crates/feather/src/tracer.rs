//! Interpreter instrumentation, trait-based instead of a logging crate.
//!
//! Feather has no `log`/`tracing` dependency: instrumentation is a zero-cost
//! trait (à la the teacher's `VmTracer`) monomorphized away when the default
//! [`NoopTracer`] is used. [`StderrTracer`] gives a human-readable execution
//! log for interactive debugging without paying for it in production builds.

use crate::obj::Obj;

/// Hook points the evaluator calls into during script execution.
pub trait Tracer {
    /// Called immediately before a command is dispatched.
    fn on_dispatch(&mut self, depth: usize, words: &[Obj]) {
        let _ = (depth, words);
    }
    /// Called when a new call frame is pushed (procedure call, `uplevel`, `namespace eval`).
    fn on_frame_push(&mut self, depth: usize, label: &str) {
        let _ = (depth, label);
    }
    /// Called when a call frame is popped, on every exit path including error unwinding.
    fn on_frame_pop(&mut self, depth: usize) {
        let _ = depth;
    }
    /// Called when a value's internal representation is lazily (re)computed ("shimmering").
    fn on_shimmer(&mut self, kind: &'static str) {
        let _ = kind;
    }
    /// Called when a command raises ERROR.
    fn on_error(&mut self, message: &str) {
        let _ = message;
    }
}

/// The default, zero-cost tracer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Prints a line to stderr for each hook invocation. Intended for interactive
/// debugging of the interpreter itself, not for production embeddings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn on_dispatch(&mut self, depth: usize, words: &[Obj]) {
        let rendered: Vec<String> = words.iter().map(Obj::to_display_string).collect();
        eprintln!("{:depth$}> {}", "", rendered.join(" "), depth = depth * 2);
    }

    fn on_frame_push(&mut self, depth: usize, label: &str) {
        eprintln!("{:depth$}+frame {label}", "", depth = depth * 2);
    }

    fn on_frame_pop(&mut self, depth: usize) {
        eprintln!("{:depth$}-frame", "", depth = depth * 2);
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }
}
