//! Error taxonomy and control-transfer result codes.
//!
//! Evaluation in Feather never throws a native Rust panic for a script-caused
//! failure (§4.10, §7): every fallible interpreter-internal operation returns
//! `RunResult<T>`, and propagation of ERROR/BREAK/CONTINUE/RETURN is modeled
//! as an enum in result position rather than unwinding, per §9's design note
//! ("extended return codes, not exceptions").

use std::fmt;

use crate::obj::Obj;

/// Result type alias for operations that can fail with a catchable script error
/// or that need to transfer control (BREAK/CONTINUE/RETURN) out of normal flow.
pub type RunResult<T> = Result<T, RunError>;

/// Taxonomy of error kinds, per §7. This is used to pick the default
/// `-errorcode` value and to let `catch`/`try ... trap` classify failures
/// without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcKind {
    /// Malformed source text at a position (§4.3, §7 "Parse error").
    ParseError,
    /// Source text ends inside an unterminated construct; not a hard failure,
    /// callers (REPLs) should accumulate more input (§4.3, §7 "Parse incomplete").
    ParseIncomplete,
    /// A value could not be coerced to the requested representation (§4.2).
    TypeError,
    /// `divide by zero`, math-function domain violation (§4.5).
    DomainError,
    /// Unknown command, variable, namespace, or method (§4.4, §4.7).
    NameError,
    /// Wrong number of arguments to a command or procedure (§4.8, §4.9).
    ArityError,
    /// BREAK or CONTINUE used outside a loop (§4.4).
    ControlFlowEscape,
    /// The dispatcher's recursion limit was exceeded (§4.4).
    RecursionLimit,
    /// Raised via `error`, `throw`, or `return -code error` (§4.8, §4.9).
    UserError,
}

impl fmt::Display for ExcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ParseError => "PARSE",
            Self::ParseIncomplete => "PARSE_INCOMPLETE",
            Self::TypeError => "TYPE",
            Self::DomainError => "DOMAIN",
            Self::NameError => "NAME",
            Self::ArityError => "ARITY",
            Self::ControlFlowEscape => "CONTROL_FLOW",
            Self::RecursionLimit => "RECURSION",
            Self::UserError => "NONE",
        };
        f.write_str(s)
    }
}

/// A raised, catchable script error: a human-readable message, an error
/// classification, an error-code list, and a concise stack trace (§4.10, §7).
#[derive(Debug, Clone)]
pub struct RaisedError {
    pub kind: ExcKind,
    pub message: String,
    /// `-errorcode` value; `NONE` unless the raiser supplied one.
    pub error_code: Obj,
    /// `-errorinfo`: concise stack of command traces, most recent first.
    pub error_info: Vec<String>,
}

impl RaisedError {
    #[must_use]
    pub fn new(kind: ExcKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            error_code: Obj::from_str("NONE"),
            error_info: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_error_code(mut self, code: Obj) -> Self {
        self.error_code = code;
        self
    }

    /// Pushes one more frame of context onto `-errorinfo`, innermost first.
    pub fn add_trace(&mut self, context: impl Into<String>) {
        self.error_info.push(context.into());
    }
}

impl fmt::Display for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// `return`'s `-level`/`-code` options (§4.8), threaded through `RunError::Return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok,
    Error,
    Return,
    Break,
    Continue,
    /// An arbitrary positive integer code supplied via `return -code N`.
    Custom(i64),
}

impl ReturnCode {
    #[must_use]
    pub fn from_i64(n: i64) -> Self {
        match n {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::Return,
            3 => Self::Break,
            4 => Self::Continue,
            other => Self::Custom(other),
        }
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
            Self::Return => 2,
            Self::Break => 3,
            Self::Continue => 4,
            Self::Custom(n) => n,
        }
    }
}

/// The non-local control transfers a script can initiate, plus the catchable
/// error path. This is Feather's enum-in-result-position stand-in for
/// exceptions (§9): `eval_script` propagates it upward until a frame boundary
/// (procedure call, loop, `catch`/`try`) consumes it.
#[derive(Debug, Clone)]
pub enum RunError {
    /// ERROR: a catchable script failure.
    Exc(Box<RaisedError>),
    /// RETURN: unwinds exactly one procedure frame, carrying the result value,
    /// the `-level` remaining to unwind, and the `-code` to resume with.
    Return {
        value: Obj,
        level: u32,
        code: ReturnCode,
    },
    /// BREAK: legal only inside a loop body.
    Break,
    /// CONTINUE: legal only inside a loop body.
    Continue,
}

impl RunError {
    #[must_use]
    pub fn user(message: impl Into<String>) -> Self {
        Self::Exc(Box::new(RaisedError::new(ExcKind::UserError, message)))
    }

    #[must_use]
    pub fn name_error(message: impl Into<String>) -> Self {
        Self::Exc(Box::new(RaisedError::new(ExcKind::NameError, message)))
    }

    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Exc(Box::new(RaisedError::new(ExcKind::TypeError, message)))
    }

    #[must_use]
    pub fn domain_error(message: impl Into<String>) -> Self {
        Self::Exc(Box::new(RaisedError::new(ExcKind::DomainError, message)))
    }

    #[must_use]
    pub fn arity_error(message: impl Into<String>) -> Self {
        Self::Exc(Box::new(RaisedError::new(ExcKind::ArityError, message)))
    }

    #[must_use]
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::Exc(Box::new(RaisedError::new(ExcKind::ParseError, message)))
    }

    #[must_use]
    pub fn control_flow_escape(word: &str) -> Self {
        Self::Exc(Box::new(RaisedError::new(
            ExcKind::ControlFlowEscape,
            format!("invoked \"{word}\" outside of a loop"),
        )))
    }

    #[must_use]
    pub fn recursion_limit() -> Self {
        Self::Exc(Box::new(RaisedError::new(
            ExcKind::RecursionLimit,
            "too many nested evaluations (infinite loop?)",
        )))
    }

    /// Adds one frame of context to the error-info trace, if this is a
    /// catchable exception (a no-op for control-flow transfers).
    pub fn add_trace(&mut self, context: impl Into<String>) {
        if let Self::Exc(exc) = self {
            exc.add_trace(context);
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exc(e) => f.write_str(&e.message),
            Self::Return { .. } => f.write_str("invoked \"return\" outside of a proc"),
            Self::Break => f.write_str("invoked \"break\" outside of a loop"),
            Self::Continue => f.write_str("invoked \"continue\" outside of a loop"),
        }
    }
}

impl std::error::Error for RunError {}
