//! `puts`: writes to the host's standard output or standard error.
//!
//! Feather has no channel/file-handle layer (§9 Non-goals); `stdout` and
//! `stderr` are the only two destinations `puts` recognizes.

use std::io::Write as _;

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
};

pub fn puts_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut i = 1;
    let mut newline = true;
    if args.get(i).map(Obj::display_string_owned).as_deref() == Some("-nonewline") {
        newline = false;
        i += 1;
    }
    let mut to_stderr = false;
    if let Some(channel) = args.get(i).map(Obj::display_string_owned) {
        if channel == "stdout" || channel == "stderr" {
            to_stderr = channel == "stderr";
            i += 1;
        }
    }
    let Some(text) = args.get(i) else {
        return Err(RunError::arity_error("wrong # args: should be \"puts ?-nonewline? ?channel? string\""));
    };
    let text = text.display_string_owned();
    if to_stderr {
        let stderr = std::io::stderr();
        let mut lock = stderr.lock();
        let _ = write!(lock, "{text}");
        if newline {
            let _ = writeln!(lock);
        }
    } else {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        let _ = write!(lock, "{text}");
        if newline {
            let _ = writeln!(lock);
        }
    }
    Ok(Obj::from_str(""))
}
