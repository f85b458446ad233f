//! `subst`: the one-shot substitution-only evaluator (§4.4, §4.9).

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
    subst::subst_with_flags,
};

pub fn subst_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut no_backslashes = false;
    let mut no_commands = false;
    let mut no_variables = false;
    let mut i = 1;
    while i < args.len() {
        match args[i].display_string_owned().as_str() {
            "-nobackslashes" => no_backslashes = true,
            "-nocommands" => no_commands = true,
            "-novariables" => no_variables = true,
            _ => break,
        }
        i += 1;
    }
    let Some(src) = args.get(i) else {
        return Err(RunError::arity_error("wrong # args: should be \"subst ?-nobackslashes? ?-nocommands? ?-novariables? string\""));
    };
    let text = src.display_string_owned();
    subst_with_flags(interp, &text, no_backslashes, no_commands, no_variables)
}
