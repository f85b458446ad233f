//! `trace`: thin command-level wrapper over [`Interp::trace_add`] /
//! `trace_remove` / `trace_list` (§4.9).

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
};

pub fn trace_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"trace subcommand ?arg ...?\""));
    }
    let sub = args[1].display_string_owned();
    match sub.as_str() {
        "add" => add(interp, &args[2..]),
        "remove" => remove(interp, &args[2..]),
        "info" => info(interp, &args[2..]),
        other => Err(super::ensemble_error(other, &["add", "remove", "info"])),
    }
}

fn add(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 4 || args[0].display_string_owned() != "variable" {
        return Err(RunError::user("trace add: only \"variable name opList command\" is supported"));
    }
    let name = args[1].display_string_owned();
    let ops = args[2].display_string_owned();
    let command = args[3].display_string_owned();
    interp.trace_add(&name, &ops, &command);
    Ok(Obj::from_str(""))
}

fn remove(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 4 || args[0].display_string_owned() != "variable" {
        return Err(RunError::user("trace remove: only \"variable name opList command\" is supported"));
    }
    let name = args[1].display_string_owned();
    let ops = args[2].display_string_owned();
    let command = args[3].display_string_owned();
    interp.trace_remove(&name, &ops, &command);
    Ok(Obj::from_str(""))
}

fn info(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 2 || args[0].display_string_owned() != "variable" {
        return Err(RunError::user("trace info: only \"variable name\" is supported"));
    }
    let name = args[1].display_string_owned();
    let entries = interp.trace_list(&name);
    let out: Vec<Obj> = entries
        .into_iter()
        .map(|(ops, command)| Obj::from_list(vec![Obj::from_string(ops), Obj::from_string(command)]))
        .collect();
    Ok(Obj::from_list(out))
}
