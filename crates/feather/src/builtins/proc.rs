//! `proc` / `apply` / `return` / `tailcall` / `rename`: procedure lifecycle (§4.8).

use crate::{
    command::{Param, ProcDef},
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
};

/// Parses a `proc`/`apply` parameter-spec list into [`Param`] entries. A bare
/// name is required; a two-element `{name default}` list is optional; the
/// literal final `args` is variadic (§4.8).
pub(super) fn parse_params(params: &mut Obj) -> RunResult<Vec<Param>> {
    let entries = params.as_list()?;
    let mut out = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let mut entry = entry.clone();
        let is_last = idx == entries.len() - 1;
        let parts = entry.as_list()?;
        match parts.len() {
            1 => {
                let name = parts[0].display_string_owned();
                if is_last && name == "args" {
                    out.push(Param::Variadic);
                } else {
                    out.push(Param::Required(name));
                }
            }
            2 => out.push(Param::Optional(parts[0].display_string_owned(), parts[1].clone())),
            _ => return Err(RunError::user(format!("too many fields in argument specifier \"{}\"", entry.display_string_owned()))),
        }
    }
    Ok(out)
}

pub fn proc_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 4 {
        return Err(RunError::arity_error("wrong # args: should be \"proc name args body\""));
    }
    let name = args[1].display_string_owned();
    let mut params_obj = args[2].clone();
    let params = parse_params(&mut params_obj)?;
    let body = args[3].display_string_owned();
    let namespace = interp.current_namespace_path();
    let leaf = name.rsplit("::").next().unwrap_or(&name).to_owned();
    interp.define_procedure(&name, ProcDef { name: leaf, params, body, namespace });
    Ok(Obj::from_str(""))
}

/// `apply {params body ?ns?} arg ...`: builds an anonymous [`ProcDef`] and
/// dispatches it directly, without installing it as a named command.
pub fn apply_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"apply lambdaExpr ?arg ...?\""));
    }
    let mut lambda = args[1].clone();
    let parts = lambda.as_list()?;
    if parts.len() < 2 || parts.len() > 3 {
        return Err(RunError::user("can't interpret lambda expression"));
    }
    let mut params_obj = parts[0].clone();
    let params = parse_params(&mut params_obj)?;
    let body = parts[1].display_string_owned();
    let namespace = if parts.len() == 3 { parts[2].display_string_owned() } else { interp.current_namespace_path() };
    let procdef = ProcDef { name: "apply".to_owned(), params, body, namespace };
    let mut call_words = vec![Obj::from_str("apply")];
    call_words.extend_from_slice(&args[2..]);
    interp.call_procedure(&procdef, &call_words)
}

pub fn return_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut level: u32 = 1;
    let mut code = crate::error::ReturnCode::Ok;
    let mut value = Obj::from_str("");
    let mut i = 1;
    while i < args.len() {
        let word = args[i].display_string_owned();
        match word.as_str() {
            "-code" if i + 1 < args.len() => {
                let raw = args[i + 1].display_string_owned();
                code = match raw.as_str() {
                    "ok" => crate::error::ReturnCode::Ok,
                    "error" => crate::error::ReturnCode::Error,
                    "return" => crate::error::ReturnCode::Return,
                    "break" => crate::error::ReturnCode::Break,
                    "continue" => crate::error::ReturnCode::Continue,
                    other => crate::error::ReturnCode::from_i64(other.parse().unwrap_or(0)),
                };
                i += 2;
            }
            "-level" if i + 1 < args.len() => {
                level = args[i + 1].display_string_owned().parse().unwrap_or(1);
                i += 2;
            }
            "-errorinfo" | "-errorcode" if i + 1 < args.len() => {
                i += 2;
            }
            _ => {
                value = args[i].clone();
                i += 1;
            }
        }
    }
    let _ = interp;
    Err(RunError::Return { value, level, code })
}

/// Pops the active frame, then dispatches `cmd` as the caller — a bounded
/// stand-in for true tail-call elimination (§4.8).
pub fn tailcall_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"tailcall command ?arg ...?\""));
    }
    interp.pop_for_tailcall();
    let result = interp.call(&args[1..]);
    result.map_err(|e| match e {
        RunError::Exc(exc) => RunError::Exc(exc),
        other => other,
    })
}

pub fn rename_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 3 {
        return Err(RunError::arity_error("wrong # args: should be \"rename oldName newName\""));
    }
    let old = args[1].display_string_owned();
    let new = args[2].display_string_owned();
    interp.rename_command(&old, &new)?;
    Ok(Obj::from_str(""))
}
