//! `info` ensemble (§4.9, §9 "Ensembles"): `exists commands procs vars
//! locals globals args body default level frame script patchlevel
//! tclversion coroutine class object`.
//!
//! `coroutine`, `class`, and `object` are Non-goals (§9) — Feather has no
//! coroutine or object-system primitives — so those subcommands always
//! report absence rather than erroring, matching a host that never defines
//! any.

use std::str::FromStr;

use strum::{EnumString, VariantNames};

use crate::{
    command::Command,
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
};

#[derive(Debug, Clone, Copy, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
enum InfoSub {
    Exists,
    Commands,
    Procs,
    Vars,
    Locals,
    Globals,
    Args,
    Body,
    Default,
    Level,
    Frame,
    Script,
    Patchlevel,
    Tclversion,
    Coroutine,
    Class,
    Object,
}

pub fn info_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"info subcommand ?arg ...?\""));
    }
    let sub_word = args[1].display_string_owned();
    let rest = &args[2..];
    let Ok(sub) = InfoSub::from_str(&sub_word) else {
        return Err(super::ensemble_error(&sub_word, InfoSub::VARIANTS));
    };
    match sub {
        InfoSub::Exists => exists(interp, rest),
        InfoSub::Commands => commands(interp, rest),
        InfoSub::Procs => procs(interp, rest),
        InfoSub::Vars => vars(interp, rest, true),
        InfoSub::Locals => vars(interp, rest, false),
        InfoSub::Globals => globals(interp, rest),
        InfoSub::Args => args_of(interp, rest),
        InfoSub::Body => body_of(interp, rest),
        InfoSub::Default => default_of(interp, rest),
        InfoSub::Level => level(interp, rest),
        InfoSub::Frame => Ok(Obj::from_int(interp.frames.depth() as i64)),
        InfoSub::Script => Ok(Obj::from_string(interp.script_path().unwrap_or_default().to_owned())),
        InfoSub::Patchlevel | InfoSub::Tclversion => Ok(Obj::from_str("1.0")),
        InfoSub::Coroutine | InfoSub::Class | InfoSub::Object => Ok(Obj::from_bool(false)),
    }
}

fn text(args: &[Obj], idx: usize) -> RunResult<String> {
    args.get(idx).map(Obj::display_string_owned).ok_or_else(|| RunError::arity_error("wrong # args to info subcommand"))
}

fn exists(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let name = text(args, 0)?;
    Ok(Obj::from_bool(interp.var_exists(&name)))
}

fn commands(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let pattern = args.first().map(Obj::display_string_owned);
    let ns = interp.current_namespace_id();
    let names: Vec<Obj> = interp
        .namespaces
        .node(ns)
        .commands
        .keys()
        .filter(|name| pattern.as_deref().is_none_or(|p| crate::glob::glob_match(p, name)))
        .map(|name| Obj::from_str(name))
        .collect();
    Ok(Obj::from_list(names))
}

fn procs(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let pattern = args.first().map(Obj::display_string_owned);
    let ns = interp.current_namespace_id();
    let names: Vec<Obj> = interp
        .namespaces
        .node(ns)
        .commands
        .iter()
        .filter(|(name, cmd)| matches!(cmd, Command::Procedure(_)) && pattern.as_deref().is_none_or(|p| crate::glob::glob_match(p, name)))
        .map(|(name, _)| Obj::from_str(name))
        .collect();
    Ok(Obj::from_list(names))
}

fn vars(interp: &mut Interp, args: &[Obj], include_linked: bool) -> RunResult<Obj> {
    let pattern = args.first().map(Obj::display_string_owned);
    let frame = interp.frames.active();
    let mut names: Vec<String> = frame.vars.keys().cloned().collect();
    if include_linked {
        names.extend(frame.links.keys().cloned());
    }
    let out: Vec<Obj> = names
        .into_iter()
        .filter(|n| pattern.as_deref().is_none_or(|p| crate::glob::glob_match(p, n)))
        .map(Obj::from_string)
        .collect();
    Ok(Obj::from_list(out))
}

fn globals(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let pattern = args.first().map(Obj::display_string_owned);
    let root = interp.namespaces.root();
    let out: Vec<Obj> = interp
        .namespaces
        .node(root)
        .vars
        .keys()
        .filter(|n| pattern.as_deref().is_none_or(|p| crate::glob::glob_match(p, n)))
        .map(|n| Obj::from_str(n))
        .collect();
    Ok(Obj::from_list(out))
}

fn find_proc(interp: &Interp, name: &str) -> RunResult<std::rc::Rc<crate::command::ProcDef>> {
    let ns = interp.current_namespace_id();
    match interp.namespaces.lookup_command(ns, name) {
        Some((_, Command::Procedure(def))) => Ok(std::rc::Rc::clone(def)),
        _ => Err(RunError::name_error(format!("command \"{name}\" doesn't exist or isn't a procedure"))),
    }
}

fn args_of(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let name = text(args, 0)?;
    let def = find_proc(interp, &name)?;
    let names: Vec<Obj> = def
        .params
        .iter()
        .map(|p| match p {
            crate::command::Param::Required(n) => Obj::from_str(n),
            crate::command::Param::Optional(n, _) => Obj::from_str(n),
            crate::command::Param::Variadic => Obj::from_str("args"),
        })
        .collect();
    Ok(Obj::from_list(names))
}

fn body_of(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let name = text(args, 0)?;
    let def = find_proc(interp, &name)?;
    Ok(Obj::from_string(def.body.clone()))
}

fn default_of(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"info default procname arg varname\""));
    }
    let name = text(args, 0)?;
    let arg_name = text(args, 1)?;
    let def = find_proc(interp, &name)?;
    let found = def.params.iter().find_map(|p| match p {
        crate::command::Param::Optional(n, v) if n == &arg_name => Some(v.clone()),
        _ => None,
    });
    if let Some(var_name) = args.get(2) {
        interp.set_var(&var_name.display_string_owned(), found.clone().unwrap_or_else(|| Obj::from_str("")))?;
    }
    Ok(Obj::from_bool(found.is_some()))
}

fn level(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let Some(spec) = args.first() else {
        return Ok(Obj::from_int(interp.frames.depth() as i64 - 1));
    };
    let spec = spec.display_string_owned();
    let from = interp.frames.active;
    let idx = interp.frames.resolve_level(&spec, from).ok_or_else(|| RunError::user(format!("bad level \"{spec}\"")))?;
    let frame = &interp.frames.frames[idx];
    let mut words = vec![Obj::from_string(frame.caller_command.clone())];
    words.extend(frame.caller_args.iter().cloned());
    Ok(Obj::from_list(words))
}
