//! `dict` ensemble (§4.9, §9 "Ensembles"): `create get set unset exists keys
//! values size for map filter merge with update incr append lappend remove`.

use std::{rc::Rc, str::FromStr};

use strum::{EnumString, VariantNames};

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::{Obj, ObjDict},
};

/// `dict`'s subcommand set (§4.9). `VariantNames::VARIANTS` feeds the
/// canonical "must be X, Y, or Z" error so the message can never drift from
/// what's actually dispatched.
#[derive(Debug, Clone, Copy, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
enum DictSub {
    Create,
    Get,
    Set,
    Unset,
    Exists,
    Keys,
    Values,
    Size,
    For,
    Map,
    Filter,
    Merge,
    With,
    Update,
    Incr,
    Append,
    Lappend,
    Remove,
}

pub fn dict_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"dict subcommand ?arg ...?\""));
    }
    let sub_word = args[1].display_string_owned();
    let rest = &args[2..];
    let Ok(sub) = DictSub::from_str(&sub_word) else {
        return Err(super::ensemble_error(&sub_word, DictSub::VARIANTS));
    };
    match sub {
        DictSub::Create => create(rest),
        DictSub::Get => get(rest),
        DictSub::Set => set(rest),
        DictSub::Unset => unset(rest),
        DictSub::Exists => exists(rest),
        DictSub::Keys => keys(rest),
        DictSub::Values => values(rest),
        DictSub::Size => size(rest),
        DictSub::Merge => merge(rest),
        DictSub::Remove => remove(rest),
        DictSub::Append => append(interp, rest),
        DictSub::Lappend => lappend(interp, rest),
        DictSub::Incr => incr(interp, rest),
        DictSub::For => for_cmd(interp, rest),
        DictSub::Map => map_cmd(interp, rest),
        DictSub::Filter => filter_cmd(interp, rest),
        DictSub::With => with_cmd(interp, rest),
        DictSub::Update => update_cmd(interp, rest),
    }
}

fn create(args: &[Obj]) -> RunResult<Obj> {
    if args.len() % 2 != 0 {
        return Err(RunError::arity_error("wrong # args: should be \"dict create ?key value ...?\""));
    }
    let mut dict = ObjDict::new();
    for pair in args.chunks(2) {
        dict.insert(Rc::from(pair[0].display_string_owned().into_boxed_str()), pair[1].clone());
    }
    Ok(Obj::from_dict(dict))
}

fn get(args: &[Obj]) -> RunResult<Obj> {
    if args.is_empty() {
        return Err(RunError::arity_error("wrong # args: should be \"dict get dictionary ?key ...?\""));
    }
    let mut current = args[0].clone();
    for key in &args[1..] {
        let dict = current.as_dict()?;
        let k = key.display_string_owned();
        current = dict.get(k.as_str()).cloned().ok_or_else(|| RunError::name_error(format!("key \"{k}\" not known in dictionary")))?;
    }
    Ok(current)
}

fn set(args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"dict set dictionary key ?key ...? value\""));
    }
    let mut dict = args[0].clone();
    let keys = &args[1..args.len() - 1];
    let value = args[args.len() - 1].clone();
    set_path(&mut dict, keys, value)?;
    Ok(dict)
}

fn set_path(dict: &mut Obj, keys: &[Obj], value: Obj) -> RunResult<()> {
    if keys.len() == 1 {
        let key = Rc::from(keys[0].display_string_owned().into_boxed_str());
        dict.with_dict_mut(|d| {
            d.insert(key, value);
        })?;
        return Ok(());
    }
    let key = keys[0].display_string_owned();
    let mut child = dict.as_dict()?.get(key.as_str()).cloned().unwrap_or_else(|| Obj::from_dict(ObjDict::new()));
    set_path(&mut child, &keys[1..], value)?;
    dict.with_dict_mut(|d| {
        d.insert(Rc::from(key.into_boxed_str()), child);
    })?;
    Ok(())
}

fn unset(args: &[Obj]) -> RunResult<Obj> {
    if args.is_empty() {
        return Err(RunError::arity_error("wrong # args: should be \"dict unset dictionary key ?key ...?\""));
    }
    let mut dict = args[0].clone();
    let key = args[1].display_string_owned();
    dict.with_dict_mut(|d| {
        d.shift_remove(key.as_str());
    })?;
    Ok(dict)
}

fn exists(args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"dict exists dictionary key ?key ...?\""));
    }
    let mut current = args[0].clone();
    for key in &args[1..] {
        let Ok(dict) = current.as_dict() else { return Ok(Obj::from_bool(false)) };
        let k = key.display_string_owned();
        match dict.get(k.as_str()) {
            Some(v) => current = v.clone(),
            None => return Ok(Obj::from_bool(false)),
        }
    }
    Ok(Obj::from_bool(true))
}

fn keys(args: &[Obj]) -> RunResult<Obj> {
    let mut dict = args.first().cloned().ok_or_else(|| RunError::arity_error("wrong # args: should be \"dict keys dictionary ?pattern?\""))?;
    let pattern = args.get(1).map(Obj::display_string_owned);
    let d = dict.as_dict()?;
    let out: Vec<Obj> = d
        .keys()
        .filter(|k| pattern.as_deref().is_none_or(|p| crate::glob::glob_match(p, k)))
        .map(|k| Obj::from_str(k))
        .collect();
    Ok(Obj::from_list(out))
}

fn values(args: &[Obj]) -> RunResult<Obj> {
    let mut dict = args.first().cloned().ok_or_else(|| RunError::arity_error("wrong # args: should be \"dict values dictionary ?pattern?\""))?;
    let d = dict.as_dict()?;
    Ok(Obj::from_list(d.values().cloned().collect()))
}

fn size(args: &[Obj]) -> RunResult<Obj> {
    let mut dict = args.first().cloned().ok_or_else(|| RunError::arity_error("wrong # args: should be \"dict size dictionary\""))?;
    Ok(Obj::from_int(dict.as_dict()?.len() as i64))
}

fn merge(args: &[Obj]) -> RunResult<Obj> {
    let mut out = ObjDict::new();
    for arg in args {
        let mut d = arg.clone();
        for (k, v) in d.as_dict()?.iter() {
            out.insert(Rc::clone(k), v.clone());
        }
    }
    Ok(Obj::from_dict(out))
}

fn remove(args: &[Obj]) -> RunResult<Obj> {
    if args.is_empty() {
        return Err(RunError::arity_error("wrong # args: should be \"dict remove dictionary ?key ...?\""));
    }
    let mut dict = args[0].clone();
    for key in &args[1..] {
        let k = key.display_string_owned();
        dict.with_dict_mut(|d| {
            d.shift_remove(k.as_str());
        })?;
    }
    Ok(dict)
}

fn append(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"dict append varName key ?value ...?\""));
    }
    let name = args[0].display_string_owned();
    let key = args[1].display_string_owned();
    let mut dict = interp.get_var(&name).unwrap_or_else(|_| Obj::from_dict(ObjDict::new()));
    let mut current = dict.as_dict()?.get(key.as_str()).cloned().unwrap_or_else(|| Obj::from_str(""));
    let mut builder = current.display_string_owned();
    for v in &args[2..] {
        builder.push_str(&v.display_string_owned());
    }
    current = Obj::from_string(builder);
    dict.with_dict_mut(|d| {
        d.insert(Rc::from(key.into_boxed_str()), current);
    })?;
    interp.set_var(&name, dict)
}

fn lappend(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"dict lappend varName key ?value ...?\""));
    }
    let name = args[0].display_string_owned();
    let key = args[1].display_string_owned();
    let mut dict = interp.get_var(&name).unwrap_or_else(|_| Obj::from_dict(ObjDict::new()));
    let mut current = dict.as_dict()?.get(key.as_str()).cloned().unwrap_or_else(|| Obj::from_list(Vec::new()));
    current.with_list_mut(|v| v.extend_from_slice(&args[2..]))?;
    dict.with_dict_mut(|d| {
        d.insert(Rc::from(key.into_boxed_str()), current);
    })?;
    interp.set_var(&name, dict)
}

fn incr(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"dict incr varName key ?increment?\""));
    }
    let name = args[0].display_string_owned();
    let key = args[1].display_string_owned();
    let delta = if let Some(d) = args.get(2) {
        let mut d = d.clone();
        d.as_int()?
    } else {
        1
    };
    let mut dict = interp.get_var(&name).unwrap_or_else(|_| Obj::from_dict(ObjDict::new()));
    let mut current = dict.as_dict()?.get(key.as_str()).cloned().unwrap_or_else(|| Obj::from_int(0));
    let n = current.as_int()? + delta;
    current = Obj::from_int(n);
    dict.with_dict_mut(|d| {
        d.insert(Rc::from(key.into_boxed_str()), current);
    })?;
    interp.set_var(&name, dict)
}

/// `dict for {keyVar valueVar} dictionary body`
fn for_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 3 {
        return Err(RunError::arity_error("wrong # args: should be \"dict for {keyVar valueVar} dictionary body\""));
    }
    let mut var_pair = args[0].clone();
    let names = var_pair.as_list()?;
    if names.len() != 2 {
        return Err(RunError::user("dict for: must supply exactly two variable names"));
    }
    let key_var = names[0].display_string_owned();
    let value_var = names[1].display_string_owned();
    let mut dict = args[1].clone();
    let body = args[2].display_string_owned();
    let entries: Vec<(Rc<str>, Obj)> = dict.as_dict()?.iter().map(|(k, v)| (Rc::clone(k), v.clone())).collect();
    let mut result = Obj::from_str("");
    for (k, v) in entries {
        interp.set_var(&key_var, Obj::from_str(&k))?;
        interp.set_var(&value_var, v)?;
        match interp.eval_body_str(&body) {
            Ok(r) => result = r,
            Err(RunError::Break) => break,
            Err(RunError::Continue) => {}
            Err(other) => return Err(other),
        }
    }
    Ok(result)
}

/// `dict map {keyVar valueVar} dictionary body`: like `for` but collects the
/// body's result per entry into a new dict keyed by the original keys.
fn map_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 3 {
        return Err(RunError::arity_error("wrong # args: should be \"dict map {keyVar valueVar} dictionary body\""));
    }
    let mut var_pair = args[0].clone();
    let names = var_pair.as_list()?;
    if names.len() != 2 {
        return Err(RunError::user("dict map: must supply exactly two variable names"));
    }
    let key_var = names[0].display_string_owned();
    let value_var = names[1].display_string_owned();
    let mut dict = args[1].clone();
    let body = args[2].display_string_owned();
    let entries: Vec<(Rc<str>, Obj)> = dict.as_dict()?.iter().map(|(k, v)| (Rc::clone(k), v.clone())).collect();
    let mut out = ObjDict::new();
    for (k, v) in entries {
        interp.set_var(&key_var, Obj::from_str(&k))?;
        interp.set_var(&value_var, v)?;
        match interp.eval_body_str(&body) {
            Ok(r) => {
                out.insert(k, r);
            }
            Err(RunError::Continue) => {}
            Err(RunError::Break) => break,
            Err(other) => return Err(other),
        }
    }
    Ok(Obj::from_dict(out))
}

/// `dict filter dictionary key pattern` (the `value`/`script` filter types
/// from the reference are not implemented; `key` covers the common case).
fn filter_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 3 || args[0].display_string_owned() != "key" {
        return Err(RunError::user("dict filter: only the \"key pattern\" form is supported"));
    }
    let mut dict = args[1].clone();
    let pattern = args[2].display_string_owned();
    let d = dict.as_dict()?;
    let mut out = ObjDict::new();
    for (k, v) in d.iter() {
        if crate::glob::glob_match(&pattern, k) {
            out.insert(Rc::clone(k), v.clone());
        }
    }
    Ok(Obj::from_dict(out))
}

/// `dict with dictVarName ?key ...? body`: binds every key of the addressed
/// (sub-)dict as a local, runs `body`, then writes the locals back.
fn with_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"dict with dictVarName ?key ...? body\""));
    }
    let name = args[0].display_string_owned();
    let keys = &args[1..args.len() - 1];
    let body = args[args.len() - 1].display_string_owned();
    let mut dict = interp.get_var(&name)?;
    for key in keys {
        let k = key.display_string_owned();
        dict = dict.as_dict()?.get(k.as_str()).cloned().ok_or_else(|| RunError::name_error(format!("key \"{k}\" not known in dictionary")))?;
    }
    let entries: Vec<(Rc<str>, Obj)> = dict.as_dict()?.iter().map(|(k, v)| (Rc::clone(k), v.clone())).collect();
    for (k, v) in &entries {
        interp.set_var(k, v.clone())?;
    }
    let result = interp.eval_body_str(&body);
    let mut updated = ObjDict::new();
    for (k, _) in &entries {
        if let Ok(v) = interp.get_var(k) {
            updated.insert(Rc::clone(k), v);
        }
    }
    let mut root = interp.get_var(&name)?;
    set_path(&mut root, keys, Obj::from_dict(updated))?;
    interp.set_var(&name, root)?;
    result
}

/// `dict update dictVarName key varName ?key varName ...? body`
fn update_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 4 || args.len() % 2 != 0 {
        return Err(RunError::arity_error("wrong # args: should be \"dict update dictVarName key varName ?key varName ...? body\""));
    }
    let name = args[0].display_string_owned();
    let body = args[args.len() - 1].display_string_owned();
    let pairs = &args[1..args.len() - 1];
    let mut dict = interp.get_var(&name)?;
    for pair in pairs.chunks(2) {
        let key = pair[0].display_string_owned();
        let var = pair[1].display_string_owned();
        if let Some(v) = dict.as_dict()?.get(key.as_str()).cloned() {
            interp.set_var(&var, v)?;
        }
    }
    let result = interp.eval_body_str(&body);
    for pair in pairs.chunks(2) {
        let key = pair[0].display_string_owned();
        let var = pair[1].display_string_owned();
        if let Ok(v) = interp.get_var(&var) {
            dict.with_dict_mut(|d| {
                d.insert(Rc::from(key.into_boxed_str()), v);
            })?;
        }
    }
    interp.set_var(&name, dict)?;
    result
}
