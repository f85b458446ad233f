//! List manipulation commands (§4.9): `list llength lindex lrange lappend
//! linsert lreplace lset lsort lsearch lmap lrepeat lreverse lassign concat
//! join split`.

use crate::{
    error::{RunError, RunResult},
    glob::glob_match,
    interp::Interp,
    obj::Obj,
    parser::parse_list_index,
};

pub fn list_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    Ok(Obj::from_list(args[1..].to_vec()))
}

pub fn llength_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 2 {
        return Err(RunError::arity_error("wrong # args: should be \"llength list\""));
    }
    let mut v = args[1].clone();
    Ok(Obj::from_int(v.as_list()?.len() as i64))
}

fn resolve_index(spec: &str, len: usize) -> RunResult<usize> {
    parse_list_index(spec, len).ok_or_else(|| RunError::type_error(format!("bad index \"{spec}\": must be integer?[+-]integer? or end?[+-]integer?")))
}

pub fn lindex_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"lindex list ?index ...?\""));
    }
    let mut current = args[1].clone();
    for idx_arg in &args[2..] {
        let items = current.as_list()?;
        let spec = idx_arg.display_string_owned();
        let Some(idx) = parse_list_index(&spec, items.len()) else {
            return Ok(Obj::from_str(""));
        };
        current = items.get(idx).cloned().unwrap_or_else(|| Obj::from_str(""));
    }
    Ok(current)
}

pub fn lrange_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 4 {
        return Err(RunError::arity_error("wrong # args: should be \"lrange list first last\""));
    }
    let mut list = args[1].clone();
    let items = list.as_list()?;
    let len = items.len();
    let first = resolve_index(&args[2].display_string_owned(), len).unwrap_or(0).min(len);
    let last = resolve_index(&args[3].display_string_owned(), len).map(|i| i + 1).unwrap_or(len).min(len);
    if first >= last {
        return Ok(Obj::from_list(Vec::new()));
    }
    Ok(Obj::from_list(items[first..last].to_vec()))
}

pub fn lappend_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"lappend varName ?value value ...?\""));
    }
    let name = args[1].display_string_owned();
    let mut current = interp.get_var(&name).unwrap_or_else(|_| Obj::from_list(Vec::new()));
    current.with_list_mut(|v| v.extend_from_slice(&args[2..]))?;
    interp.set_var(&name, current)
}

pub fn linsert_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"linsert list index ?element ...?\""));
    }
    let mut list = args[1].clone();
    let len = list.as_list()?.len();
    let idx = resolve_index(&args[2].display_string_owned(), len + 1).unwrap_or(len).min(len);
    list.with_list_mut(|v| {
        for (offset, item) in args[3..].iter().enumerate() {
            v.insert(idx + offset, item.clone());
        }
    })?;
    Ok(list)
}

pub fn lreplace_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 4 {
        return Err(RunError::arity_error("wrong # args: should be \"lreplace list first last ?element ...?\""));
    }
    let mut list = args[1].clone();
    let len = list.as_list()?.len();
    let first = resolve_index(&args[2].display_string_owned(), len).unwrap_or(0).min(len);
    let last = resolve_index(&args[3].display_string_owned(), len).map(|i| i + 1).unwrap_or(len).min(len).max(first);
    list.with_list_mut(|v| {
        let replacement: Vec<Obj> = args[4..].to_vec();
        v.splice(first..last, replacement);
    })?;
    Ok(list)
}

pub fn lset_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"lset varName index value\""));
    }
    let name = args[1].display_string_owned();
    let mut current = interp.get_var(&name)?;
    let len = current.as_list()?.len();
    let idx = resolve_index(&args[2].display_string_owned(), len)?;
    let value = args[args.len() - 1].clone();
    current.with_list_mut(|v| {
        if idx < v.len() {
            v[idx] = value.clone();
        }
    })?;
    interp.set_var(&name, current)
}

pub fn lreverse_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 2 {
        return Err(RunError::arity_error("wrong # args: should be \"lreverse list\""));
    }
    let mut list = args[1].clone();
    list.with_list_mut(|v| v.reverse())?;
    Ok(list)
}

pub fn lrepeat_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"lrepeat count ?element ...?\""));
    }
    let mut count_obj = args[1].clone();
    let count = usize::try_from(count_obj.as_int()?).unwrap_or(0);
    let elements = &args[2..];
    let mut out = Vec::with_capacity(count * elements.len().max(1));
    for _ in 0..count {
        out.extend_from_slice(elements);
    }
    Ok(Obj::from_list(out))
}

pub fn lassign_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"lassign list ?varName ...?\""));
    }
    let mut list = args[1].clone();
    let items = list.as_list()?;
    let var_names = &args[2..];
    for (i, name) in var_names.iter().enumerate() {
        let value = items.get(i).cloned().unwrap_or_else(|| Obj::from_str(""));
        interp.set_var(&name.display_string_owned(), value)?;
    }
    let remainder: Vec<Obj> = items.iter().skip(var_names.len()).cloned().collect();
    Ok(Obj::from_list(remainder))
}

pub fn concat_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut out = Vec::new();
    for arg in &args[1..] {
        let mut a = arg.clone();
        out.extend(a.as_list()?.iter().cloned());
    }
    Ok(Obj::from_list(out))
}

pub fn join_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 || args.len() > 3 {
        return Err(RunError::arity_error("wrong # args: should be \"join list ?joinString?\""));
    }
    let mut list = args[1].clone();
    let sep = args.get(2).map(Obj::display_string_owned).unwrap_or_else(|| " ".to_owned());
    let rendered: Vec<String> = list.as_list()?.iter().map(Obj::display_string_owned).collect();
    Ok(Obj::from_string(rendered.join(&sep)))
}

pub fn split_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 || args.len() > 3 {
        return Err(RunError::arity_error("wrong # args: should be \"split string ?splitChars?\""));
    }
    let s = args[1].display_string_owned();
    let splits = args.get(2).map(Obj::display_string_owned);
    let pieces: Vec<Obj> = match splits {
        None => s.split_whitespace().map(Obj::from_str).collect(),
        Some(chars) if chars.is_empty() => s.chars().map(|c| Obj::from_string(c.to_string())).collect(),
        Some(chars) => s.split(|c| chars.contains(c)).map(Obj::from_str).collect(),
    };
    Ok(Obj::from_list(pieces))
}

/// `lsort ?-ascii|-dictionary|-integer|-real? ?-increasing|-decreasing? ?-unique? list`
pub fn lsort_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"lsort ?options? list\""));
    }
    let mut decreasing = false;
    let mut unique = false;
    let mut numeric = false;
    for flag in &args[1..args.len() - 1] {
        match flag.display_string_owned().as_str() {
            "-decreasing" => decreasing = true,
            "-increasing" => decreasing = false,
            "-unique" => unique = true,
            "-integer" | "-real" => numeric = true,
            "-ascii" | "-dictionary" => numeric = false,
            other => return Err(RunError::user(format!("bad option \"{other}\" to lsort"))),
        }
    }
    let mut list = args[args.len() - 1].clone();
    let mut items = list.as_list()?.to_vec();
    items.sort_by(|a, b| {
        let ord = if numeric { a.compare_numeric_or_string(b) } else { a.display_string_owned().cmp(&b.display_string_owned()) };
        if decreasing {
            ord.reverse()
        } else {
            ord
        }
    });
    if unique {
        items.dedup_by(|a, b| a.display_string_owned() == b.display_string_owned());
    }
    Ok(Obj::from_list(items))
}

/// `lsearch ?-exact|-glob|-regexp? ?-all? ?-inline? list pattern`
pub fn lsearch_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"lsearch ?options? list pattern\""));
    }
    let mut mode = "glob".to_owned();
    let mut all = false;
    let mut inline = false;
    let mut i = 1;
    while i < args.len() - 2 {
        match args[i].display_string_owned().as_str() {
            "-exact" => mode = "exact".to_owned(),
            "-glob" => mode = "glob".to_owned(),
            "-regexp" => mode = "regexp".to_owned(),
            "-all" => all = true,
            "-inline" => inline = true,
            other => return Err(RunError::user(format!("bad option \"{other}\" to lsearch"))),
        }
        i += 1;
    }
    let mut list = args[args.len() - 2].clone();
    let pattern = args[args.len() - 1].display_string_owned();
    let items = list.as_list()?;
    let mut matched_indices = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let text = item.display_string_owned();
        let is_match = match mode.as_str() {
            "exact" => text == pattern,
            "regexp" => regex::Regex::new(&pattern).map(|re| re.is_match(&text)).unwrap_or(false),
            _ => glob_match(&pattern, &text),
        };
        if is_match {
            matched_indices.push(idx);
            if !all {
                break;
            }
        }
    }
    if inline {
        let values: Vec<Obj> = matched_indices.iter().map(|&i| items[i].clone()).collect();
        if all {
            Ok(Obj::from_list(values))
        } else {
            Ok(values.into_iter().next().unwrap_or_else(|| Obj::from_str("")))
        }
    } else if all {
        Ok(Obj::from_list(matched_indices.into_iter().map(|i| Obj::from_int(i as i64)).collect()))
    } else {
        Ok(Obj::from_int(matched_indices.first().map_or(-1, |&i| i as i64)))
    }
}

/// `lmap varName list body`: collects the body's result from every iteration
/// into a list, skipping iterations that `continue` (§4.9, modeled on `foreach`).
pub fn lmap_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 4 {
        return Err(RunError::arity_error("wrong # args: should be \"lmap varName list body\""));
    }
    let var_name = args[1].display_string_owned();
    let mut list = args[2].clone();
    let body = args[3].display_string_owned();
    let items = list.as_list()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items.iter() {
        interp.set_var(&var_name, item.clone())?;
        match interp.eval_body_str(&body) {
            Ok(v) => out.push(v),
            Err(RunError::Continue) => {}
            Err(RunError::Break) => break,
            Err(other) => return Err(other),
        }
    }
    Ok(Obj::from_list(out))
}
