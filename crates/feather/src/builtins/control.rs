//! `if` / `while` / `for` / `foreach` / `switch` / `break` / `continue` (§4.9).

use crate::{error::RunError, error::RunResult, expr::eval_expr_bool, glob::glob_match, interp::Interp, obj::Obj};

pub fn if_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut i = 1;
    loop {
        if i >= args.len() {
            return Err(RunError::arity_error("wrong # args: should be \"if expr1 ?then? body1 elseif expr2 ?then? body2 ... ?else? ?bodyN?\""));
        }
        let cond = args[i].display_string_owned();
        i += 1;
        if args.get(i).map(Obj::display_string_owned).as_deref() == Some("then") {
            i += 1;
        }
        let body = args.get(i).ok_or_else(|| RunError::arity_error("wrong # args: if body missing"))?.display_string_owned();
        i += 1;
        if eval_expr_bool(interp, &cond)? {
            return interp.eval_body_str(&body);
        }
        match args.get(i).map(Obj::display_string_owned) {
            Some(s) if s == "elseif" => {
                i += 1;
            }
            Some(s) if s == "else" => {
                i += 1;
                let body = args.get(i).ok_or_else(|| RunError::arity_error("wrong # args: else body missing"))?.display_string_owned();
                return interp.eval_body_str(&body);
            }
            Some(_) => return Err(RunError::arity_error("wrong # args: extra words after else body")),
            None => return Ok(Obj::from_str("")),
        }
    }
}

pub fn while_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 3 {
        return Err(RunError::arity_error("wrong # args: should be \"while test body\""));
    }
    let cond = args[1].display_string_owned();
    let body = args[2].display_string_owned();
    let mut result = Obj::from_str("");
    while eval_expr_bool(interp, &cond)? {
        match interp.eval_body_str(&body) {
            Ok(v) => result = v,
            Err(RunError::Break) => break,
            Err(RunError::Continue) => {}
            Err(other) => return Err(other),
        }
    }
    Ok(result)
}

pub fn for_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 5 {
        return Err(RunError::arity_error("wrong # args: should be \"for start test next body\""));
    }
    let start = args[1].display_string_owned();
    let test = args[2].display_string_owned();
    let next = args[3].display_string_owned();
    let body = args[4].display_string_owned();
    interp.eval_body_str(&start)?;
    let mut result = Obj::from_str("");
    while eval_expr_bool(interp, &test)? {
        match interp.eval_body_str(&body) {
            Ok(v) => result = v,
            Err(RunError::Break) => break,
            Err(RunError::Continue) => {}
            Err(other) => return Err(other),
        }
        interp.eval_body_str(&next)?;
    }
    Ok(result)
}

/// `foreach varList1 list1 ?varList2 list2 ...? body`: iterates in parallel,
/// exhausting the longest list and binding missing trailing elements to `{}`.
pub fn foreach_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 4 || args.len() % 2 != 0 {
        return Err(RunError::arity_error("wrong # args: should be \"foreach varList list ?varList list ...? body\""));
    }
    let body = args[args.len() - 1].display_string_owned();
    let pairs = &args[1..args.len() - 1];
    let mut groups = Vec::with_capacity(pairs.len() / 2);
    let mut max_rounds = 0usize;
    for chunk in pairs.chunks(2) {
        let mut var_list_obj = chunk[0].clone();
        let var_names: Vec<String> = var_list_obj.as_list()?.iter().map(Obj::display_string_owned).collect();
        let mut value_obj = chunk[1].clone();
        let values: Vec<Obj> = value_obj.as_list()?.to_vec();
        if var_names.is_empty() {
            return Err(RunError::user("foreach varlist is empty"));
        }
        let rounds = values.len().div_ceil(var_names.len());
        max_rounds = max_rounds.max(rounds);
        groups.push((var_names, values));
    }
    let mut result = Obj::from_str("");
    'rounds: for round in 0..max_rounds {
        for (var_names, values) in &groups {
            for (slot, name) in var_names.iter().enumerate() {
                let idx = round * var_names.len() + slot;
                let value = values.get(idx).cloned().unwrap_or_else(|| Obj::from_str(""));
                interp.set_var(name, value)?;
            }
        }
        match interp.eval_body_str(&body) {
            Ok(v) => result = v,
            Err(RunError::Break) => break 'rounds,
            Err(RunError::Continue) => {}
            Err(other) => return Err(other),
        }
    }
    Ok(result)
}

pub fn break_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 1 {
        return Err(RunError::arity_error("wrong # args: should be \"break\""));
    }
    Err(RunError::Break)
}

pub fn continue_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 1 {
        return Err(RunError::arity_error("wrong # args: should be \"continue\""));
    }
    Err(RunError::Continue)
}

/// `switch ?-exact|-glob|-regexp? ?--? string {pattern body ...}` or the
/// flattened `string pattern body pattern body ...` form. `regexp` matching
/// uses the `regex` crate; `default` is a wildcard pattern in TCL, so we
/// treat a literal `default` arm specially only once no earlier pattern matched.
pub fn switch_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut i = 1;
    let mut mode = SwitchMode::Exact;
    while i < args.len() {
        let word = args[i].display_string_owned();
        match word.as_str() {
            "-exact" => mode = SwitchMode::Exact,
            "-glob" => mode = SwitchMode::Glob,
            "-regexp" => mode = SwitchMode::Regexp,
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
        i += 1;
    }
    let value = args.get(i).ok_or_else(|| RunError::arity_error("wrong # args: no switch value"))?.display_string_owned();
    i += 1;
    let rest = &args[i..];
    let arms: Vec<(String, String)> = if rest.len() == 1 {
        let mut list_obj = rest[0].clone();
        let items = list_obj.as_list()?;
        if items.len() % 2 != 0 {
            return Err(RunError::arity_error("switch: extra switch pattern with no body"));
        }
        items.chunks(2).map(|c| (c[0].display_string_owned(), c[1].display_string_owned())).collect()
    } else {
        if rest.len() % 2 != 0 {
            return Err(RunError::arity_error("switch: extra switch pattern with no body"));
        }
        rest.chunks(2).map(|c| (c[0].display_string_owned(), c[1].display_string_owned())).collect()
    };
    let mut body = None;
    for (idx, (pattern, arm_body)) in arms.iter().enumerate() {
        let matched = pattern == "default" && idx == arms.len() - 1 || switch_matches(mode, pattern, &value)?;
        if matched {
            body = Some(arm_body.clone());
            break;
        }
    }
    let Some(body) = body else {
        return Ok(Obj::from_str(""));
    };
    if body == "-" {
        return Err(RunError::user("switch: fallthrough bodies are unsupported"));
    }
    interp.eval_body_str(&body)
}

#[derive(Clone, Copy)]
enum SwitchMode {
    Exact,
    Glob,
    Regexp,
}

fn switch_matches(mode: SwitchMode, pattern: &str, value: &str) -> RunResult<bool> {
    match mode {
        SwitchMode::Exact => Ok(pattern == value),
        SwitchMode::Glob => Ok(glob_match(pattern, value)),
        SwitchMode::Regexp => {
            let re = regex::Regex::new(pattern).map_err(|e| RunError::user(format!("bad regexp pattern: {e}")))?;
            Ok(re.is_match(value))
        }
    }
}
