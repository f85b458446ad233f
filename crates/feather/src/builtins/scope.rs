//! `global` / `variable` / `upvar` / `uplevel`: scope linking (§4.6).

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
};

pub fn global(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    for name in &args[1..] {
        interp.install_global_link(&name.display_string_owned());
    }
    Ok(Obj::from_str(""))
}

pub fn variable(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let mut i = 1;
    while i < args.len() {
        let name = args[i].display_string_owned();
        interp.install_namespace_link(&name);
        if i + 1 < args.len() && !looks_like_next_name(&args, i) {
            let value = args[i + 1].clone();
            interp.set_var(&name, value)?;
            i += 2;
        } else {
            i += 1;
        }
    }
    Ok(Obj::from_str(""))
}

/// `variable` accepts `name value name value ...` OR bare `name name ...`;
/// since either is legal we greedily pair consecutive args when there is an
/// even count remaining, matching the common usage `variable x 0`.
fn looks_like_next_name(args: &[Obj], i: usize) -> bool {
    (args.len() - i) % 2 != 0
}

pub fn upvar(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"upvar ?level? otherVar localVar ?otherVar localVar ...?\""));
    }
    let mut rest = &args[1..];
    let level = if rest.len() % 2 == 1 { let l = rest[0].display_string_owned(); rest = &rest[1..]; l } else { "1".to_owned() };
    let mut i = 0;
    while i + 1 < rest.len() {
        let other = rest[i].display_string_owned();
        let local = rest[i + 1].display_string_owned();
        interp.install_upvar_link(&local, &level, &other)?;
        i += 2;
    }
    Ok(Obj::from_str(""))
}

pub fn uplevel(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"uplevel ?level? arg ?arg ...?\""));
    }
    let mut rest = &args[1..];
    let level = if looks_like_level(&rest[0]) {
        let l = rest[0].display_string_owned();
        rest = &rest[1..];
        l
    } else {
        "1".to_owned()
    };
    let body = rest.iter().map(Obj::display_string_owned).collect::<Vec<_>>().join(" ");
    interp.with_uplevel(&level, &body)
}

fn looks_like_level(value: &Obj) -> bool {
    let s = value.display_string_owned();
    s.starts_with('#') || s.parse::<i64>().is_ok()
}
