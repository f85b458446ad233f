//! `set` / `unset` / `append` / `incr` (§4.9).

use crate::{error::RunResult, interp::Interp, obj::Obj};

pub fn set(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    match args.len() {
        2 => interp.get_var(&args[1].display_string_owned()),
        3 => interp.set_var(&args[1].display_string_owned(), args[2].clone()),
        _ => Err(crate::error::RunError::arity_error("wrong # args: should be \"set varName ?newValue?\"")),
    }
}

pub fn unset(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    for name in &args[1..] {
        interp.unset_var(&name.display_string_owned())?;
    }
    Ok(Obj::from_str(""))
}

pub fn append(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(crate::error::RunError::arity_error("wrong # args: should be \"append varName ?value value ...?\""));
    }
    let name = args[1].display_string_owned();
    let mut current = interp.get_var(&name).unwrap_or_else(|_| Obj::from_str(""));
    let mut builder = current.display_string_owned();
    for value in &args[2..] {
        builder.push_str(&value.display_string_owned());
    }
    current = Obj::from_string(builder);
    interp.set_var(&name, current)
}

pub fn incr(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 || args.len() > 3 {
        return Err(crate::error::RunError::arity_error("wrong # args: should be \"incr varName ?increment?\""));
    }
    let name = args[1].display_string_owned();
    let delta = if args.len() == 3 {
        let mut d = args[2].clone();
        d.as_int()?
    } else {
        1
    };
    let mut current = interp.get_var(&name).unwrap_or_else(|_| Obj::from_int(0));
    let n = current.as_int()?;
    let updated = Obj::from_int(n + delta);
    interp.set_var(&name, updated)
}
