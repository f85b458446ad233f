//! `usage`: declarative argument-spec command, a Feather extension (§4.9
//! table, §6 "Feather extension"). Mirrors `proc`'s parameter-spec syntax
//! so a host-registered command can advertise the same kind of usage
//! string and arity validation a `proc` definition gets for free.

use crate::{error::RunResult, interp::Interp, obj::Obj};

use super::proc::parse_params;

pub fn usage_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() >= 3 && args[1].display_string_owned() == "check" {
        let name = args[2].display_string_owned();
        interp.check_usage(&name, &args[2..])?;
        return Ok(Obj::from_str(""));
    }
    if args.len() == 3 {
        let name = args[1].display_string_owned();
        let mut params = args[2].clone();
        let parsed = parse_params(&mut params)?;
        interp.define_usage(&name, parsed);
        return Ok(Obj::from_string(interp.usage_string(&name).unwrap_or_default()));
    }
    if args.len() == 2 {
        let name = args[1].display_string_owned();
        return interp
            .usage_string(&name)
            .map(Obj::from_string)
            .ok_or_else(|| crate::error::RunError::name_error(format!("no usage spec registered for \"{name}\"")));
    }
    Err(crate::error::RunError::arity_error("wrong # args: should be \"usage name ?paramSpec?\""))
}
