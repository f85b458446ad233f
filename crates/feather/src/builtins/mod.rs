//! Every command the interpreter implements natively, organized one module
//! per command family and wired into a fresh namespace root by
//! [`register_all`] (§4.9).

mod control;
mod dict;
mod errors;
mod exprcmd;
mod format;
mod info;
mod list;
mod namespace;
mod proc;
mod puts;
mod scope;
mod string;
mod substcmd;
mod trace;
mod usage;
mod var;

use crate::{error::RunError, interp::Interp};

/// Builds the canonical "must be X, Y, or Z" error an ensemble raises for an
/// unrecognized subcommand, from the same list its dispatcher matches
/// against (§4.9 "generate the error text from the dispatch table").
fn ensemble_error(got: &str, allowed: &[&str]) -> RunError {
    let listed = match allowed.len() {
        0 => String::new(),
        1 => allowed[0].to_owned(),
        _ => format!("{}, or {}", allowed[..allowed.len() - 1].join(", "), allowed[allowed.len() - 1]),
    };
    RunError::name_error(format!("unknown or ambiguous subcommand \"{got}\": must be {listed}"))
}

pub(crate) fn register_all(interp: &mut Interp) {
    interp.register_command("set", var::set);
    interp.register_command("unset", var::unset);
    interp.register_command("append", var::append);
    interp.register_command("incr", var::incr);

    interp.register_command("global", scope::global);
    interp.register_command("variable", scope::variable);
    interp.register_command("upvar", scope::upvar);
    interp.register_command("uplevel", scope::uplevel);

    interp.register_command("proc", proc::proc_cmd);
    interp.register_command("apply", proc::apply_cmd);
    interp.register_command("return", proc::return_cmd);
    interp.register_command("tailcall", proc::tailcall_cmd);
    interp.register_command("rename", proc::rename_cmd);

    interp.register_command("if", control::if_cmd);
    interp.register_command("while", control::while_cmd);
    interp.register_command("for", control::for_cmd);
    interp.register_command("foreach", control::foreach_cmd);
    interp.register_command("switch", control::switch_cmd);
    interp.register_command("break", control::break_cmd);
    interp.register_command("continue", control::continue_cmd);

    interp.register_command("catch", errors::catch_cmd);
    interp.register_command("try", errors::try_cmd);
    interp.register_command("throw", errors::throw_cmd);
    interp.register_command("error", errors::error_cmd);

    interp.register_command("expr", exprcmd::expr_cmd);

    interp.register_command("list", list::list_cmd);
    interp.register_command("llength", list::llength_cmd);
    interp.register_command("lindex", list::lindex_cmd);
    interp.register_command("lrange", list::lrange_cmd);
    interp.register_command("lappend", list::lappend_cmd);
    interp.register_command("linsert", list::linsert_cmd);
    interp.register_command("lreplace", list::lreplace_cmd);
    interp.register_command("lset", list::lset_cmd);
    interp.register_command("lsort", list::lsort_cmd);
    interp.register_command("lsearch", list::lsearch_cmd);
    interp.register_command("lmap", list::lmap_cmd);
    interp.register_command("lrepeat", list::lrepeat_cmd);
    interp.register_command("lreverse", list::lreverse_cmd);
    interp.register_command("lassign", list::lassign_cmd);
    interp.register_command("concat", list::concat_cmd);
    interp.register_command("join", list::join_cmd);
    interp.register_command("split", list::split_cmd);

    interp.register_command("dict", dict::dict_cmd);
    interp.register_command("string", string::string_cmd);
    interp.register_command("format", format::format_cmd);
    interp.register_command("scan", format::scan_cmd);
    interp.register_command("subst", substcmd::subst_cmd);
    interp.register_command("info", info::info_cmd);
    interp.register_command("namespace", namespace::namespace_cmd);
    interp.register_command("trace", trace::trace_cmd);
    interp.register_command("usage", usage::usage_cmd);
    interp.register_command("puts", puts::puts_cmd);
}
