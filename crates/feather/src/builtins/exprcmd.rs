//! `expr`: the expression evaluator's command-level front-end (§4.5, §4.9).

use crate::{error::RunResult, expr::eval_expr, interp::Interp, obj::Obj};

pub fn expr_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let src = args[1..].iter().map(Obj::display_string_owned).collect::<Vec<_>>().join(" ");
    eval_expr(interp, &src)
}
