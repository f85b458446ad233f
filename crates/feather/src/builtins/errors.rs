//! `catch` / `try` / `throw` / `error`: error handling (§4.9, §4.10).

use crate::{
    error::{ExcKind, RaisedError, ReturnCode, RunError, RunResult},
    interp::Interp,
    obj::{Obj, ObjDict},
};
use std::rc::Rc;

/// Maps a propagating [`RunError`] to its TCL return-code integer, the value
/// to bind to `catch`'s result variable, and the raw error for options (§7).
fn classify(err: RunError) -> (i64, Obj, Option<RaisedError>) {
    match err {
        RunError::Exc(e) => (ReturnCode::Error.as_i64(), Obj::from_string(e.message.clone()), Some(*e)),
        RunError::Return { value, code, .. } => (code.as_i64(), value, None),
        RunError::Break => (ReturnCode::Break.as_i64(), Obj::from_str(""), None),
        RunError::Continue => (ReturnCode::Continue.as_i64(), Obj::from_str(""), None),
    }
}

pub fn catch_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 || args.len() > 4 {
        return Err(RunError::arity_error("wrong # args: should be \"catch script ?resultVarName? ?optionsVarName?\""));
    }
    let body = args[1].display_string_owned();
    let (code, value, raised) = match interp.eval_body_str(&body) {
        Ok(v) => (ReturnCode::Ok.as_i64(), v, None),
        Err(e) => classify(e),
    };
    if let Some(var_name) = args.get(2) {
        interp.set_var(&var_name.display_string_owned(), value)?;
    }
    if let Some(opts_name) = args.get(3) {
        let mut dict = ObjDict::new();
        dict.insert(Rc::from("-code"), Obj::from_int(code));
        if let Some(raised) = &raised {
            dict.insert(Rc::from("-errorcode"), raised.error_code.clone());
            dict.insert(Rc::from("-errorinfo"), Obj::from_string(raised.error_info.join("\n")));
        }
        interp.set_var(&opts_name.display_string_owned(), Obj::from_dict(dict))?;
    }
    Ok(Obj::from_int(code))
}

pub fn throw_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() != 3 {
        return Err(RunError::arity_error("wrong # args: should be \"throw code message\""));
    }
    let code = args[1].clone();
    let message = args[2].display_string_owned();
    Err(RunError::Exc(Box::new(RaisedError::new(ExcKind::UserError, message).with_error_code(code))))
}

pub fn error_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 || args.len() > 4 {
        return Err(RunError::arity_error("wrong # args: should be \"error message ?errorInfo? ?errorCode?\""));
    }
    let message = args[1].display_string_owned();
    let mut raised = RaisedError::new(ExcKind::UserError, message);
    if let Some(info) = args.get(2) {
        raised.add_trace(info.display_string_owned());
    }
    if let Some(code) = args.get(3) {
        raised.error_code = code.clone();
    }
    Err(RunError::Exc(Box::new(raised)))
}

/// `try body ?on code {varList} handler? ... ?trap pattern {varList} handler? ... ?finally script?`
/// Handlers are tried in the order written; `on` matches a numeric/named
/// return code, `trap` matches a prefix of the raised `-errorcode` list.
pub fn try_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"try body ?handler ...? ?finally script?\""));
    }
    let body = args[1].display_string_owned();
    let outcome = interp.eval_body_str(&body);
    let (code, value, raised) = match outcome {
        Ok(v) => (ReturnCode::Ok.as_i64(), v, None),
        Err(e) => classify(e),
    };

    let mut i = 2;
    let mut finally_script = None;
    let mut handled: Option<RunResult<Obj>> = None;
    while i < args.len() {
        let kind = args[i].display_string_owned();
        match kind.as_str() {
            "finally" => {
                finally_script = args.get(i + 1).map(Obj::display_string_owned);
                i += 2;
            }
            "on" if handled.is_none() => {
                let want_code = on_code_value(&args[i + 1].display_string_owned());
                let var_list = args.get(i + 2).cloned().unwrap_or_else(|| Obj::from_str(""));
                let handler = args.get(i + 3).map(Obj::display_string_owned).unwrap_or_default();
                if want_code == code {
                    handled = Some(run_handler(interp, &var_list, &value, raised.as_ref(), &handler));
                }
                i += 4;
            }
            "trap" if handled.is_none() => {
                let mut pattern_obj = args[i + 1].clone();
                let pattern = pattern_obj.as_list()?;
                let var_list = args.get(i + 2).cloned().unwrap_or_else(|| Obj::from_str(""));
                let handler = args.get(i + 3).map(Obj::display_string_owned).unwrap_or_default();
                if code == ReturnCode::Error.as_i64() && trap_matches(&pattern, raised.as_ref()) {
                    handled = Some(run_handler(interp, &var_list, &value, raised.as_ref(), &handler));
                }
                i += 4;
            }
            "on" | "trap" => i += 4,
            _ => return Err(RunError::user(format!("invalid try handler \"{kind}\""))),
        }
    }

    let result = handled.unwrap_or_else(|| rethrow(code, value, raised));

    if let Some(script) = finally_script {
        interp.eval_body_str(&script)?;
    }
    result
}

fn on_code_value(word: &str) -> i64 {
    match word {
        "ok" => ReturnCode::Ok.as_i64(),
        "error" => ReturnCode::Error.as_i64(),
        "return" => ReturnCode::Return.as_i64(),
        "break" => ReturnCode::Break.as_i64(),
        "continue" => ReturnCode::Continue.as_i64(),
        other => other.parse().unwrap_or(1),
    }
}

fn trap_matches(pattern: &[Obj], raised: Option<&RaisedError>) -> bool {
    let Some(raised) = raised else { return false };
    let mut code_obj = raised.error_code.clone();
    let Ok(code_list) = code_obj.as_list() else { return false };
    pattern.iter().zip(code_list.iter()).all(|(p, c)| p.display_string_owned() == c.display_string_owned())
}

fn run_handler(interp: &mut Interp, var_list: &Obj, value: &Obj, raised: Option<&RaisedError>, handler: &str) -> RunResult<Obj> {
    let mut var_list = var_list.clone();
    let names = var_list.as_list().map(|l| l.to_vec()).unwrap_or_default();
    if let Some(name) = names.first() {
        interp.set_var(&name.display_string_owned(), value.clone())?;
    }
    if let Some(name) = names.get(1) {
        let mut dict = ObjDict::new();
        if let Some(raised) = raised {
            dict.insert(Rc::from("-errorcode"), raised.error_code.clone());
            dict.insert(Rc::from("-errorinfo"), Obj::from_string(raised.error_info.join("\n")));
        }
        interp.set_var(&name.display_string_owned(), Obj::from_dict(dict))?;
    }
    interp.eval_body_str(handler)
}

fn rethrow(code: i64, value: Obj, raised: Option<RaisedError>) -> RunResult<Obj> {
    if code == ReturnCode::Ok.as_i64() {
        return Ok(value);
    }
    if let Some(raised) = raised {
        return Err(RunError::Exc(Box::new(raised)));
    }
    match ReturnCode::from_i64(code) {
        ReturnCode::Break => Err(RunError::Break),
        ReturnCode::Continue => Err(RunError::Continue),
        other => Err(RunError::Return { value, level: 0, code: other }),
    }
}
