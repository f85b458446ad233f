//! Command-line front end: runs a script file non-interactively, or drives a
//! line-buffered REPL over stdin when no file is given (§6 "REPL protocol").

use std::{
    env, fs,
    io::{self, BufRead, Write as _},
    process::ExitCode,
};

use feather::{EvalOutcome, Interp};

/// Set by a driving test harness to request out-of-band status lines on
/// stderr alongside whatever the script itself writes to stdout via `puts`
/// (§6 "optional out-of-band structured status").
const HARNESS_VAR: &str = "FEATHER_IN_HARNESS";

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let harness = env::var(HARNESS_VAR).as_deref() == Ok("1");

    match args.get(1) {
        Some(path) => run_file(path, harness),
        None => run_repl(harness),
    }
}

fn run_file(path: &str, harness: bool) -> ExitCode {
    let code = match fs::read_to_string(path) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: reading {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut interp = Interp::new();
    interp.set_script_path(path.to_owned());
    report(&mut interp, &code, harness)
}

/// Reads stdin a line at a time, handing each accumulated chunk to
/// [`Interp::eval_partial`] and growing it across lines while the parser
/// reports `Incomplete` (§4.3 "REPLs rely on this distinction").
fn run_repl(harness: bool) -> ExitCode {
    let stdin = io::stdin();
    let is_tty = io::IsTerminal::is_terminal(&stdin);
    let mut interp = Interp::new();
    let mut buffer = String::new();
    let mut last = ExitCode::SUCCESS;

    loop {
        if is_tty {
            print_prompt(buffer.is_empty());
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("error: reading stdin: {err}");
                return ExitCode::FAILURE;
            }
        }
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line.trim_end_matches('\n'));

        match interp.eval_partial(&buffer) {
            EvalOutcome::Incomplete => continue,
            EvalOutcome::Ok(value) => {
                buffer.clear();
                emit_ok(&value, harness);
                last = ExitCode::SUCCESS;
            }
            EvalOutcome::Error(raised) => {
                buffer.clear();
                emit_error(&raised, harness);
                last = ExitCode::FAILURE;
            }
        }
    }
    last
}

fn print_prompt(fresh: bool) {
    let prompt = if fresh { "% " } else { "> " };
    print!("{prompt}");
    let _ = io::stdout().flush();
}

/// Evaluates a whole non-interactive script and maps the outcome to the
/// process exit code the harness expects (§6 "exit code 0 on OK, nonzero on
/// ERROR/INCOMPLETE").
fn report(interp: &mut Interp, code: &str, harness: bool) -> ExitCode {
    match interp.eval_partial(code) {
        EvalOutcome::Ok(value) => {
            emit_ok(&value, harness);
            ExitCode::SUCCESS
        }
        EvalOutcome::Incomplete => {
            if harness {
                eprintln!("return: incomplete");
            }
            eprintln!("error: script ends inside an unterminated construct");
            ExitCode::FAILURE
        }
        EvalOutcome::Error(raised) => {
            emit_error(&raised, harness);
            ExitCode::FAILURE
        }
    }
}

fn emit_ok(value: &feather::Obj, harness: bool) {
    if harness {
        eprintln!("return: ok");
        eprintln!("result: {}", value.display_string_owned());
    }
}

fn emit_error(raised: &feather::RaisedError, harness: bool) {
    if harness {
        eprintln!("return: error");
        eprintln!("error: {} {raised}", raised.kind);
    } else {
        eprintln!("error: {raised}");
    }
}
