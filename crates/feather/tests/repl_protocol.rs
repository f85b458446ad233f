//! Parser incomplete/error classification the REPL relies on (§4.3, §6, §8
//! "for every prefix of a well-formed script that ends inside an
//! unterminated construct, the parser reports INCOMPLETE and not ERROR").

use feather::{EvalOutcome, Interp};

fn outcome(src: &str) -> EvalOutcome {
    Interp::new().eval_partial(src)
}

#[test]
fn unterminated_brace_group_is_incomplete() {
    assert!(matches!(outcome("proc f {} {"), EvalOutcome::Incomplete));
}

#[test]
fn unterminated_quote_is_incomplete() {
    assert!(matches!(outcome("set x \"hello"), EvalOutcome::Incomplete));
}

#[test]
fn unterminated_bracket_is_incomplete() {
    assert!(matches!(outcome("set x [expr {1 + "), EvalOutcome::Incomplete));
}

#[test]
fn trailing_backslash_newline_is_incomplete() {
    assert!(matches!(outcome("set x 1 \\\n"), EvalOutcome::Incomplete));
}

#[test]
fn balanced_script_is_ok() {
    assert!(matches!(outcome("set x 1"), EvalOutcome::Ok(_)));
}

#[test]
fn unknown_command_is_a_hard_error_not_incomplete() {
    assert!(matches!(outcome("totally-unknown-command foo"), EvalOutcome::Error(_)));
}

#[test]
fn multi_line_accumulation_matches_repl_usage() {
    let mut interp = Interp::new();
    let mut buffer = String::from("proc greet {name} {\n");
    assert!(matches!(interp.eval_partial(&buffer), EvalOutcome::Incomplete));
    buffer.push_str("    return \"hi $name\"\n");
    assert!(matches!(interp.eval_partial(&buffer), EvalOutcome::Incomplete));
    buffer.push('}');
    assert!(matches!(interp.eval_partial(&buffer), EvalOutcome::Ok(_)));
    let result = interp.eval("greet world").unwrap();
    assert_eq!(result.display_string_owned(), "hi world");
}
