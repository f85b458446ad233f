//! Broader builtin command coverage beyond the literal seed scenarios:
//! `try`/`throw` handler matching, `format`/`scan` conversions, and the
//! `usage` extension command (§4.9, §4.9 table, §6).

use feather::Interp;
use pretty_assertions::assert_eq;

fn eval(src: &str) -> String {
    let mut interp = Interp::new();
    match interp.eval(src) {
        Ok(v) => v.display_string_owned(),
        Err(e) => panic!("unexpected error evaluating {src:?}: {e}"),
    }
}

#[test]
fn try_on_error_handler_binds_message() {
    assert_eq!(
        eval("try {error boom} on error {msg} {return \"handled: $msg\"}"),
        "handled: boom"
    );
}

#[test]
fn try_finally_runs_even_when_handler_matches() {
    let mut interp = Interp::new();
    interp
        .eval("set log {}; try {error boom} on error {msg} {append log handled} finally {append log /finally}")
        .unwrap();
    let log = interp.eval("set log").unwrap();
    assert_eq!(log.display_string_owned(), "handled/finally");
}

#[test]
fn try_without_matching_handler_rethrows() {
    let mut interp = Interp::new();
    let err = interp.eval("try {error boom} on break {} {return nope}").unwrap_err();
    assert!(err.to_string().contains("boom"));
}

#[test]
fn throw_is_caught_with_custom_error_code() {
    let mut interp = Interp::new();
    interp.eval("catch {throw {MYAPP BADTHING} \"custom failure\"} msg opts").unwrap();
    let msg = interp.eval("set msg").unwrap();
    assert_eq!(msg.display_string_owned(), "custom failure");
    let code = interp.eval("dict get $opts -errorcode").unwrap();
    assert_eq!(code.display_string_owned(), "MYAPP BADTHING");
}

#[test]
fn try_trap_matches_errorcode_prefix() {
    assert_eq!(
        eval("try {throw {MYAPP BADTHING} oops} trap {MYAPP} {msg} {return \"trapped: $msg\"}"),
        "trapped: oops"
    );
}

#[test]
fn format_pads_and_renders_integers_and_strings() {
    assert_eq!(eval("format {%5d|%-5d|%s} 3 3 hi"), "    3|3    |hi");
}

#[test]
fn format_renders_hex_and_float() {
    assert_eq!(eval("format {0x%X %.2f} 255 3.14159"), "0xFF 3.14");
}

#[test]
fn scan_extracts_integers_and_strings_into_caller_variables() {
    let mut interp = Interp::new();
    let count = interp.eval("scan {12 hello} {%d %s} n word").unwrap();
    assert_eq!(count.display_string_owned(), "2");
    let n = interp.eval("set n").unwrap();
    assert_eq!(n.display_string_owned(), "12");
    let word = interp.eval("set word").unwrap();
    assert_eq!(word.display_string_owned(), "hello");
}

#[test]
fn usage_defines_and_reports_spec_string() {
    let mut interp = Interp::new();
    let reported = interp.eval("usage greet {name {greeting hello}}").unwrap();
    assert_eq!(reported.display_string_owned(), "greet name ?greeting?");
    let queried = interp.eval("usage greet").unwrap();
    assert_eq!(queried.display_string_owned(), "greet name ?greeting?");
}

#[test]
fn usage_check_rejects_too_few_arguments() {
    let mut interp = Interp::new();
    interp.eval("usage greet {name {greeting hello}}").unwrap();
    let err = interp.eval("usage check greet").unwrap_err();
    assert!(err.to_string().contains("wrong # args"));
}

#[test]
fn string_and_dict_ensembles_dispatch_subcommands() {
    assert_eq!(eval("string length hello"), "5");
    assert_eq!(eval("string toupper hello"), "HELLO");
    assert_eq!(eval("string range hello 1 3"), "ell");
    assert_eq!(eval("dict exists [dict create a 1] a"), "1");
}

#[test]
fn list_ensemble_supports_append_and_sort() {
    assert_eq!(eval("lsort {banana apple cherry}"), "apple banana cherry");
    assert_eq!(eval("lappend l a b; lappend l c; set l"), "a b c");
}

#[test]
fn subst_novariables_reproduces_suppressed_variable_verbatim() {
    let mut interp = Interp::new();
    interp.eval("set x hi").unwrap();
    let out = interp.eval("subst -novariables {a$xb}").unwrap();
    assert_eq!(out.display_string_owned(), "a$xb");
}

#[test]
fn subst_nocommands_reproduces_suppressed_command_sub_verbatim() {
    let out = eval("subst -nocommands {a[set x hi]b}");
    assert_eq!(out, "a[set x hi]b");
}

#[test]
fn subst_nobackslashes_leaves_escape_sequence_literal() {
    let out = eval(r"subst -nobackslashes {a\nb}");
    assert_eq!(out, r"a\nb");
}

#[test]
fn subst_without_flags_still_resolves_everything() {
    let mut interp = Interp::new();
    interp.eval("set x hi").unwrap();
    let out = interp.eval(r"subst {a$x[set x there]b\n}").unwrap();
    assert_eq!(out.display_string_owned(), "ahithereb\n");
}
