//! The literal seed scenarios from §8.

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
fn incr_and_puts() {
    let mut interp = Interp::new();
    let result = interp.eval("set x 41; incr x").unwrap();
    assert_eq!(result.display_string_owned(), "42");
}

#[test]
fn proc_with_optional_and_variadic_params() {
    assert_eq!(eval("proc f {a {b 2} args} { list $a $b $args } ; f 1"), "1 2 {}");
}

#[test]
fn recursive_factorial() {
    assert_eq!(
        eval("proc fact {n} { if {$n <= 1} {return 1}; expr {$n * [fact [expr {$n-1}]]} } ; fact 5"),
        "120"
    );
}

#[test]
fn nested_list_length_and_index() {
    let mut interp = Interp::new();
    let llength = interp.eval("set x {a b {c d}} ; llength $x").unwrap();
    assert_eq!(llength.display_string_owned(), "3");
    let lindex = interp.eval("lindex $x 2").unwrap();
    assert_eq!(lindex.display_string_owned(), "c d");
}

#[test]
fn dict_create_get_keys() {
    let mut interp = Interp::new();
    interp.eval("set d [dict create name Alice age 30]").unwrap();
    let age = interp.eval("dict get $d age").unwrap();
    assert_eq!(age.display_string_owned(), "30");
    let keys = interp.eval("dict keys $d").unwrap();
    assert_eq!(keys.display_string_owned(), "name age");
}

#[test]
fn catch_divide_by_zero() {
    let mut interp = Interp::new();
    let code = interp.eval("catch {expr {1/0}} msg").unwrap();
    assert_eq!(code.display_string_owned(), "1");
    let msg = interp.eval("set msg").unwrap();
    assert_eq!(msg.display_string_owned(), "divide by zero");
}

#[test]
fn namespace_eval_and_qualified_call() {
    assert_eq!(eval("namespace eval foo {proc bar {} {return 42}} ; foo::bar"), "42");
}

#[test]
fn for_loop_accumulates_string() {
    assert_eq!(eval("set s {}; for {set i 0} {$i<3} {incr i} {append s $i} ; set s"), "012");
}
