//! Upvar/global/namespace-variable linking (§4.6, §4.7, §8 "Scope linking").

use feather::Interp;
use pretty_assertions::assert_eq;

#[test]
fn upvar_aliases_caller_local() {
    let mut interp = Interp::new();
    interp
        .eval(
            "proc bump {} {
                upvar 1 x y
                set y [expr {$y + 1}]
            }
            set x 10
            bump
            bump",
        )
        .unwrap();
    let x = interp.eval("set x").unwrap();
    assert_eq!(x.display_string_owned(), "12");
}

#[test]
fn global_links_root_namespace_variable() {
    let mut interp = Interp::new();
    interp
        .eval(
            "set counter 0
            proc tick {} {
                global counter
                incr counter
            }
            tick
            tick
            tick",
        )
        .unwrap();
    let counter = interp.eval("set counter").unwrap();
    assert_eq!(counter.display_string_owned(), "3");
}

#[test]
fn namespace_eval_shares_variables_across_calls() {
    let mut interp = Interp::new();
    interp
        .eval(
            "namespace eval counter {
                variable n 0
                proc next {} {
                    variable n
                    incr n
                }
            }
            counter::next
            counter::next",
        )
        .unwrap();
    let n = interp.eval("namespace eval counter {variable n; set n}").unwrap();
    assert_eq!(n.display_string_owned(), "2");
}

#[test]
fn nested_namespaces_resolve_by_ancestor_search() {
    let mut interp = Interp::new();
    interp
        .eval(
            "namespace eval outer {
                proc helper {} { return from-outer }
                namespace eval inner {
                    proc call_helper {} { helper }
                }
            }",
        )
        .unwrap();
    let result = interp.eval("outer::inner::call_helper").unwrap();
    assert_eq!(result.display_string_owned(), "from-outer");
}

#[test]
fn uplevel_runs_body_in_caller_frame() {
    let mut interp = Interp::new();
    interp
        .eval(
            "proc set_in_caller {} {
                uplevel 1 {set injected 99}
            }
            proc caller {} {
                set_in_caller
                return $injected
            }",
        )
        .unwrap();
    let result = interp.eval("caller").unwrap();
    assert_eq!(result.display_string_owned(), "99");
}
