//! The remaining §8 testable properties not covered by `seed_scenarios.rs`,
//! `repl_protocol.rs`, or `scope_linking.rs`: shimmering preserves semantics,
//! list/dict round-trip, recursion-limit honored, and idempotence.

use feather::{Interp, ResourceLimits};
use pretty_assertions::assert_eq;

/// "shimmering preserves semantics": forcing a value through an internal
/// representation (int, list) and back to its string form never changes
/// what the string form looks like, since the string rep is cached
/// alongside whichever internal rep got materialized (§3.2 shimmering).
#[test]
fn shimmering_does_not_change_string_representation() {
    let mut interp = Interp::new();
    interp.eval("set n 007").unwrap();
    let numeric_use = interp.eval("expr {$n + 0}").unwrap();
    assert_eq!(numeric_use.display_string_owned(), "7");
    let still_same_string = interp.eval("set n").unwrap();
    assert_eq!(still_same_string.display_string_owned(), "007");

    interp.eval("set l {a b c}").unwrap();
    let list_use = interp.eval("lindex $l 1").unwrap();
    assert_eq!(list_use.display_string_owned(), "b");
    let still_same_list_string = interp.eval("set l").unwrap();
    assert_eq!(still_same_list_string.display_string_owned(), "a b c");
}

/// "list/dict round-trip": reconstructing a list from its own elements via
/// `{*}` expansion preserves length, and re-setting a dict key to its
/// current value is a no-op on the visible key set.
#[test]
fn list_round_trips_through_expansion() {
    let mut interp = Interp::new();
    let original = interp.eval("set l {a b {c d} e}").unwrap();
    let original_len = original.display_string_owned();
    let rebuilt_len = interp.eval("llength [list {*}$l]").unwrap();
    let direct_len = interp.eval("llength $l").unwrap();
    assert_eq!(rebuilt_len.display_string_owned(), direct_len.display_string_owned());
    assert_eq!(original_len, "a b {c d} e");
}

#[test]
fn dict_round_trips_on_same_value_set() {
    let mut interp = Interp::new();
    interp.eval("set d [dict create a 1 b 2]").unwrap();
    let before = interp.eval("dict keys $d").unwrap();
    interp.eval("dict set d a 1").unwrap();
    let after = interp.eval("dict keys $d").unwrap();
    assert_eq!(before.display_string_owned(), after.display_string_owned());
    let size = interp.eval("dict size $d").unwrap();
    assert_eq!(size.display_string_owned(), "2");
}

/// "recursion-limit honored": unbounded recursion raises an error rather
/// than overflowing the host stack, and the interpreter stays usable
/// afterward (§4.4, §5).
#[test]
fn recursion_limit_terminates_cleanly_and_leaves_interp_usable() {
    let mut interp = Interp::with_limits(ResourceLimits {
        max_recursion_depth: 64,
        ..ResourceLimits::default()
    });
    let err = interp
        .eval("proc spin {} { spin } ; spin")
        .expect_err("unbounded recursion should raise, not overflow the stack");
    assert!(err.to_string().contains("too many nested evaluations") || err.to_string().contains("recursion"));

    let still_alive = interp.eval("set x 1; incr x").unwrap();
    assert_eq!(still_alive.display_string_owned(), "2");
}

/// "idempotence": `set x [set x]` never changes `x`'s value, and a caught
/// error leaves its message text exactly as raised.
#[test]
fn set_of_its_own_value_is_a_no_op() {
    let mut interp = Interp::new();
    interp.eval("set x {hello world}").unwrap();
    let result = interp.eval("set x [set x]").unwrap();
    assert_eq!(result.display_string_owned(), "hello world");
}

#[test]
fn caught_error_message_is_preserved_verbatim() {
    let mut interp = Interp::new();
    let code = interp.eval("catch {error foo} msg").unwrap();
    assert_eq!(code.display_string_owned(), "1");
    let msg = interp.eval("set msg").unwrap();
    assert_eq!(msg.display_string_owned(), "foo");
}
