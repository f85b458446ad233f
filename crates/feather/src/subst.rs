//! Substitution engine (§2, §4.4).
//!
//! Resolves the fragments the parser produced for one word into a single
//! `Obj`. A word made of exactly one `Var` or `CommandSub` fragment hands
//! back that fragment's resolved `Obj` untouched, preserving whatever
//! internal representation it already carries — this is what lets
//! `set x $y; cmd $x` carry a list/dict/foreign value across without a
//! round trip through its string form (§4.4). Any other shape of word
//! (multiple fragments, or a bare literal) is assembled by concatenating
//! each fragment's string form.

use crate::{
    error::RunResult,
    interp::Interp,
    obj::Obj,
    parser::{Fragment, Word},
};

/// Array element access is modeled by flattening `name(index)` into a single
/// compound variable-table key (`"name(index)"`) rather than introducing a
/// distinct array type — the data model in §3 has no `Array` record, only
/// scalar `Obj` variables, so this is the minimal extension that satisfies
/// the `$name(index)` substitution syntax §4.3 specifies.
fn compound_name(interp: &mut Interp, name: &str, index: &Option<Vec<Fragment>>) -> RunResult<String> {
    match index {
        None => Ok(name.to_owned()),
        Some(frags) => {
            let idx = substitute_word(interp, frags)?;
            Ok(format!("{name}({})", idx.display_string_owned()))
        }
    }
}

/// Resolves one fragment to an `Obj`, preserving internal representation.
fn substitute_fragment(interp: &mut Interp, fragment: &Fragment) -> RunResult<Obj> {
    match fragment {
        Fragment::Literal(s) => Ok(Obj::from_str(s)),
        Fragment::Var { name, index } => {
            let compound = compound_name(interp, name, index)?;
            interp.get_var(&compound)
        }
        Fragment::CommandSub(src) => interp.eval_body_str(src),
    }
}

/// Resolves a full word's fragments into its substituted `Obj` (§4.4).
pub fn substitute_word(interp: &mut Interp, word: &Word) -> RunResult<Obj> {
    match word {
        [] => Ok(Obj::from_str("")),
        [single] => substitute_fragment(interp, single),
        many => {
            let mut out = String::new();
            for frag in many {
                out.push_str(&substitute_fragment(interp, frag)?.display_string_owned());
            }
            Ok(Obj::from_string(out))
        }
    }
}

/// Implements the `subst` builtin's selective-suppression flags (§4.9). A
/// suppressed piece falls back to its raw source text rather than being
/// dropped — `subst -novariables {a$xb}` must read back `a$xb`, not `ab` —
/// which is why `parser::parse_subst_text` hands back [`SubstPiece`]s that
/// each carry their own raw text alongside their resolved meaning.
pub fn subst_with_flags(interp: &mut Interp, src: &str, no_backslashes: bool, no_commands: bool, no_variables: bool) -> RunResult<Obj> {
    use crate::parser::SubstPiece;
    let pieces = crate::parser::parse_subst_text(src).map_err(|e| crate::error::RunError::Exc(Box::new(e)))?;
    let mut out = String::new();
    for piece in pieces {
        match piece {
            SubstPiece::Literal(s) => out.push_str(&s),
            SubstPiece::Var { raw, name, index } => {
                if no_variables {
                    out.push_str(&raw);
                } else {
                    let compound = compound_name(interp, &name, &index)?;
                    out.push_str(&interp.get_var(&compound)?.display_string_owned());
                }
            }
            SubstPiece::CommandSub { raw, inner } => {
                if no_commands {
                    out.push_str(&raw);
                } else {
                    out.push_str(&interp.eval_body_str(&inner)?.display_string_owned());
                }
            }
            SubstPiece::Backslash { raw, value } => out.push_str(if no_backslashes { &raw } else { &value }),
        }
    }
    Ok(Obj::from_string(out))
}
