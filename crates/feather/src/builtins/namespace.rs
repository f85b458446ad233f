//! `namespace` ensemble (§4.6, §4.9, §9 "Ensembles"): `eval current parent
//! children exists delete export import origin which code inscope
//! qualifiers tail`.

use std::str::FromStr;

use strum::{EnumString, VariantNames};

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    nstree::NamespaceTree,
    obj::Obj,
};

#[derive(Debug, Clone, Copy, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
enum NamespaceSub {
    Eval,
    Current,
    Parent,
    Children,
    Exists,
    Delete,
    Export,
    Import,
    Origin,
    Which,
    Code,
    Inscope,
    Qualifiers,
    Tail,
}

pub fn namespace_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"namespace subcommand ?arg ...?\""));
    }
    let sub_word = args[1].display_string_owned();
    let rest = &args[2..];
    let Ok(sub) = NamespaceSub::from_str(&sub_word) else {
        return Err(super::ensemble_error(&sub_word, NamespaceSub::VARIANTS));
    };
    match sub {
        NamespaceSub::Eval => eval(interp, rest),
        NamespaceSub::Current => Ok(Obj::from_string(interp.current_namespace_path())),
        NamespaceSub::Parent => parent(interp, rest),
        NamespaceSub::Children => children(interp, rest),
        NamespaceSub::Exists => exists(interp, rest),
        NamespaceSub::Delete => delete(interp, rest),
        NamespaceSub::Export => export(interp, rest),
        NamespaceSub::Import => import(interp, rest),
        NamespaceSub::Origin | NamespaceSub::Which => origin(interp, rest),
        NamespaceSub::Code => code(rest),
        NamespaceSub::Inscope => inscope(interp, rest),
        NamespaceSub::Qualifiers => Ok(Obj::from_string(qualifiers(&text(rest, 0)?))),
        NamespaceSub::Tail => Ok(Obj::from_string(tail(&text(rest, 0)?))),
    }
}

fn text(args: &[Obj], idx: usize) -> RunResult<String> {
    args.get(idx).map(Obj::display_string_owned).ok_or_else(|| RunError::arity_error("wrong # args to namespace subcommand"))
}

fn eval(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"namespace eval name arg ?arg ...?\""));
    }
    let path = args[0].display_string_owned();
    let body = if args.len() == 2 { args[1].display_string_owned() } else { args[1..].iter().map(Obj::display_string_owned).collect::<Vec<_>>().join(" ") };
    interp.with_namespace_eval(&path, &body)
}

fn resolve(interp: &Interp, name: &str) -> RunResult<usize> {
    let current = interp.current_namespace_id();
    interp
        .namespaces
        .find_path(current, name)
        .ok_or_else(|| RunError::name_error(format!("unknown namespace \"{name}\"")))
}

fn parent(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let id = match args.first() {
        Some(n) => resolve(interp, &n.display_string_owned())?,
        None => interp.current_namespace_id(),
    };
    match interp.namespaces.parent_of(id) {
        Some(p) => Ok(Obj::from_string(interp.namespaces.path_of(p).to_owned())),
        None => Ok(Obj::from_str("")),
    }
}

fn children(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let id = match args.first() {
        Some(n) => resolve(interp, &n.display_string_owned())?,
        None => interp.current_namespace_id(),
    };
    let pattern = args.get(1).map(Obj::display_string_owned);
    let base = interp.namespaces.path_of(id).to_owned();
    let children: Vec<Obj> = interp
        .namespaces
        .children_of(id)
        .filter(|(name, _)| pattern.as_deref().is_none_or(|p| crate::glob::glob_match(p, name)))
        .map(|(name, _)| {
            let full = if base == "::" { format!("::{name}") } else { format!("{base}::{name}") };
            Obj::from_string(full)
        })
        .collect();
    Ok(Obj::from_list(children))
}

fn exists(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let name = text(args, 0)?;
    let current = interp.current_namespace_id();
    Ok(Obj::from_bool(interp.namespaces.find_path(current, &name).is_some()))
}

fn delete(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    for arg in args {
        let name = arg.display_string_owned();
        let id = resolve(interp, &name)?;
        interp.namespaces.delete(id);
    }
    Ok(Obj::from_str(""))
}

fn export(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let current = interp.current_namespace_id();
    let mut patterns: Vec<String> = args.iter().map(Obj::display_string_owned).collect();
    patterns.retain(|p| p != "-clear");
    if args.first().map(Obj::display_string_owned).as_deref() == Some("-clear") {
        interp.namespaces.node_mut(current).exports.clear();
    }
    interp.namespaces.node_mut(current).exports.extend(patterns);
    Ok(Obj::from_str(""))
}

fn import(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let current = interp.current_namespace_id();
    for arg in args {
        let pattern = arg.display_string_owned();
        let (_, parts) = NamespaceTree::split_path(&pattern);
        if parts.len() < 2 {
            return Err(RunError::user(format!("invalid import pattern \"{pattern}\"")));
        }
        let cmd_pattern = parts[parts.len() - 1];
        let ns_path = parts[..parts.len() - 1].join("::");
        let src = resolve(interp, &ns_path)?;
        interp.namespaces.import(current, src, cmd_pattern);
    }
    Ok(Obj::from_str(""))
}

fn origin(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    let name = text(args, 0)?;
    let current = interp.current_namespace_id();
    match interp.namespaces.lookup_command(current, &name) {
        Some((owner, _)) => {
            let path = interp.namespaces.path_of(owner).to_owned();
            let full = if path == "::" { format!("::{name}") } else { format!("{path}::{name}") };
            Ok(Obj::from_string(full))
        }
        None => Err(RunError::name_error(format!("invalid command name \"{name}\""))),
    }
}

fn code(args: &[Obj]) -> RunResult<Obj> {
    Ok(Obj::from_list(args.to_vec()))
}

fn inscope(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"namespace inscope name arg ?arg ...?\""));
    }
    let path = args[0].display_string_owned();
    let body = args[1..].iter().map(Obj::display_string_owned).collect::<Vec<_>>().join(" ");
    interp.with_namespace_eval(&path, &body)
}

fn qualifiers(name: &str) -> String {
    match name.rfind("::") {
        Some(idx) => name[..idx].to_owned(),
        None => String::new(),
    }
}

fn tail(name: &str) -> String {
    match name.rfind("::") {
        Some(idx) => name[idx + 2..].to_owned(),
        None => name.to_owned(),
    }
}
