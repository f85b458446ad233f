//! `string` ensemble (§4.9, §9 "Ensembles"): `length index range compare
//! equal match first last map tolower toupper totitle trim trimleft
//! trimright replace repeat reverse cat is`.

use std::str::FromStr;

use strum::{EnumString, VariantNames};

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
    parser::parse_list_index,
};

#[derive(Debug, Clone, Copy, EnumString, VariantNames)]
#[strum(serialize_all = "snake_case")]
enum StringSub {
    Length,
    Index,
    Range,
    Compare,
    Equal,
    Match,
    First,
    Last,
    Map,
    Tolower,
    Toupper,
    Totitle,
    Trim,
    Trimleft,
    Trimright,
    Replace,
    Repeat,
    Reverse,
    Cat,
    Is,
}

pub fn string_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"string subcommand ?arg ...?\""));
    }
    let sub_word = args[1].display_string_owned();
    let rest = &args[2..];
    let Ok(sub) = StringSub::from_str(&sub_word) else {
        return Err(super::ensemble_error(&sub_word, StringSub::VARIANTS));
    };
    match sub {
        StringSub::Length => length(rest),
        StringSub::Index => index(rest),
        StringSub::Range => range(rest),
        StringSub::Compare => compare(rest),
        StringSub::Equal => equal(rest),
        StringSub::Match => match_cmd(rest),
        StringSub::First => first(rest),
        StringSub::Last => last(rest),
        StringSub::Map => map_cmd(rest),
        StringSub::Tolower => Ok(Obj::from_string(text(rest, 0)?.to_lowercase())),
        StringSub::Toupper => Ok(Obj::from_string(text(rest, 0)?.to_uppercase())),
        StringSub::Totitle => totitle(rest),
        StringSub::Trim => Ok(Obj::from_string(trim_chars(rest)?.trim().to_owned())),
        StringSub::Trimleft => Ok(Obj::from_string(trim_left(rest)?)),
        StringSub::Trimright => Ok(Obj::from_string(trim_right(rest)?)),
        StringSub::Replace => replace(rest),
        StringSub::Repeat => repeat(rest),
        StringSub::Reverse => Ok(Obj::from_string(text(rest, 0)?.chars().rev().collect())),
        StringSub::Cat => Ok(Obj::from_string(rest.iter().map(Obj::display_string_owned).collect())),
        StringSub::Is => is_cmd(rest),
    }
}

fn text(args: &[Obj], idx: usize) -> RunResult<String> {
    args.get(idx).map(Obj::display_string_owned).ok_or_else(|| RunError::arity_error("wrong # args to string subcommand"))
}

fn length(args: &[Obj]) -> RunResult<Obj> {
    Ok(Obj::from_int(text(args, 0)?.chars().count() as i64))
}

fn resolve(s: &str, spec: &str) -> RunResult<usize> {
    let len = s.chars().count();
    parse_list_index(spec, len).ok_or_else(|| RunError::type_error(format!("bad index \"{spec}\": must be integer?[+-]integer? or end?[+-]integer?")))
}

fn index(args: &[Obj]) -> RunResult<Obj> {
    let s = text(args, 0)?;
    let spec = text(args, 1)?;
    let idx = resolve(&s, &spec)?;
    match s.chars().nth(idx) {
        Some(c) => Ok(Obj::from_string(c.to_string())),
        None => Ok(Obj::from_str("")),
    }
}

fn range(args: &[Obj]) -> RunResult<Obj> {
    let s = text(args, 0)?;
    let chars: Vec<char> = s.chars().collect();
    let from = resolve(&s, &text(args, 1)?)?;
    let to = resolve(&s, &text(args, 2)?)?;
    if from > to || from >= chars.len() {
        return Ok(Obj::from_str(""));
    }
    let to = to.min(chars.len() - 1);
    Ok(Obj::from_string(chars[from..=to].iter().collect()))
}

fn compare(args: &[Obj]) -> RunResult<Obj> {
    let (a, b) = strip_nocase_and_len(args)?;
    let n = match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
    Ok(Obj::from_int(n))
}

fn equal(args: &[Obj]) -> RunResult<Obj> {
    let (a, b) = strip_nocase_and_len(args)?;
    Ok(Obj::from_bool(a == b))
}

fn strip_nocase_and_len(args: &[Obj]) -> RunResult<(String, String)> {
    let mut nocase = false;
    let mut i = 0;
    while i < args.len() && args[i].display_string_owned().starts_with('-') {
        let flag = args[i].display_string_owned();
        if flag == "-nocase" {
            nocase = true;
            i += 1;
        } else if flag == "-length" {
            i += 2;
        } else {
            break;
        }
    }
    if args.len() < i + 2 {
        return Err(RunError::arity_error("wrong # args: should be \"string compare ?options? string1 string2\""));
    }
    let mut a = args[i].display_string_owned();
    let mut b = args[i + 1].display_string_owned();
    if nocase {
        a = a.to_lowercase();
        b = b.to_lowercase();
    }
    Ok((a, b))
}

fn match_cmd(args: &[Obj]) -> RunResult<Obj> {
    let mut i = 0;
    let mut nocase = false;
    if args.first().map(Obj::display_string_owned).as_deref() == Some("-nocase") {
        nocase = true;
        i += 1;
    }
    if args.len() < i + 2 {
        return Err(RunError::arity_error("wrong # args: should be \"string match ?-nocase? pattern string\""));
    }
    let pattern = args[i].display_string_owned();
    let value = args[i + 1].display_string_owned();
    let matched = if nocase {
        crate::glob::glob_match(&pattern.to_lowercase(), &value.to_lowercase())
    } else {
        crate::glob::glob_match(&pattern, &value)
    };
    Ok(Obj::from_bool(matched))
}

fn first(args: &[Obj]) -> RunResult<Obj> {
    let needle = text(args, 0)?;
    let haystack = text(args, 1)?;
    let start = if let Some(s) = args.get(2) { resolve(&haystack, &s.display_string_owned())? } else { 0 };
    let chars: Vec<char> = haystack.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    if needle_chars.is_empty() {
        return Ok(Obj::from_int(-1));
    }
    for i in start..chars.len() {
        if chars[i..].starts_with(needle_chars.as_slice()) {
            return Ok(Obj::from_int(i as i64));
        }
    }
    Ok(Obj::from_int(-1))
}

fn last(args: &[Obj]) -> RunResult<Obj> {
    let needle = text(args, 0)?;
    let haystack = text(args, 1)?;
    let chars: Vec<char> = haystack.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();
    if needle_chars.is_empty() || needle_chars.len() > chars.len() {
        return Ok(Obj::from_int(-1));
    }
    for i in (0..=chars.len() - needle_chars.len()).rev() {
        if chars[i..].starts_with(needle_chars.as_slice()) {
            return Ok(Obj::from_int(i as i64));
        }
    }
    Ok(Obj::from_int(-1))
}

fn map_cmd(args: &[Obj]) -> RunResult<Obj> {
    if args.is_empty() {
        return Err(RunError::arity_error("wrong # args: should be \"string map mapping string\""));
    }
    let mut map_obj = args[0].clone();
    let pairs = map_obj.as_list()?;
    let s = text(args, 1)?;
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    'outer: while i < chars.len() {
        let rest: String = chars[i..].iter().collect();
        for pair in pairs.chunks(2) {
            let from = pair[0].display_string_owned();
            if !from.is_empty() && rest.starts_with(from.as_str()) {
                out.push_str(&pair[1].display_string_owned());
                i += from.chars().count();
                continue 'outer;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    Ok(Obj::from_string(out))
}

fn totitle(args: &[Obj]) -> RunResult<Obj> {
    let s = text(args, 0)?;
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    };
    Ok(Obj::from_string(out))
}

fn trim_chars(args: &[Obj]) -> RunResult<String> {
    text(args, 0)
}

fn chars_set(args: &[Obj]) -> Option<String> {
    args.get(1).map(Obj::display_string_owned)
}

fn trim_left(args: &[Obj]) -> RunResult<String> {
    let s = text(args, 0)?;
    Ok(match chars_set(args) {
        Some(set) => s.trim_start_matches(|c| set.contains(c)).to_owned(),
        None => s.trim_start().to_owned(),
    })
}

fn trim_right(args: &[Obj]) -> RunResult<String> {
    let s = text(args, 0)?;
    Ok(match chars_set(args) {
        Some(set) => s.trim_end_matches(|c| set.contains(c)).to_owned(),
        None => s.trim_end().to_owned(),
    })
}

fn replace(args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"string replace string first last ?newString?\""));
    }
    let s = text(args, 0)?;
    let chars: Vec<char> = s.chars().collect();
    let from = resolve(&s, &text(args, 1)?)?;
    let to = resolve(&s, &text(args, 2)?)?;
    let replacement = args.get(3).map(Obj::display_string_owned).unwrap_or_default();
    if from >= chars.len() || from > to {
        return Ok(Obj::from_string(s));
    }
    let to = to.min(chars.len() - 1);
    let mut out: String = chars[..from].iter().collect();
    out.push_str(&replacement);
    out.extend(chars[to + 1..].iter());
    Ok(Obj::from_string(out))
}

fn repeat(args: &[Obj]) -> RunResult<Obj> {
    let s = text(args, 0)?;
    let mut count_obj = args.get(1).cloned().ok_or_else(|| RunError::arity_error("wrong # args: should be \"string repeat string count\""))?;
    let count = usize::try_from(count_obj.as_int()?).unwrap_or(0);
    Ok(Obj::from_string(s.repeat(count)))
}

fn is_cmd(args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"string is class ?-strict? string\""));
    }
    let class = args[0].display_string_owned();
    let s = args[args.len() - 1].display_string_owned();
    let ok = match class.as_str() {
        "alpha" => !s.is_empty() && s.chars().all(char::is_alphabetic),
        "digit" => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
        "alnum" => !s.is_empty() && s.chars().all(char::is_alphanumeric),
        "space" => !s.is_empty() && s.chars().all(char::is_whitespace),
        "upper" => !s.is_empty() && s.chars().all(char::is_uppercase),
        "lower" => !s.is_empty() && s.chars().all(char::is_lowercase),
        "integer" => {
            let mut o = Obj::from_str(&s);
            o.as_int().is_ok()
        }
        "double" => {
            let mut o = Obj::from_str(&s);
            o.as_double().is_ok()
        }
        "boolean" => matches!(s.as_str(), "0" | "1" | "true" | "false" | "yes" | "no" | "on" | "off"),
        "list" => {
            let mut o = Obj::from_str(&s);
            o.as_list().is_ok()
        }
        "ascii" => s.is_ascii(),
        other => return Err(RunError::user(format!("unknown string is class \"{other}\""))),
    };
    Ok(Obj::from_bool(ok))
}
