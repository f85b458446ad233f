//! `format` / `scan`: printf-family conversion commands (§4.9).
//!
//! Supports `%d %i %u %o %x %X %e %E %f %g %G %s %c %%`, field width,
//! precision, and the flags `- + 0 # space`.

use crate::{
    error::{RunError, RunResult},
    interp::Interp,
    obj::Obj,
};

struct Spec {
    left_align: bool,
    force_sign: bool,
    space_sign: bool,
    zero_pad: bool,
    alt_form: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conv: char,
}

pub fn format_cmd(_interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 2 {
        return Err(RunError::arity_error("wrong # args: should be \"format formatString ?arg ...?\""));
    }
    let fmt = args[1].display_string_owned();
    let values = &args[2..];
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    let mut arg_idx = 0usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }
        let spec = parse_spec(&mut chars)?;
        if spec.conv == '%' {
            out.push('%');
            continue;
        }
        let value = values.get(arg_idx).cloned().ok_or_else(|| RunError::arity_error("not enough arguments for all format specifiers"))?;
        arg_idx += 1;
        out.push_str(&render(&spec, value)?);
    }
    Ok(Obj::from_string(out))
}

fn parse_spec(chars: &mut std::iter::Peekable<std::str::Chars>) -> RunResult<Spec> {
    let mut left_align = false;
    let mut force_sign = false;
    let mut space_sign = false;
    let mut zero_pad = false;
    let mut alt_form = false;

    loop {
        match chars.peek() {
            Some('-') => {
                left_align = true;
                chars.next();
            }
            Some('+') => {
                force_sign = true;
                chars.next();
            }
            Some(' ') => {
                space_sign = true;
                chars.next();
            }
            Some('0') => {
                zero_pad = true;
                chars.next();
            }
            Some('#') => {
                alt_form = true;
                chars.next();
            }
            _ => break,
        }
    }

    let width = parse_digits(chars);

    let precision = if chars.peek() == Some(&'.') {
        chars.next();
        Some(parse_digits(chars).unwrap_or(0))
    } else {
        None
    };

    let conv = chars.next().ok_or_else(|| RunError::user("format string ended in middle of field specifier"))?;
    Ok(Spec {
        left_align,
        force_sign,
        space_sign,
        zero_pad,
        alt_form,
        width,
        precision,
        conv,
    })
}

fn parse_digits(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<usize> {
    let mut s = String::new();
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            s.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    if s.is_empty() {
        None
    } else {
        s.parse().ok()
    }
}

fn pad(body: String, spec: &Spec, numeric: bool) -> String {
    let Some(width) = spec.width else { return body };
    if body.chars().count() >= width {
        return body;
    }
    let fill_count = width - body.chars().count();
    if spec.left_align {
        let mut s = body;
        s.push_str(&" ".repeat(fill_count));
        s
    } else if spec.zero_pad && numeric {
        let (sign, rest) = if let Some(stripped) = body.strip_prefix(['-', '+']) {
            (&body[..1], stripped)
        } else {
            ("", body.as_str())
        };
        format!("{sign}{}{rest}", "0".repeat(fill_count))
    } else {
        format!("{}{body}", " ".repeat(fill_count))
    }
}

fn sign_prefix(spec: &Spec, negative: bool) -> &'static str {
    if negative {
        ""
    } else if spec.force_sign {
        "+"
    } else if spec.space_sign {
        " "
    } else {
        ""
    }
}

fn render(spec: &Spec, mut value: Obj) -> RunResult<String> {
    let body = match spec.conv {
        'd' | 'i' => {
            let n = value.as_int()?;
            let digits = n.unsigned_abs().to_string();
            let sign = if n < 0 { "-" } else { sign_prefix(spec, false) };
            format!("{sign}{digits}")
        }
        'u' => {
            let n = value.as_int()?;
            #[allow(clippy::cast_sign_loss, reason = "unsigned conversion specifier")]
            format!("{}", n as u64)
        }
        'o' => {
            let n = value.as_int()?;
            let prefix = if spec.alt_form { "0" } else { "" };
            #[allow(clippy::cast_sign_loss, reason = "octal conversion specifier")]
            format!("{prefix}{:o}", n as u64)
        }
        'x' => {
            let n = value.as_int()?;
            let prefix = if spec.alt_form { "0x" } else { "" };
            #[allow(clippy::cast_sign_loss, reason = "hex conversion specifier")]
            format!("{prefix}{:x}", n as u64)
        }
        'X' => {
            let n = value.as_int()?;
            let prefix = if spec.alt_form { "0X" } else { "" };
            #[allow(clippy::cast_sign_loss, reason = "hex conversion specifier")]
            format!("{prefix}{:X}", n as u64)
        }
        'c' => {
            let n = value.as_int()?;
            u32::try_from(n).ok().and_then(char::from_u32).map(String::from).unwrap_or_default()
        }
        's' => {
            let s = value.display_string_owned();
            match spec.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s,
            }
        }
        'f' | 'e' | 'E' | 'g' | 'G' => {
            let n = value.as_double()?;
            let precision = spec.precision.unwrap_or(6);
            let sign = sign_prefix(spec, n < 0.0);
            match spec.conv {
                'f' => format!("{sign}{n:.precision$}"),
                'e' => format!("{sign}{n:.precision$e}"),
                'E' => format!("{sign}{n:.precision$E}"),
                _ => format!("{sign}{n}"),
            }
        }
        other => return Err(RunError::user(format!("bad field specifier \"{other}\""))),
    };
    let numeric = !matches!(spec.conv, 's' | 'c');
    Ok(pad(body, spec, numeric))
}

/// `scan string format ?varName ...?`: supports `%d %f %s %c` conversions,
/// whitespace-delimited by default. Returns the count of successful
/// conversions, or writes into the named variables when supplied.
pub fn scan_cmd(interp: &mut Interp, args: &[Obj]) -> RunResult<Obj> {
    if args.len() < 3 {
        return Err(RunError::arity_error("wrong # args: should be \"scan string format ?varName ...?\""));
    }
    let source = args[1].display_string_owned();
    let fmt = args[2].display_string_owned();
    let var_names = &args[3..];

    let mut results: Vec<Obj> = Vec::new();
    let mut src_chars = source.chars().peekable();
    let mut fmt_chars = fmt.chars().peekable();

    while let Some(fc) = fmt_chars.next() {
        if fc == '%' {
            let conv = fmt_chars.next().ok_or_else(|| RunError::user("scan: format string ended in conversion"))?;
            match conv {
                '%' => {
                    if src_chars.peek() == Some(&'%') {
                        src_chars.next();
                    }
                }
                'd' | 'i' => {
                    skip_ws(&mut src_chars);
                    let token = take_number(&mut src_chars);
                    if token.is_empty() {
                        break;
                    }
                    results.push(Obj::from_int(token.parse().unwrap_or(0)));
                }
                'f' | 'e' | 'g' => {
                    skip_ws(&mut src_chars);
                    let token = take_float(&mut src_chars);
                    if token.is_empty() {
                        break;
                    }
                    results.push(Obj::from_double(token.parse().unwrap_or(0.0)));
                }
                's' => {
                    skip_ws(&mut src_chars);
                    let mut token = String::new();
                    while let Some(&c) = src_chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        token.push(c);
                        src_chars.next();
                    }
                    results.push(Obj::from_string(token));
                }
                'c' => {
                    if let Some(c) = src_chars.next() {
                        results.push(Obj::from_int(i64::from(c as u32)));
                    }
                }
                other => return Err(RunError::user(format!("bad scan conversion \"{other}\""))),
            }
        } else if fc.is_whitespace() {
            skip_ws(&mut src_chars);
        } else if src_chars.peek() == Some(&fc) {
            src_chars.next();
        } else {
            break;
        }
    }

    if var_names.is_empty() {
        return Ok(Obj::from_list(results));
    }
    let count = results.len();
    for (name, value) in var_names.iter().zip(results.into_iter()) {
        interp.set_var(&name.display_string_owned(), value)?;
    }
    Ok(Obj::from_int(count as i64))
}

fn skip_ws(chars: &mut std::iter::Peekable<std::str::Chars>) {
    while let Some(c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else {
            break;
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut s = String::new();
    if matches!(chars.peek(), Some('-' | '+')) {
        s.push(chars.next().unwrap());
    }
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() {
            s.push(c);
            chars.next();
        } else {
            break;
        }
    }
    s
}

fn take_float(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut s = take_number(chars);
    if chars.peek() == Some(&'.') {
        s.push(chars.next().unwrap());
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                chars.next();
            } else {
                break;
            }
        }
    }
    if matches!(chars.peek(), Some('e' | 'E')) {
        s.push(chars.next().unwrap());
        if matches!(chars.peek(), Some('-' | '+')) {
            s.push(chars.next().unwrap());
        }
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                chars.next();
            } else {
                break;
            }
        }
    }
    s
}
