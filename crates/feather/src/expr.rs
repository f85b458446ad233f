//! The `expr` sub-language: a precedence-climbing evaluator (§4.5).
//!
//! Shares the main parser's `$name`/`${name}`/`$name(index)`, `[ … ]`,
//! `" … "`, and `{ … }` recognizers (`parser::Scanner`) for operands, then
//! layers a standard operator-precedence parser over them for the
//! arithmetic/comparison/logic/bit grammar.

use crate::{
    error::{ExcKind, RaisedError, RunError, RunResult},
    interp::Interp,
    obj::Obj,
    parser::{Fragment, ScanError, Scanner},
    subst,
};

/// Evaluates an `expr`-sublanguage source string to a single `Obj` (§4.5).
pub fn eval_expr(interp: &mut Interp, src: &str) -> RunResult<Obj> {
    let mut parser = ExprParser {
        scanner: Scanner::new(src),
        interp,
        full_src: src,
    };
    parser.skip_ws();
    let value = parser.parse_ternary()?;
    parser.skip_ws();
    if !parser.scanner.at_end() {
        return Err(RunError::parse_error(format!("extra characters after expression: \"{}\"", &src[parser.scanner.pos()..])));
    }
    Ok(value)
}

struct ExprParser<'a, 'i> {
    scanner: Scanner<'a>,
    interp: &'i mut Interp,
    full_src: &'a str,
}

fn parse_incomplete_to_err() -> RunError {
    RunError::Exc(Box::new(RaisedError::new(ExcKind::ParseError, "incomplete expression")))
}

impl ExprParser<'_, '_> {
    fn skip_ws(&mut self) {
        while matches!(self.scanner.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.scanner.advance();
        }
    }

    fn scanner_rest(&self) -> &str {
        &self.full_src[self.scanner.pos()..]
    }

    fn scanner_full_str(&self) -> &str {
        self.full_src
    }

    fn consume_op(&mut self, len: usize) {
        self.scanner.set_pos(self.scanner.pos() + len);
    }

    // ---- precedence ladder, lowest to highest (§4.5) ----------------------

    fn parse_ternary(&mut self) -> RunResult<Obj> {
        let cond = self.parse_or()?;
        self.skip_ws();
        if self.scanner.peek() == Some(b'?') {
            self.consume_op(1);
            self.skip_ws();
            let then_val = self.parse_ternary()?;
            self.skip_ws();
            if self.scanner.peek() != Some(b':') {
                return Err(RunError::parse_error("expected ':' in ternary expression"));
            }
            self.consume_op(1);
            self.skip_ws();
            let else_val = self.parse_ternary()?;
            return Ok(if is_truthy(&cond)? { then_val } else { else_val });
        }
        Ok(cond)
    }

    fn parse_or(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_ws();
            if self.scanner_rest().starts_with("||") {
                self.consume_op(2);
                self.skip_ws();
                let rhs = self.parse_and()?;
                lhs = Obj::from_bool(is_truthy(&lhs)? || is_truthy(&rhs)?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_and(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_bitor()?;
        loop {
            self.skip_ws();
            if self.scanner_rest().starts_with("&&") {
                self.consume_op(2);
                self.skip_ws();
                let rhs = self.parse_bitor()?;
                lhs = Obj::from_bool(is_truthy(&lhs)? && is_truthy(&rhs)?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_bitor(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_bitxor()?;
        loop {
            self.skip_ws();
            if self.scanner.peek() == Some(b'|') && self.scanner_rest().as_bytes().get(1) != Some(&b'|') {
                self.consume_op(1);
                self.skip_ws();
                let mut a = lhs.clone();
                let mut b = self.parse_bitxor()?;
                lhs = Obj::from_int(a.as_int()? | b.as_int()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_bitxor(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_bitand()?;
        loop {
            self.skip_ws();
            if self.scanner.peek() == Some(b'^') {
                self.consume_op(1);
                self.skip_ws();
                let mut a = lhs.clone();
                let mut b = self.parse_bitand()?;
                lhs = Obj::from_int(a.as_int()? ^ b.as_int()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_bitand(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_equality()?;
        loop {
            self.skip_ws();
            if self.scanner.peek() == Some(b'&') && self.scanner_rest().as_bytes().get(1) != Some(&b'&') {
                self.consume_op(1);
                self.skip_ws();
                let mut a = lhs.clone();
                let mut b = self.parse_equality()?;
                lhs = Obj::from_int(a.as_int()? & b.as_int()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_equality(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_relational()?;
        loop {
            self.skip_ws();
            let rest = self.scanner_rest();
            let op = if rest.starts_with("==") {
                Some("==")
            } else if rest.starts_with("!=") {
                Some("!=")
            } else if starts_with_word(rest, "eq") {
                Some("eq")
            } else if starts_with_word(rest, "ne") {
                Some("ne")
            } else if starts_with_word(rest, "in") {
                Some("in")
            } else if starts_with_word(rest, "ni") {
                Some("ni")
            } else {
                None
            };
            let Some(op) = op else { return Ok(lhs) };
            self.consume_op(op.len());
            self.skip_ws();
            let rhs = self.parse_relational()?;
            lhs = match op {
                "==" => Obj::from_bool(lhs.compare_numeric_or_string(&rhs) == std::cmp::Ordering::Equal),
                "!=" => Obj::from_bool(lhs.compare_numeric_or_string(&rhs) != std::cmp::Ordering::Equal),
                "eq" => Obj::from_bool(lhs.to_display_string() == rhs.to_display_string()),
                "ne" => Obj::from_bool(lhs.to_display_string() != rhs.to_display_string()),
                "in" | "ni" => {
                    let mut list_obj = rhs.clone();
                    let items = list_obj.as_list()?;
                    let found = items.iter().any(|item| item.to_display_string() == lhs.to_display_string());
                    Obj::from_bool(if op == "in" { found } else { !found })
                }
                _ => unreachable!(),
            };
        }
    }

    fn parse_relational(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_shift()?;
        loop {
            self.skip_ws();
            let rest = self.scanner_rest();
            let op = if rest.starts_with("<=") {
                Some("<=")
            } else if rest.starts_with(">=") {
                Some(">=")
            } else if rest.starts_with('<') {
                Some("<")
            } else if rest.starts_with('>') {
                Some(">")
            } else {
                None
            };
            let Some(op) = op else { return Ok(lhs) };
            self.consume_op(op.len());
            self.skip_ws();
            let rhs = self.parse_shift()?;
            let ord = lhs.compare_numeric_or_string(&rhs);
            lhs = Obj::from_bool(match op {
                "<" => ord.is_lt(),
                ">" => ord.is_gt(),
                "<=" => ord.is_le(),
                ">=" => ord.is_ge(),
                _ => unreachable!(),
            });
        }
    }

    fn parse_shift(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_additive()?;
        loop {
            self.skip_ws();
            let rest = self.scanner_rest();
            let op = if rest.starts_with("<<") {
                Some("<<")
            } else if rest.starts_with(">>") {
                Some(">>")
            } else {
                None
            };
            let Some(op) = op else { return Ok(lhs) };
            self.consume_op(2);
            self.skip_ws();
            let mut a = lhs.clone();
            let mut b = self.parse_additive()?;
            let (x, y) = (a.as_int()?, b.as_int()?);
            lhs = Obj::from_int(if op == "<<" { x.wrapping_shl(y as u32) } else { x.wrapping_shr(y as u32) });
        }
    }

    fn parse_additive(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            self.skip_ws();
            match self.scanner.peek() {
                Some(b'+') => {
                    self.consume_op(1);
                    self.skip_ws();
                    let rhs = self.parse_multiplicative()?;
                    lhs = numeric_binop(&lhs, &rhs, |a, b| a.checked_add(b), |a, b| a + b)?;
                }
                Some(b'-') => {
                    self.consume_op(1);
                    self.skip_ws();
                    let rhs = self.parse_multiplicative()?;
                    lhs = numeric_binop(&lhs, &rhs, |a, b| a.checked_sub(b), |a, b| a - b)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_multiplicative(&mut self) -> RunResult<Obj> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_ws();
            match self.scanner.peek() {
                Some(b'*') if self.scanner_rest().as_bytes().get(1) != Some(&b'*') => {
                    self.consume_op(1);
                    self.skip_ws();
                    let rhs = self.parse_unary()?;
                    lhs = numeric_binop(&lhs, &rhs, |a, b| a.checked_mul(b), |a, b| a * b)?;
                }
                Some(b'/') => {
                    self.consume_op(1);
                    self.skip_ws();
                    let rhs = self.parse_unary()?;
                    lhs = divide(&lhs, &rhs)?;
                }
                Some(b'%') => {
                    self.consume_op(1);
                    self.skip_ws();
                    let rhs = self.parse_unary()?;
                    lhs = modulo(&lhs, &rhs)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn parse_unary(&mut self) -> RunResult<Obj> {
        self.skip_ws();
        match self.scanner.peek() {
            Some(b'-') => {
                self.consume_op(1);
                self.skip_ws();
                let mut v = self.parse_unary()?;
                if let Ok(n) = v.as_int() {
                    Ok(Obj::from_int(-n))
                } else {
                    Ok(Obj::from_double(-v.as_double()?))
                }
            }
            Some(b'+') => {
                self.consume_op(1);
                self.skip_ws();
                self.parse_unary()
            }
            Some(b'!') => {
                self.consume_op(1);
                self.skip_ws();
                let v = self.parse_unary()?;
                Ok(Obj::from_bool(!is_truthy(&v)?))
            }
            Some(b'~') => {
                self.consume_op(1);
                self.skip_ws();
                let mut v = self.parse_unary()?;
                Ok(Obj::from_int(!v.as_int()?))
            }
            _ => self.parse_power(),
        }
    }

    /// `**` is right-associative and binds tighter than unary (§4.5).
    fn parse_power(&mut self) -> RunResult<Obj> {
        let lhs = self.parse_primary()?;
        self.skip_ws();
        if self.scanner_rest().starts_with("**") {
            self.consume_op(2);
            self.skip_ws();
            let rhs = self.parse_unary()?;
            return power(&lhs, &rhs);
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> RunResult<Obj> {
        self.skip_ws();
        match self.scanner.peek() {
            None => Err(parse_incomplete_to_err()),
            Some(b'(') => {
                self.consume_op(1);
                self.skip_ws();
                let v = self.parse_ternary()?;
                self.skip_ws();
                if self.scanner.peek() != Some(b')') {
                    return Err(RunError::parse_error("expected ')'"));
                }
                self.consume_op(1);
                Ok(v)
            }
            Some(b'$') => {
                let frag = self.scanner.try_parse_variable().map_err(scan_err_to_run)?.ok_or_else(|| RunError::parse_error("expected variable name after '$'"))?;
                subst::substitute_word(self.interp, &[frag])
            }
            Some(b'[') => {
                let src = self.scanner.parse_command_sub().map_err(scan_err_to_run)?;
                self.interp.eval_body_str(&src)
            }
            Some(b'"') => {
                self.consume_op(1);
                let mut fragments = Vec::new();
                let mut literal = String::new();
                loop {
                    match self.scanner.peek() {
                        None => return Err(parse_incomplete_to_err()),
                        Some(b'"') => {
                            self.consume_op(1);
                            break;
                        }
                        _ => self.scanner.parse_substitutable_piece(&mut fragments, &mut literal, true).map_err(scan_err_to_run)?,
                    }
                }
                if !literal.is_empty() {
                    fragments.push(Fragment::Literal(literal));
                }
                subst::substitute_word(self.interp, &fragments)
            }
            Some(b'{') => {
                let word = self.scanner.parse_braced_word().map_err(scan_err_to_run)?;
                subst::substitute_word(self.interp, &word)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.parse_number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.parse_ident_or_call(),
            Some(other) => Err(RunError::parse_error(format!("unexpected character '{}' in expression", other as char))),
        }
    }

    fn parse_number(&mut self) -> RunResult<Obj> {
        let start = self.scanner.pos();
        if self.scanner.peek() == Some(b'0') && matches!(self.scanner_rest().as_bytes().get(1), Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')) {
            self.consume_op(2);
            while matches!(self.scanner.peek(), Some(b) if b.is_ascii_alphanumeric()) {
                self.scanner.advance();
            }
            let text = &self.scanner_full_str()[start..self.scanner.pos()];
            return crate::fmt::parse_integer_literal(text).map(Obj::from_int).ok_or_else(|| RunError::parse_error(format!("bad number \"{text}\"")));
        }
        let mut saw_dot_or_exp = false;
        while let Some(b) = self.scanner.peek() {
            match b {
                b'0'..=b'9' => {
                    self.scanner.advance();
                }
                b'.' => {
                    saw_dot_or_exp = true;
                    self.scanner.advance();
                }
                b'e' | b'E' => {
                    saw_dot_or_exp = true;
                    self.scanner.advance();
                    if matches!(self.scanner.peek(), Some(b'+' | b'-')) {
                        self.scanner.advance();
                    }
                }
                _ => break,
            }
        }
        let text = &self.scanner_full_str()[start..self.scanner.pos()];
        if saw_dot_or_exp {
            text.parse::<f64>().map(Obj::from_double).map_err(|_| RunError::parse_error(format!("bad number \"{text}\"")))
        } else {
            crate::fmt::parse_integer_literal(text).map(Obj::from_int).ok_or_else(|| RunError::parse_error(format!("bad number \"{text}\"")))
        }
    }

    fn parse_ident_or_call(&mut self) -> RunResult<Obj> {
        let start = self.scanner.pos();
        while matches!(self.scanner.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.scanner.advance();
        }
        let ident = self.scanner_full_str()[start..self.scanner.pos()].to_owned();
        self.skip_ws();
        if self.scanner.peek() == Some(b'(') {
            self.consume_op(1);
            let mut args = Vec::new();
            self.skip_ws();
            if self.scanner.peek() != Some(b')') {
                loop {
                    args.push(self.parse_ternary()?);
                    self.skip_ws();
                    if self.scanner.peek() == Some(b',') {
                        self.consume_op(1);
                        self.skip_ws();
                    } else {
                        break;
                    }
                }
            }
            self.skip_ws();
            if self.scanner.peek() != Some(b')') {
                return Err(RunError::parse_error("expected ')' after function arguments"));
            }
            self.consume_op(1);
            return call_math_function(&ident, &args);
        }
        match ident.as_str() {
            "true" | "yes" | "on" => Ok(Obj::from_bool(true)),
            "false" | "no" | "off" => Ok(Obj::from_bool(false)),
            other => Ok(Obj::from_str(other)),
        }
    }
}

fn scan_err_to_run(e: ScanError) -> RunError {
    match e {
        ScanError::Incomplete => parse_incomplete_to_err(),
        ScanError::Error(msg, pos) => RunError::parse_error(format!("{msg} at position {pos}")),
    }
}

fn starts_with_word(rest: &str, word: &str) -> bool {
    rest.starts_with(word) && !rest.as_bytes().get(word.len()).is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

fn is_truthy(value: &Obj) -> RunResult<bool> {
    let s = value.to_display_string();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => {
            let mut v = value.clone();
            Ok(v.as_double()? != 0.0)
        }
    }
}

/// Evaluates `src` as an expression and interprets the result as a boolean,
/// the way `if`/`while`/`for`'s condition arguments do (§4.9).
pub fn eval_expr_bool(interp: &mut Interp, src: &str) -> RunResult<bool> {
    let value = eval_expr(interp, src)?;
    is_truthy(&value)
}

/// Numeric coercion per §4.5: integer+integer stays integer (with a
/// checked-overflow fallback to double, since Feather has no bignum type);
/// either operand a double promotes both to double.
fn numeric_binop(lhs: &Obj, rhs: &Obj, int_op: impl Fn(i64, i64) -> Option<i64>, float_op: impl Fn(f64, f64) -> f64) -> RunResult<Obj> {
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    if let (Ok(x), Ok(y)) = (a.as_int(), b.as_int()) {
        if let Some(result) = int_op(x, y) {
            return Ok(Obj::from_int(result));
        }
        #[allow(clippy::cast_precision_loss, reason = "overflow fallback widening")]
        return Ok(Obj::from_double(float_op(x as f64, y as f64)));
    }
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    Ok(Obj::from_double(float_op(a.as_double()?, b.as_double()?)))
}

/// `**`: both operands integer with a non-negative exponent stays integer,
/// same checked-overflow-falls-back-to-double shape as `numeric_binop` (§4.5);
/// a negative exponent or either operand a double widens to double.
fn power(lhs: &Obj, rhs: &Obj) -> RunResult<Obj> {
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    if let (Ok(base), Ok(exp)) = (a.as_int(), b.as_int()) {
        if let Ok(exp_u32) = u32::try_from(exp) {
            if let Some(result) = base.checked_pow(exp_u32) {
                return Ok(Obj::from_int(result));
            }
        }
        #[allow(clippy::cast_precision_loss, reason = "overflow/negative-exponent fallback widening")]
        return Ok(Obj::from_double((base as f64).powf(exp as f64)));
    }
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    Ok(Obj::from_double(a.as_double()?.powf(b.as_double()?)))
}

/// Integer division truncating toward negative infinity, as TCL specifies (§4.5),
/// rather than Rust's default truncate-toward-zero.
fn floor_div(x: i64, y: i64) -> i64 {
    let q = x / y;
    let r = x % y;
    if r != 0 && (r < 0) != (y < 0) { q - 1 } else { q }
}

fn divide(lhs: &Obj, rhs: &Obj) -> RunResult<Obj> {
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    if let (Ok(x), Ok(y)) = (a.as_int(), b.as_int()) {
        if y == 0 {
            return Err(RunError::domain_error("divide by zero"));
        }
        return Ok(Obj::from_int(floor_div(x, y)));
    }
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    // Floating-point division by zero yields signed infinity/NaN, not an error (§4.5).
    Ok(Obj::from_double(a.as_double()? / b.as_double()?))
}

fn modulo(lhs: &Obj, rhs: &Obj) -> RunResult<Obj> {
    let mut a = lhs.clone();
    let mut b = rhs.clone();
    let (x, y) = (a.as_int()?, b.as_int()?);
    if y == 0 {
        return Err(RunError::domain_error("divide by zero"));
    }
    // `%` follows the divisor's sign (§4.5), i.e. Euclidean-like floor modulo.
    let r = x % y;
    let result = if r != 0 && (r < 0) != (y < 0) { r + y } else { r };
    Ok(Obj::from_int(result))
}

fn call_math_function(name: &str, args: &[Obj]) -> RunResult<Obj> {
    let arg = |i: usize| -> RunResult<f64> {
        let mut v = args.get(i).cloned().ok_or_else(|| RunError::arity_error(format!("too few arguments to math function \"{name}\"")))?;
        v.as_double()
    };
    let one = |f: fn(f64) -> f64| -> RunResult<Obj> { Ok(Obj::from_double(f(arg(0)?))) };
    match name {
        "sqrt" => one(f64::sqrt),
        "exp" => one(f64::exp),
        "log" => one(f64::ln),
        "log10" => one(f64::log10),
        "sin" => one(f64::sin),
        "cos" => one(f64::cos),
        "tan" => one(f64::tan),
        "asin" => one(f64::asin),
        "acos" => one(f64::acos),
        "atan" => one(f64::atan),
        "sinh" => one(f64::sinh),
        "cosh" => one(f64::cosh),
        "tanh" => one(f64::tanh),
        "floor" => one(f64::floor),
        "ceil" => one(f64::ceil),
        "round" => Ok(Obj::from_int(arg(0)?.round() as i64)),
        "abs" => {
            let mut v = args.first().cloned().ok_or_else(|| RunError::arity_error("too few arguments to math function \"abs\""))?;
            if let Ok(n) = v.as_int() {
                Ok(Obj::from_int(n.abs()))
            } else {
                Ok(Obj::from_double(v.as_double()?.abs()))
            }
        }
        "pow" => Ok(Obj::from_double(arg(0)?.powf(arg(1)?))),
        "atan2" => Ok(Obj::from_double(arg(0)?.atan2(arg(1)?))),
        // C/TCL `fmod`: result's sign follows the dividend, unlike `rem_euclid`
        // (always non-negative). Rust's float `%` already matches C `fmod`.
        "fmod" => Ok(Obj::from_double(arg(0)? % arg(1)?)),
        "hypot" => Ok(Obj::from_double(arg(0)?.hypot(arg(1)?))),
        _ => Err(RunError::name_error(format!("unknown math function \"{name}\""))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str) -> Obj {
        let mut interp = Interp::new();
        eval_expr(&mut interp, src).unwrap()
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(eval("1 + 2 * 3").to_display_string(), "7");
        assert_eq!(eval("(1 + 2) * 3").to_display_string(), "9");
    }

    #[test]
    fn integer_division_truncates_toward_neg_infinity() {
        assert_eq!(eval("-7 / 2").to_display_string(), "-4");
        assert_eq!(eval("7 % -2").to_display_string(), "-1");
    }

    #[test]
    fn divide_by_zero_is_domain_error() {
        let mut interp = Interp::new();
        assert!(eval_expr(&mut interp, "1 / 0").is_err());
    }

    #[test]
    fn comparison_and_ternary() {
        assert_eq!(eval("1 < 2 ? 10 : 20").to_display_string(), "10");
    }

    #[test]
    fn string_equality_without_numeric_coercion() {
        assert_eq!(eval("\"abc\" eq \"abc\"").to_display_string(), "1");
    }

    #[test]
    fn integer_power_stays_integer() {
        assert_eq!(eval("2**3").to_display_string(), "8");
        assert!(eval("2**0.5").to_display_string().contains('.'));
    }

    #[test]
    fn fmod_sign_follows_dividend() {
        assert_eq!(eval("fmod(-7,3)").to_display_string(), "-1.0");
    }
}
