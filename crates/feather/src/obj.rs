//! `Obj`: the single polymorphic value type (§3, §4.2).
//!
//! Every `Obj` carries an optional canonical string representation and at
//! most one cached "internal representation". Converting between
//! representations ("shimmering", §4.2) is lazy: the first request for an
//! internal rep parses the current string rep and caches the result; any
//! successful mutation invalidates the cached string, which is regenerated
//! on next use. Equality is always defined via the string rep (§3).
//!
//! List and dict payloads are held behind `Rc` so that `Obj::clone()` is a
//! cheap refcount bump (the TCL "value-copy" contract, §4.2) while mutating
//! methods use `Rc::make_mut` to mutate in place when uniquely owned and
//! copy-on-write otherwise — the optimization §9's open question leaves
//! unspecified, made concrete here via ordinary Rust aliasing rules instead
//! of a manual "is this handle uniquely owned" check.

use std::{cmp::Ordering, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::{ExcKind, RaisedError, RunError, RunResult},
    fmt::{classify_double, format_double, join_list_elements, parse_double_literal, parse_integer_literal, quote_list_element, DoubleClass},
    glob::glob_match,
};

/// An ordered, insertion-preserving string-keyed mapping (§3 "dict").
pub type ObjDict = IndexMap<Rc<str>, Obj>;

/// Opaque host-managed foreign-object reference (§3, §6).
///
/// The interpreter never interprets `payload`; it is a correlation id the
/// host uses to find its own instance data. `type_name` is exposed to
/// `info`/`string is` and used to format the `<type N>`-style handle the
/// value stringifies to (§6 "Foreign-object handle syntax").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignObj {
    pub type_name: Rc<str>,
    pub payload: u64,
}

impl fmt::Display for ForeignObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name, self.payload)
    }
}

/// Cached internal representation. `None` means only the string rep is
/// known (or trivial); exactly one other variant may be cached at a time.
#[derive(Debug, Clone)]
enum Repr {
    None,
    Int(i64),
    Double(f64),
    List(Rc<Vec<Obj>>),
    Dict(Rc<ObjDict>),
    Foreign(Rc<ForeignObj>),
    /// Mutable string builder; transient, used while a word's pieces are
    /// being assembled during substitution (§4.4). Never observed by
    /// scripts directly.
    Builder(String),
}

/// The polymorphic value type (§3). Cheap to clone: list/dict/foreign
/// payloads are reference-counted.
#[derive(Debug, Clone)]
pub struct Obj {
    string_rep: Option<Rc<str>>,
    repr: Repr,
}

impl Default for Obj {
    fn default() -> Self {
        Self::from_str("")
    }
}

impl Obj {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            string_rep: Some(Rc::from(s)),
            repr: Repr::None,
        }
    }

    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self {
            string_rep: Some(Rc::from(s.into_boxed_str())),
            repr: Repr::None,
        }
    }

    #[must_use]
    pub fn from_int(n: i64) -> Self {
        Self {
            string_rep: None,
            repr: Repr::Int(n),
        }
    }

    #[must_use]
    pub fn from_double(n: f64) -> Self {
        Self {
            string_rep: None,
            repr: Repr::Double(n),
        }
    }

    #[must_use]
    pub fn from_bool(b: bool) -> Self {
        Self::from_str(if b { "1" } else { "0" })
    }

    #[must_use]
    pub fn from_list(items: Vec<Self>) -> Self {
        Self {
            string_rep: None,
            repr: Repr::List(Rc::new(items)),
        }
    }

    #[must_use]
    pub fn from_dict(dict: ObjDict) -> Self {
        Self {
            string_rep: None,
            repr: Repr::Dict(Rc::new(dict)),
        }
    }

    #[must_use]
    pub fn from_foreign(foreign: ForeignObj) -> Self {
        Self {
            string_rep: None,
            repr: Repr::Foreign(Rc::new(foreign)),
        }
    }

    #[must_use]
    pub fn empty_builder() -> Self {
        Self {
            string_rep: None,
            repr: Repr::Builder(String::new()),
        }
    }

    /// Appends to a string-builder rep, creating one from the current string
    /// rep if needed. Invalidates the cached canonical string.
    pub fn builder_append(&mut self, text: &str) {
        let current = match &self.repr {
            Repr::Builder(s) => {
                let mut s = s.clone();
                s.push_str(text);
                s
            }
            _ => {
                let mut s = self.display_string_owned();
                s.push_str(text);
                s
            }
        };
        self.repr = Repr::Builder(current);
        self.string_rep = None;
    }

    /// Finalizes a builder (or any Obj) into its canonical string form.
    pub fn finish_builder(self) -> Self {
        match self.repr {
            Repr::Builder(s) => Self::from_string(s),
            _ => self,
        }
    }

    // ---- canonical string representation -------------------------------

    /// Computes (without caching) the canonical string form.
    #[must_use]
    pub fn display_string_owned(&self) -> String {
        if let Some(s) = &self.string_rep {
            return s.to_string();
        }
        match &self.repr {
            Repr::None => String::new(),
            Repr::Int(n) => n.to_string(),
            Repr::Double(n) => format_double(*n),
            Repr::List(items) => {
                let rendered: Vec<String> = items.iter().map(Obj::display_string_owned).collect();
                join_list_elements(rendered.iter().map(String::as_str))
            }
            Repr::Dict(dict) => {
                let mut rendered = Vec::with_capacity(dict.len() * 2);
                for (k, v) in dict.iter() {
                    rendered.push(k.to_string());
                    rendered.push(v.display_string_owned());
                }
                join_list_elements(rendered.iter().map(String::as_str))
            }
            Repr::Foreign(f) => f.to_string(),
            Repr::Builder(s) => s.clone(),
        }
    }

    /// Like [`Self::display_string_owned`] but caches the result.
    pub fn to_display_string(&self) -> String {
        self.display_string_owned()
    }

    /// Returns the cached or freshly computed string rep, caching it.
    pub fn as_str(&mut self) -> &str {
        if self.string_rep.is_none() {
            let s = self.display_string_owned();
            self.string_rep = Some(Rc::from(s.into_boxed_str()));
        }
        self.string_rep.as_deref().unwrap_or_default()
    }

    fn invalidate_string(&mut self) {
        self.string_rep = None;
    }

    // ---- shimmering accessors --------------------------------------------

    /// Shimmers to an integer, re-parsing the string rep if the cached repr
    /// is not already an int (§4.2).
    pub fn as_int(&mut self) -> RunResult<i64> {
        if let Repr::Int(n) = self.repr {
            return Ok(n);
        }
        let s = self.as_str().to_owned();
        match parse_integer_literal(&s) {
            Some(n) => {
                self.repr = Repr::Int(n);
                Ok(n)
            }
            None => Err(type_error_expected("integer", &s)),
        }
    }

    /// Shimmers to a double; integer literals are accepted and widened.
    pub fn as_double(&mut self) -> RunResult<f64> {
        if let Repr::Double(n) = self.repr {
            return Ok(n);
        }
        if let Repr::Int(n) = self.repr {
            #[allow(clippy::cast_precision_loss, reason = "widening int to double on request")]
            let d = n as f64;
            self.repr = Repr::Double(d);
            return Ok(d);
        }
        let s = self.as_str().to_owned();
        match parse_double_literal(&s) {
            Some(n) => {
                self.repr = Repr::Double(n);
                Ok(n)
            }
            None => Err(type_error_expected("floating-point number", &s)),
        }
    }

    /// Shimmers to a list, splitting the string rep with TCL list syntax if needed.
    pub fn as_list(&mut self) -> RunResult<Rc<Vec<Self>>> {
        if let Repr::List(items) = &self.repr {
            return Ok(Rc::clone(items));
        }
        let s = self.as_str().to_owned();
        let items = crate::parser::split_list(&s).map_err(|e| type_error_expected("list", &e))?;
        let rc = Rc::new(items);
        self.repr = Repr::List(Rc::clone(&rc));
        Ok(rc)
    }

    /// Shimmers to a dict: a list of alternating key/value pairs.
    pub fn as_dict(&mut self) -> RunResult<Rc<ObjDict>> {
        if let Repr::Dict(dict) = &self.repr {
            return Ok(Rc::clone(dict));
        }
        let items = self.as_list()?;
        if items.len() % 2 != 0 {
            return Err(RunError::Exc(Box::new(RaisedError::new(
                ExcKind::TypeError,
                "missing value to go with key",
            ))));
        }
        let mut dict = ObjDict::new();
        let mut iter = items.iter();
        while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
            dict.insert(Rc::from(k.display_string_owned().into_boxed_str()), v.clone());
        }
        let rc = Rc::new(dict);
        self.repr = Repr::Dict(Rc::clone(&rc));
        Ok(rc)
    }

    pub fn as_foreign(&self) -> Option<&ForeignObj> {
        match &self.repr {
            Repr::Foreign(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_list_repr(&self) -> bool {
        matches!(self.repr, Repr::List(_))
    }

    #[must_use]
    pub fn is_dict_repr(&self) -> bool {
        matches!(self.repr, Repr::Dict(_))
    }

    // ---- list mutation (copy-on-write via Rc::make_mut) ------------------

    /// Mutates the list representation in place if uniquely owned, otherwise
    /// copy-on-write clones it first. Invalidates the cached string either way.
    pub fn with_list_mut<R>(&mut self, f: impl FnOnce(&mut Vec<Self>) -> R) -> RunResult<R> {
        let items = self.as_list()?;
        let mut owned = items;
        let result = {
            let vec_mut = Rc::make_mut(&mut owned);
            f(vec_mut)
        };
        self.repr = Repr::List(owned);
        self.invalidate_string();
        Ok(result)
    }

    pub fn with_dict_mut<R>(&mut self, f: impl FnOnce(&mut ObjDict) -> R) -> RunResult<R> {
        let dict = self.as_dict()?;
        let mut owned = dict;
        let result = {
            let map_mut = Rc::make_mut(&mut owned);
            f(map_mut)
        };
        self.repr = Repr::Dict(owned);
        self.invalidate_string();
        Ok(result)
    }

    // ---- equality, ordering, matching ------------------------------------

    /// Length in bytes of the canonical string form. `string length` uses
    /// the rune-based variant in `builtins::string_cmd` instead (§9 Unicode).
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.display_string_owned().len()
    }

    #[must_use]
    pub fn glob_matches(&self, pattern: &str) -> bool {
        glob_match(pattern, &self.display_string_owned())
    }

    /// Numeric-aware comparison for `expr`'s relational operators; falls
    /// back to string comparison when either side does not parse as a number.
    pub fn compare_numeric_or_string(&self, other: &Self) -> Ordering {
        let mut a = self.clone();
        let mut b = other.clone();
        if let (Ok(x), Ok(y)) = (a.as_double(), b.as_double()) {
            return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
        }
        self.display_string_owned().cmp(&other.display_string_owned())
    }
}

impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        self.display_string_owned() == other.display_string_owned()
    }
}
impl Eq for Obj {}

impl fmt::Display for Obj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string_owned())
    }
}

fn type_error_expected(kind: &str, got: &str) -> RunError {
    RunError::Exc(Box::new(RaisedError::new(
        ExcKind::TypeError,
        format!("expected {kind} but got \"{got}\""),
    )))
}

#[must_use]
pub fn double_classification(value: f64) -> DoubleClass {
    classify_double(value)
}

#[must_use]
pub fn quote_element(elem: &str) -> String {
    quote_list_element(elem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shimmering_preserves_string_form() {
        let mut a = Obj::from_str("42");
        assert_eq!(a.as_int().unwrap(), 42);
        assert_eq!(a.to_display_string(), "42");
    }

    #[test]
    fn double_roundtrip() {
        let mut a = Obj::from_double(1.0);
        assert_eq!(a.to_display_string(), "1.0");
        assert_eq!(a.as_int().is_err(), true);
    }

    #[test]
    fn list_clone_is_cheap_and_value_like() {
        let a = Obj::from_list(vec![Obj::from_str("a"), Obj::from_str("b")]);
        let mut b = a.clone();
        b.with_list_mut(|v| v.push(Obj::from_str("c"))).unwrap();
        assert_eq!(a.to_display_string(), "a b");
        assert_eq!(b.to_display_string(), "a b c");
    }

    #[test]
    fn equality_via_string_rep() {
        let a = Obj::from_int(1);
        let b = Obj::from_str("1");
        assert_eq!(a, b);
    }
}
