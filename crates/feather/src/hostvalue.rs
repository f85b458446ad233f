//! `HostValue`: the owned, handle-free value the host exchanges across the
//! embedding boundary (§6, §10.5).
//!
//! `Obj` is deliberately not exposed by value across that boundary: its list
//! and dict payloads are `Rc`-backed and its scratch representation is only
//! meaningful within the top-level evaluation that produced it (§4.1 "handles
//! from prior evaluations must not be dereferenced"). `HostValue` is the
//! materialized, self-contained equivalent a host can store, compare, or
//! serialize without the interpreter.

use std::rc::Rc;

use crate::obj::Obj;

/// A fully-owned snapshot of an `Obj`'s value (§6 embedding API).
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Str(String),
    Int(i64),
    Double(f64),
    List(Vec<HostValue>),
    Dict(Vec<(String, HostValue)>),
}

impl HostValue {
    #[must_use]
    pub fn from_obj(obj: &Obj) -> Self {
        if obj.is_list_repr() {
            let mut o = obj.clone();
            if let Ok(items) = o.as_list() {
                return Self::List(items.iter().map(Self::from_obj).collect());
            }
        }
        if obj.is_dict_repr() {
            let mut o = obj.clone();
            if let Ok(dict) = o.as_dict() {
                return Self::Dict(dict.iter().map(|(k, v)| (k.to_string(), Self::from_obj(v))).collect());
            }
        }
        Self::Str(obj.to_display_string())
    }

    #[must_use]
    pub fn to_obj(&self) -> Obj {
        match self {
            Self::Str(s) => Obj::from_str(s),
            Self::Int(n) => Obj::from_int(*n),
            Self::Double(n) => Obj::from_double(*n),
            Self::List(items) => Obj::from_list(items.iter().map(Self::to_obj).collect()),
            Self::Dict(pairs) => {
                let mut dict = crate::obj::ObjDict::new();
                for (k, v) in pairs {
                    dict.insert(Rc::from(k.as_str()), v.to_obj());
                }
                Obj::from_dict(dict)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_list() {
        let obj = Obj::from_list(vec![Obj::from_int(1), Obj::from_str("two")]);
        let host = HostValue::from_obj(&obj);
        assert_eq!(host, HostValue::List(vec![HostValue::Str("1".to_owned()), HostValue::Str("two".to_owned())]));
        assert_eq!(host.to_obj().to_display_string(), "1 two");
    }
}
