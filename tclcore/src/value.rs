//! The Value Type
//!
//! The [`Value`] struct is the standard representation of a data value in the interpreter.
//! Every argument passed to a command, every variable, and every command result is a
//! `Value`.
//!
//! # Everything is a string
//!
//! As in standard Tcl, every `Value` has a string representation, and that string is the
//! canonical form of the value: two values are equal if and only if their strings are
//! equal.  A value may also have a typed representation: an integer, a float, a list, or an
//! opaque host handle.  The typed representation a value was *constructed* from determines
//! its [`ValueKind`]; a value constructed from a string is of kind `String`.
//!
//! When a string value is used as an integer, float, list, or script, the parsed form is
//! cached inside the value so that it isn't parsed again.  The cache never changes the
//! value's kind, and since values are immutable the string and the cached forms can never
//! disagree.
//!
//! ```
//! use tclcore::{Value, ValueKind};
//!
//! let num = Value::from(42);
//! assert_eq!(num.kind(), ValueKind::Integer);
//! assert_eq!(num.as_str(), "42");
//!
//! let text = Value::from("42");
//! assert_eq!(text.kind(), ValueKind::String);
//! assert_eq!(text.as_int(), Ok(42));
//! assert_eq!(num, text);
//! ```
//!
//! # Opaque handles
//!
//! A value may wrap a [`HostHandle`], a token that identifies a host object registered with
//! an interpreter's marshaller.  Its string form is `handle:<owner>:<token>`, so a handle can
//! be stored in variables and passed through scripts like any other string, and recovered
//! with [`Value::as_handle`].
//!
//! [`HostHandle`]: ../marshal/struct.HostHandle.html

use crate::list::get_list;
use crate::list::list_to_string;
use crate::marshal::HostHandle;
use crate::parser;
use crate::parser::Script;
use crate::types::*;
use std::cell::OnceCell;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// The kind of a [`Value`]: the representation it was constructed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    List,
    Opaque,
}

/// The value type.  See the [module level documentation](index.html) for more.
#[derive(Clone)]
pub struct Value {
    inner: Rc<InnerValue>,
}

struct InnerValue {
    // The string form, computed lazily from `origin` for typed values.
    string_rep: OnceCell<String>,

    // The representation the value was constructed from.  Never changes.
    origin: DataRep,

    // A representation parsed from the string form, saved for reuse.
    cache: RefCell<DataRep>,
}

#[derive(Clone, Debug)]
enum DataRep {
    None,
    Int(TclInt),
    Float(TclFloat),
    List(Rc<TclList>),
    Opaque(HostHandle),
    Script(Rc<Script>),
}

impl Value {
    fn with_string(string: String) -> Self {
        let string_rep = OnceCell::new();
        let _ = string_rep.set(string);
        Self {
            inner: Rc::new(InnerValue {
                string_rep,
                origin: DataRep::None,
                cache: RefCell::new(DataRep::None),
            }),
        }
    }

    fn with_rep(origin: DataRep) -> Self {
        Self {
            inner: Rc::new(InnerValue {
                string_rep: OnceCell::new(),
                origin,
                cache: RefCell::new(DataRep::None),
            }),
        }
    }

    /// Returns the empty value.
    pub fn empty() -> Self {
        Value::with_string(String::new())
    }

    /// Creates an opaque value wrapping a host handle.
    pub fn opaque(handle: HostHandle) -> Self {
        Value::with_rep(DataRep::Opaque(handle))
    }

    /// The kind of the value, i.e., the representation it was constructed from.
    pub fn kind(&self) -> ValueKind {
        match &self.inner.origin {
            DataRep::None | DataRep::Script(_) => ValueKind::String,
            DataRep::Int(_) => ValueKind::Integer,
            DataRep::Float(_) => ValueKind::Float,
            DataRep::List(_) => ValueKind::List,
            DataRep::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Whether the value's string form is empty.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Returns the value's string form.
    pub fn as_str(&self) -> &str {
        self.inner
            .string_rep
            .get_or_init(|| match &self.inner.origin {
                DataRep::Int(int) => int.to_string(),
                DataRep::Float(flt) => Value::fmt_float(*flt),
                DataRep::List(list) => list_to_string(list),
                DataRep::Opaque(handle) => handle.to_string(),
                DataRep::None | DataRep::Script(_) => String::new(),
            })
    }

    /// Returns the value as an integer, parsing the string form if necessary.
    ///
    /// ```
    /// use tclcore::Value;
    /// assert_eq!(Value::from("0x10").as_int(), Ok(16));
    /// assert!(Value::from("abc").as_int().is_err());
    /// ```
    pub fn as_int(&self) -> Result<TclInt, Exception> {
        if let DataRep::Int(int) = self.inner.origin {
            return Ok(int);
        }

        if let DataRep::Int(int) = *self.inner.cache.borrow() {
            return Ok(int);
        }

        let int = Value::get_int(self.as_str())?;
        *self.inner.cache.borrow_mut() = DataRep::Int(int);
        Ok(int)
    }

    /// Returns the value as a float, parsing the string form if necessary.  Integers
    /// are accepted.
    pub fn as_float(&self) -> Result<TclFloat, Exception> {
        match self.inner.origin {
            DataRep::Float(flt) => return Ok(flt),
            DataRep::Int(int) => return Ok(int as TclFloat),
            _ => {}
        }

        if let DataRep::Float(flt) = *self.inner.cache.borrow() {
            return Ok(flt);
        }

        let flt = Value::get_float(self.as_str())?;
        *self.inner.cache.borrow_mut() = DataRep::Float(flt);
        Ok(flt)
    }

    /// Returns the value as a boolean.  Numbers are true if non-zero; the strings
    /// `true`, `yes`, `on` and `false`, `no`, `off` are accepted in any case.
    pub fn as_bool(&self) -> Result<bool, Exception> {
        match self.inner.origin {
            DataRep::Int(int) => return Ok(int != 0),
            DataRep::Float(flt) => return Ok(flt != 0.0),
            _ => {}
        }

        Value::get_bool(self.as_str())
    }

    /// Returns the value as a list, parsing the string form if necessary.
    pub fn as_list(&self) -> Result<Rc<TclList>, Exception> {
        if let DataRep::List(list) = &self.inner.origin {
            return Ok(Rc::clone(list));
        }

        if let DataRep::List(list) = &*self.inner.cache.borrow() {
            return Ok(Rc::clone(list));
        }

        let list = Rc::new(get_list(self.as_str())?);
        *self.inner.cache.borrow_mut() = DataRep::List(Rc::clone(&list));
        Ok(list)
    }

    /// Returns the value as a host handle.  The value must be an opaque value or a
    /// string in handle form; this says nothing about whether the handle is valid for any
    /// particular interpreter.
    pub fn as_handle(&self) -> Result<HostHandle, Exception> {
        if let DataRep::Opaque(handle) = self.inner.origin {
            return Ok(handle);
        }

        match HostHandle::parse(self.as_str()) {
            Some(handle) => Ok(handle),
            None => tcl_throw!(
                ErrorKind::InvalidHandle,
                "expected handle but got \"{}\"",
                self.as_str()
            ),
        }
    }

    /// Returns the value parsed as a script, caching the parsed form.  `limit` bounds
    /// the nesting of command substitutions.
    pub(crate) fn as_script(&self, limit: usize) -> Result<Rc<Script>, Exception> {
        if let DataRep::Script(script) = &*self.inner.cache.borrow() {
            return Ok(Rc::clone(script));
        }

        let script = Rc::new(parser::parse(self.as_str(), limit)?);
        *self.inner.cache.borrow_mut() = DataRep::Script(Rc::clone(&script));
        Ok(script)
    }

    /// Parses a string as an integer: an optional sign followed by decimal digits, or by
    /// a `0x`, `0o`, or `0b` prefixed hex, octal, or binary number.  Surrounding whitespace
    /// is ignored.
    pub fn get_int(arg: &str) -> Result<TclInt, Exception> {
        let trimmed = arg.trim();
        let (sign, body) = match trimmed.as_bytes().first() {
            Some(b'-') => ("-", &trimmed[1..]),
            Some(b'+') => ("", &trimmed[1..]),
            _ => ("", trimmed),
        };

        let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
            (16, rest)
        } else if let Some(rest) = strip_prefix_ci(body, "0o") {
            (8, rest)
        } else if let Some(rest) = strip_prefix_ci(body, "0b") {
            (2, rest)
        } else {
            (10, body)
        };

        if digits.is_empty() || digits.starts_with(|c: char| c == '+' || c == '-') {
            return tcl_err!("expected integer but got \"{}\"", arg);
        }

        let text = format!("{}{}", sign, digits);
        match TclInt::from_str_radix(&text, radix) {
            Ok(int) => Ok(int),
            Err(_) => tcl_err!("expected integer but got \"{}\"", arg),
        }
    }

    /// Parses a string as a float.  Integer syntax is accepted, including hex.
    pub fn get_float(arg: &str) -> Result<TclFloat, Exception> {
        if let Ok(int) = Value::get_int(arg) {
            return Ok(int as TclFloat);
        }

        let trimmed = arg.trim();
        match trimmed {
            "Inf" | "+Inf" => return Ok(TclFloat::INFINITY),
            "-Inf" => return Ok(TclFloat::NEG_INFINITY),
            "NaN" => return Ok(TclFloat::NAN),
            _ => {}
        }

        // Rust accepts "inf" and "infinity" in any case; Tcl spells them one way only.
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(flt) = trimmed.parse::<TclFloat>() {
                return Ok(flt);
            }
        }

        tcl_err!("expected floating-point number but got \"{}\"", arg)
    }

    /// Parses a string as a boolean.
    pub fn get_bool(arg: &str) -> Result<bool, Exception> {
        let trimmed = arg.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => return Ok(true),
            "false" | "no" | "off" => return Ok(false),
            _ => {}
        }

        if let Ok(int) = Value::get_int(trimmed) {
            return Ok(int != 0);
        }

        if let Ok(flt) = Value::get_float(trimmed) {
            return Ok(flt != 0.0);
        }

        tcl_err!("expected boolean value but got \"{}\"", arg)
    }

    /// Formats a float the way the interpreter displays it: integral values keep a
    /// trailing `.0`, infinities are `Inf` and `-Inf`.
    pub fn fmt_float(flt: TclFloat) -> String {
        if flt.is_nan() {
            "NaN".into()
        } else if flt.is_infinite() {
            if flt > 0.0 { "Inf".into() } else { "-Inf".into() }
        } else {
            format!("{:?}", flt)
        }
    }
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value[{:?}]", self.as_str())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Value {}

impl From<String> for Value {
    fn from(string: String) -> Self {
        Value::with_string(string)
    }
}

impl From<&String> for Value {
    fn from(string: &String) -> Self {
        Value::with_string(string.clone())
    }
}

impl From<&str> for Value {
    fn from(string: &str) -> Self {
        Value::with_string(string.to_string())
    }
}

impl From<TclInt> for Value {
    fn from(int: TclInt) -> Self {
        Value::with_rep(DataRep::Int(int))
    }
}

impl From<TclFloat> for Value {
    fn from(flt: TclFloat) -> Self {
        Value::with_rep(DataRep::Float(flt))
    }
}

/// Booleans are integers: `1` or `0`.
impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::from(flag as TclInt)
    }
}

impl From<TclList> for Value {
    fn from(list: TclList) -> Self {
        Value::with_rep(DataRep::List(Rc::new(list)))
    }
}

impl From<&[Value]> for Value {
    fn from(list: &[Value]) -> Self {
        Value::from(list.to_vec())
    }
}

impl From<HostHandle> for Value {
    fn from(handle: HostHandle) -> Self {
        Value::opaque(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Value::from("abc").kind(), ValueKind::String);
        assert_eq!(Value::from(1).kind(), ValueKind::Integer);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Float);
        assert_eq!(Value::from(true).kind(), ValueKind::Integer);
        assert_eq!(Value::from(TclList::new()).kind(), ValueKind::List);
        assert_eq!(
            Value::opaque(HostHandle::new(1, 2)).kind(),
            ValueKind::Opaque
        );
    }

    #[test]
    fn test_string_reps() {
        assert_eq!(Value::from(42).as_str(), "42");
        assert_eq!(Value::from(-7).as_str(), "-7");
        assert_eq!(Value::from(3.0).as_str(), "3.0");
        assert_eq!(Value::from(3.5).as_str(), "3.5");
        assert_eq!(Value::from(false).as_str(), "0");
        assert_eq!(
            Value::from(vec![Value::from("a"), Value::from("b c")]).as_str(),
            "a {b c}"
        );
        assert_eq!(Value::opaque(HostHandle::new(3, 9)).as_str(), "handle:3:9");
    }

    #[test]
    fn test_cache_keeps_kind() {
        let val = Value::from("12");
        assert_eq!(val.as_int(), Ok(12));
        assert_eq!(val.as_int(), Ok(12));
        assert_eq!(val.kind(), ValueKind::String);

        let list = Value::from("a b c");
        assert_eq!(list.as_list().map(|l| l.len()), Ok(3));
        assert_eq!(list.kind(), ValueKind::String);
    }

    #[test]
    fn test_as_int() {
        assert_eq!(Value::from(" 42 ").as_int(), Ok(42));
        assert_eq!(Value::from("-0x1F").as_int(), Ok(-31));
        assert_eq!(Value::from("0b101").as_int(), Ok(5));
        assert_eq!(Value::from("+5").as_int(), Ok(5));
        assert_eq!(
            Value::from("1.5").as_int(),
            Err(Exception::tcl_err(Value::from("expected integer but got \"1.5\"")))
        );
        assert!(Value::from("--5").as_int().is_err());
        assert!(Value::from("").as_int().is_err());
        assert!(Value::from(2.0).as_int().is_err());
    }

    #[test]
    fn test_as_float() {
        assert_eq!(Value::from("1.5").as_float(), Ok(1.5));
        assert_eq!(Value::from("2").as_float(), Ok(2.0));
        assert_eq!(Value::from(2).as_float(), Ok(2.0));
        assert_eq!(Value::from("1e3").as_float(), Ok(1000.0));
        assert_eq!(Value::from("Inf").as_float(), Ok(TclFloat::INFINITY));
        assert!(Value::from("inf").as_float().is_err());
        assert!(Value::from("abc").as_float().is_err());
    }

    #[test]
    fn test_as_bool() {
        assert_eq!(Value::from("yes").as_bool(), Ok(true));
        assert_eq!(Value::from("OFF").as_bool(), Ok(false));
        assert_eq!(Value::from("0").as_bool(), Ok(false));
        assert_eq!(Value::from("2.5").as_bool(), Ok(true));
        assert_eq!(Value::from(0).as_bool(), Ok(false));
        assert!(Value::from("maybe").as_bool().is_err());
    }

    #[test]
    fn test_as_handle() {
        let handle = HostHandle::new(4, 11);
        assert_eq!(Value::opaque(handle).as_handle(), Ok(handle));
        assert_eq!(Value::from("handle:4:11").as_handle(), Ok(handle));
        assert_eq!(
            Value::from("file3").as_handle().map_err(|e| e.kind()),
            Err(ErrorKind::InvalidHandle)
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::from(1), Value::from("1"));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_eq!(Value::from(vec![Value::from("a")]), Value::from("a"));
    }

    #[test]
    fn test_fmt_float() {
        assert_eq!(Value::fmt_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(Value::fmt_float(-2.0), "-2.0");
        assert_eq!(Value::fmt_float(TclFloat::NEG_INFINITY), "-Inf");
        assert_eq!(Value::fmt_float(TclFloat::NAN), "NaN");
    }
}
