//! Host Value Marshalling
//!
//! The [`Marshaller`] converts between interpreter [`Value`]s and [`HostValue`]s, the
//! structured values the host application passes to [`Interp::call`] and receives from it,
//! and which host callbacks receive as arguments and return as results.
//!
//! | `Value` kind | `HostValue` |
//! |--------------|-------------|
//! | String       | `Str`       |
//! | Integer      | `Int`       |
//! | Float        | `Float`     |
//! | List         | `List`, converted element by element |
//! | Opaque       | `Handle`    |
//!
//! In the other direction, `Bool` becomes an integer value (`1` or `0`) and `Map` becomes a
//! list of alternating keys and values, i.e., a Tcl dictionary string.
//!
//! Conversion is deterministic: it depends only on the value's kind, never on whatever
//! parsed representations happen to be cached inside it.
//!
//! # Opaque handles
//!
//! Host objects that can't be represented as strings are passed to scripts as *handles*.
//! The host registers an `Rc` with the marshaller and gets back a [`HostHandle`]; the
//! marshaller keeps only a weak reference, so the host retains ownership.  A handle is only
//! valid for the interpreter that issued it: converting or resolving a handle issued by
//! another interpreter fails with [`ErrorKind::InvalidHandle`].
//!
//! ```
//! use std::rc::Rc;
//! use tclcore::{HostValue, Interp};
//!
//! struct Account { balance: i64 }
//!
//! let mut interp = Interp::new();
//! let account = Rc::new(Account { balance: 10 });
//! let handle = interp.register_handle(&account);
//!
//! interp.proc("balance", |interp: &mut Interp, args: &[HostValue]| {
//!     let HostValue::Handle(handle) = &args[0] else {
//!         return Err("expected an account handle".into());
//!     };
//!     let account = interp.resolve_handle::<Account>(handle)?;
//!     Ok(HostValue::Int(account.balance))
//! });
//!
//! let result = interp.call("balance", &[HostValue::Handle(handle)]).unwrap();
//! assert_eq!(result, HostValue::Int(10));
//! ```
//!
//! [`Interp::call`]: ../interp/struct.Interp.html#method.call
//! [`ErrorKind::InvalidHandle`]: ../types/enum.ErrorKind.html

use crate::list::format_list;
use crate::types::*;
use crate::value::Value;
use crate::value::ValueKind;
use fnv::FnvHashMap;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

// Hands out marshaller ids, so that each interpreter can recognize its own handles.
static NEXT_MARSHALLER_ID: AtomicU64 = AtomicU64::new(1);

/// A host-side value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Str(String),
    Int(TclInt),
    Float(TclFloat),
    Bool(bool),
    List(Vec<HostValue>),
    Map(IndexMap<String, HostValue>),
    Handle(HostHandle),
}

impl HostValue {
    /// Returns the string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(string) => Some(string),
            _ => None,
        }
    }

    /// Returns the integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<TclInt> {
        match self {
            HostValue::Int(int) => Some(*int),
            _ => None,
        }
    }

    /// Returns the number, if this is a `Float` or an `Int`.
    pub fn as_float(&self) -> Option<TclFloat> {
        match self {
            HostValue::Float(flt) => Some(*flt),
            HostValue::Int(int) => Some(*int as TclFloat),
            _ => None,
        }
    }

    /// Returns the elements, if this is a `List`.
    pub fn as_list(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::List(list) => Some(list),
            _ => None,
        }
    }
}

/// Formats the value as the string the interpreter would see.
impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Str(string) => f.write_str(string),
            HostValue::Int(int) => write!(f, "{}", int),
            HostValue::Float(flt) => f.write_str(&Value::fmt_float(*flt)),
            HostValue::Bool(flag) => f.write_str(if *flag { "1" } else { "0" }),
            HostValue::List(list) => {
                let elements: Vec<String> = list.iter().map(|v| v.to_string()).collect();
                f.write_str(&format_list(&elements))
            }
            HostValue::Map(map) => {
                let elements: Vec<String> = map
                    .iter()
                    .flat_map(|(k, v)| [k.clone(), v.to_string()])
                    .collect();
                f.write_str(&format_list(&elements))
            }
            HostValue::Handle(handle) => write!(f, "{}", handle),
        }
    }
}

impl From<&str> for HostValue {
    fn from(string: &str) -> Self {
        HostValue::Str(string.to_string())
    }
}

impl From<String> for HostValue {
    fn from(string: String) -> Self {
        HostValue::Str(string)
    }
}

impl From<TclInt> for HostValue {
    fn from(int: TclInt) -> Self {
        HostValue::Int(int)
    }
}

impl From<TclFloat> for HostValue {
    fn from(flt: TclFloat) -> Self {
        HostValue::Float(flt)
    }
}

impl From<bool> for HostValue {
    fn from(flag: bool) -> Self {
        HostValue::Bool(flag)
    }
}

impl From<HostHandle> for HostValue {
    fn from(handle: HostHandle) -> Self {
        HostValue::Handle(handle)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(list: Vec<T>) -> Self {
        HostValue::List(list.into_iter().map(Into::into).collect())
    }
}

/// An identity token for a host object registered with a [`Marshaller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle {
    owner: u64,
    token: u64,
}

impl HostHandle {
    pub(crate) fn new(owner: u64, token: u64) -> Self {
        Self { owner, token }
    }

    /// Parses the string form of a handle, `handle:<owner>:<token>`.
    pub fn parse(text: &str) -> Option<HostHandle> {
        let rest = text.strip_prefix("handle:")?;
        let (owner, token) = rest.split_once(':')?;
        Some(HostHandle {
            owner: owner.parse().ok()?,
            token: token.parse().ok()?,
        })
    }

    /// The identity token.
    pub fn token(&self) -> u64 {
        self.token
    }
}

impl fmt::Display for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle:{}:{}", self.owner, self.token)
    }
}

/// Converts values between the interpreter and the host, and keeps the registry of host
/// objects known to the interpreter.  Every interpreter owns one marshaller.
pub struct Marshaller {
    id: u64,
    next_token: u64,
    handles: FnvHashMap<u64, Weak<dyn Any>>,
}

impl Default for Marshaller {
    fn default() -> Self {
        Self::new()
    }
}

impl Marshaller {
    /// Creates a marshaller with an empty handle registry and a fresh id.
    pub fn new() -> Self {
        Self {
            id: NEXT_MARSHALLER_ID.fetch_add(1, Ordering::Relaxed),
            next_token: 1,
            handles: FnvHashMap::default(),
        }
    }

    /// Registers a host object, returning its handle.  Only a weak reference is kept.
    pub fn register<T: Any>(&mut self, object: &Rc<T>) -> HostHandle {
        let token = self.next_token;
        self.next_token += 1;

        let weak: Weak<dyn Any> = Rc::downgrade(object) as Weak<dyn Any>;
        self.handles.insert(token, weak);
        tracing::debug!(owner = self.id, token, "registered host handle");

        HostHandle::new(self.id, token)
    }

    /// Releases a handle, returning whether it was registered here.
    pub fn release(&mut self, handle: &HostHandle) -> bool {
        if handle.owner != self.id {
            return false;
        }
        let found = self.handles.remove(&handle.token).is_some();
        tracing::debug!(owner = self.id, token = handle.token, found, "released host handle");
        found
    }

    /// Whether this marshaller issued the handle and hasn't released it.
    pub fn owns(&self, handle: &HostHandle) -> bool {
        handle.owner == self.id && self.handles.contains_key(&handle.token)
    }

    /// Returns the object behind a handle.  Fails if the handle wasn't issued here, was
    /// released, refers to an object that has been dropped, or refers to an object of a
    /// different type.
    pub fn resolve<T: Any>(&self, handle: &HostHandle) -> Result<Rc<T>, Exception> {
        if handle.owner != self.id {
            return tcl_throw!(
                ErrorKind::InvalidHandle,
                "handle \"{}\" belongs to another interpreter",
                handle
            );
        }

        let Some(weak) = self.handles.get(&handle.token) else {
            return tcl_throw!(ErrorKind::InvalidHandle, "unknown handle \"{}\"", handle);
        };

        let Some(object) = weak.upgrade() else {
            return tcl_throw!(
                ErrorKind::InvalidHandle,
                "handle \"{}\" refers to a released object",
                handle
            );
        };

        match object.downcast::<T>() {
            Ok(object) => Ok(object),
            Err(_) => tcl_throw!(
                ErrorKind::InvalidHandle,
                "handle \"{}\" refers to an object of another type",
                handle
            ),
        }
    }

    fn check(&self, handle: &HostHandle) -> Result<(), Exception> {
        if self.owns(handle) {
            Ok(())
        } else {
            tcl_throw!(
                ErrorKind::InvalidHandle,
                "handle \"{}\" was not issued by this interpreter",
                handle
            )
        }
    }

    /// Converts an interpreter value to a host value.
    pub fn to_host(&self, value: &Value) -> Result<HostValue, Exception> {
        match value.kind() {
            ValueKind::String => Ok(HostValue::Str(value.as_str().to_string())),
            ValueKind::Integer => Ok(HostValue::Int(value.as_int()?)),
            ValueKind::Float => Ok(HostValue::Float(value.as_float()?)),
            ValueKind::List => Ok(HostValue::List(self.to_host_args(&value.as_list()?)?)),
            ValueKind::Opaque => {
                let handle = value.as_handle()?;
                self.check(&handle)?;
                Ok(HostValue::Handle(handle))
            }
        }
    }

    /// Converts a host value to an interpreter value.
    pub fn from_host(&self, value: &HostValue) -> Result<Value, Exception> {
        match value {
            HostValue::Str(string) => Ok(Value::from(string.as_str())),
            HostValue::Int(int) => Ok(Value::from(*int)),
            HostValue::Float(flt) => Ok(Value::from(*flt)),
            HostValue::Bool(flag) => Ok(Value::from(*flag)),
            HostValue::List(list) => Ok(Value::from(self.from_host_args(list)?)),
            HostValue::Map(map) => {
                let mut list = Vec::with_capacity(map.len() * 2);
                for (key, item) in map {
                    list.push(Value::from(key.as_str()));
                    list.push(self.from_host(item)?);
                }
                Ok(Value::from(list))
            }
            HostValue::Handle(handle) => {
                self.check(handle)?;
                Ok(Value::opaque(*handle))
            }
        }
    }

    /// Converts a slice of interpreter values, preserving order.
    pub fn to_host_args(&self, values: &[Value]) -> Result<Vec<HostValue>, Exception> {
        values.iter().map(|v| self.to_host(v)).collect()
    }

    /// Converts a slice of host values, preserving order.
    pub fn from_host_args(&self, values: &[HostValue]) -> Result<TclList, Exception> {
        values.iter().map(|v| self.from_host(v)).collect()
    }
}
