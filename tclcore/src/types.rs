//! Common Type Definitions
//!
//! This module defines the types shared across the interpreter: the numeric types used by
//! [`Value`], the [`Exception`] type that carries every error out of the interpreter, the
//! [`ErrorKind`] taxonomy, and the signature of a native [`CommandFunc`].
//!
//! [`Value`]: ../value/struct.Value.html

use crate::interp::Interp;
use crate::value::Value;
use core::fmt;

/// The standard integer type for interpreter code.
pub type TclInt = i64;

/// The standard floating point type for interpreter code.
pub type TclFloat = f64;

/// The standard list type for interpreter code.
pub type TclList = Vec<Value>;

/// The hasher used by the command table, variable scopes, and the handle registry.
pub type TclHasher = fnv::FnvBuildHasher;

/// The result of evaluating a script or executing a command: a [`Value`] or an
/// [`Exception`].
pub type TclResult = Result<Value, Exception>;

/// A native command: given the interpreter and the command's words (`argv[0]` is the
/// command name), return the command's result.
pub type CommandFunc = fn(&mut Interp, &[Value]) -> TclResult;

/// The kinds of error the interpreter can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A malformed script or expression: unmatched quote, brace, or bracket, extra
    /// characters after a close-brace, an empty command name.
    SyntaxError,

    /// The command name isn't in the command table.
    UnknownCommand,

    /// Script or substitution nesting exceeded the interpreter's recursion limit.
    RecursionLimit,

    /// An arithmetic failure in `expr`: division by zero, overflow, non-numeric operand.
    ArithmeticError,

    /// An opaque handle that this interpreter didn't issue, or whose object is gone.
    InvalidHandle,

    /// A host callback returned an error.
    CallbackError,

    /// An error raised by a command's own logic: wrong # args, bad argument value,
    /// unknown variable, or the `error` command.
    ScriptError,
}

impl ErrorKind {
    /// The Tcl-style `errorCode` for this kind of error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "TCL PARSE",
            ErrorKind::UnknownCommand => "TCL LOOKUP COMMAND",
            ErrorKind::RecursionLimit => "TCL LIMIT DEPTH",
            ErrorKind::ArithmeticError => "ARITH",
            ErrorKind::InvalidHandle => "TCL LOOKUP HANDLE",
            ErrorKind::CallbackError => "HOST CALLBACK",
            ErrorKind::ScriptError => "NONE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::UnknownCommand => "unknown command",
            ErrorKind::RecursionLimit => "recursion limit",
            ErrorKind::ArithmeticError => "arithmetic error",
            ErrorKind::InvalidHandle => "invalid handle",
            ErrorKind::CallbackError => "callback error",
            ErrorKind::ScriptError => "script error",
        };
        f.write_str(name)
    }
}

/// An error returned by the interpreter.
///
/// An `Exception` carries its [`ErrorKind`], the error message, the name of the command that
/// failed (when known), and the Tcl-style stack trace accumulated as the error unwinds
/// through nested evaluations (the `errorInfo`).  A `CallbackError` raised because a host
/// callback propagated an interpreter error also carries that error as its cause.
///
/// Two exceptions compare equal if their kinds and messages are equal; the command name,
/// stack trace, and cause are ignored.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{value}")]
pub struct Exception {
    kind: ErrorKind,
    value: Value,
    command: Option<String>,
    error_info: String,
    is_new: bool,
    #[source]
    cause: Option<Box<Exception>>,
}

impl Exception {
    /// Creates a new exception of the given kind with the given message.
    pub fn new(kind: ErrorKind, msg: Value) -> Self {
        Self {
            kind,
            error_info: msg.as_str().to_string(),
            value: msg,
            command: None,
            is_new: true,
            cause: None,
        }
    }

    /// Creates a `CallbackError` for an interpreter error propagated out of a host callback.
    /// The new exception takes the message and stack trace of `cause`, and keeps `cause`
    /// itself, so the original kind of error can be recovered with [`cause`](#method.cause).
    pub fn callback_error(cause: Exception) -> Self {
        Self {
            kind: ErrorKind::CallbackError,
            value: cause.value.clone(),
            command: None,
            error_info: cause.error_info.clone(),
            is_new: cause.is_new,
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a `ScriptError` exception with the given message.  This is the usual
    /// error raised by command implementations; see also the `tcl_err!` macro.
    pub fn tcl_err(msg: Value) -> Self {
        Self::new(ErrorKind::ScriptError, msg)
    }

    /// Attaches the name of the command that raised the error, if none is set yet.
    pub fn with_command(mut self, name: &str) -> Self {
        if self.command.is_none() {
            self.command = Some(name.to_string());
        }
        self
    }

    /// The kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error message.
    pub fn value(&self) -> Value {
        self.value.clone()
    }

    /// The name of the command that failed, if known.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// The interpreter error that caused this one, for a `CallbackError` raised by a
    /// callback that propagated a nested evaluation's failure.
    pub fn cause(&self) -> Option<&Exception> {
        self.cause.as_deref()
    }

    /// The accumulated stack trace.
    pub fn error_info(&self) -> Value {
        Value::from(self.error_info.as_str())
    }

    /// The Tcl-style error code.
    pub fn error_code(&self) -> Value {
        Value::from(self.kind.error_code())
    }

    /// Whether the error was just raised, i.e., no stack trace has been added to it yet.
    pub fn is_new_error(&self) -> bool {
        self.is_new
    }

    /// Appends a line to the stack trace.
    pub fn add_error_info(&mut self, line: &str) {
        self.error_info.push('\n');
        self.error_info.push_str(line);
        self.is_new = false;
    }
}

impl PartialEq for Exception {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

/// A subcommand of an ensemble command such as `info` or `string`: the subcommand's
/// name and its implementation.
pub struct Subcommand(pub &'static str, pub CommandFunc);

impl Subcommand {
    /// Looks up a subcommand by name, returning a standard error listing the valid
    /// options if it isn't found.
    pub fn find<'a>(ensemble: &'a [Subcommand], sub_name: &str) -> Result<&'a Subcommand, Exception> {
        for subcmd in ensemble {
            if subcmd.0 == sub_name {
                return Ok(subcmd);
            }
        }

        let mut names = String::new();
        names.push_str(ensemble[0].0);
        let last = ensemble.len() - 1;

        if ensemble.len() > 1 {
            names.push_str(", ");
        }

        if ensemble.len() > 2 {
            let vec: Vec<&str> = ensemble[1..last].iter().map(|x| x.0).collect();
            names.push_str(&vec.join(", "));
        }

        if ensemble.len() > 2 {
            names.push_str(", or ");
        }

        if ensemble.len() > 1 {
            names.push_str(ensemble[last].0);
        }

        tcl_err!(
            "unknown or ambiguous subcommand \"{}\": must be {}",
            sub_name,
            &names
        )
    }
}
