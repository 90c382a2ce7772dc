//! # tclcore: An Embeddable Tcl Command Interpreter
//!
//! This crate is the core of a small Tcl-style scripting language meant to be embedded in a
//! Rust host application.  It provides a parser for Tcl command syntax, an evaluator with
//! variable and command substitution, an expression evaluator, and a host interface: the
//! host can register callbacks as commands, call commands directly with structured
//! [`HostValue`]s, and pass opaque handles to its own objects through scripts.
//!
//! ```
//! use tclcore::*;
//!
//! let mut interp = Interp::new();
//!
//! interp.proc("add", |_: &mut Interp, args: &[HostValue]| {
//!     let sum: i64 = args.iter().filter_map(|arg| arg.as_int()).sum();
//!     Ok(HostValue::Int(sum))
//! });
//!
//! let result = interp.eval("set x [add 1 2 3]; expr {$x * 2}").unwrap();
//! assert_eq!(result.as_int(), Ok(12));
//! ```
//!
//! Each [`Interp`] is a single-threaded object; an application wanting scripting on several
//! threads creates one interpreter per thread.
//!
//! See the [`interp`](interp/index.html) module for the interpreter and the
//! [`value`](value/index.html) module for the value type.
//!
//! # Features
//!
//! * `error-stack-trace` (default): errors accumulate a human-readable stack trace, saved
//!   in the global `errorInfo` variable.
//! * `io-commands` (default): includes the `puts` and `source` builtins.

#![doc(html_root_url = "https://docs.rs/tclcore/0.1.0")]

pub use crate::interp::Interp;
pub use crate::marshal::HostHandle;
pub use crate::marshal::HostValue;
pub use crate::marshal::Marshaller;
pub use crate::trampoline::HostError;
pub use crate::trampoline::HostFunction;
pub use crate::types::*;
pub use crate::value::Value;
pub use crate::value::ValueKind;

#[macro_use]
mod macros;
mod cmdtable;
mod commands;
mod expr;
mod frame;
pub mod interp;
mod list;
pub mod marshal;
mod parser;
mod stack;
mod tokenizer;
pub mod trampoline;
pub mod types;
pub mod value;

/// This function is used in command functions to check whether the command's argument
/// list is of a proper size for the given command.  If it is, `check_args` returns
/// the empty result; if not, it returns a Tcl error message `wrong # args: should be "syntax..."`,
/// where the syntax is the command name followed by the `argsig`.
///
/// The arguments are as follows:
///
/// * `namec`: the number of elements of `argv` that name the command, usually 1, or 2 for
///   a subcommand.
/// * `argv`: the argument list, including the command name.
/// * `min`: the minimum number of elements in `argv`.
/// * `max`: the maximum number of elements in `argv`, or 0 if there is no maximum.
/// * `argsig`: the signature of the arguments following the command name.
///
/// # Example
///
/// ```
/// use tclcore::*;
///
/// // Implements the "double intValue" command
/// fn cmd_double(_: &mut Interp, argv: &[Value]) -> TclResult {
///     check_args(1, argv, 2, 2, "intValue")?;
///     tcl_ok!(2 * argv[1].as_int()?)
/// }
///
/// let mut interp = Interp::new();
/// interp.add_command("double", cmd_double);
/// assert_eq!(interp.eval("double 21"), Ok(Value::from(42)));
/// assert_eq!(
///     interp.eval("double").unwrap_err().value().as_str(),
///     "wrong # args: should be \"double intValue\""
/// );
/// ```
pub fn check_args(namec: usize, argv: &[Value], min: usize, max: usize, argsig: &str) -> TclResult {
    assert!(namec >= 1);
    assert!(min >= 1);
    assert!(!argv.is_empty());

    if argv.len() < min || (max > 0 && argv.len() > max) {
        let cmd_tokens = Value::from(&argv[0..namec]);
        if argsig.is_empty() {
            tcl_err!("wrong # args: should be \"{}\"", cmd_tokens)
        } else {
            tcl_err!("wrong # args: should be \"{} {}\"", cmd_tokens, argsig)
        }
    } else {
        tcl_ok!()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_args() {
        assert_ok(&check_args(1, &mklist(vec!["mycmd"]), 1, 1, ""));
        assert_ok(&check_args(1, &mklist(vec!["mycmd"]), 1, 2, "arg1"));
        assert_ok(&check_args(1, &mklist(vec!["mycmd", "data"]), 1, 2, "arg1"));
        assert_err(
            &check_args(1, &mklist(vec!["mycmd", "data", "data2"]), 1, 2, "arg1"),
            "wrong # args: should be \"mycmd arg1\"",
        );

        assert_ok(&check_args(1, &mklist(vec!["mycmd"]), 1, 0, "args..."));
        assert_ok(&check_args(
            1,
            &mklist(vec!["mycmd", "1", "2", "3", "4", "5"]),
            1,
            0,
            "args...",
        ));

        assert_ok(&check_args(2, &mklist(vec!["mycmd", "sub"]), 2, 2, ""));
        assert_err(
            &check_args(2, &mklist(vec!["mycmd", "sub", "x"]), 2, 2, ""),
            "wrong # args: should be \"mycmd sub\"",
        );
    }

    // Helpers

    fn mklist(argv: Vec<&str>) -> TclList {
        argv.into_iter().map(Value::from).collect()
    }

    fn assert_err(result: &TclResult, msg: &str) {
        assert_eq!(&Err(Exception::tcl_err(Value::from(msg))), result);
    }

    fn assert_ok(result: &TclResult) {
        assert!(result.is_ok(), "Result is not Ok");
    }
}
