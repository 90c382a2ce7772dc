//! Convenience Macros
//!
//! This module contains macros for use by command authors.

/// Returns an `Ok` [`TclResult`].
///
/// If called with no arguments, returns an empty value as the `Ok` result.
/// If called with one argument, returns the argument as the `Ok` result, converting it
/// to a value automatically.
/// If called with two or more arguments, computes the `Ok` result using `format!()`;
/// the first argument is naturally the format string.
///
/// # Examples
///
/// ```
/// use tclcore::*;
///
/// fn empty() -> TclResult { tcl_ok!() }
/// fn number() -> TclResult { tcl_ok!(5) }
/// fn formatted() -> TclResult { tcl_ok!("The answer is {}.", 5) }
///
/// assert_eq!(empty(), Ok(Value::empty()));
/// assert_eq!(number(), Ok(Value::from(5)));
/// assert_eq!(formatted(), Ok(Value::from("The answer is 5.")));
/// ```
///
/// [`TclResult`]: types/type.TclResult.html
#[macro_export]
macro_rules! tcl_ok {
    () => (
        Ok($crate::Value::empty())
    );
    ($arg:expr) => (
        Ok($crate::Value::from($arg))
    );
    ($($arg:tt)*) => (
        Ok($crate::Value::from(format!($($arg)*)))
    )
}

/// Returns an `Err` [`TclResult`] of kind `ScriptError`, the usual error raised by a
/// command.  The message is the argument, or is computed with `format!()` if there are
/// several arguments.
///
/// # Examples
///
/// ```
/// use tclcore::*;
///
/// fn simple() -> TclResult { tcl_err!("error message") }
/// fn formatted() -> TclResult { tcl_err!("error {}", 5) }
///
/// assert_eq!(simple(), Err(Exception::tcl_err(Value::from("error message"))));
/// assert_eq!(formatted(), Err(Exception::tcl_err(Value::from("error 5"))));
/// ```
///
/// [`TclResult`]: types/type.TclResult.html
#[macro_export]
macro_rules! tcl_err {
    ($arg:expr) => (
        Err($crate::Exception::tcl_err($crate::Value::from($arg)))
    );
    ($($arg:tt)*) => (
        Err($crate::Exception::tcl_err($crate::Value::from(format!($($arg)*))))
    )
}

/// Returns an `Err` result of an explicit [`ErrorKind`], formatting the message.
///
/// # Example
///
/// ```
/// use tclcore::*;
///
/// fn div(a: TclInt, b: TclInt) -> TclResult {
///     if b == 0 {
///         return tcl_throw!(ErrorKind::ArithmeticError, "divide by zero");
///     }
///     tcl_ok!(a / b)
/// }
///
/// assert_eq!(div(1, 0).unwrap_err().kind(), ErrorKind::ArithmeticError);
/// ```
///
/// [`ErrorKind`]: types/enum.ErrorKind.html
#[macro_export]
macro_rules! tcl_throw {
    ($kind:expr, $arg:expr) => (
        Err($crate::Exception::new($kind, $crate::Value::from($arg)))
    );
    ($kind:expr, $($arg:tt)*) => (
        Err($crate::Exception::new($kind, $crate::Value::from(format!($($arg)*))))
    )
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn test_tcl_ok() {
        let result: TclResult = tcl_ok!();
        assert_eq!(Ok(Value::empty()), result);

        let result: TclResult = tcl_ok!(5);
        assert_eq!(Ok(Value::from(5)), result);

        let result: TclResult = tcl_ok!("Five");
        assert_eq!(Ok(Value::from("Five")), result);

        let result: TclResult = tcl_ok!("The answer is {}", 5);
        assert_eq!(Ok(Value::from("The answer is 5")), result);
    }

    #[test]
    fn test_tcl_err() {
        let result: TclResult = tcl_err!("error message");
        assert_eq!(Err(Exception::tcl_err(Value::from("error message"))), result);

        let result: TclResult = tcl_err!("error {}", 5);
        assert_eq!(Err(Exception::tcl_err(Value::from("error 5"))), result);
    }

    #[test]
    fn test_tcl_throw() {
        let result: TclResult = tcl_throw!(ErrorKind::InvalidHandle, "bad handle {}", 7);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHandle);
        assert_eq!(err.value().as_str(), "bad handle 7");
    }
}
