//! The Callback Trampoline
//!
//! A host callback is any [`HostFunction`]: usually a closure registered with
//! [`Interp::proc`].  When a script invokes the callback's command, the trampoline
//!
//! 1. pushes a callback frame,
//! 2. marshals the command's arguments (not the command name) into [`HostValue`]s,
//! 3. calls the host function, passing it the interpreter so that it can evaluate scripts or
//!    call commands of its own,
//! 4. marshals the returned host value back into a [`Value`],
//! 5. pops the frame, whether or not the callback succeeded,
//!
//! and evaluation resumes with the callback's value as the command's result.
//!
//! An error returned by the host function always becomes an [`ErrorKind::CallbackError`]
//! exception carrying the host error's message.  If the host error is itself an
//! [`Exception`], as when the callback propagates a failed nested `eval` with `?`, the
//! `CallbackError` also keeps its stack trace, and keeps the original as its
//! [`cause`](../types/struct.Exception.html#method.cause).
//!
//! [`Interp::proc`]: ../interp/struct.Interp.html#method.proc
//! [`ErrorKind::CallbackError`]: ../types/enum.ErrorKind.html

use crate::frame::FrameKind;
use crate::interp::Interp;
use crate::marshal::HostValue;
use crate::types::*;
use crate::value::Value;

/// The error type returned by host callbacks.  Any error type converts into it with `?`,
/// as do `&str` and `String` with `.into()`.
pub type HostError = Box<dyn std::error::Error>;

/// A host function that can be registered as an interpreter command.
///
/// Closures of the form `Fn(&mut Interp, &[HostValue]) -> Result<HostValue, HostError>`
/// implement this trait; implement it directly for host objects that carry more state.
pub trait HostFunction {
    /// Invokes the function with the command's arguments, excluding the command name.
    fn invoke(&self, interp: &mut Interp, args: &[HostValue]) -> Result<HostValue, HostError>;
}

impl<F> HostFunction for F
where
    F: Fn(&mut Interp, &[HostValue]) -> Result<HostValue, HostError>,
{
    fn invoke(&self, interp: &mut Interp, args: &[HostValue]) -> Result<HostValue, HostError> {
        self(interp, args)
    }
}

/// Calls a host function on behalf of the command `argv[0]`.
pub(crate) fn invoke(interp: &mut Interp, func: &dyn HostFunction, argv: &[Value]) -> TclResult {
    let name = argv[0].as_str();
    let frame = interp.push_frame(FrameKind::Callback, argv)?;

    tracing::debug!(command = name, argc = argv.len() - 1, "invoking host callback");
    let result = call_host(interp, func, argv);

    interp.pop_frame(frame);
    result
}

fn call_host(interp: &mut Interp, func: &dyn HostFunction, argv: &[Value]) -> TclResult {
    let name = argv[0].as_str();
    let args = interp.marshaller().to_host_args(&argv[1..])?;

    match func.invoke(interp, &args) {
        Ok(value) => interp.marshaller().from_host(&value),
        Err(err) => match err.downcast::<Exception>() {
            Ok(exception) => Err(Exception::callback_error(*exception).with_command(name)),
            Err(err) => {
                tracing::debug!(command = name, error = %err, "host callback failed");
                Err(Exception::new(ErrorKind::CallbackError, Value::from(err.to_string()))
                    .with_command(name))
            }
        },
    }
}
