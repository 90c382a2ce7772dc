//! The Interpreter
//!
//! The [`Interp`] struct is the primary API for embedding the interpreter into a Rust
//! application.  Given an `Interp`, the application may:
//!
//! * Evaluate scripts and expressions
//! * Check scripts for completeness
//! * Register host callbacks as commands, and call commands directly with host values
//! * Pass host objects through scripts as opaque handles
//! * Set and get variables
//!
//! # Interp is not Send!
//!
//! The [`Interp`] (like [`Value`]) is built on `Rc` and is intended for use in a single
//! thread.  It is safe to have `Interps` in different threads; but use `String` or
//! [`HostValue`] (built from sendable data) when passing data between them.
//!
//! # Creating an Interpreter
//!
//! There are two ways to create an interpreter.  The usual way is to call
//! [`Interp::new`](struct.Interp.html#method.new), which creates an interpreter and populates
//! it with all of the standard builtin commands.  The application can then add any
//! application-specific commands.
//!
//! Alternatively, [`Interp::empty`](struct.Interp.html#method.empty) creates an interpreter
//! with no commands at all, allowing the application to define only those commands it needs.
//!
//! ```
//! use tclcore::Interp;
//! let mut interp = Interp::new();
//!
//! // add commands, evaluate scripts, etc.
//! ```
//!
//! # Evaluating Scripts
//!
//! The simplest way to evaluate a script is to pass it as a string to `Interp::eval`.  The
//! interpreter evaluates the string as a script, and returns either a normal [`Value`]
//! containing the result of the script's last command, or an [`Exception`].  The script is
//! evaluated in the caller's context: if called at the application level, the script will be
//! evaluated in the interpreter's global scope; if called by a host callback, it will be
//! evaluated in the scope of the code that invoked the callback.
//!
//! ```
//! use tclcore::*;
//!
//! # fn dummy() -> TclResult {
//! let mut interp = Interp::new();
//!
//! let val = interp.eval("expr {2 + 2}")?;
//! assert_eq!(val.as_str(), "4");
//! assert_eq!(val.as_int()?, 4);
//! # tcl_ok!()
//! # }
//! # dummy().unwrap();
//! ```
//!
//! [`Interp::eval_value`](struct.Interp.html#method.eval_value) is equivalent to
//! `Interp::eval` but takes the script as a `Value` instead of as a `&str`.  The `Value`
//! caches its parsed form, so prefer `eval_value` for scripts evaluated many times.
//!
//! When an evaluation started by the application fails, the interpreter saves the error's
//! stack trace and error code in the global variables `errorInfo` and `errorCode`; the
//! trace is also available from [`Interp::error_info`](struct.Interp.html#method.error_info).
//!
//! # Host Callbacks
//!
//! The usual reason for embedding the interpreter is to extend it with application-specific
//! commands.  [`Interp::proc`](struct.Interp.html#method.proc) registers a closure as a
//! command; scripts call it like any other command.  The closure receives the command's
//! arguments as [`HostValue`]s and returns a `HostValue` (or any error) as the result.  It
//! also receives the interpreter, so it may evaluate scripts of its own.
//!
//! ```
//! use tclcore::*;
//!
//! # fn dummy() -> TclResult {
//! let mut interp = Interp::new();
//!
//! interp.proc("greet", |_: &mut Interp, args: &[HostValue]| {
//!     let name = args.first().and_then(|a| a.as_str()).unwrap_or("world");
//!     Ok(HostValue::from(format!("Hello, {}!", name)))
//! });
//!
//! assert_eq!(interp.eval("greet Alice")?.as_str(), "Hello, Alice!");
//! # tcl_ok!()
//! # }
//! # dummy().unwrap();
//! ```
//!
//! Commands can also be called directly, without parsing a script, using
//! [`Interp::call`](struct.Interp.html#method.call):
//!
//! ```
//! use tclcore::*;
//!
//! let mut interp = Interp::new();
//! let items = HostValue::List((1..=5).map(HostValue::Int).collect());
//! assert_eq!(interp.call("llength", &[items]), Ok(HostValue::Int(5)));
//! ```
//!
//! # Native Commands
//!
//! Builtins are [`CommandFunc`]s: Rust functions that are given the interpreter and the
//! command's words as [`Value`]s.  An application may add its own with
//! [`Interp::add_command`](struct.Interp.html#method.add_command).
//!
//! ```
//! use tclcore::*;
//!
//! # fn dummy() -> TclResult {
//! let mut interp = Interp::new();
//! interp.add_command("square", cmd_square);
//!
//! let val = interp.eval("square 5")?;
//! assert_eq!(val.as_str(), "25");
//! # tcl_ok!()
//! # }
//! # dummy().unwrap();
//!
//! // The command: square intValue
//! fn cmd_square(_: &mut Interp, argv: &[Value]) -> TclResult {
//!     check_args(1, argv, 2, 2, "intValue")?;
//!     let int_value = argv[1].as_int()?;
//!     tcl_ok!(int_value * int_value)
//! }
//! ```
//!
//! # Ensemble Commands
//!
//! An _ensemble command_ is a command with subcommands, like the standard `info` and
//! `string` commands.  It looks up its subcommand (e.g., `argv[1]`) in an array of
//! [`Subcommand`] structs using
//! [`Interp::call_subcommand`](struct.Interp.html#method.call_subcommand), which handles
//! the relevant errors in the standard way.
//!
//! [`Value`]: ../value/struct.Value.html
//! [`HostValue`]: ../marshal/enum.HostValue.html
//! [`Exception`]: ../types/struct.Exception.html
//! [`CommandFunc`]: ../types/type.CommandFunc.html
//! [`Subcommand`]: ../types/struct.Subcommand.html
//! [`Interp`]: struct.Interp.html

use crate::check_args;
use crate::cmdtable::Command;
use crate::cmdtable::CommandTable;
use crate::commands;
use crate::expr;
use crate::frame::FrameId;
use crate::frame::FrameKind;
use crate::frame::FrameStack;
use crate::marshal::HostHandle;
use crate::marshal::HostValue;
use crate::marshal::Marshaller;
use crate::parser;
use crate::parser::Script;
use crate::parser::Word;
use crate::stack;
use crate::trampoline::HostError;
use crate::trampoline::HostFunction;
use crate::types::*;
use crate::value::Value;
use std::any::Any;
use std::rc::Rc;

/// The default limit on the depth of nested evaluations.
const DEFAULT_RECURSION_LIMIT: usize = 1000;

/// The Interpreter.
///
/// The `Interp` struct is the primary API for embedding the interpreter into a Rust
/// application.  The application creates an instance of `Interp`, configures it with the
/// required set of application-specific commands and callbacks, and then uses it to
/// evaluate scripts and expressions, and to call commands directly.  See the
/// [module level documentation](index.html) for an overview.
///
/// # Example
///
/// By default, the `Interp` comes configured with the full set of builtin commands.
///
/// ```
/// use tclcore::*;
/// # fn dummy() -> TclResult {
/// let mut interp = Interp::new();
/// let four = interp.eval("expr {2 + 2}")?;
/// assert_eq!(four, Value::from(4));
/// # tcl_ok!()
/// # }
/// # dummy().unwrap();
/// ```
pub struct Interp {
    // Command Table
    commands: CommandTable,

    // Execution frames and their variables
    frames: FrameStack,

    // Host value conversion and the handle registry
    marshaller: Marshaller,

    // The limit on the depth of nested evaluations.
    recursion_limit: usize,
}

impl Default for Interp {
    fn default() -> Self {
        Self::new()
    }
}

// NOTE: The order of methods in the generated RustDoc depends on the order in this block.
// Consequently, methods are ordered pedagogically.
impl Interp {
    //--------------------------------------------------------------------------------------------
    // Constructors

    /// Creates a new interpreter with no commands defined.  Use this when crafting
    /// command languages that shouldn't include the normal builtins.
    ///
    /// # Example
    ///
    /// ```
    /// # use tclcore::Interp;
    /// let interp = Interp::empty();
    /// assert!(interp.command_names().is_empty());
    /// ```
    pub fn empty() -> Self {
        let mut interp = Self {
            commands: CommandTable::new(),
            frames: FrameStack::new(),
            marshaller: Marshaller::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        };

        interp.frames.set_global("errorInfo", Value::empty());
        interp
    }

    /// Creates a new interpreter that is pre-populated with the builtin commands.
    /// Use [`command_names`](#method.command_names) (or the `info commands` command)
    /// to retrieve the full list, and [`proc`](#method.proc) or
    /// [`add_command`](#method.add_command) to extend the interpreter with new commands.
    ///
    /// ```
    /// # use tclcore::*;
    /// # fn dummy() -> TclResult {
    /// let mut interp = Interp::new();
    /// let four = interp.eval("expr {2 + 2}")?;
    /// assert_eq!(four, Value::from(4));
    /// # tcl_ok!()
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn new() -> Self {
        let mut interp = Interp::empty();

        let builtins: &[(&'static str, CommandFunc)] = &[
            ("append", commands::cmd_append),
            ("catch", commands::cmd_catch),
            ("concat", commands::cmd_concat),
            ("error", commands::cmd_error),
            ("eval", commands::cmd_eval),
            ("expr", commands::cmd_expr),
            ("global", commands::cmd_global),
            ("incr", commands::cmd_incr),
            ("info", commands::cmd_info),
            ("join", commands::cmd_join),
            ("lappend", commands::cmd_lappend),
            ("lindex", commands::cmd_lindex),
            ("list", commands::cmd_list),
            ("llength", commands::cmd_llength),
            ("proc", commands::cmd_proc),
            ("rename", commands::cmd_rename),
            ("set", commands::cmd_set),
            ("string", commands::cmd_string),
            ("unset", commands::cmd_unset),
            #[cfg(feature = "io-commands")]
            ("puts", commands::cmd_puts),
            #[cfg(feature = "io-commands")]
            ("source", commands::cmd_source),
        ];

        for &(name, func) in builtins {
            interp.add_command(name, func);
        }

        interp
    }

    /// Removes the builtins that reach outside the interpreter (`puts` and `source`), so
    /// that untrusted scripts can only compute.  Commands registered by the application
    /// are left alone.
    ///
    /// ```
    /// # use tclcore::Interp;
    /// let mut interp = Interp::new();
    /// interp.make_safe();
    /// assert!(!interp.has_command("source"));
    /// assert!(interp.has_command("set"));
    /// ```
    pub fn make_safe(&mut self) {
        for name in commands::UNSAFE_COMMANDS {
            if self.commands.command_type(name) == Some("native") {
                self.commands.unregister(name);
            }
        }
        tracing::debug!("removed unsafe builtins");
    }

    //--------------------------------------------------------------------------------------------
    // Script and Expression Evaluation

    /// Evaluates a script one command at a time.  Returns the [`Value`](../value/index.html)
    /// of the last command in the script (the empty value for an empty script), or the first
    /// error thrown by the script.
    ///
    /// # Example
    ///
    /// The following code shows how to evaluate a script and handle the result, whether
    /// it's a computed `Value` or an error.
    ///
    /// ```
    /// # use tclcore::*;
    /// let mut interp = Interp::new();
    ///
    /// match interp.eval("set a 1") {
    ///    Ok(val) => println!("Value: {}", val),
    ///    Err(exception) => println!("Error ({}): {}", exception.kind(), exception.value()),
    /// }
    /// ```
    pub fn eval(&mut self, script: &str) -> TclResult {
        let value = Value::from(script);
        self.eval_value(&value)
    }

    /// Evaluates the string value of a [`Value`] as a script.  This method is equivalent to
    /// [`eval`](#method.eval), but works on a `Value` rather than on a string slice.  Prefer
    /// it if the script is already stored in a `Value`, as the parsed script is cached.
    ///
    /// [`Value`]: ../value/index.html
    pub fn eval_value(&mut self, value: &Value) -> TclResult {
        let result = self.eval_nested(value);
        self.save_error_if_top_level(&result);
        result
    }

    // Evaluates the value as a script in a new script frame.
    fn eval_nested(&mut self, value: &Value) -> TclResult {
        let script = value.as_script(self.recursion_limit)?;
        let frame = self.push_frame(FrameKind::Script, &[])?;
        let result = self.eval_script(&script);
        self.pop_frame(frame);
        result
    }

    // When an evaluation started by the application fails, save the error data.
    fn save_error_if_top_level(&mut self, result: &TclResult) {
        if self.frames.depth() == 0 {
            if let Err(exception) = result {
                self.set_global_error_data(exception);
            }
        }
    }

    /// Saves the error's stack trace and error code in `errorInfo` and `errorCode`.
    pub(crate) fn set_global_error_data(&mut self, exception: &Exception) {
        self.frames.set_global("errorInfo", exception.error_info());
        self.frames.set_global("errorCode", exception.error_code());
    }

    /// Evaluates a parsed Script in the current frame.  Also used by procedures.
    pub(crate) fn eval_script(&mut self, script: &Script) -> TclResult {
        stack::ensure_sufficient_stack(|| self.eval_script_inner(script))
    }

    fn eval_script_inner(&mut self, script: &Script) -> TclResult {
        let mut result_value = Value::empty();

        for word_vec in script.commands() {
            let words = self.eval_word_vec(word_vec.words())?;

            if words.is_empty() {
                break;
            }

            result_value = self.dispatch(&words)?;
        }

        Ok(result_value)
    }

    // Looks up and executes the command named by `words[0]`.
    fn dispatch(&mut self, words: &[Value]) -> TclResult {
        let name = words[0].as_str();

        if name.is_empty() {
            return tcl_throw!(ErrorKind::SyntaxError, "empty command name");
        }

        let Some(cmd) = self.commands.lookup(name) else {
            let exception = Exception::new(
                ErrorKind::UnknownCommand,
                Value::from(format!("invalid command name \"{}\"", name)),
            );
            return Err(annotate(exception, false, words));
        };

        tracing::trace!(command = name, argc = words.len() - 1, "dispatching command");

        match cmd.execute(self, words) {
            Ok(value) => Ok(value),
            Err(exception) => Err(annotate(exception, cmd.is_proc(), words)),
        }
    }

    /// Evaluates a WordVec, producing a list of Values.
    fn eval_word_vec(&mut self, words: &[Word]) -> Result<TclList, Exception> {
        let mut list: TclList = Vec::with_capacity(words.len());

        for word in words {
            list.push(self.eval_word(word)?);
        }

        Ok(list)
    }

    /// Evaluates a single word, producing a value.  This is also used by expr.rs.  Each
    /// command substitution is evaluated in a frame of its own.
    pub(crate) fn eval_word(&mut self, word: &Word) -> TclResult {
        match word {
            Word::Value(val) => Ok(val.clone()),
            Word::VarRef(name) => self.var(name),
            Word::Script(script) => {
                let frame = self.push_frame(FrameKind::Script, &[])?;
                let result = self.eval_script(script);
                self.pop_frame(frame);
                result
            }
            Word::Tokens(tokens) => {
                let tlist = self.eval_word_vec(tokens)?;
                let string: String = tlist.iter().map(|i| i.as_str()).collect();
                Ok(Value::from(string))
            }
            Word::String(str) => Ok(Value::from(str)),
        }
    }

    /// Determines whether or not the script is syntactically complete,
    /// e.g., has no unmatched quotes, brackets, or braces.
    ///
    /// REPLs use this to determine whether or not to ask for another line of
    /// input.
    ///
    /// # Example
    ///
    /// ```
    /// # use tclcore::Interp;
    /// let interp = Interp::new();
    /// assert!(interp.complete("set a [expr {1+1}]"));
    /// assert!(!interp.complete("set a [expr {1+1"));
    /// ```
    pub fn complete(&self, script: &str) -> bool {
        parser::parse(script, self.recursion_limit).is_ok()
    }

    /// Evaluates an expression and returns its value.  The expression is passed as a
    /// `Value` which is interpreted as a `String`.
    ///
    /// # Example
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> Result<String,Exception> {
    /// let mut interp = Interp::new();
    /// let expr = Value::from("2 + 2");
    /// let sum = interp.expr(&expr)?.as_int()?;
    ///
    /// assert_eq!(sum, 4);
    /// # Ok("dummy".to_string())
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn expr(&mut self, expr: &Value) -> TclResult {
        let result = expr::expr(self, expr);
        self.save_error_if_top_level(&result);
        result
    }

    /// Evaluates a boolean expression and returns its value, or an error if it couldn't be
    /// interpreted as a boolean.
    ///
    /// # Example
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> Result<String,Exception> {
    /// let mut interp = Interp::new();
    ///
    /// let expr = Value::from("1 < 2");
    /// let flag: bool = interp.expr_bool(&expr)?;
    ///
    /// assert!(flag);
    /// # Ok("dummy".to_string())
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn expr_bool(&mut self, expr: &Value) -> Result<bool, Exception> {
        self.expr(expr)?.as_bool()
    }

    /// Evaluates an expression and returns its value as an integer, or an error if it
    /// couldn't be interpreted as an integer.
    ///
    /// # Example
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> Result<String,Exception> {
    /// let mut interp = Interp::new();
    ///
    /// let expr = Value::from("1 + 2");
    /// let val: TclInt = interp.expr_int(&expr)?;
    ///
    /// assert_eq!(val, 3);
    /// # Ok("dummy".to_string())
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn expr_int(&mut self, expr: &Value) -> Result<TclInt, Exception> {
        self.expr(expr)?.as_int()
    }

    /// Evaluates an expression and returns its value as a float, or an error if it
    /// couldn't be interpreted as a float.
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> Result<String,Exception> {
    /// let mut interp = Interp::new();
    ///
    /// let expr = Value::from("7 / 2");
    /// let val: TclFloat = interp.expr_float(&expr)?;
    ///
    /// assert_eq!(val, 3.5);
    /// # Ok("dummy".to_string())
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn expr_float(&mut self, expr: &Value) -> Result<TclFloat, Exception> {
        self.expr(expr)?.as_float()
    }

    /// Returns the stack trace of the most recent error that escaped to the application,
    /// i.e., the value of the global `errorInfo` variable.
    ///
    /// ```
    /// # use tclcore::Interp;
    /// let mut interp = Interp::new();
    /// assert!(interp.eval("error boom").is_err());
    /// assert!(interp.error_info().as_str().starts_with("boom\n    while executing"));
    /// ```
    pub fn error_info(&self) -> Value {
        self.frames.get_global("errorInfo").unwrap_or_default()
    }

    //--------------------------------------------------------------------------------------------
    // Calling Commands Directly

    /// Calls the named command with the given host values as its arguments, without
    /// parsing a script, and returns its result as a host value.  The arguments are
    /// marshalled in order; a list argument is passed as a single list-valued argument.
    ///
    /// # Example
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> Result<(), Exception> {
    /// let mut interp = Interp::new();
    ///
    /// let joined = interp.call("join", &[HostValue::from(vec!["a", "b"]), HostValue::from("-")])?;
    /// assert_eq!(joined, HostValue::from("a-b"));
    /// # Ok(())
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn call(&mut self, name: &str, args: &[HostValue]) -> Result<HostValue, Exception> {
        let argv = self.marshaller.from_host_args(args)?;
        let value = self.call_value(name, &argv)?;
        self.marshaller.to_host(&value)
    }

    /// Calls the named command with the given values as its arguments, without parsing a
    /// script.
    pub fn call_value(&mut self, name: &str, args: &[Value]) -> TclResult {
        let mut words: TclList = Vec::with_capacity(args.len() + 1);
        words.push(Value::from(name));
        words.extend_from_slice(args);

        let result = self.dispatch(&words);
        self.save_error_if_top_level(&result);
        result
    }

    //--------------------------------------------------------------------------------------------
    // Variable Handling

    /// Retrieves the value of the named variable in the current scope.
    ///
    /// # Example
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> TclResult {
    /// let mut interp = Interp::new();
    ///
    /// interp.eval("set a 1")?;
    /// assert_eq!(interp.var("a")?.as_str(), "1");
    /// # tcl_ok!()
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn var(&self, name: &str) -> TclResult {
        self.frames.get(name)
    }

    /// Returns true if the named variable is defined in the current scope.
    pub fn var_exists(&self, name: &str) -> bool {
        self.frames.exists(name)
    }

    /// Sets the value of the named variable in the current scope, creating the variable if
    /// need be.
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> TclResult {
    /// let mut interp = Interp::new();
    ///
    /// interp.set_var("a", Value::from(5));
    /// assert_eq!(interp.eval("expr {$a * 2}")?.as_int()?, 10);
    /// # tcl_ok!()
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn set_var(&mut self, name: &str, value: Value) {
        self.frames.set(name, value);
    }

    /// Sets the value of the named variable in the current scope, returning the value.
    /// This is convenient for commands that return the value assigned.
    pub fn set_var_return(&mut self, name: &str, value: Value) -> TclResult {
        self.frames.set(name, value.clone());
        Ok(value)
    }

    /// Unsets the named variable in the current scope.  Does nothing if the variable
    /// doesn't exist.
    pub fn unset_var(&mut self, name: &str) {
        self.frames.unset(name);
    }

    /// Gets a list of the names of the variables that are visible in the current scope.
    pub fn vars_in_scope(&self) -> TclList {
        self.frames.var_names()
    }

    /// Links the named variable in the current procedure scope to the global variable of
    /// the same name.
    pub(crate) fn link_global(&mut self, name: &str) -> Result<(), Exception> {
        self.frames.link_global(name)
    }

    //--------------------------------------------------------------------------------------------
    // Command Definition and Handling

    /// Registers a host callback as a command.  The callback receives the command's
    /// arguments (not including the command name) as host values.  Any existing command of
    /// the same name, builtin or not, is replaced; a registration with an empty name is
    /// ignored.
    ///
    /// See the [module level documentation](index.html) for an example.
    pub fn proc<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Interp, &[HostValue]) -> Result<HostValue, HostError> + 'static,
    {
        self.register(name, func);
    }

    /// Registers any [`HostFunction`] as a command.  This is the general form of
    /// [`proc`](#method.proc), for host objects that implement the trait directly.
    ///
    /// [`HostFunction`]: ../trampoline/trait.HostFunction.html
    pub fn register<H: HostFunction + 'static>(&mut self, name: &str, func: H) {
        self.commands
            .register(name, Command::Callback(Box::new(func)));
    }

    /// Adds a native command to the interpreter.
    pub fn add_command(&mut self, name: &str, func: CommandFunc) {
        self.commands.register(name, Command::Builtin(func));
    }

    /// Adds a procedure to the interpreter.  The arguments are the same as for the `proc`
    /// command, which validates the parameter list.
    pub(crate) fn add_proc(&mut self, name: &str, parms: &[Value], body: &Value) {
        let proc = Procedure {
            parms: parms.to_owned(),
            body: body.clone(),
        };

        self.commands.register(name, Command::Proc(proc));
    }

    /// Determines whether or not the interpreter contains a command with the given
    /// name.
    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains(name)
    }

    /// Renames the command.  If the new name is empty, the command is deleted.
    ///
    /// **Note:** This does not update procedures that reference the command under the old
    /// name.  This is intentional: it is a common TCL programming technique to wrap an
    /// existing command by renaming it and defining a new command with the old name that
    /// calls the original command at its new name.
    ///
    /// # Example
    ///
    /// ```
    /// use tclcore::*;
    /// # fn dummy() -> TclResult {
    /// let mut interp = Interp::new();
    ///
    /// interp.rename_command("expr", "=")?;
    ///
    /// let sum = interp.eval("= {1 + 1}")?.as_int()?;
    ///
    /// assert_eq!(sum, 2);
    /// # tcl_ok!()
    /// # }
    /// # dummy().unwrap();
    /// ```
    pub fn rename_command(&mut self, old_name: &str, new_name: &str) -> Result<(), Exception> {
        self.commands.rename(old_name, new_name)
    }

    /// Removes the command with the given name, returning whether it existed.
    ///
    /// # Example
    ///
    /// ```
    /// use tclcore::Interp;
    ///
    /// let mut interp = Interp::new();
    ///
    /// assert!(interp.remove_command("set"));  // You'll be sorry....
    /// assert!(!interp.has_command("set"));
    /// assert!(!interp.remove_command("set"));
    /// ```
    pub fn remove_command(&mut self, name: &str) -> bool {
        self.commands.unregister(name)
    }

    /// Gets a vector of the names of the existing commands, in the order in which they were
    /// defined.
    pub fn command_names(&self) -> TclList {
        self.commands.names()
    }

    /// Returns a value naming the kind of command, "native", "callback", or "proc", or an
    /// error if there is no such command.
    pub fn command_type(&self, command: &str) -> TclResult {
        match self.commands.command_type(command) {
            Some(cmdtype) => tcl_ok!(cmdtype),
            None => tcl_err!("\"{}\" isn't a command", command),
        }
    }

    /// Gets a vector of the names of the existing procedures.
    pub fn proc_names(&self) -> TclList {
        self.commands.proc_names()
    }

    /// Returns the body of the named procedure, or an error if the name doesn't
    /// name a procedure.
    pub fn proc_body(&self, procname: &str) -> TclResult {
        if let Some(cmd) = self.commands.lookup(procname) {
            if let Some(proc) = cmd.as_proc() {
                return tcl_ok!(proc.body.clone());
            }
        }

        tcl_err!("\"{}\" isn't a procedure", procname)
    }

    /// Returns a list of the names of the arguments of the named procedure, or an
    /// error if the name doesn't name a procedure.
    pub fn proc_args(&self, procname: &str) -> TclResult {
        if let Some(cmd) = self.commands.lookup(procname) {
            if let Some(proc) = cmd.as_proc() {
                // Note: each item is guaranteed to be a list of 1 or 2 elements.
                let mut names: TclList = Vec::with_capacity(proc.parms.len());
                for parm in &proc.parms {
                    names.push(parm.as_list()?[0].clone());
                }
                return tcl_ok!(names);
            }
        }

        tcl_err!("\"{}\" isn't a procedure", procname)
    }

    /// Calls a subcommand of the current command, looking up its name in an array of
    /// `Subcommand` tuples.
    ///
    /// The subcommand, if found, is called with the same `argv` as its parent ensemble.
    /// `subc` is the index of the subcommand's name in the `argv` array; in most cases it
    /// will be `1`.  If the subcommand name isn't found, the error message lists the valid
    /// options.
    pub fn call_subcommand(
        &mut self,
        argv: &[Value],
        subc: usize,
        subcommands: &[Subcommand],
    ) -> TclResult {
        check_args(subc, argv, subc + 1, 0, "subcommand ?arg ...?")?;
        let rec = Subcommand::find(subcommands, argv[subc].as_str())?;
        (rec.1)(self, argv)
    }

    //--------------------------------------------------------------------------------------------
    // Host Values and Handles

    /// Converts a value into a host value.  Fails with `InvalidHandle` if the value is a
    /// handle this interpreter didn't issue.
    pub fn to_host(&self, value: &Value) -> Result<HostValue, Exception> {
        self.marshaller.to_host(value)
    }

    /// Converts a host value into a value.  Fails with `InvalidHandle` if the host value
    /// contains a handle this interpreter didn't issue.
    pub fn from_host(&self, value: &HostValue) -> TclResult {
        self.marshaller.from_host(value)
    }

    /// Registers a host object, returning an opaque handle that scripts can pass around.
    /// The interpreter holds only a weak reference: the object stays owned by the
    /// application.
    pub fn register_handle<T: Any>(&mut self, object: &Rc<T>) -> HostHandle {
        self.marshaller.register(object)
    }

    /// Resolves a handle to the host object it was registered for.  Fails with
    /// `InvalidHandle` if the handle is foreign, unknown, released, or of the wrong type,
    /// or if the object has been dropped.
    pub fn resolve_handle<T: Any>(&self, handle: &HostHandle) -> Result<Rc<T>, Exception> {
        self.marshaller.resolve(handle)
    }

    /// Releases a handle, returning whether it was registered.
    pub fn release_handle(&mut self, handle: &HostHandle) -> bool {
        self.marshaller.release(handle)
    }

    /// The interpreter's marshaller.
    pub fn marshaller(&self) -> &Marshaller {
        &self.marshaller
    }

    //--------------------------------------------------------------------------------------------
    // Execution Frames

    /// The number of active frames above the global frame: script evaluations, command
    /// substitutions, callback invocations, and procedure calls.  Zero when no
    /// evaluation is in progress.
    pub fn frame_depth(&self) -> usize {
        self.frames.depth()
    }

    /// Pushes a frame, failing with `RecursionLimit` if the stack is too deep.
    pub(crate) fn push_frame(&mut self, kind: FrameKind, argv: &[Value]) -> Result<FrameId, Exception> {
        self.frames.push(kind, argv, self.recursion_limit)
    }

    /// Pops a frame pushed by `push_frame`.
    pub(crate) fn pop_frame(&mut self, frame: FrameId) {
        self.frames.pop(frame)
    }

    /// The number of procedure calls in progress.
    pub(crate) fn proc_level(&self) -> usize {
        self.frames.proc_frames().len()
    }

    /// The command and arguments of the procedure call at the given level, counting from 1
    /// for the outermost call.
    pub(crate) fn proc_level_argv(&self, level: usize) -> Option<TclList> {
        let frames = self.frames.proc_frames();
        let id = *frames.get(level.checked_sub(1)?)?;
        Some(self.frames.argv(id).to_vec())
    }

    //--------------------------------------------------------------------------------------------
    // Interpreter Configuration

    /// Gets the interpreter's recursion limit: how deep the stack of nested evaluations may
    /// be.
    ///
    /// A frame is added by each script evaluation, command substitution, callback
    /// invocation, and procedure call.
    ///
    /// # Example
    /// ```
    /// # use tclcore::Interp;
    /// let interp = Interp::new();
    /// assert_eq!(interp.recursion_limit(), 1000);
    /// ```
    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Sets the interpreter's recursion limit: how deep the stack of nested evaluations may
    /// be.  The default is 1000.
    ///
    /// # Example
    /// ```
    /// # use tclcore::Interp;
    /// let mut interp = Interp::new();
    /// interp.set_recursion_limit(100);
    /// assert_eq!(interp.recursion_limit(), 100);
    /// ```
    pub fn set_recursion_limit(&mut self, limit: usize) {
        self.recursion_limit = limit;
    }
}

/// Adds the failing command to the exception's stack trace.
#[allow(unused_mut)]
fn annotate(mut exception: Exception, is_proc: bool, words: &[Value]) -> Exception {
    let name = words[0].as_str();

    cfg_if::cfg_if! {
        if #[cfg(feature = "error-stack-trace")] {
            // A new error, or an error from within a proc.  Errors passing through other
            // commands (e.g., `eval`) were already traced by the command that raised them.
            if exception.is_new_error() {
                exception.add_error_info("    while executing");
            } else if is_proc {
                exception.add_error_info(&format!("    (procedure \"{}\")", name));
                exception.add_error_info("    invoked from within");
            } else {
                return exception.with_command(name);
            }

            exception.add_error_info(&format!("\"{}\"", crate::list::list_to_string(words)));
        } else {
            let _ = is_proc;
        }
    }

    exception.with_command(name)
}

/// How a procedure is defined: as an argument list and a body script.
/// The argument list is a list of Values, and the body is a Value; each will
/// retain its parsed form.
///
/// NOTE: We do not save the procedure's name; the name exists only in the
/// commands table, and can be changed there freely.  The procedure truly doesn't
/// know what its name is except when it is being executed.
pub(crate) struct Procedure {
    /// The procedure's parameter list.  Each item in the list is a name or a
    /// name/default value pair.  (This is verified by the `proc` command.)
    parms: TclList,

    /// The procedure's body string, as a Value.  As such, it retains both its
    /// string value, as needed for introspection, and its parsed Script.
    body: Value,
}

impl Procedure {
    pub fn execute(&self, interp: &mut Interp, argv: &[Value]) -> TclResult {
        // FIRST, push the proc's frame, which has its own variable scope.
        let frame = interp.push_frame(FrameKind::Proc, argv)?;

        // NEXT, bind the arguments and evaluate the body; then pop the frame whatever
        // the outcome.
        let result = self
            .bind_args(interp, argv)
            .and_then(|_| self.body.as_script(interp.recursion_limit()))
            .and_then(|script| interp.eval_script(&script));

        interp.pop_frame(frame);
        result
    }

    // Binds the arguments to the parameters in the current scope.
    fn bind_args(&self, interp: &mut Interp, argv: &[Value]) -> Result<(), Exception> {
        let mut argi = 1; // Skip the proc's name

        for (speci, spec) in self.parms.iter().enumerate() {
            // FIRST, get the parameter as a vector.  It should be a list of
            // one or two elements.
            let vec = spec.as_list()?;

            // NEXT, if this is the args parameter, give the remaining args,
            // if any.  Note that "args" has special meaning only if it's the
            // final arg spec in the list.
            if vec[0].as_str() == "args" && speci == self.parms.len() - 1 {
                interp.set_var("args", Value::from(&argv[argi..]));

                // We've processed all of the args
                argi = argv.len();
                break;
            }

            // NEXT, do we have a matching argument?
            if argi < argv.len() {
                interp.set_var(vec[0].as_str(), argv[argi].clone());
                argi += 1;
                continue;
            }

            // NEXT, do we have a default value?
            if vec.len() == 2 {
                interp.set_var(vec[0].as_str(), vec[1].clone());
            } else {
                // We don't; we're missing a required argument.
                return self.wrong_num_args(&argv[0]);
            }
        }

        // NEXT, do we have any arguments left over?
        if argi != argv.len() {
            return self.wrong_num_args(&argv[0]);
        }

        Ok(())
    }

    // Outputs the wrong # args message for the proc.  The name is passed in
    // because it can be changed via the `rename` command.
    fn wrong_num_args(&self, name: &Value) -> Result<(), Exception> {
        let mut msg = String::new();
        msg.push_str("wrong # args: should be \"");
        msg.push_str(name.as_str());

        for (i, arg) in self.parms.iter().enumerate() {
            msg.push(' ');

            // "args" has special meaning only in the last place.
            if arg.as_str() == "args" && i == self.parms.len() - 1 {
                msg.push_str("?arg ...?");
                break;
            }

            let vec = arg.as_list()?;

            if vec.len() == 1 {
                msg.push_str(vec[0].as_str());
            } else {
                msg.push('?');
                msg.push_str(vec[0].as_str());
                msg.push('?');
            }
        }
        msg.push('\"');

        tcl_err!(msg)
    }
}
