//! Builtin Command Definitions
//!
//! This module defines the standard builtin commands installed by `Interp::new()`.  Each is
//! a [`CommandFunc`]; see [`check_args`] for the standard argument checking.
//!
//! [`CommandFunc`]: ../types/type.CommandFunc.html
//! [`check_args`]: ../fn.check_args.html

use crate::check_args;
use crate::interp::Interp;
use crate::types::*;
use crate::value::Value;

/// The builtins removed by `Interp::make_safe`.
pub(crate) const UNSAFE_COMMANDS: [&str; 2] = ["puts", "source"];

/// # append *varName* ?*value* ...?
///
/// Appends one or more strings to a variable, creating it if need be.
pub fn cmd_append(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 0, "varName ?value value ...?")?;

    let var_name = argv[1].as_str();
    let mut new_string = match interp.var(var_name) {
        Ok(value) => value.as_str().to_string(),
        Err(_) => String::new(),
    };

    for item in &argv[2..] {
        new_string.push_str(item.as_str());
    }

    interp.set_var_return(var_name, new_string.into())
}

/// # catch *script* ?*resultVarName*?
///
/// Executes a script, returning 1 if it threw an error and 0 otherwise.  If
/// *resultVarName* is given, the script's result or error message is saved in it.
pub fn cmd_catch(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 3, "script ?resultVarName?")?;

    let (code, value): (TclInt, Value) = match interp.eval_value(&argv[1]) {
        Ok(value) => (0, value),
        Err(exception) => {
            interp.set_global_error_data(&exception);
            (1, exception.value())
        }
    };

    if argv.len() == 3 {
        interp.set_var(argv[2].as_str(), value);
    }

    tcl_ok!(code)
}

/// # concat ?*arg* ...?
///
/// Joins the arguments with spaces, after trimming surrounding whitespace from each.
pub fn cmd_concat(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    tcl_ok!(concat(&argv[1..]))
}

fn concat(args: &[Value]) -> String {
    let parts: Vec<&str> = args
        .iter()
        .map(|arg| arg.as_str().trim())
        .filter(|arg| !arg.is_empty())
        .collect();
    parts.join(" ")
}

/// # error *message*
///
/// Returns an error with the given message.
pub fn cmd_error(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 2, "message")?;

    Err(Exception::tcl_err(argv[1].clone()))
}

/// # eval *arg* ?*arg* ...?
///
/// Concatenates the arguments and evaluates the result as a script.
pub fn cmd_eval(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 0, "arg ?arg ...?")?;

    if argv.len() == 2 {
        interp.eval_value(&argv[1])
    } else {
        interp.eval_value(&Value::from(concat(&argv[1..])))
    }
}

/// # expr *arg* ?*arg* ...?
///
/// Concatenates the arguments and evaluates the result as an expression.
pub fn cmd_expr(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 0, "arg ?arg ...?")?;

    if argv.len() == 2 {
        interp.expr(&argv[1])
    } else {
        interp.expr(&Value::from(concat(&argv[1..])))
    }
}

/// # global ?*varName* ...?
///
/// Within a procedure, links the named variables to the global variables of the same names.
/// Does nothing at global scope.
pub fn cmd_global(interp: &mut Interp, argv: &[Value]) -> TclResult {
    for name in &argv[1..] {
        interp.link_global(name.as_str())?;
    }

    tcl_ok!()
}

/// # incr *varName* ?*increment*?
///
/// Increments an integer variable, creating it with the value 0 first if need be.
pub fn cmd_incr(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 3, "varName ?increment?")?;

    let increment: TclInt = if argv.len() == 3 { argv[2].as_int()? } else { 1 };

    let var_name = argv[1].as_str();
    let current = if interp.var_exists(var_name) {
        interp.var(var_name)?.as_int()?
    } else {
        0
    };

    match current.checked_add(increment) {
        Some(new_value) => interp.set_var_return(var_name, new_value.into()),
        None => tcl_throw!(ErrorKind::ArithmeticError, "integer overflow"),
    }
}

const INFO_SUBCOMMANDS: [Subcommand; 6] = [
    Subcommand("args", cmd_info_args),
    Subcommand("body", cmd_info_body),
    Subcommand("commands", cmd_info_commands),
    Subcommand("exists", cmd_info_exists),
    Subcommand("level", cmd_info_level),
    Subcommand("procs", cmd_info_procs),
];

/// # info *subcommand* ?*arg*...?
pub fn cmd_info(interp: &mut Interp, argv: &[Value]) -> TclResult {
    interp.call_subcommand(argv, 1, &INFO_SUBCOMMANDS)
}

/// # info args *procname*
pub fn cmd_info_args(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 3, "procname")?;
    interp.proc_args(argv[2].as_str())
}

/// # info body *procname*
pub fn cmd_info_body(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 3, "procname")?;
    interp.proc_body(argv[2].as_str())
}

/// # info commands
pub fn cmd_info_commands(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 2, 2, "")?;
    tcl_ok!(interp.command_names())
}

/// # info exists *varName*
pub fn cmd_info_exists(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 3, "varName")?;
    tcl_ok!(interp.var_exists(argv[2].as_str()))
}

/// # info level ?*number*?
///
/// With no argument, returns the number of procedure calls in progress.  Given a positive
/// number, returns the command and arguments of the procedure call at that level; given
/// zero or a negative number, counts back from the current level.
pub fn cmd_info_level(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 2, 3, "?number?")?;

    let current = interp.proc_level() as TclInt;

    if argv.len() == 2 {
        return tcl_ok!(current);
    }

    let number = argv[2].as_int()?;
    let level = if number > 0 { number } else { current + number };

    match usize::try_from(level)
        .ok()
        .and_then(|level| interp.proc_level_argv(level))
    {
        Some(words) => tcl_ok!(words),
        None => tcl_err!("bad level \"{}\"", argv[2]),
    }
}

/// # info procs
pub fn cmd_info_procs(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 2, 2, "")?;
    tcl_ok!(interp.proc_names())
}

/// # join *list* ?*joinString*?
///
/// Joins the elements of a list with the join string, which defaults to a single space.
pub fn cmd_join(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 3, "list ?joinString?")?;

    let list = argv[1].as_list()?;
    let join_string = if argv.len() == 3 { argv[2].as_str() } else { " " };

    let elements: Vec<&str> = list.iter().map(|v| v.as_str()).collect();
    tcl_ok!(elements.join(join_string))
}

/// # lappend *varName* ?*value* ...?
///
/// Appends values to a list variable, creating it if need be.
pub fn cmd_lappend(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 0, "varName ?value ...?")?;

    let var_name = argv[1].as_str();
    let mut list: TclList = if interp.var_exists(var_name) {
        interp.var(var_name)?.as_list()?.to_vec()
    } else {
        Vec::new()
    };

    list.extend_from_slice(&argv[2..]);
    interp.set_var_return(var_name, list.into())
}

/// # lindex *list* ?*index* ...?
///
/// Returns an element of a list; with several indices, of nested lists.  An index is an
/// integer, `end`, or `end-`*n*.  An index out of range yields the empty string.
pub fn cmd_lindex(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 0, "list ?index ...?")?;

    let mut value = argv[1].clone();

    for index in &argv[2..] {
        let list = value.as_list()?;
        value = match parse_index(index, list.len())? {
            Some(i) => list[i].clone(),
            None => return tcl_ok!(),
        };
    }

    Ok(value)
}

// Resolves a list index against a list of the given length.
fn parse_index(index: &Value, len: usize) -> Result<Option<usize>, Exception> {
    let text = index.as_str().trim();
    let len = len as TclInt;

    let position = if let Some(offset) = text.strip_prefix("end") {
        let back = if offset.is_empty() {
            0
        } else if let Some(back) = offset.strip_prefix('-') {
            Value::get_int(back).ok().filter(|b| *b >= 0).ok_or_else(|| bad_index(text))?
        } else {
            return Err(bad_index(text));
        };
        len - 1 - back
    } else {
        Value::get_int(text).map_err(|_| bad_index(text))?
    };

    if position >= 0 && position < len {
        Ok(Some(position as usize))
    } else {
        Ok(None)
    }
}

fn bad_index(text: &str) -> Exception {
    Exception::tcl_err(Value::from(format!(
        "bad index \"{}\": must be integer?[+-]integer? or end?[+-]integer?",
        text
    )))
}

/// # list ?*arg* ...?
///
/// Returns its arguments as a list.
pub fn cmd_list(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    tcl_ok!(&argv[1..])
}

/// # llength *list*
pub fn cmd_llength(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 2, "list")?;

    tcl_ok!(argv[1].as_list()?.len() as TclInt)
}

/// # proc *name* *args* *body*
///
/// Defines a procedure.  Each element of *args* is a parameter name, or a list of a
/// parameter name and its default value; a final parameter called `args` collects any
/// remaining arguments.
pub fn cmd_proc(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 4, 4, "name args body")?;

    let name = argv[1].as_str();
    let parms = argv[2].as_list()?;

    for parm in parms.iter() {
        let fields = parm.as_list()?;

        if fields.is_empty() || fields[0].is_empty() {
            return tcl_err!("argument with no name");
        } else if fields.len() > 2 {
            return tcl_err!("too many fields in argument specifier \"{}\"", parm);
        }
    }

    interp.add_proc(name, &parms, &argv[3]);

    tcl_ok!()
}

/// # rename *oldName* *newName*
///
/// Renames a command; if *newName* is the empty string, deletes it.
pub fn cmd_rename(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 3, 3, "oldName newName")?;

    interp.rename_command(argv[1].as_str(), argv[2].as_str())?;

    tcl_ok!()
}

/// # set *varName* ?*newValue*?
///
/// Sets or gets a variable.
pub fn cmd_set(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 3, "varName ?newValue?")?;

    if argv.len() == 3 {
        interp.set_var_return(argv[1].as_str(), argv[2].clone())
    } else {
        interp.var(argv[1].as_str())
    }
}

const STRING_SUBCOMMANDS: [Subcommand; 6] = [
    Subcommand("compare", cmd_string_compare),
    Subcommand("equal", cmd_string_equal),
    Subcommand("length", cmd_string_length),
    Subcommand("tolower", cmd_string_tolower),
    Subcommand("toupper", cmd_string_toupper),
    Subcommand("trim", cmd_string_trim),
];

/// # string *subcommand* ?*arg*...?
pub fn cmd_string(interp: &mut Interp, argv: &[Value]) -> TclResult {
    interp.call_subcommand(argv, 1, &STRING_SUBCOMMANDS)
}

// Parses the ?-nocase? string1 string2 arguments shared by compare and equal.
fn string_pair(argv: &[Value]) -> Result<(String, String), Exception> {
    check_args(2, argv, 4, 5, "?-nocase? string1 string2")?;

    let (nocase, first) = if argv.len() == 5 {
        if argv[2].as_str() != "-nocase" {
            return tcl_err!("bad option \"{}\": must be -nocase", argv[2]);
        }
        (true, 3)
    } else {
        (false, 2)
    };

    let fold = |value: &Value| {
        if nocase {
            value.as_str().to_lowercase()
        } else {
            value.as_str().to_string()
        }
    };

    Ok((fold(&argv[first]), fold(&argv[first + 1])))
}

/// # string compare ?-nocase? *string1* *string2*
pub fn cmd_string_compare(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    let (a, b) = string_pair(argv)?;
    let order: TclInt = match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    };
    tcl_ok!(order)
}

/// # string equal ?-nocase? *string1* *string2*
pub fn cmd_string_equal(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    let (a, b) = string_pair(argv)?;
    tcl_ok!(a == b)
}

/// # string length *string*
pub fn cmd_string_length(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 3, "string")?;
    tcl_ok!(argv[2].as_str().chars().count() as TclInt)
}

/// # string tolower *string*
pub fn cmd_string_tolower(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 3, "string")?;
    tcl_ok!(argv[2].as_str().to_lowercase())
}

/// # string toupper *string*
pub fn cmd_string_toupper(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 3, "string")?;
    tcl_ok!(argv[2].as_str().to_uppercase())
}

/// # string trim *string* ?*chars*?
pub fn cmd_string_trim(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(2, argv, 3, 4, "string ?chars?")?;

    let s = argv[2].as_str();
    if argv.len() == 4 {
        let chars = argv[3].as_str();
        tcl_ok!(s.trim_matches(|c: char| chars.contains(c)))
    } else {
        tcl_ok!(s.trim())
    }
}

/// # unset ?-nocomplain? ?*varName* ...?
///
/// Unsets variables.  It is an error to unset a variable that doesn't exist, unless
/// `-nocomplain` is given.
pub fn cmd_unset(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 1, 0, "?-nocomplain? ?varName ...?")?;

    let mut names = &argv[1..];
    let mut complain = true;

    if let Some(first) = names.first() {
        if first.as_str() == "-nocomplain" {
            complain = false;
            names = &names[1..];
        }
    }

    for name in names {
        let name = name.as_str();
        if complain && !interp.var_exists(name) {
            return tcl_err!("can't unset \"{}\": no such variable", name);
        }
        interp.unset_var(name);
    }

    tcl_ok!()
}

/// # puts ?-nonewline? ?*channelId*? *string*
///
/// Writes the string to standard output, or to `stderr`.
#[cfg(feature = "io-commands")]
pub fn cmd_puts(_interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 4, "?-nonewline? ?channelId? string")?;

    let mut args = &argv[1..];
    let newline = if args.len() > 1 && args[0].as_str() == "-nonewline" {
        args = &args[1..];
        false
    } else {
        true
    };

    let (to_stderr, text) = match args {
        [text] => (false, text),
        [channel, text] => match channel.as_str() {
            "stdout" => (false, text),
            "stderr" => (true, text),
            other => return tcl_err!("can not find channel named \"{}\"", other),
        },
        _ => return tcl_err!("wrong # args: should be \"puts ?-nonewline? ?channelId? string\""),
    };

    match (to_stderr, newline) {
        (false, true) => println!("{}", text),
        (false, false) => print!("{}", text),
        (true, true) => eprintln!("{}", text),
        (true, false) => eprint!("{}", text),
    }

    tcl_ok!()
}

/// # source *fileName*
///
/// Reads the file and evaluates its contents as a script.
#[cfg(feature = "io-commands")]
pub fn cmd_source(interp: &mut Interp, argv: &[Value]) -> TclResult {
    check_args(1, argv, 2, 2, "fileName")?;

    let filename = argv[1].as_str();

    match std::fs::read_to_string(filename) {
        Ok(script) => interp.eval_value(&Value::from(script)),
        Err(e) => tcl_err!("couldn't read file \"{}\": {}", filename, e),
    }
}
