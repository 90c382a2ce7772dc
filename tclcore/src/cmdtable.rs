//! The Command Table
//!
//! Maps command names to their implementations: native builtins, host callbacks, and
//! procedures defined in script code.  The table preserves insertion order, so that
//! `info commands` lists commands in the order they were defined.
//!
//! Entries are reference counted.  The interpreter clones an entry's `Rc` before executing
//! it, so a command may redefine or delete itself while it is running.

use crate::interp::Interp;
use crate::interp::Procedure;
use crate::trampoline;
use crate::trampoline::HostFunction;
use crate::types::*;
use crate::value::Value;
use indexmap::IndexMap;
use std::rc::Rc;

/// A command defined in the interpreter.
pub(crate) enum Command {
    /// A builtin implemented as a Rust `CommandFunc`.
    Builtin(CommandFunc),

    /// A host callback, invoked through the trampoline.
    Callback(Box<dyn HostFunction>),

    /// A procedure defined by the `proc` command.
    Proc(Procedure),
}

impl Command {
    /// Execute the command according to its kind.
    pub fn execute(&self, interp: &mut Interp, argv: &[Value]) -> TclResult {
        match self {
            Command::Builtin(func) => func(interp, argv),
            Command::Callback(func) => trampoline::invoke(interp, func.as_ref(), argv),
            Command::Proc(proc) => proc.execute(interp, argv),
        }
    }

    /// The name of the command's kind, as returned by `Interp::command_type`.
    pub fn cmdtype(&self) -> &'static str {
        match self {
            Command::Builtin(_) => "native",
            Command::Callback(_) => "callback",
            Command::Proc(_) => "proc",
        }
    }

    pub fn as_proc(&self) -> Option<&Procedure> {
        match self {
            Command::Proc(proc) => Some(proc),
            _ => None,
        }
    }

    pub fn is_proc(&self) -> bool {
        matches!(self, Command::Proc(_))
    }
}

#[derive(Default)]
pub(crate) struct CommandTable {
    commands: IndexMap<String, Rc<Command>, TclHasher>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command under the given name, replacing any existing command of that
    /// name.  An empty name is ignored.
    pub fn register(&mut self, name: &str, command: Command) {
        if name.is_empty() {
            tracing::warn!(
                kind = command.cmdtype(),
                "ignoring registration of a command with an empty name"
            );
            return;
        }

        if let Some(old) = self.commands.get(name) {
            tracing::warn!(
                command = name,
                old = old.cmdtype(),
                new = command.cmdtype(),
                "redefining existing command"
            );
        }

        self.commands.insert(name.to_string(), Rc::new(command));
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<Command>> {
        self.commands.get(name).cloned()
    }

    /// Removes the named command, returning whether it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.commands.shift_remove(name).is_some()
    }

    /// Renames a command.  Renaming to the empty string deletes the command.
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), Exception> {
        let Some(cmd) = self.commands.get(old_name).cloned() else {
            let action = if new_name.is_empty() { "delete" } else { "rename" };
            return tcl_err!("can't {} \"{}\": command doesn't exist", action, old_name);
        };

        if new_name.is_empty() {
            self.commands.shift_remove(old_name);
            return Ok(());
        }

        if self.commands.contains_key(new_name) {
            return tcl_err!("can't rename to \"{}\": command already exists", new_name);
        }

        self.commands.shift_remove(old_name);
        self.commands.insert(new_name.to_string(), cmd);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> TclList {
        self.commands.keys().map(Value::from).collect()
    }

    pub fn proc_names(&self) -> TclList {
        self.commands
            .iter()
            .filter(|(_, cmd)| cmd.is_proc())
            .map(|(name, _)| Value::from(name))
            .collect()
    }

    pub fn command_type(&self, name: &str) -> Option<&'static str> {
        self.commands.get(name).map(|cmd| cmd.cmdtype())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::HostValue;
    use crate::trampoline::HostError;

    fn cmd_one(_: &mut Interp, _: &[Value]) -> TclResult {
        tcl_ok!("one")
    }

    fn cmd_two(_: &mut Interp, _: &[Value]) -> TclResult {
        tcl_ok!("two")
    }

    #[test]
    fn test_register_lookup() {
        let mut table = CommandTable::new();
        assert!(table.lookup("one").is_none());

        table.register("one", Command::Builtin(cmd_one));
        assert!(table.contains("one"));
        assert_eq!(table.command_type("one"), Some("native"));

        let mut interp = Interp::empty();
        let cmd = table.lookup("one").unwrap();
        assert_eq!(
            cmd.execute(&mut interp, &[Value::from("one")]),
            Ok(Value::from("one"))
        );
    }

    #[test]
    fn test_replace() {
        let mut table = CommandTable::new();
        table.register("a", Command::Builtin(cmd_one));
        table.register("b", Command::Builtin(cmd_one));
        table.register("a", Command::Builtin(cmd_two));

        // Replacement keeps the original position.
        assert_eq!(table.names(), vec![Value::from("a"), Value::from("b")]);

        let mut interp = Interp::empty();
        let cmd = table.lookup("a").unwrap();
        assert_eq!(cmd.execute(&mut interp, &[Value::from("a")]), Ok(Value::from("two")));

        table.register(
            "a",
            Command::Callback(Box::new(
                |_: &mut Interp, _: &[HostValue]| -> Result<HostValue, HostError> {
                    Ok(HostValue::from("three"))
                },
            )),
        );
        assert_eq!(table.command_type("a"), Some("callback"));
    }

    #[test]
    fn test_empty_name_ignored() {
        let mut table = CommandTable::new();
        table.register("", Command::Builtin(cmd_one));
        assert!(table.names().is_empty());
    }

    #[test]
    fn test_unregister() {
        let mut table = CommandTable::new();
        table.register("one", Command::Builtin(cmd_one));
        assert!(table.unregister("one"));
        assert!(!table.unregister("one"));
        assert!(!table.contains("one"));
    }

    #[test]
    fn test_rename() {
        let mut table = CommandTable::new();
        table.register("one", Command::Builtin(cmd_one));
        table.register("two", Command::Builtin(cmd_two));

        table.rename("one", "uno").unwrap();
        assert!(!table.contains("one"));
        assert!(table.contains("uno"));

        assert_eq!(
            table.rename("uno", "two"),
            Err(Exception::tcl_err(Value::from(
                "can't rename to \"two\": command already exists"
            )))
        );
        assert_eq!(
            table.rename("nope", "x"),
            Err(Exception::tcl_err(Value::from(
                "can't rename \"nope\": command doesn't exist"
            )))
        );

        table.rename("uno", "").unwrap();
        assert_eq!(table.names(), vec![Value::from("two")]);
    }
}
