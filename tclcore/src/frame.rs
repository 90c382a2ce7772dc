//! Execution Frames
//!
//! Every nested evaluation runs in its own [`Frame`]: a top-level script, a command
//! substitution, a host callback re-entering the interpreter, a procedure call.  Frames live
//! in an arena (a `Vec`) and refer to their parent by index, so unwinding is a matter of
//! truncating the arena back to the frame being popped.
//!
//! Frame 0 is the global frame; it is never popped.  A procedure frame owns a fresh variable
//! scope; every other frame shares the variable scope of its parent, so that a script
//! evaluated by a callback sees the variables of the code that invoked the callback.

use crate::types::*;
use crate::value::Value;
use fnv::FnvHashMap;

/// An index into the frame arena.
pub(crate) type FrameId = usize;

/// Why a frame was pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Global,
    Script,
    Callback,
    Proc,
}

/// A variable binding: a value, or a link to the global variable of the same name.
#[derive(Debug, Clone)]
enum Var {
    Value(Value),
    Global,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,

    // The frame that was current when this one was pushed.
    parent: Option<FrameId>,

    // The frame that owns the variable bindings visible in this frame.
    scope: FrameId,

    // The variable bindings; empty unless this frame owns its scope.
    vars: FnvHashMap<String, Var>,

    // The command and arguments this frame is executing.
    argv: TclList,
}

/// The stack of execution frames.
#[derive(Debug)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
    current: FrameId,
}

impl FrameStack {
    /// Creates a stack containing only the global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Global,
                parent: None,
                scope: 0,
                vars: FnvHashMap::default(),
                argv: Vec::new(),
            }],
            current: 0,
        }
    }

    /// The number of frames above the global frame.
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Pushes a new frame, failing if that would make the stack deeper than `limit`.
    pub fn push(&mut self, kind: FrameKind, argv: &[Value], limit: usize) -> Result<FrameId, Exception> {
        if self.depth() >= limit {
            tracing::debug!(depth = self.depth(), limit, "recursion limit reached");
            return tcl_throw!(
                ErrorKind::RecursionLimit,
                "too many nested evaluations (infinite loop?)"
            );
        }

        let id = self.frames.len();
        let scope = if kind == FrameKind::Proc {
            id
        } else {
            self.frames[self.current].scope
        };

        self.frames.push(Frame {
            kind,
            parent: Some(self.current),
            scope,
            vars: FnvHashMap::default(),
            argv: argv.to_vec(),
        });
        self.current = id;
        Ok(id)
    }

    /// Pops the given frame, which must be the current one, and any frames above it.
    pub fn pop(&mut self, id: FrameId) {
        assert!(id != 0, "attempted to pop the global frame");
        debug_assert_eq!(id, self.current, "frames popped out of order");

        self.current = self.frames[id].parent.unwrap_or(0);
        self.frames.truncate(id);
    }

    /// The kind of the current frame.
    #[cfg(test)]
    pub fn current_kind(&self) -> FrameKind {
        self.frames[self.current].kind
    }

    /// The procedure frames on the stack, outermost first.
    pub fn proc_frames(&self) -> Vec<FrameId> {
        let mut ids = Vec::new();
        let mut next = Some(self.current);

        while let Some(id) = next {
            if self.frames[id].kind == FrameKind::Proc {
                ids.push(id);
            }
            next = self.frames[id].parent;
        }

        ids.reverse();
        ids
    }

    /// The command and arguments of the given frame.
    pub fn argv(&self, id: FrameId) -> &[Value] {
        &self.frames[id].argv
    }

    // The frame whose bindings hold the named variable.
    fn resolve(&self, name: &str) -> FrameId {
        let scope = self.frames[self.current].scope;
        match self.frames[scope].vars.get(name) {
            Some(Var::Global) => 0,
            _ => scope,
        }
    }

    /// Gets the value of the named variable.
    pub fn get(&self, name: &str) -> TclResult {
        let scope = self.resolve(name);
        match self.frames[scope].vars.get(name) {
            Some(Var::Value(value)) => Ok(value.clone()),
            _ => tcl_err!("can't read \"{}\": no such variable", name),
        }
    }

    /// Sets the value of the named variable, creating it if need be.
    pub fn set(&mut self, name: &str, value: Value) {
        let scope = self.resolve(name);
        self.frames[scope]
            .vars
            .insert(name.to_string(), Var::Value(value));
    }

    /// Whether the named variable exists and has a value.
    pub fn exists(&self, name: &str) -> bool {
        let scope = self.resolve(name);
        matches!(self.frames[scope].vars.get(name), Some(Var::Value(_)))
    }

    /// Unsets the named variable.  Unsetting a name linked to a global unsets the global.
    pub fn unset(&mut self, name: &str) {
        let scope = self.resolve(name);
        self.frames[scope].vars.remove(name);
    }

    /// Links the named variable in the current scope to the global of the same name.
    /// Does nothing at global scope.
    pub fn link_global(&mut self, name: &str) -> Result<(), Exception> {
        let scope = self.frames[self.current].scope;
        if scope == 0 {
            return Ok(());
        }

        if let Some(Var::Value(_)) = self.frames[scope].vars.get(name) {
            return tcl_err!("variable \"{}\" already exists", name);
        }

        self.frames[scope].vars.insert(name.to_string(), Var::Global);
        Ok(())
    }

    /// Sets a variable in the global scope.
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.frames[0]
            .vars
            .insert(name.to_string(), Var::Value(value));
    }

    /// Gets a variable from the global scope, if it is set.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        match self.frames[0].vars.get(name) {
            Some(Var::Value(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// The names of the variables visible in the current scope.
    pub fn var_names(&self) -> TclList {
        let scope = self.frames[self.current].scope;
        let mut names: Vec<&String> = self.frames[scope]
            .vars
            .iter()
            .filter(|(name, var)| match var {
                Var::Value(_) => true,
                Var::Global => matches!(self.frames[0].vars.get(*name), Some(Var::Value(_))),
            })
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names.into_iter().map(Value::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stack = FrameStack::new();
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.current_kind(), FrameKind::Global);
    }

    #[test]
    fn test_push_pop() {
        let mut stack = FrameStack::new();
        let a = stack.push(FrameKind::Script, &[], 10).unwrap();
        let b = stack.push(FrameKind::Callback, &[Value::from("cb")], 10).unwrap();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.current_kind(), FrameKind::Callback);
        assert_eq!(stack.argv(b), &[Value::from("cb")]);

        stack.pop(b);
        assert_eq!(stack.current_kind(), FrameKind::Script);
        stack.pop(a);
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_limit() {
        let mut stack = FrameStack::new();
        stack.push(FrameKind::Script, &[], 2).unwrap();
        stack.push(FrameKind::Script, &[], 2).unwrap();
        let err = stack.push(FrameKind::Script, &[], 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecursionLimit);
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_shared_scope() {
        let mut stack = FrameStack::new();
        stack.set("a", Value::from("1"));

        let id = stack.push(FrameKind::Callback, &[], 10).unwrap();
        assert_eq!(stack.get("a"), Ok(Value::from("1")));
        stack.set("b", Value::from("2"));
        stack.pop(id);

        assert_eq!(stack.get("b"), Ok(Value::from("2")));
    }

    #[test]
    fn test_proc_scope() {
        let mut stack = FrameStack::new();
        stack.set("a", Value::from("1"));

        let id = stack.push(FrameKind::Proc, &[], 10).unwrap();
        assert!(!stack.exists("a"));
        assert_eq!(
            stack.get("a"),
            Err(Exception::tcl_err(Value::from(
                "can't read \"a\": no such variable"
            )))
        );
        stack.set("local", Value::from("x"));

        stack.link_global("a").unwrap();
        assert_eq!(stack.get("a"), Ok(Value::from("1")));
        stack.set("a", Value::from("3"));
        assert_eq!(stack.var_names(), vec![Value::from("a"), Value::from("local")]);

        stack.pop(id);
        assert_eq!(stack.get("a"), Ok(Value::from("3")));
        assert!(!stack.exists("local"));
    }

    #[test]
    fn test_link_global_conflict() {
        let mut stack = FrameStack::new();
        stack.push(FrameKind::Proc, &[], 10).unwrap();
        stack.set("x", Value::from("1"));
        assert!(stack.link_global("x").is_err());
    }

    #[test]
    fn test_proc_frames() {
        let mut stack = FrameStack::new();
        let p1 = stack.push(FrameKind::Proc, &[Value::from("p1")], 10).unwrap();
        stack.push(FrameKind::Script, &[], 10).unwrap();
        let p2 = stack.push(FrameKind::Proc, &[Value::from("p2")], 10).unwrap();
        assert_eq!(stack.proc_frames(), vec![p1, p2]);
    }

    #[test]
    fn test_set_global() {
        let mut stack = FrameStack::new();
        stack.push(FrameKind::Proc, &[], 10).unwrap();
        stack.set_global("errorInfo", Value::from("trace"));
        assert!(!stack.exists("errorInfo"));
        assert_eq!(stack.get_global("errorInfo"), Some(Value::from("trace")));
        assert_eq!(stack.get_global("errorCode"), None);
        stack.link_global("errorInfo").unwrap();
        assert_eq!(stack.get("errorInfo"), Ok(Value::from("trace")));
    }
}
