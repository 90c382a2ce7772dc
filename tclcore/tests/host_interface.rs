//! Tests of the host-facing interface: evaluation, callbacks, direct calls, marshalling,
//! and handles.

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use tclcore::*;

fn int_list(items: &[i64]) -> HostValue {
    HostValue::List(items.iter().copied().map(HostValue::Int).collect())
}

#[test]
fn expr_returns_typed_integer() {
    let mut interp = Interp::new();
    let value = interp.eval("expr 7*6").unwrap();

    assert_eq!(value.kind(), ValueKind::Integer);
    assert_eq!(value.as_int(), Ok(42));
    assert_eq!(interp.to_host(&value), Ok(HostValue::Int(42)));
}

#[test]
fn callback_receives_arguments_and_supplies_result() {
    let mut interp = Interp::new();
    let seen: Rc<RefCell<Vec<HostValue>>> = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    interp.proc("cb", move |_: &mut Interp, args: &[HostValue]| {
        log.borrow_mut().extend_from_slice(args);
        Ok(HostValue::from("called"))
    });

    let result = interp.eval("cb one two").unwrap();
    assert_eq!(result.as_str(), "called");
    assert_eq!(
        *seen.borrow(),
        vec![HostValue::from("one"), HostValue::from("two")]
    );
}

#[test]
fn callback_arguments_keep_their_kinds() {
    let mut interp = Interp::new();
    let seen: Rc<RefCell<Vec<HostValue>>> = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&seen);
    interp.proc("cb", move |_: &mut Interp, args: &[HostValue]| {
        log.borrow_mut().extend_from_slice(args);
        Ok(HostValue::List(Vec::new()))
    });

    interp.eval("cb [expr {2 + 3}] [expr {1 / 4}] [list a b] text").unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            HostValue::Int(5),
            HostValue::Float(0.25),
            HostValue::List(vec![HostValue::from("a"), HostValue::from("b")]),
            HostValue::from("text"),
        ]
    );
}

#[test]
fn call_passes_host_array_as_one_list() {
    let mut interp = Interp::new();

    let result = interp.call("llength", &[int_list(&[1, 2, 3, 4, 5])]).unwrap();
    assert_eq!(result, HostValue::Int(5));

    let empty = interp.call("llength", &[HostValue::List(Vec::new())]).unwrap();
    assert_eq!(empty, HostValue::Int(0));
}

#[test]
fn call_reaches_callbacks_and_procs() {
    let mut interp = Interp::new();
    interp.proc("sum", |_: &mut Interp, args: &[HostValue]| {
        let total: i64 = args
            .iter()
            .flat_map(|arg| arg.as_list().unwrap_or_default())
            .filter_map(|item| item.as_int())
            .sum();
        Ok(HostValue::Int(total))
    });
    interp.eval("proc twice {x} {expr {$x * 2}}").unwrap();

    assert_eq!(
        interp.call("sum", &[int_list(&[1, 2, 3])]),
        Ok(HostValue::Int(6))
    );
    assert_eq!(
        interp.call("twice", &[HostValue::Float(1.5)]),
        Ok(HostValue::Float(3.0))
    );
}

#[test]
fn call_unknown_command() {
    let mut interp = Interp::new();
    let err = interp.call("nosuch", &[]).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownCommand);
    assert_eq!(err.value().as_str(), "invalid command name \"nosuch\"");
}

#[test]
fn reregistering_replaces_command() {
    let mut interp = Interp::new();
    interp.proc("greet", |_: &mut Interp, _: &[HostValue]| Ok(HostValue::from("hello")));
    assert_eq!(interp.eval("greet").unwrap().as_str(), "hello");

    interp.proc("greet", |_: &mut Interp, _: &[HostValue]| Ok(HostValue::from("goodbye")));
    assert_eq!(interp.eval("greet").unwrap().as_str(), "goodbye");

    interp.eval("proc greet {} {return-value}").unwrap();
    assert_eq!(interp.command_type("greet"), Ok(Value::from("proc")));

    let count = interp
        .command_names()
        .iter()
        .filter(|name| name.as_str() == "greet")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn syntax_error_leaves_interp_usable() {
    let mut interp = Interp::new();
    interp.set_var("a", Value::from("kept"));
    let commands_before = interp.command_names();

    let err = interp.eval("foo {bar").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxError);

    assert_eq!(interp.frame_depth(), 0);
    assert_eq!(interp.command_names(), commands_before);
    assert_eq!(interp.eval("set a"), Ok(Value::from("kept")));
    assert_eq!(interp.eval("llength {x y}"), Ok(Value::from(2)));
}

#[test]
fn failing_callback_is_callback_error() {
    let mut interp = Interp::new();
    interp.proc("fail", |_: &mut Interp, _: &[HostValue]| {
        Err("the host said no".into())
    });
    let commands_before = interp.command_names();

    let err = interp.eval("set x [fail 1 2]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CallbackError);
    assert_eq!(err.value().as_str(), "the host said no");
    assert_eq!(err.command(), Some("fail"));

    assert_eq!(interp.frame_depth(), 0);
    assert_eq!(interp.command_names(), commands_before);
    assert!(!interp.var_exists("x"));
}

#[test]
fn nested_errors_become_the_cause_of_callback_error() {
    let mut interp = Interp::new();
    interp.proc("compute", |interp: &mut Interp, args: &[HostValue]| {
        let script = args[0].as_str().unwrap_or_default().to_string();
        let value = interp.eval(&script)?;
        Ok(interp.to_host(&value)?)
    });

    assert_eq!(interp.eval("compute {expr {2 + 2}}"), Ok(Value::from(4)));

    let err = interp.eval("compute {expr {1 / 0}}").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CallbackError);
    assert_eq!(err.value().as_str(), "divide by zero");
    assert_eq!(err.command(), Some("compute"));
    assert_eq!(err.cause().map(|e| e.kind()), Some(ErrorKind::ArithmeticError));
    assert!(err.error_info().as_str().contains("\"expr {1 / 0}\""));
    assert_eq!(interp.frame_depth(), 0);
}

#[test]
fn catch_recovers_from_callback_error() {
    let mut interp = Interp::new();
    interp.proc("fail", |_: &mut Interp, _: &[HostValue]| Err("broken".into()));

    assert_eq!(interp.eval("catch {fail} msg"), Ok(Value::from(1)));
    assert_eq!(interp.var("msg"), Ok(Value::from("broken")));
    assert_eq!(interp.var("errorCode"), Ok(Value::from("HOST CALLBACK")));
}

#[cfg(feature = "error-stack-trace")]
#[test]
fn top_level_error_saves_stack_trace() {
    let mut interp = Interp::new();
    interp.eval("proc inner {} {error deep}").unwrap();
    interp.eval("proc outer {} {inner}").unwrap();

    assert!(interp.eval("outer").is_err());

    let trace = interp.error_info();
    let lines: Vec<&str> = trace.as_str().lines().collect();
    assert_eq!(lines[0], "deep");
    assert_eq!(lines[1], "    while executing");
    assert_eq!(lines[2], "\"error deep\"");
    assert!(lines.contains(&"    (procedure \"inner\")"));
    assert!(lines.contains(&"    (procedure \"outer\")"));
    assert_eq!(interp.var("errorInfo"), Ok(trace.clone()));
}

#[test]
fn values_round_trip_through_host() {
    let interp = Interp::new();
    let values = vec![
        Value::from("plain text"),
        Value::from(""),
        Value::from(-17),
        Value::from(2.5),
        Value::from(vec![Value::from("a"), Value::from(vec![Value::from("b c")])]),
        Value::from(TclList::new()),
    ];

    for value in values {
        let host = interp.to_host(&value).unwrap();
        let back = interp.from_host(&host).unwrap();
        assert_eq!(back, value);
        assert_eq!(back.kind(), value.kind());
    }
}

#[test]
fn host_bool_and_map_convert_one_way() {
    let interp = Interp::new();

    let flag = interp.from_host(&HostValue::Bool(true)).unwrap();
    assert_eq!(flag.kind(), ValueKind::Integer);
    assert_eq!(interp.to_host(&flag), Ok(HostValue::Int(1)));

    let mut map = indexmap::IndexMap::new();
    map.insert("name".to_string(), HostValue::from("Ada Lovelace"));
    map.insert("year".to_string(), HostValue::Int(1815));
    let dict = interp.from_host(&HostValue::Map(map)).unwrap();
    assert_eq!(dict.as_str(), "name {Ada Lovelace} year 1815");
}

#[derive(Debug)]
struct Counter {
    hits: RefCell<i64>,
}

#[test]
fn handles_pass_through_scripts() {
    let mut interp = Interp::new();
    let counter = Rc::new(Counter { hits: RefCell::new(0) });
    let handle = interp.register_handle(&counter);

    interp.proc("hit", |interp: &mut Interp, args: &[HostValue]| {
        let HostValue::Handle(handle) = &args[0] else {
            return Err("expected a counter handle".into());
        };
        let counter = interp.resolve_handle::<Counter>(handle)?;
        *counter.hits.borrow_mut() += 1;
        let hits = *counter.hits.borrow();
        Ok(HostValue::Int(hits))
    });

    interp.set_var("c", Value::from(handle));
    assert_eq!(interp.eval("hit $c; hit $c"), Ok(Value::from(2)));
    assert_eq!(*counter.hits.borrow(), 2);

    let stored = interp.var("c").unwrap();
    assert_eq!(stored.as_handle(), Ok(handle));
    assert_eq!(interp.to_host(&stored), Ok(HostValue::Handle(handle)));

    assert!(interp.release_handle(&handle));
    let err = interp.eval("hit $c").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHandle);
}

#[test]
fn handles_are_not_shared_between_interpreters() {
    let mut first = Interp::new();
    let second = Interp::new();
    let counter = Rc::new(Counter { hits: RefCell::new(0) });
    let handle = first.register_handle(&counter);

    let err = second.resolve_handle::<Counter>(&handle).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHandle);

    let err = second.from_host(&HostValue::Handle(handle)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHandle);
}

#[test]
fn promotion_rules() {
    let mut interp = Interp::new();
    let cases = [
        ("2 + 3", "5", ValueKind::Integer),
        ("2 * 3.0", "6.0", ValueKind::Float),
        ("6 / 3", "2", ValueKind::Integer),
        ("7 / 2", "3.5", ValueKind::Float),
        ("-7 % 3", "2", ValueKind::Integer),
        ("1.5 - 1", "0.5", ValueKind::Float),
        ("3 > 2", "1", ValueKind::Integer),
        ("{abc} < {abd}", "1", ValueKind::Integer),
        ("abs(-4)", "4", ValueKind::Integer),
        ("round(2.5)", "3", ValueKind::Integer),
        ("double(3)", "3.0", ValueKind::Float),
    ];

    for (expr, expected, kind) in cases {
        let value = interp.expr(&Value::from(expr)).unwrap();
        assert_eq!((expr, value.as_str()), (expr, expected));
        assert_eq!((expr, value.kind()), (expr, kind));
    }

    for expr in ["1 / 0", "5 % 0", "2.5 % 2", "9223372036854775807 * 2", "{x} + 1"] {
        let err = interp.expr(&Value::from(expr)).unwrap_err();
        assert_eq!((expr, err.kind()), (expr, ErrorKind::ArithmeticError));
    }
}

#[test]
fn make_safe_removes_io_builtins() {
    let mut interp = Interp::new();
    interp.make_safe();

    assert!(!interp.has_command("puts"));
    assert!(!interp.has_command("source"));
    assert!(interp.has_command("set"));
    assert_eq!(
        interp.eval("source /etc/passwd").unwrap_err().kind(),
        ErrorKind::UnknownCommand
    );
}

#[test]
fn interpreters_run_on_separate_threads() {
    let workers: Vec<_> = (1..=4)
        .map(|n: i64| {
            std::thread::spawn(move || {
                let mut interp = Interp::new();
                interp.proc("scale", move |_: &mut Interp, args: &[HostValue]| {
                    Ok(HostValue::Int(args[0].as_int().unwrap_or(0) * n))
                });
                interp.set_var("n", Value::from(n));
                let value = interp.eval("scale [expr {$n + 1}]").unwrap();
                value.as_int().unwrap()
            })
        })
        .collect();

    let results: Vec<i64> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert_eq!(results, vec![2, 6, 12, 20]);
}

#[test]
fn runaway_proc_stops_at_default_limit() {
    let mut interp = Interp::new();
    interp.eval("proc r {} { r }").unwrap();

    let err = interp.eval("r").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);
    assert_eq!(interp.frame_depth(), 0);
}

#[test]
fn nested_brackets_at_default_limit() {
    let mut interp = Interp::new();
    let nested = |depth: usize| format!("{}1{}", "[set x ".repeat(depth), "]".repeat(depth));

    // Each substitution is evaluated in a frame of its own, under the top-level frame.
    assert_eq!(interp.eval(&nested(900)), Ok(Value::from(1)));

    let err = interp.eval(&nested(1200)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);
    assert_eq!(interp.frame_depth(), 0);
}

#[test]
fn nested_parentheses_at_default_limit() {
    let mut interp = Interp::new();
    let nested = |depth: usize| Value::from(format!("{}1{}", "(".repeat(depth), ")".repeat(depth)));

    assert_eq!(interp.expr(&nested(990)), Ok(Value::from(1)));
    assert_eq!(
        interp.expr(&nested(1001)).unwrap_err().kind(),
        ErrorKind::RecursionLimit
    );

    let negated = Value::from(format!("{}1", "-".repeat(990)));
    assert_eq!(interp.expr(&negated), Ok(Value::from(1)));
}

#[test]
fn deep_recursion_is_limited() {
    let mut interp = Interp::new();
    interp.set_recursion_limit(50);
    interp.eval("proc down {n} {down [expr {$n + 1}]}").unwrap();

    let err = interp.eval("down 0").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RecursionLimit);
    assert_eq!(interp.frame_depth(), 0);
    assert_eq!(interp.eval("expr {1 + 1}"), Ok(Value::from(2)));
}
