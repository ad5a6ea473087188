use pretty_assertions::assert_eq;
use quill::parser;
use quill::runtime::evaluator::{Evaluator, DEFAULT_MAX_RECURSION_DEPTH};
use quill::runtime::{RuntimeError, Value};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Output sink whose clones share one buffer.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run(code: &str) -> (Evaluator, Result<Value, RuntimeError>, SharedBuffer) {
    let program = parser::parse(code).expect("program should parse");
    let out = SharedBuffer::default();
    let mut evaluator = Evaluator::default().with_output(out.clone());
    let result = evaluator.execute(&program);
    (evaluator, result, out)
}

fn global(evaluator: &Evaluator, name: &str) -> Option<Value> {
    evaluator.environment().lookup(name).cloned()
}

#[test]
fn test_add_scenario_prints_and_keeps_globals() {
    let (ev, result, out) = run(
        r#"
        let x = 10;
        func add(a, b) { return a + b };
        print(add(2, 3))
        "#,
    );
    assert_eq!(result, Ok(Value::Unit));
    assert_eq!(out.contents(), "5\n");
    assert_eq!(global(&ev, "x"), Some(Value::Integer(10)));
    assert_eq!(ev.environment().depth(), 1);
}

#[test]
fn test_parameter_shadowing_does_not_leak() {
    let (ev, result, _) = run(
        r#"
        let x = 1
        func f(x) { return x }
        let r = f(2)
        "#,
    );
    assert!(result.is_ok(), "{:?}", result);
    assert_eq!(global(&ev, "r"), Some(Value::Integer(2)));
    assert_eq!(global(&ev, "x"), Some(Value::Integer(1)));
}

#[test]
fn test_function_body_is_deferred() {
    let (ev, result, _) = run("func g() { return nope }");
    assert_eq!(result, Ok(Value::String("g".to_string())));
    assert!(global(&ev, "g").map(|v| v.is_callable()).unwrap_or(false));

    let (ev, result, _) = run("func g() { return nope }\ng()");
    match result {
        Err(RuntimeError::UndefinedSymbol { name, location }) => {
            assert_eq!(name, "nope");
            assert_eq!(location.map(|l| l.line), Some(1));
        }
        other => panic!("expected name failure, got {:?}", other),
    }
    assert_eq!(ev.environment().depth(), 1);
}

#[test]
fn test_arity_mismatch_leaves_depth_unchanged() {
    let (ev, result, _) = run("func pair(a, b) { return (a, b) }\npair(1)");
    match result {
        Err(RuntimeError::ArityMismatch {
            function,
            expected,
            actual,
            ..
        }) => {
            assert_eq!(function, "pair");
            assert_eq!(expected, "2");
            assert_eq!(actual, 1);
        }
        other => panic!("expected arity failure, got {:?}", other),
    }
    assert_eq!(ev.environment().depth(), 1);
}

#[test]
fn test_defaults_are_evaluated_at_call_time() {
    let (ev, result, _) = run(
        r#"
        let base = 1
        func f(a, b = base + a) { return b }
        base = 10
        let r = f(1)
        let s = f(1, 5)
        "#,
    );
    assert!(result.is_ok(), "{:?}", result);
    assert_eq!(global(&ev, "r"), Some(Value::Integer(11)));
    assert_eq!(global(&ev, "s"), Some(Value::Integer(5)));
}

#[test]
fn test_recursion() {
    let (_, result, _) = run(
        r#"
        func fact(n) {
            if n <= 1 { return 1 }
            return n * fact(n - 1)
        }
        fact(10)
        "#,
    );
    assert_eq!(result, Ok(Value::Integer(3628800)));
}

#[test]
fn test_stack_overflow_unwinds_every_scope() {
    let program = parser::parse("func spin(n) { return spin(n + 1) }\nspin(0)").unwrap();
    let mut ev = Evaluator::default()
        .with_output(io::sink())
        .with_max_recursion_depth(64);
    assert_eq!(ev.execute(&program), Err(RuntimeError::StackOverflow(64)));
    assert_eq!(ev.environment().depth(), 1);
    assert_eq!(ev.recursion_depth(), 0);
}

#[test]
fn test_deep_recursion_within_the_default_limit() {
    let (ev, result, _) = run(
        "func down(n) { if n == 0 { return 0 }\n return down(n - 1) }\ndown(500)",
    );
    assert_eq!(result, Ok(Value::Integer(0)));
    assert_eq!(ev.environment().depth(), 1);

    // Exactly the default number of nested frames still fits.
    let (ev, result, _) = run(
        "func count(n) { if n == 0 { return 0 }\n return 1 + count(n - 1) }\ncount(511)",
    );
    assert_eq!(result, Ok(Value::Integer(511)));
    assert_eq!(ev.recursion_depth(), 0);

    let (ev, result, _) = run("func spin(n) { return spin(n + 1) }\nspin(0)");
    assert_eq!(
        result,
        Err(RuntimeError::StackOverflow(DEFAULT_MAX_RECURSION_DEPTH))
    );
    assert_eq!(ev.environment().depth(), 1);
    assert_eq!(ev.recursion_depth(), 0);
}

#[test]
fn test_errors_deep_in_calls_pop_every_scope() {
    let (ev, result, _) = run(
        r#"
        func inner(v) { if true { return v / 0 } }
        func outer(v) { let local = v
            return inner(local) }
        outer(3)
        "#,
    );
    assert_eq!(result, Err(RuntimeError::DivisionByZero));
    assert_eq!(ev.environment().depth(), 1);
    assert_eq!(global(&ev, "local"), None);
}

#[test]
fn test_blocks_scope_lets_but_assignments_reach_out() {
    let (ev, result, _) = run(
        r#"
        let x = 1
        let c = 0
        if true {
            let x = 2
            let y = 3
            c = x + y
        }
        "#,
    );
    assert!(result.is_ok(), "{:?}", result);
    assert_eq!(global(&ev, "x"), Some(Value::Integer(1)));
    assert_eq!(global(&ev, "c"), Some(Value::Integer(5)));
    assert_eq!(global(&ev, "y"), None);
}

#[test]
fn test_assignment_to_unknown_name_fails() {
    let (_, result, _) = run("missing = 3");
    assert!(matches!(
        result,
        Err(RuntimeError::UndefinedSymbol { ref name, .. }) if name == "missing"
    ));
}

#[test]
fn test_nested_function_definitions_are_local() {
    let (ev, result, _) = run(
        r#"
        func outer() {
            func inner() { return 1 }
            return inner() + 1
        }
        outer()
        "#,
    );
    assert_eq!(result, Ok(Value::Integer(2)));
    assert_eq!(global(&ev, "inner"), None);
}

#[test]
fn test_callee_sees_caller_locals_through_the_scope_stack() {
    let (_, result, _) = run(
        r#"
        func reader() { return secret }
        func caller() {
            let secret = 42
            return reader()
        }
        caller()
        "#,
    );
    assert_eq!(result, Ok(Value::Integer(42)));
}

#[test]
fn test_user_definitions_shadow_builtins() {
    let (_, result, _) = run("func len(x) { return 99 }\nlen([1])");
    assert_eq!(result, Ok(Value::Integer(99)));
}
