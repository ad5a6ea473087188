use proptest::prelude::*;
use quill::parser;
use quill::runtime::environment::Environment;
use quill::runtime::evaluator::Evaluator;
use quill::runtime::Value;
use std::io;

#[derive(Debug, Clone)]
enum Op {
    Push,
    Pop,
    Define(u8, i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Push),
        Just(Op::Pop),
        (0u8..4, any::<i64>()).prop_map(|(n, v)| Op::Define(n, v)),
    ]
}

proptest! {
    // Pushing a scope, doing anything inside it, then popping it restores
    // every lookup to what it was before the push.
    #[test]
    fn push_pop_round_trip(
        before in prop::collection::vec((0u8..4, any::<i64>()), 0..6),
        inside in prop::collection::vec(op_strategy(), 0..20),
    ) {
        let mut env = Environment::new();
        for (n, v) in &before {
            env.define(&format!("v{}", n), Value::Integer(*v));
        }
        let snapshot: Vec<Option<Value>> =
            (0..4).map(|n| env.lookup(&format!("v{}", n)).cloned()).collect();

        env.push_scope();
        let base = env.depth();
        for op in &inside {
            match op {
                Op::Push => env.push_scope(),
                // Stay inside the scope pushed above.
                Op::Pop => {
                    if env.depth() > base {
                        env.pop_scope();
                    }
                }
                Op::Define(n, v) => env.define(&format!("v{}", n), Value::Integer(*v)),
            }
        }
        while env.depth() > base {
            env.pop_scope();
        }
        env.pop_scope();

        prop_assert_eq!(env.depth(), 1);
        let after: Vec<Option<Value>> =
            (0..4).map(|n| env.lookup(&format!("v{}", n)).cloned()).collect();
        prop_assert_eq!(after, snapshot);
    }

    // A call never changes the caller's bindings of its parameter names.
    #[test]
    fn parameters_never_leak(outer in any::<i32>(), arg in any::<i32>()) {
        let code = format!(
            "let x = {}\nfunc f(x) {{ let y = x\n return y }}\nlet r = f({})",
            outer, arg
        );
        let program = parser::parse(&code).unwrap();
        let mut ev = Evaluator::default().with_output(io::sink());
        ev.execute(&program).unwrap();
        prop_assert_eq!(ev.environment().lookup("x"), Some(&Value::Integer(outer as i64)));
        prop_assert_eq!(ev.environment().lookup("r"), Some(&Value::Integer(arg as i64)));
        prop_assert!(ev.environment().lookup("y").is_none());
        prop_assert_eq!(ev.environment().depth(), 1);
    }
}
