use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quill::config::{TypeCheckMode, TypeConfig};
use quill::parser::{parse, parse_expression};
use quill::runtime::{CollectingReporter, Evaluator};
use std::io;

/// Benchmark Quill parsing performance
fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let test_cases = vec![
        ("simple_int", "42"),
        ("simple_string", "\"hello world\""),
        ("arithmetic", "1 + 2 + 3 + 4 + 5"),
        ("nested_arithmetic", "(2 * 3) + (10 - 5)"),
        ("call", "add(1, mul(2, 3))"),
        ("record_literal", "{name: \"Alice\", age: 30}"),
        ("list", "[1, 2, 3, 4, 5]"),
    ];

    for (name, expr) in test_cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &expr, |b, &expr| {
            b.iter(|| parse_expression(black_box(expr)));
        });
    }

    group.finish();
}

/// Benchmark Quill expression evaluation
fn benchmark_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");

    let test_cases = vec![
        ("literal_int", "42"),
        ("arithmetic_complex", "(2 * 3) + (10 - 5) + (20 / 4)"),
        ("comparison", "1 < 2 && 3 >= 3"),
        ("record_access", "{a: 1, b: 2}.a"),
        ("list_index", "[1, 2, 3, 4, 5, 6, 7, 8, 9, 10][9]"),
    ];

    for (name, expr) in test_cases {
        let parsed = parse_expression(expr).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &parsed, |b, parsed| {
            let mut evaluator = Evaluator::default().with_output(io::sink());
            b.iter(|| evaluator.eval_expr(black_box(parsed)));
        });
    }

    group.finish();
}

/// Benchmark the cost of runtime type checking on annotated calls
fn benchmark_call_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_overhead");

    let program = parse(
        r#"
        type Point = {x: int, y: int}
        func norm1(p: Point, scale: int = 1) -> int {
            let ax = p.x
            let ay = p.y
            if ax < 0 { ax = -ax }
            if ay < 0 { ay = -ay }
            return (ax + ay) * scale
        }
        let i = 0
        let total = 0
        while i < 200 {
            total = total + norm1({x: i, y: -i})
            i = i + 1
        }
        total
        "#,
    )
    .unwrap();

    for mode in [TypeCheckMode::Off, TypeCheckMode::Warn, TypeCheckMode::On] {
        group.bench_with_input(
            BenchmarkId::from_parameter(mode.to_string()),
            &program,
            |b, program| {
                b.iter(|| {
                    let mut evaluator =
                        Evaluator::new(TypeConfig::new().with_cli_override(mode))
                            .with_output(io::sink())
                            .with_reporter(CollectingReporter::new());
                    evaluator.execute(black_box(program))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_parsing,
    benchmark_evaluation,
    benchmark_call_overhead
);
criterion_main!(benches);
