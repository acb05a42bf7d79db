//! Operator benchmarks
//!
//! Measures the hot paths of expression evaluation:
//! - Numeric promotion in `+`
//! - String building with `&`
//! - Mixed-type equality
//! - Date string parsing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vbs_runtime::{Currency, Runtime, RuntimeOptions, Value};

fn runtime() -> Runtime {
    Runtime::with_options(RuntimeOptions {
        reference_year: Some(2024),
        log_trapped_errors: false,
        ..RuntimeOptions::default()
    })
}

// ============================================================================
// Arithmetic
// ============================================================================

fn bench_add(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("add");
    let cases = [
        ("integer", Value::Integer(120), Value::Integer(7)),
        ("promote_long", Value::Integer(32_000), Value::Integer(1_000)),
        ("double", Value::Double(1.5), Value::Long(7)),
        (
            "currency",
            Value::Currency(Currency::from_scaled(15_000)),
            Value::Integer(2),
        ),
        ("numeric_string", Value::string("42.5"), Value::Integer(1)),
    ];
    for (name, left, right) in cases.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &(left, right), |b, (l, r)| {
            b.iter(|| rt.add(black_box(l), black_box(r)))
        });
    }
    group.finish();
}

// ============================================================================
// Strings
// ============================================================================

fn bench_concat(c: &mut Criterion) {
    let rt = runtime();
    c.bench_function("concat_100_parts", |b| {
        let parts: Vec<Value> = (0..100)
            .map(|i| {
                if i % 2 == 0 {
                    Value::Integer(i)
                } else {
                    Value::string("part")
                }
            })
            .collect();
        b.iter(|| rt.concat_all(black_box(&parts)));
    });
}

// ============================================================================
// Comparison
// ============================================================================

fn bench_equals(c: &mut Criterion) {
    let rt = runtime();
    c.bench_function("equals_mixed", |b| {
        let left = Value::Boolean(true);
        let right = Value::Double(-1.0);
        b.iter(|| rt.equals(black_box(&left), black_box(&right)));
    });
    c.bench_function("equals_strings", |b| {
        let left = Value::string("The quick brown fox");
        let right = Value::string("The quick brown fix");
        b.iter(|| rt.equals(black_box(&left), black_box(&right)));
    });
}

// ============================================================================
// Dates
// ============================================================================

fn bench_cdate(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("cdate");
    for input in ["1/15/2000", "July 4, 1776 6:30 PM", "36526.25"] {
        let value = Value::string(input);
        group.bench_with_input(BenchmarkId::from_parameter(input), &value, |b, v| {
            b.iter(|| rt.cdate(black_box(v)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_add, bench_concat, bench_equals, bench_cdate);
criterion_main!(benches);
