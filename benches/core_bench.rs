//! Benchmarks for protoplan core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use protoplan::core::{cycles, graph::DependencyGraph, parser, sequencer, validator};
use protoplan::{ObjectInventory, Operation, OperationList};

/// Linear chain `s0 -> s1 -> ... -> sN`, listed in reverse order.
fn chain(n: usize) -> (ObjectInventory, OperationList) {
    let ops: Vec<Operation> = (0..n)
        .rev()
        .map(|i| {
            Operation::new(
                &format!("op{i}"),
                [format!("s{i}")],
                [format!("s{}", i + 1)],
            )
        })
        .collect();
    (
        ObjectInventory::new(["s0".to_string()], [format!("s{n}")]),
        OperationList::new(ops).unwrap(),
    )
}

/// Fan-in: N independent preparations feeding one assembly step.
fn fan_in(n: usize) -> (ObjectInventory, OperationList) {
    let mut ops: Vec<Operation> = (0..n)
        .map(|i| Operation::new(&format!("prep{i}"), [format!("raw{i}")], [format!("part{i}")]))
        .collect();
    ops.push(Operation::new(
        "assemble",
        (0..n).map(|i| format!("part{i}")).collect::<Vec<_>>(),
        ["product".to_string()],
    ));
    (
        ObjectInventory::new((0..n).map(|i| format!("raw{i}")), ["product".to_string()]),
        OperationList::new(ops).unwrap(),
    )
}

fn bench_validate_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_chain");
    for size in [10, 100, 1000, 10000] {
        let plan = chain(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &plan, |b, (inv, ops)| {
            b.iter(|| black_box(validator::validate(black_box(inv), black_box(ops))));
        });
    }
    group.finish();
}

fn bench_validate_fan_in(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_fan_in");
    for size in [10, 100, 1000] {
        let plan = fan_in(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &plan, |b, (inv, ops)| {
            b.iter(|| black_box(validator::validate(black_box(inv), black_box(ops))));
        });
    }
    group.finish();
}

fn bench_detect_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_cycles");
    for size in [100, 1000, 10000] {
        let (_, ops) = chain(size);
        let graph = DependencyGraph::build(&ops);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, graph| {
            b.iter(|| black_box(cycles::detect_cycles(black_box(graph))));
        });
    }
    group.finish();
}

fn bench_operation_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("operation_order");
    for size in [100, 1000, 10000] {
        let (_, ops) = chain(size);
        let graph = DependencyGraph::build(&ops);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(ops, graph),
            |b, (ops, graph)| {
                b.iter(|| black_box(sequencer::operation_order(black_box(ops), black_box(graph))));
            },
        );
    }
    group.finish();
}

fn bench_yaml_parse(c: &mut Criterion) {
    let yaml = r#"
identified_objects:
  initial:
    - objects/initial/tris_hcl.reagent
    - objects/initial/enzyme.stock
    - objects/initial/dna_probe.sample
  intermediate:
    - objects/intermediate/buffer.solution
    - objects/intermediate/diluted_enzyme.solution
    - objects/intermediate/reaction.mix
  final:
    - objects/final/gel.image
operations:
  - operation_id: prepare_buffer
    input: [objects/initial/tris_hcl.reagent]
    output: [objects/intermediate/buffer.solution]
  - operation_id: dilute_enzyme
    input: [objects/initial/enzyme.stock, objects/intermediate/buffer.solution]
    output: [objects/intermediate/diluted_enzyme.solution]
  - operation_id: prepare_reaction
    input:
      - objects/intermediate/diluted_enzyme.solution
      - objects/initial/dna_probe.sample
    output: [objects/intermediate/reaction.mix]
  - operation_id: run_gel
    input: [objects/intermediate/reaction.mix]
    output: [objects/final/gel.image]
policy:
  max_attempts: 3
"#;

    c.bench_function("yaml_parse_plan", |b| {
        b.iter(|| {
            let plan = parser::parse_plan(black_box(yaml)).unwrap();
            black_box(plan);
        });
    });
}

criterion_group!(
    benches,
    bench_validate_chain,
    bench_validate_fan_in,
    bench_detect_cycles,
    bench_operation_order,
    bench_yaml_parse,
);
criterion_main!(benches);
