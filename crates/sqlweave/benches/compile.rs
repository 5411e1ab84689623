use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlweave::{ConditionNode, Grammar, Operator, Parts, Row, Value, number_placeholders};
use sqlweave::grammar::base;

/// WHERE with `n` comparisons, every fourth one nested in an OR group.
fn build_conditions(n: usize) -> Vec<ConditionNode> {
    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let node = if i % 4 == 3 {
            ConditionNode::group([
                ConditionNode::compare(format!("col{i}"), Operator::Eq, i as i64),
                ConditionNode::compare(format!("col{i}"), Operator::In, vec![1i64, 2, 3]).or(),
            ])
        } else {
            ConditionNode::compare(format!("col{i}"), Operator::Eq, i as i64)
        };
        nodes.push(node);
    }
    nodes
}

fn build_rows(rows: usize, columns: usize) -> Vec<Row> {
    (0..rows)
        .map(|r| {
            (0..columns)
                .map(|c| (format!("col{c}"), Value::Int((r * columns + c) as i64).into()))
                .collect()
        })
        .collect()
}

fn bench_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/where");

    for n in [1, 5, 10, 50, 100] {
        let nodes = build_conditions(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &nodes, |b, nodes| {
            b.iter(|| black_box(base::where_clause(nodes)));
        });
    }

    group.finish();
}

fn bench_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/values");

    for n in [1, 10, 100, 1000] {
        let rows = build_rows(n, 8);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| black_box(base::values(rows)));
        });
    }

    group.finish();
}

fn bench_select_statement(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/select");
    let grammar = Grammar::default();

    for n in [1, 10, 100] {
        let parts = Parts {
            select: (0..n).map(|i| format!("col{i}")).collect(),
            from: vec!["t".to_string()],
            conditions: build_conditions(n),
            limit: Some(10),
            ..Parts::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &parts, |b, parts| {
            b.iter(|| {
                for clause in sqlweave::Dialect::Postgres.clauses(sqlweave::StatementKind::Select) {
                    if parts.is_present(*clause) {
                        black_box(grammar.translate(*clause, parts).ok());
                    }
                }
            });
        });
    }

    group.finish();
}

fn bench_number_placeholders(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/number_placeholders");

    for n in [5, 20, 100, 500] {
        let sql = format!(
            "SELECT * FROM t WHERE id IN ({})",
            vec!["?"; n].join(", ")
        );
        group.bench_with_input(BenchmarkId::from_parameter(n), &sql, |b, sql| {
            b.iter(|| black_box(number_placeholders(sql)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_where,
    bench_values,
    bench_select_statement,
    bench_number_placeholders
);
criterion_main!(benches);
