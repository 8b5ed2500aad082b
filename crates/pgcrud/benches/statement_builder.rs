use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgcrud::{Record, SqlQb, qb};

/// A record with `n` integer columns: `col0 = 0, col1 = 1, ...`.
fn wide_record(n: usize) -> Record {
    let mut record = Record::with_capacity(n);
    for i in 0..n {
        record
            .push(format!("col{i}"), i.to_string(), "integer")
            .expect("distinct columns");
    }
    record
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/insert");

    for n in [1, 5, 10, 50, 100] {
        let record = wide_record(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &record, |b, record| {
            b.iter(|| {
                let qb = qb::insert_record("school", "student", record).expect("valid record");
                black_box(qb.build());
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/update");

    for n in [1, 5, 10, 50, 100] {
        let filter = wide_record(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| {
                let value = pgcrud::codec::bind("character varying", "Ana").expect("text binds");
                let qb = qb::update_where("school", "student", "name", value, filter)
                    .expect("valid filter");
                black_box(qb.build());
            });
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/codec");

    for (declared, raw) in [
        ("integer", "2147483647"),
        ("big int", "-9223372036854775808"),
        ("boolean", "TRUE"),
        ("date", "2024-02-29"),
        ("character varying", "Ana"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(declared), &raw, |b, raw| {
            b.iter(|| black_box(pgcrud::codec::bind(declared, raw)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_codec);
criterion_main!(benches);
