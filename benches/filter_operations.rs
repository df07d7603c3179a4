//! Benchmarks for micro-syntax parsing, filter compilation and evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sieve::prelude::*;
use sieve::{OperatorTable, syntax};

pub struct Address {
    pub city: String,
}

pub struct Customer {
    pub name: String,
    pub age: i32,
    pub score: f64,
    pub address: Option<Address>,
}

filterable! {
    Address {
        city: String,
    }
}

filterable! {
    Customer {
        name: String,
        age: i32,
        score: f64,
    }
    nested {
        address: Option<Address>,
    }
}

fn customers(count: usize) -> Vec<Customer> {
    (0..count)
        .map(|i| Customer {
            name: format!("customer_{}", i),
            age: (i % 90) as i32,
            score: i as f64 / 10.0,
            address: (i % 3 != 0).then(|| Address {
                city: format!("city_{}", i % 7),
            }),
        })
        .collect()
}

fn sample_filter() -> EntityFilter<Customer> {
    let mut address = EntityFilter::<Address>::new();
    address.add_syntax("city", "^city_1,city_2").unwrap();
    let mut filter = entity_filter!(Customer {
        name: "~customer_1,!customer_19",
        age: ">=18,<65",
        score: ">1.5",
    })
    .unwrap();
    filter.add_nested("address", address).unwrap();
    filter
}

fn bench_syntax(c: &mut Criterion) {
    let mut group = c.benchmark_group("syntax");
    let table = OperatorTable::default();

    group.bench_function("parse_single", |b| {
        b.iter(|| black_box(syntax::parse(black_box("~smith"), &table)))
    });

    group.bench_function("parse_mixed", |b| {
        b.iter(|| black_box(syntax::parse(black_box(">=18,<65|!40;ISNULL"), &table)))
    });

    group.bench_function("parse_escaped", |b| {
        b.iter(|| black_box(syntax::parse(black_box(r"a\,b,c\\d,==e\|f"), &table)))
    });

    let filters = syntax::parse(">=18,<65|!40;ISNULL", &table);
    group.bench_function("render", |b| {
        b.iter(|| black_box(syntax::render(black_box(&filters), &table)))
    });

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let ctx = FilterContext::default();
    let filter = sample_filter();

    group.bench_function("predicate", |b| {
        b.iter(|| black_box(filter.predicate(&ctx).unwrap()))
    });

    group.bench_function("deferred_expr", |b| {
        b.iter(|| black_box(filter.deferred_expr(&ctx).unwrap()))
    });

    let single = entity_filter!(Customer { name: "x" }).unwrap();
    group.bench_function("single_property", |b| {
        b.iter(|| black_box(single.predicate(&ctx).unwrap()))
    });

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let ctx = FilterContext::default();
    let predicate = sample_filter().predicate(&ctx).unwrap().unwrap();

    for size in [100usize, 1_000, 10_000].iter() {
        let data = customers(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("matches", size), &data, |b, data| {
            b.iter(|| data.iter().filter(|c| predicate.matches(c)).count())
        });
    }

    group.finish();
}

fn bench_query_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_string");
    let filter = sample_filter();
    let query = filter.to_query_string(PropertyNaming::CamelCase);

    group.bench_function("encode", |b| {
        b.iter(|| black_box(filter.to_query_string(PropertyNaming::CamelCase)))
    });

    group.bench_function("decode", |b| {
        b.iter(|| {
            black_box(EntityFilter::<Customer>::from_query_string(
                black_box(&query),
                PropertyNaming::CamelCase,
            ))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_syntax,
    bench_compile,
    bench_apply,
    bench_query_string
);
criterion_main!(benches);
