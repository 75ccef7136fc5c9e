//! Clause builder benchmarks
//!
//! The builders run once per list query, so they are measured both with a
//! fixed resolver and with the thread-local tenant lookup in front of them.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqldialect::database::{
    DatabaseBackend, FixedDialectResolver, JoinType, Sort, SqlGenerator, TenantDialectResolver,
};
use sqldialect::tenant::{ExecutionContext, SystemClock, TenantContext};
use std::sync::Arc;

fn fixed_generator(backend: DatabaseBackend) -> SqlGenerator {
    SqlGenerator::new(
        Arc::new(FixedDialectResolver::new(backend)),
        Arc::new(SystemClock::new()),
    )
}

fn benchmark_build_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_select");
    let fields = [
        "id",
        "account_no",
        "external_id",
        "principal_amount",
        "loan_status_id",
        "submittedon_date",
    ];

    for backend in [DatabaseBackend::MySQL, DatabaseBackend::Postgres] {
        let generator = fixed_generator(backend);
        group.bench_with_input(BenchmarkId::from_parameter(backend), &fields, |b, fields| {
            b.iter(|| {
                generator
                    .build_select(black_box(fields.iter()), Some("l"), false)
                    .unwrap_or_default()
            })
        });
    }

    group.finish();
}

fn benchmark_full_statement(c: &mut Criterion) {
    let generator = fixed_generator(DatabaseBackend::Postgres);
    let sort = Sort::desc("submittedon_date").and(Sort::asc("id"));

    c.bench_function("full_statement_postgres", |b| {
        b.iter(|| {
            format!(
                "{} {} {} {} {}",
                generator
                    .build_select(black_box(["id", "account_no"]), Some("l"), false)
                    .unwrap_or_default(),
                generator
                    .build_from(Some("m_loan"), Some("l"), false)
                    .unwrap_or_default(),
                generator
                    .build_join("m_client", Some("c"), "id", Some("l"), "client_id", JoinType::Left)
                    .unwrap_or_default(),
                generator
                    .build_order_by(black_box(&sort), Some("l"), false)
                    .unwrap_or_default(),
                generator.limit_offset(black_box(50), black_box(100)).unwrap_or_default()
            )
        })
    });
}

fn benchmark_tenant_resolution(c: &mut Criterion) {
    let resolver = TenantDialectResolver::new(DatabaseBackend::Postgres);
    for i in 0..64 {
        resolver.register(format!("tenant_{}", i), DatabaseBackend::MySQL);
    }
    let generator = SqlGenerator::new(Arc::new(resolver), Arc::new(SystemClock::new()));
    let _guard = ExecutionContext::for_tenant(TenantContext::new("tenant_42")).enter();

    c.bench_function("tenant_resolved_limit", |b| {
        b.iter(|| generator.limit_offset(black_box(10), black_box(0)))
    });
}

criterion_group!(
    benches,
    benchmark_build_select,
    benchmark_full_statement,
    benchmark_tenant_resolution
);
criterion_main!(benches);
