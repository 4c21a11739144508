use barber_directory::db::DemoStore;
use barber_directory::models::Role;
use barber_directory::services::ProfileResolver;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::Arc;

fn benchmark_resolve(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to build runtime");

    // A few hundred staff rows so the email scans do some work
    let store = Arc::new(DemoStore::new());
    for i in 0..500 {
        store.create_account(
            &format!("Barbero {}", i),
            &format!("barbero{}@barberia.dev", i),
            Role::Barbero,
        );
    }
    let resolver = ProfileResolver::new(store.clone());

    let mut group = c.benchmark_group("profile_resolution");

    group.bench_function("admin_by_uid", |b| {
        b.iter(|| {
            runtime.block_on(resolver.resolve(black_box("demo-barber"), Some("demo@barberia.dev")))
        })
    });

    group.bench_function("barber_by_email", |b| {
        b.iter(|| {
            runtime.block_on(resolver.resolve(
                black_box("unlinked-uid"),
                Some(black_box("Barbero250@Barberia.dev")),
            ))
        })
    });

    group.bench_function("unknown_user", |b| {
        b.iter(|| runtime.block_on(resolver.resolve(black_box("nobody"), Some("nobody@x.com"))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_resolve);
criterion_main!(benches);
