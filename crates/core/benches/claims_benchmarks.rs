use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use claimsync_core::{Role, UserRecord, derive_claims};

fn role_list(len: usize) -> Vec<String> {
    let base = ["admin", "operador", "cliente", "auditor", "soporte"];
    (0..len).map(|i| base[i % base.len()].to_string()).collect()
}

fn bench_derive_claims(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_claims");

    for len in [0usize, 3, 16, 64] {
        let roles: Vec<Role> = role_list(len).into_iter().map(Role::new).collect();
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &roles, |b, roles| {
            b.iter(|| derive_claims(black_box(roles)))
        });
    }

    group.finish();
}

/// Extraction + comparison, i.e. the work done for every change that turns out
/// to be a no-op.
fn bench_unchanged_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("unchanged_guard");

    for len in [3usize, 64] {
        let before = UserRecord::with_roles(role_list(len));
        let after = before.clone();
        group.bench_with_input(BenchmarkId::from_parameter(len), &(before, after), |b, (before, after)| {
            b.iter(|| {
                let lhs = black_box(before).role_ids().into_roles();
                let rhs = black_box(after).role_ids().into_roles();
                lhs == rhs
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_derive_claims, bench_unchanged_guard);
criterion_main!(benches);
