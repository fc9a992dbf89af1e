use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use profunc::{
    FilteredEntry, OverlapScorer, SubstringTable, MAX_SUBSTRING_LEN, MIN_SUBSTRING_LEN,
};

// A pool shaped like real search output: a dominant family label with
// varied qualifiers, plus unrelated noise entries.
fn synthetic_pool(rows: usize) -> Vec<FilteredEntry> {
    let families = [
        "ABC transporter permease",
        "ABC transporter ATP-binding",
        "ABC transporter substrate-binding",
        "MFS transporter",
        "TonB-dependent receptor",
        "Serine protease",
    ];
    (0..rows)
        .map(|i| {
            let description = format!("{} subunit {}", families[i % families.len()], i % 7);
            let similarity = 0.5 + 0.4 * ((i % 11) as f64 / 10.0);
            FilteredEntry::new(description, similarity)
        })
        .collect()
}

fn bench_table_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("consensus/table_build");
    for rows in [16usize, 64, 256] {
        let pool = synthetic_pool(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &pool, |b, pool| {
            b.iter(|| SubstringTable::build(pool, MIN_SUBSTRING_LEN, MAX_SUBSTRING_LEN));
        });
    }
    group.finish();
}

fn bench_candidate_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("consensus/select");
    for rows in [16usize, 64, 256] {
        let pool = synthetic_pool(rows);
        let table = SubstringTable::build(&pool, MIN_SUBSTRING_LEN, MAX_SUBSTRING_LEN);
        group.bench_with_input(
            BenchmarkId::from_parameter(rows),
            &(table, pool),
            |b, (table, pool)| {
                b.iter(|| OverlapScorer::new(table, pool, 0.10, 0.25).select());
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_table_build, bench_candidate_selection);
criterion_main!(benches);
