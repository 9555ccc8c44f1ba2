use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use corroborate::{
    EntityKind, EntityRegistry, RawRecord, SignalExtractor, SourceTag, TargetProfile,
};

fn sample_records() -> Vec<RawRecord> {
    // 256 records cycling through name variants so resolution measures a
    // realistic mix of creations, exact folds, and fuzzy folds.
    let stems = [
        "Meridian Optics",
        "Zhongke Quantum Research Institute",
        "Northern Dynamics",
        "Starlight Materials",
    ];
    let suffixes = ["Co., Ltd.", "Co Ltd", "Limited", "Corp"];

    (0..256u32)
        .map(|i| {
            let stem = stems[(i as usize) % stems.len()];
            let suffix = suffixes[(i as usize / stems.len()) % suffixes.len()];
            RawRecord::new(SourceTag::patents())
                .with_country("CN")
                .with_name(format!("{stem} {suffix}"))
                .with_address("Haidian District, Beijing")
                .with_postal_code("100085")
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let profile = TargetProfile::china_affiliation();
    let extractor = SignalExtractor::new();
    let records = sample_records();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("classify_256", |b| {
        b.iter(|| {
            for record in &records {
                std::hint::black_box(extractor.classify(record, &profile));
            }
        });
    });
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let records = sample_records();

    let mut group = c.benchmark_group("pipeline");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("resolve_256", |b| {
        b.iter(|| {
            // Fresh registry per sample so fold rates do not drift
            // between iterations.
            let registry = EntityRegistry::with_default_matcher();
            for record in &records {
                registry
                    .resolve_or_create(
                        &record.name,
                        EntityKind::Company,
                        Some("CN"),
                        &record.source,
                    )
                    .unwrap();
            }
            std::hint::black_box(registry.len().unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_classify, bench_resolve);
criterion_main!(benches);
