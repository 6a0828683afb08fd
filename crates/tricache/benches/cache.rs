use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tricache::TriCache;

fn bench_cached_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut cache = TriCache::new(1000, 101).unwrap();
        let data = vec![b'x'; 1024];

        for key in 0..100 {
            cache.add(key, data.clone());
        }

        let mut counter = 0i64;
        b.iter(|| {
            black_box(cache.get(counter % 100).is_some());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write_evicting", |b| {
        let mut cache = TriCache::new(1000, 101).unwrap();

        for key in 0..1000 {
            cache.add(key, key);
        }

        let mut counter = 0i64;
        b.iter(|| {
            if counter % 2 == 0 {
                black_box(cache.get(counter % 1000).is_some());
            } else {
                black_box(cache.add(1000 + counter, counter));
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_ordered_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered");
    group.sample_size(50);

    let mut cache = TriCache::new(10_000, 1009).unwrap();
    for key in 0..10_000 {
        cache.add((key * 7919) % 10_000, key);
    }

    group.throughput(Throughput::Elements(100));
    group.bench_function("range_100", |b| {
        b.iter(|| black_box(cache.range(black_box(4000), black_box(4099)).count()));
    });

    group.throughput(Throughput::Elements(10_000));
    group.bench_function("sort_ascending_10k", |b| {
        b.iter(|| black_box(cache.sort_ascending().count()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_get,
    bench_mixed_50_50,
    bench_ordered_reads
);
criterion_main!(benches);
