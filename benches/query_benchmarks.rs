use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use geo::{LineString, Polygon};
use geomoir::{BuildConfig, Coordinate, CountryFeature, CountryIndex, LeafPolicy, QuadTree, codec};

/// A ring of wedge shaped countries around the origin.
fn wedge_countries(count: usize) -> CountryIndex {
    let step = std::f64::consts::TAU / count as f64;
    CountryIndex::new((0..count).map(|i| {
        let (a, b) = (i as f64 * step, (i + 1) as f64 * step);
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (170.0 * a.cos(), 85.0 * a.sin()),
            (170.0 * b.cos(), 85.0 * b.sin()),
            (0.0, 0.0),
        ]);
        CountryFeature::new(format!("wedge-{}", i), Polygon::new(ring, Vec::new()))
    }))
}

fn build(depth: usize) -> QuadTree {
    let config = BuildConfig::default()
        .with_max_depth(depth)
        .with_leaf_policy(LeafPolicy::Covering);
    wedge_countries(24).build_tree(&config).unwrap().tree
}

fn sample_points(tree: &QuadTree, count: usize) -> Vec<Coordinate> {
    let bound = tree.bound();
    // Deterministic scatter
    (0..count)
        .map(|i| {
            let fx = (i as f32 * 0.618_034).fract();
            let fy = (i as f32 * 0.414_214).fract();
            Coordinate::new(
                bound.top_left.x + bound.width() * fx,
                bound.top_left.y + bound.height() * fy,
            )
        })
        .collect()
}

fn benchmark_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    for depth in [6, 9, 12] {
        let tree = build(depth);
        let points = sample_points(&tree, 1000);

        group.bench_with_input(BenchmarkId::new("query_1000", depth), &points, |b, points| {
            b.iter(|| {
                for point in points {
                    black_box(tree.query(black_box(*point)).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn benchmark_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    let tree = build(9);
    let bytes = codec::encode(&tree);

    group.bench_function("encode", |b| b.iter(|| codec::encode(black_box(&tree))));
    group.bench_function("decode", |b| {
        b.iter(|| codec::decode(black_box(&bytes)).unwrap())
    });

    group.finish();
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    let index = wedge_countries(24);
    for depth in [4, 6] {
        group.bench_with_input(BenchmarkId::new("covering", depth), &depth, |b, &depth| {
            let config = BuildConfig::default()
                .with_max_depth(depth)
                .with_leaf_policy(LeafPolicy::Covering);
            b.iter(|| index.build_tree(black_box(&config)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_query, benchmark_codec, benchmark_build);
criterion_main!(benches);
