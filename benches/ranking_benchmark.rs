use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geosearch_engine::{
    AttributeValue, EngineConfig, GeoPoint, Record, SearchEngine, SearchOptions, SearchQuery,
};

const PREFIXES: &[&str] = &["Lon", "Mont", "Spring", "Port", "Saint", "New", "Fort", "Lake"];

fn create_test_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let name = format!("{}{} {}", PREFIXES[i % PREFIXES.len()], "dale", i);
            Record::from_pairs([
                ("id", AttributeValue::Integer(i as i64)),
                ("name", AttributeValue::Text(name)),
                ("lat", AttributeValue::Float(25.0 + (i % 250) as f64 * 0.1)),
                ("long", AttributeValue::Float(-125.0 + (i % 600) as f64 * 0.1)),
            ])
            .unwrap()
        })
        .collect()
}

fn bench_compute_search(c: &mut Criterion) {
    let config = EngineConfig::default_cities().unwrap();
    let options = SearchOptions::default();
    let query = SearchQuery::new()
        .text("name", "Lon")
        .near("distance", GeoPoint::new(43.70011, -79.4163));

    for count in [1_000, 10_000, 100_000] {
        let engine = SearchEngine::from_config(create_test_records(count), &config).unwrap();

        c.bench_function(&format!("compute_search_{}", count), |b| {
            b.iter(|| black_box(engine.compute_search(&query, &options).unwrap()));
        });
    }
}

fn bench_distance_only(c: &mut Criterion) {
    let config = EngineConfig::default_cities().unwrap();
    let engine = SearchEngine::from_config(create_test_records(10_000), &config).unwrap();
    let query = SearchQuery::new().near("distance", GeoPoint::new(45.5467131, -73.8779451));

    c.bench_function("distance_only_10000", |b| {
        b.iter(|| black_box(engine.search(&query).unwrap()));
    });
}

criterion_group!(benches, bench_compute_search, bench_distance_only);
criterion_main!(benches);
