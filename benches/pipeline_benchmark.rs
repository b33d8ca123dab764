use acs_tract_extractor::models::{
    FipsLookup, FipsRecord, GeometryCollection, PolygonPart, StatisticsTable, TractFeature,
    TractStatistics,
};
use acs_tract_extractor::processors::TractJoiner;
use acs_tract_extractor::readers::StatisticsParser;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Roughly the size of the national county table
fn create_lookup(states: u32, counties_per_state: u32) -> FipsLookup {
    let mut records = Vec::with_capacity((states * counties_per_state) as usize);
    for state in 1..=states {
        for county in 1..=counties_per_state {
            records.push(FipsRecord::new(
                &format!("S{}", state % 100),
                &format!("County {}", county),
                state,
                county * 2 - 1,
            ));
        }
    }
    FipsLookup::new(records)
}

fn create_tracts(count: usize) -> (GeometryCollection, StatisticsTable) {
    let mut features = Vec::with_capacity(count);
    let mut table = StatisticsTable::new(vec!["B01001_001E".to_string()]);

    for i in 0..count {
        let tract = format!("{:06}", i * 100);
        let x = (i % 50) as f64 * 0.01;
        let y = (i / 50) as f64 * 0.01;
        features.push(TractFeature::new(
            &tract,
            vec![PolygonPart::new(
                vec![(x, y), (x, y + 0.01), (x + 0.01, y + 0.01), (x + 0.01, y), (x, y)],
                vec![],
            )],
        ));

        // every tenth tract has no statistics
        if i % 10 != 0 {
            table.insert(TractStatistics {
                tract,
                name: format!("Census Tract {}", i),
                state: "06".to_string(),
                county: "037".to_string(),
                values: vec![Some(i as f64)],
            });
        }
    }

    (
        GeometryCollection {
            features,
            ..Default::default()
        },
        table,
    )
}

fn create_statistics_body(rows: usize) -> String {
    let mut body =
        String::from(r#"[["NAME","B01001_001E","B19013_001E","state","county","tract"]"#);
    for i in 0..rows {
        body.push_str(&format!(
            r#",["Census Tract {i}","{}","{}","06","037","{:06}"]"#,
            i * 3,
            if i % 7 == 0 { "-666666666".to_string() } else { (i * 11).to_string() },
            i
        ));
    }
    body.push(']');
    body
}

fn benchmark_lookup(c: &mut Criterion) {
    let lookup = create_lookup(56, 60);

    c.bench_function("fips_resolve", |b| {
        b.iter(|| black_box(lookup.resolve(black_box("S50"), black_box("County 45"))))
    });
}

fn benchmark_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("tract_join");

    for size in [500, 2500].iter() {
        let (geometry, statistics) = create_tracts(*size);
        group.bench_with_input(BenchmarkId::new("left_join", size), size, |b, _| {
            b.iter(|| {
                let joiner = TractJoiner::new();
                black_box(joiner.join(geometry.clone(), &statistics))
            })
        });
    }

    group.finish();
}

fn benchmark_statistics_parse(c: &mut Criterion) {
    let body = create_statistics_body(2500);
    let variables = vec!["B01001_001E".to_string(), "B19013_001E".to_string()];

    c.bench_function("statistics_parse_2500", |b| {
        b.iter(|| black_box(StatisticsParser::new().parse(black_box(&body), &variables)))
    });
}

criterion_group!(
    benches,
    benchmark_lookup,
    benchmark_join,
    benchmark_statistics_parse
);
criterion_main!(benches);
