use criterion::{criterion_group, criterion_main, Criterion};
use dtodata_core::column::{ColumnConfig, ValueType};
use dtodata_core::config::Settings;
use dtodata_core::id::TableId;
use dtodata_core::request::{RequestColumn, RequestOrder, TableRequest};
use dtodata_exec::{normalize, Envelope, Instance, RowMode};
use dtodata_query::{transform_search, OperatorMap};
use serde_json::json;

fn make_request(columns: usize) -> TableRequest {
    TableRequest {
        draw: 1,
        columns: (0..columns)
            .map(|i| RequestColumn::field(format!("Col{i}")).searching(">=10 and <100"))
            .collect(),
        order: vec![RequestOrder::new(0, "asc"), RequestOrder::new(1, "desc")],
        start: 100,
        length: 50,
        ..TableRequest::default()
    }
}

fn bench_query_build(c: &mut Criterion) {
    let mut instance = Instance::new(TableId::from("bench"), Settings::with_url("http://svc/odata/Rows"))
        .unwrap();
    instance.set_column_configs(
        (0..16)
            .map(|i| ColumnConfig::field(format!("Col{i}")).with_type("number"))
            .collect(),
    );
    let request = make_request(16);
    c.bench_function("query_build_16_columns", |b| {
        b.iter(|| {
            let _ = instance.query(true, Some(&request));
        })
    });
}

fn bench_transform_search(c: &mut Criterion) {
    let map = OperatorMap::default();
    c.bench_function("transform_search", |b| {
        b.iter(|| {
            let _ = transform_search(&map, "Price", ">= 10 && <= 99.5", ValueType::Numeric);
        })
    });
}

fn bench_normalize_arrays(c: &mut Criterion) {
    let rows: Vec<_> = (0..1024)
        .map(|i| json!({"Id": i, "Name": format!("row-{i}"), "Score": (i % 10) as f64}))
        .collect();
    let envelope = Envelope {
        context: None,
        count: Some(10_000),
        value: rows,
    };
    c.bench_function("normalize_arrays_1024", |b| {
        b.iter(|| {
            let _ = normalize(envelope.clone(), 1, RowMode::Arrays);
        })
    });
}

criterion_group!(queries, bench_query_build, bench_transform_search, bench_normalize_arrays);
criterion_main!(queries);
