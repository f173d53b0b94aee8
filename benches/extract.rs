use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use tinytiles::parse::{parse_filter, parse_style};

/// A style with `n` layers, each filtering on a few fields through nested logic.
fn build_style(n: usize) -> String {
    let layers: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "id": format!("layer-{i}"),
                "source-layer": format!("source-{}", i % 12),
                "filter": ["all",
                    ["==", format!("class{}", i % 20), "motorway"],
                    ["any", ["has", "bridge"], ["in", format!("rank{}", i % 7), 1, 2, 3]],
                    ["none", ["!=", "tunnel", true]]
                ]
            })
        })
        .collect();
    json!({ "version": 8, "layers": layers }).to_string()
}

fn bench_parse_style(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_style");

    for &n in &[10, 100, 500] {
        let style = build_style(n);
        group.bench_function(&format!("{n}_layers"), |b| {
            b.iter(|| parse_style(black_box(&style)).unwrap());
        });
    }

    group.finish();
}

fn bench_collect_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_fields");

    for &depth in &[2, 8, 32] {
        let mut doc = json!(["==", "class", "motorway"]);
        for i in 0..depth {
            doc = json!(["all", doc, ["has", format!("f{i}")]]);
        }
        let filter = parse_filter(&doc).unwrap();
        group.bench_function(&format!("depth_{depth}"), |b| {
            b.iter(|| black_box(&filter).fields());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_style, bench_collect_fields);
criterion_main!(benches);
