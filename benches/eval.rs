use std::time::Instant;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use serde_json::json;

use outofbound::OutOfBoundRule;

fn rules_document(assets: usize, datapoints: usize) -> String {
    let rules: Vec<_> = (0..assets)
        .map(|a| {
            let dps: Vec<_> = (0..datapoints)
                .map(|d| json!({"name": format!("dp{d}"), "type": "float", "trigger_value": 100.0}))
                .collect();
            json!({
                "asset": {"name": format!("asset{a}")},
                "datapoints": dps,
                "eval_all_datapoints": true
            })
        })
        .collect();
    json!({ "rules": rules }).to_string()
}

fn values_document(assets: usize, datapoints: usize) -> String {
    let mut doc = serde_json::Map::new();
    for a in 0..assets {
        let mut values = serde_json::Map::new();
        for d in 0..datapoints {
            // Alternate scalar and window values so both paths are measured.
            let v = if d % 2 == 0 {
                json!(150.0)
            } else {
                json!([10.0, 20.0, 150.0, 5.0])
            };
            values.insert(format!("dp{d}"), v);
        }
        doc.insert(format!("asset{a}"), serde_json::Value::Object(values));
    }
    serde_json::Value::Object(doc).to_string()
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");
    group.throughput(Throughput::Elements(1));

    for (assets, datapoints) in [(1, 1), (16, 8), (128, 16)] {
        let rule = OutOfBoundRule::new();
        rule.configure_rules(&rules_document(assets, datapoints)).unwrap();
        let values = values_document(assets, datapoints);

        group.bench_function(format!("{assets}x{datapoints}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    rule.eval(&values).unwrap();
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

fn bench_configure(c: &mut Criterion) {
    let mut group = c.benchmark_group("configure");
    group.throughput(Throughput::Elements(1));

    let rule = OutOfBoundRule::new();
    let doc = rules_document(64, 8);
    group.bench_function("64x8", |b| {
        b.iter(|| rule.configure_rules(&doc).unwrap());
    });

    group.finish();
}

criterion_group!(rule_benches, bench_eval, bench_configure);
criterion_main!(rule_benches);
