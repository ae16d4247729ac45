use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};

use outofbound::{NotificationRule, OutOfBoundRule};

fn rules(assets: usize) -> String {
    let rules: Vec<_> = (0..assets)
        .map(|a| {
            json!({
                "asset": {"name": format!("asset{a:02}")},
                "datapoints": [{"name": "v", "trigger_value": 10}],
                "evaluation_data": {"value": "Window"},
                "window_data": {"value": "Average"},
                "time_interval": 30
            })
        })
        .collect();
    json!({ "rules": rules }).to_string()
}

#[test]
fn readers_never_observe_a_partial_store() {
    let rule = Arc::new(OutOfBoundRule::new());
    rule.configure_rules(&rules(8)).unwrap();

    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let rule = Arc::clone(&rule);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let docs = [rules(8), rules(16)];
            let mut i = 0usize;
            while !stop.load(Ordering::Acquire) {
                rule.configure_rules(&docs[i % 2]).unwrap();
                i += 1;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || {
                for _ in 0..500 {
                    let doc: Value = serde_json::from_str(&NotificationRule::triggers(&*rule)).unwrap();
                    let count = doc["triggers"].as_array().unwrap().len();
                    assert!(count == 8 || count == 16, "observed {count} assets");
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    writer.join().unwrap();
}

#[test]
fn eval_runs_alongside_reconfigure() {
    let rule = Arc::new(OutOfBoundRule::new());
    rule.configure_rules(&rules(4)).unwrap();

    let values = json!({
        "asset00": {"v": 20},
        "asset01": {"v": 20},
        "asset02": {"v": 20},
        "asset03": {"v": 20}
    })
    .to_string();

    let writer = {
        let rule = Arc::clone(&rule);
        thread::spawn(move || {
            for _ in 0..200 {
                rule.configure_rules(&rules(4)).unwrap();
            }
        })
    };

    let evaluator = {
        let rule = Arc::clone(&rule);
        thread::spawn(move || {
            for _ in 0..200 {
                assert!(NotificationRule::eval(&*rule, &values));
            }
        })
    };

    writer.join().unwrap();
    evaluator.join().unwrap();
    assert_eq!(rule.asset_count().unwrap(), 4);
}
