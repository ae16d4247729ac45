//! OutOfBound rule harness
//!
//! Loads a rule configuration, then evaluates one JSON values document
//! per line of standard input and prints the verdict and reason.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use outofbound::config::RULE_CONFIG_ITEM;
use outofbound::{
    plugin_eval, plugin_init_with, plugin_reason, plugin_shutdown, plugin_triggers,
    ConfigCategory, DatapointPolicy, EngineConfig, VerdictPolicy,
};

/// Harness configuration
struct Config {
    /// File with either a configuration category or a bare rules document
    config_path: Option<PathBuf>,
    /// Evaluation policies
    engine: EngineConfig,
    /// Print the triggers document and exit
    triggers_only: bool,
}

fn parse_policy(value: &str) -> Option<(VerdictPolicy, DatapointPolicy)> {
    match value {
        "last-write" => Some((VerdictPolicy::LastWrite, DatapointPolicy::LastWrite)),
        "and" => Some((VerdictPolicy::LogicalAnd, DatapointPolicy::LogicalAnd)),
        _ => None,
    }
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut config = Config {
        config_path: None,
        engine: EngineConfig::default(),
        triggers_only: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("error: --config requires a value");
                    std::process::exit(1);
                }
            }
            "--policy" | "-p" => {
                if i + 1 < args.len() {
                    let Some((verdict, datapoint)) = parse_policy(&args[i + 1]) else {
                        eprintln!("error: invalid policy: {}", args[i + 1]);
                        std::process::exit(1);
                    };
                    config.engine.verdict_policy = verdict;
                    config.engine.datapoint_policy = datapoint;
                    i += 2;
                } else {
                    eprintln!("error: --policy requires a value");
                    std::process::exit(1);
                }
            }
            "--triggers" | "-t" => {
                config.triggers_only = true;
                i += 1;
            }
            "--help" | "-h" => {
                println!("outofbound-eval - evaluate the OutOfBound rule against JSON values");
                println!();
                println!("USAGE:");
                println!("    outofbound-eval --config <FILE> [OPTIONS] < values.jsonl");
                println!();
                println!("OPTIONS:");
                println!("    -c, --config <FILE>       Configuration category or rules document");
                println!("    -p, --policy <POLICY>     last-write | and [default: last-write]");
                println!("    -t, --triggers            Print the triggers document and exit");
                println!("    -h, --help                Print help information");
                std::process::exit(0);
            }
            arg => {
                eprintln!("error: unknown argument: {}", arg);
                std::process::exit(1);
            }
        }
    }

    config
}

/// Accepts a full category or a bare `{"rules": [...]}` document.
fn load_category(text: &str) -> Result<ConfigCategory, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if value.get("rules").is_some() {
        return Ok(ConfigCategory::new("outofbound").with_item(RULE_CONFIG_ITEM, text));
    }
    Ok(ConfigCategory::from_value("outofbound", value)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    outofbound::logging::init_tracing();
    let config = parse_args();

    let Some(path) = config.config_path else {
        eprintln!("error: --config is required");
        std::process::exit(1);
    };

    let category = load_category(&std::fs::read_to_string(&path)?)?;
    let rule = plugin_init_with(&category, config.engine);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", plugin_triggers(&rule))?;

    if !config.triggers_only {
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let verdict = plugin_eval(&rule, &line);
            writeln!(out, "{verdict} {}", plugin_reason(&rule))?;
        }
    }

    plugin_shutdown(rule);
    Ok(())
}
