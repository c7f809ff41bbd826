//! shapecheck CLI — driving adapter for the shapecheck matcher.
//!
//! Subcommands:
//! - `check <value> <pattern>` — match a value document against a pattern document
//! - `predicates` — print registered predicate names
//!
//! Exit codes: `0` match, `1` mismatch or debug dump, `2` usage or load error.

use std::path::Path;
use std::process;

use shapecheck::{matches, MatchOutcome, Registry, Value};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(2);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "predicates" => cmd_predicates(),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(true)
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(2);
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

/// Returns `Ok(true)` on a match.
fn cmd_check(args: &[String]) -> Result<bool, String> {
    let [value_path, pattern_path] = args else {
        return Err("check requires a value file and a pattern file".into());
    };

    let outcome = check(&build_registry(), value_path, pattern_path)?;
    println!("{outcome}");
    Ok(outcome.is_match())
}

#[allow(clippy::unnecessary_wraps)] // Uniform return type for all commands
fn cmd_predicates() -> Result<bool, String> {
    let registry = build_registry();

    println!("Registered predicates:");
    for name in registry.names() {
        println!("  {name}");
    }

    Ok(true)
}

fn check(registry: &Registry, value_path: &str, pattern_path: &str) -> Result<MatchOutcome, String> {
    let value = Value::from(load_document(value_path)?);
    let pattern = registry
        .load_pattern(&load_document(pattern_path)?)
        .map_err(|e| format!("pattern invalid: {e}"))?;

    tracing::debug!(value = value_path, pattern = pattern_path, "documents loaded");
    Ok(matches(&value, &pattern))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry assembly (composition root)
// ═══════════════════════════════════════════════════════════════════════════════

fn build_registry() -> Registry {
    let builder = shapecheck::RegistryBuilder::new();
    shapecheck_test::register(builder).build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Document loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_document(path: &str) -> Result<serde_json::Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error in \"{path}\": {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error in \"{path}\": {e}"))
    }
}

fn print_usage() {
    eprintln!(
        "Usage: shapecheck <command> [options]

Commands:
  check <value> <pattern>   Match a value document against a pattern document
  predicates                Print registered predicate names
  help                      Show this help

Documents are JSON (.json) or YAML (anything else).
Exit codes: 0 match, 1 mismatch, 2 error. Set RUST_LOG for diagnostics."
    );
}
