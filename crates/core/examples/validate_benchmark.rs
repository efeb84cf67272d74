//! Lightweight symbol-table/validate benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p z80lint_core --example validate_benchmark --release`

use std::fs;
use std::time::Instant;

use z80lint_core::{DialectId, Grammar, SymbolTable, split_lines, validate};

fn run_benchmark(label: &str, input: &str, grammar: &Grammar, iterations: usize) {
    let lines = split_lines(input);

    let symbols_start = Instant::now();
    for _ in 0..iterations {
        let _ = SymbolTable::build(&lines, grammar);
    }
    let symbols_elapsed = symbols_start.elapsed();

    let validate_start = Instant::now();
    let mut issues = 0usize;
    for _ in 0..iterations {
        issues = validate(input, grammar).issues.len();
    }
    let validate_elapsed = validate_start.elapsed();

    println!("Benchmark: {label}");
    println!("  input_bytes: {}, lines: {}, issues: {issues}", input.len(), lines.len());
    println!(
        "  symbols:  total={:?}, per_iter={:.3} ms",
        symbols_elapsed,
        symbols_elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
    println!(
        "  validate: total={:?}, per_iter={:.3} ms",
        validate_elapsed,
        validate_elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
}

fn main() -> Result<(), String> {
    let grammar = Grammar::builtin(DialectId::Z80).map_err(|e| e.to_string())?;
    let iterations = std::env::var("Z80LINT_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(500);

    let sample_paths = [
        ("hello", "samples/hello.asm"),
        ("structs", "samples/structs.asm"),
    ];

    let mut combined = String::new();
    for (label, path) in sample_paths {
        let input = fs::read_to_string(path)
            .map_err(|e| format!("failed to read sample '{}': {e}", path))?;
        run_benchmark(label, &input, grammar, iterations);
        combined.push_str(&input);
    }

    // Many copies of the samples: every label turns into a duplicate.
    let large = combined.repeat(50);
    run_benchmark("combined_x50", &large, grammar, iterations / 10 + 1);

    Ok(())
}
