//! OPLAW CLI — load operator laws and evaluate expressions.
//!
//! Usage:
//!   oplaw solve --problem "Part A" --test "6 ⊕ 6"
//!   oplaw eval --rules demos/hilbert_a.oplaw "6 ⊕ 6" "22 buO 0"
//!   oplaw check demos/hilbert_b.oplaw

use clap::{Parser, Subcommand};
use std::fs;

use oplaw::engine::RuleEngine;
use oplaw::provider::{MockProvider, RuleProvider};

#[derive(Parser)]
#[command(name = "oplaw", version, about = "OPLAW — runtime-defined operator laws")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the provider for a rule bundle, load it, and evaluate
    Solve {
        /// Problem statement handed to the provider
        #[arg(short, long)]
        problem: String,
        /// Extra expressions to evaluate after the bundle's own evals
        #[arg(short, long = "test")]
        tests: Vec<String>,
        /// Skip the bundle's own evals
        #[arg(long)]
        no_evals: bool,
    },
    /// Load a directive file and evaluate expressions against it
    Eval {
        /// Path to a directive file
        #[arg(short, long)]
        rules: String,
        /// Expressions like "3 ⊕ 7"
        #[arg(required = true)]
        exprs: Vec<String>,
    },
    /// Parse a directive file and report the resulting registry
    Check {
        /// Path to a directive file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { problem, tests, no_evals } => cmd_solve(&problem, &tests, no_evals),
        Commands::Eval { rules, exprs } => cmd_eval(&rules, &exprs),
        Commands::Check { file } => cmd_check(&file),
    }
}

fn cmd_solve(problem: &str, tests: &[String], no_evals: bool) {
    let provider = MockProvider;
    let bundle = match provider.solve(problem) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Provider error: {}", e);
            std::process::exit(1);
        }
    };

    if bundle.dsl.trim().is_empty() {
        eprintln!("Provider returned no DSL. Stopping.");
        std::process::exit(1);
    }

    println!("=== PROVIDER RULES ===");
    println!("{}", bundle.dsl);
    println!("======================");

    let mut engine = RuleEngine::new();
    if let Err(e) = engine.load_rules(&bundle.dsl) {
        eprintln!("Directive error: {}", e);
        std::process::exit(1);
    }
    drain_warnings(&mut engine);

    if !no_evals {
        for expr in &bundle.evals {
            report(&mut engine, "EVAL", expr);
        }
    }
    for expr in tests {
        report(&mut engine, "TEST", expr);
    }

    if !bundle.final_answer.is_empty() {
        println!();
        println!("=== PROPOSED SOLUTION ===");
        println!("{}", bundle.final_answer);
    }
}

fn cmd_eval(rules_path: &str, exprs: &[String]) {
    let source = read_or_exit(rules_path);

    let mut engine = RuleEngine::new();
    if let Err(e) = engine.load_rules(&source) {
        eprintln!("Directive error: {}", e);
        std::process::exit(1);
    }
    drain_warnings(&mut engine);

    for expr in exprs {
        report(&mut engine, "EVAL", expr);
    }
}

fn cmd_check(path: &str) {
    let source = read_or_exit(path);

    let mut engine = RuleEngine::new();
    if let Err(e) = engine.load_rules(&source) {
        eprintln!("Directive error: {}", e);
        std::process::exit(1);
    }
    drain_warnings(&mut engine);

    let ops = engine.operations();
    println!("OK: {} operation(s)", ops.len());
    for (symbol, law_count, enabled) in ops {
        let shape = if law_count == 1 { "single".to_string() } else { format!("{law_count} laws") };
        let state = if enabled { "enabled" } else { "disabled" };
        println!("  {symbol}: {shape}, {state}");
    }
}

/// Evaluate one expression and print the outcome; per-expression errors
/// never abort the batch.
fn report(engine: &mut RuleEngine, tag: &str, expr: &str) {
    match engine.evaluate(expr) {
        Ok(value) => println!("[{tag}] {expr} => {value}"),
        Err(e) => println!("[{tag}] {expr} => ERROR: {e}"),
    }
    drain_warnings(engine);
}

fn drain_warnings(engine: &mut RuleEngine) {
    for warning in engine.take_warnings() {
        eprintln!("[warn] {}", warning);
    }
}

fn read_or_exit(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    }
}
