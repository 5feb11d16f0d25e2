use clap::Parser;
use kensa::prelude::*;
use kensa::wire;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Validate a generated workflow graph and repair its variable references
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow JSON file (a markdown-fenced block is accepted)
    workflow_path: String,

    /// Optional engine config JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Additional device kind the platform accepts (repeatable)
    #[arg(short = 'd', long = "device-kind")]
    device_kinds: Vec<String>,

    /// Only validate; leave the graph untouched
    #[arg(long)]
    no_repair: bool,

    /// Write the repaired graph to this path
    #[arg(short, long)]
    output: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Loading ---
    let text = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            &cli.workflow_path, e
        ))
    });
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EngineConfig::default(),
    };
    config.device_kinds.extend(cli.device_kinds.iter().cloned());

    let mut graph = parse_workflow(&text)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse workflow: {}", e)));
    println!(
        "Loaded workflow with {} nodes and {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );

    // --- 2. Validation and repair ---
    let pipeline = Pipeline::from_config(config);
    let outcome = if cli.no_repair {
        pipeline.check(&graph)
    } else {
        pipeline.run(&mut graph)
    };

    // --- 3. Report ---
    print_outcome(&outcome);

    if let Some(path) = &cli.output {
        let json = wire::to_json_string_pretty(&graph)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize graph: {}", e)));
        fs::write(path, json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", path, e)));
        println!("Wrote graph to '{}'", path);
    }

    println!("\nFinished in {:?}", total_start.elapsed());

    if !outcome.is_clean() {
        std::process::exit(1);
    }
}

fn print_outcome(outcome: &PipelineOutcome) {
    let report = &outcome.report;

    if report.errors().is_empty() {
        println!("\nNo errors.");
    } else {
        println!("\nErrors ({}):", report.errors().len());
        for diagnostic in report.errors() {
            println!("  [{}] {}", diagnostic.code(), diagnostic);
        }
    }
    if !report.warnings().is_empty() {
        println!("\nWarnings ({}):", report.warnings().len());
        for diagnostic in report.warnings() {
            println!("  [{}] {}", diagnostic.code(), diagnostic);
        }
    }

    match &outcome.repair {
        RepairStatus::Completed(repair) => {
            println!("\nRepair: rewrote {} nodeCode pointer(s)", repair.repaired);
            for unresolved in &repair.unresolved {
                println!(
                    "  unresolved '{}' at {} in node '{}'",
                    unresolved.variable_id, unresolved.location, unresolved.node_id
                );
            }
        }
        RepairStatus::Skipped(SkipReason::NotRequested) => println!("\nRepair: not requested"),
        RepairStatus::Skipped(SkipReason::FatalStructure) => {
            println!("\nRepair: skipped because of structural errors")
        }
        RepairStatus::Skipped(SkipReason::Unordered(e)) => println!("\nRepair: skipped ({})", e),
        RepairStatus::Failed(e) => println!("\nRepair: failed ({})", e),
    }

    println!("\nResult: {}", verdict(outcome));
}

/// The one-word result line. A failed repair is never reported as valid.
fn verdict(outcome: &PipelineOutcome) -> &'static str {
    if outcome.is_clean() {
        "valid"
    } else if matches!(outcome.repair, RepairStatus::Failed(_)) {
        "repair failed"
    } else {
        "invalid"
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
