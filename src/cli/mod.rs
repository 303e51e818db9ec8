//! PP-013: CLI subcommands — init, validate, feedback, graph, retry, batch, schema.

use crate::core::{
    cycles, feedback, graph::DependencyGraph, parser, procedure, retry, sequencer, types,
    validator, workspace,
};
use clap::Subcommand;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new plan directory
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate a plan's operation graph
    Validate {
        /// Path to plan.yaml (YAML or JSON)
        #[arg(short, long, default_value = "plan.yaml")]
        file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print correction feedback for a failed plan
    Feedback {
        /// Path to plan.yaml
        #[arg(short, long, default_value = "plan.yaml")]
        file: PathBuf,
    },

    /// Show producers, consumers, dependency edges, and cycles
    Graph {
        /// Path to plan.yaml
        #[arg(short, long, default_value = "plan.yaml")]
        file: PathBuf,
    },

    /// Replay recorded generation attempts through the retry loop
    Retry {
        /// Plan providing the object inventory and policy
        #[arg(short, long, default_value = "plan.yaml")]
        file: PathBuf,

        /// Operation documents, one per attempt, in order
        #[arg(short, long, num_args = 1.., required = true)]
        candidates: Vec<PathBuf>,

        /// Override policy.max_attempts
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Workspace directory for attempt artifacts and journal
        #[arg(long, default_value = "workspace")]
        workspace: PathBuf,
    },

    /// Validate every task of a JSONL file
    Batch {
        /// Input JSONL (`{"id": ..., "plan": {...}}` per line)
        input: PathBuf,

        /// Output JSONL (`{"id": ..., "report": {...}}` per line)
        output: PathBuf,
    },

    /// Print the JSON Schema of the plan document
    Schema,
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file, json } => cmd_validate(&file, json),
        Commands::Feedback { file } => cmd_feedback(&file),
        Commands::Graph { file } => cmd_graph(&file),
        Commands::Retry {
            file,
            candidates,
            max_attempts,
            workspace,
        } => cmd_retry(&file, &candidates, max_attempts, &workspace),
        Commands::Batch { input, output } => cmd_batch(&input, &output),
        Commands::Schema => cmd_schema(),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let plan_path = path.join("plan.yaml");
    if plan_path.exists() {
        return Err(format!("{} already exists", plan_path.display()));
    }

    let ws = path.join("workspace");
    std::fs::create_dir_all(&ws).map_err(|e| format!("cannot create workspace: {}", e))?;

    let template = r#"identified_objects:
  initial:
    - objects/initial/stock.reagent
  intermediate:
    - objects/intermediate/diluted.sample
  final:
    - objects/final/result.image

operations:
  - operation_id: dilute
    input: [objects/initial/stock.reagent]
    output: [objects/intermediate/diluted.sample]
  - operation_id: image
    input: [objects/intermediate/diluted.sample]
    output: [objects/final/result.image]

policy:
  max_attempts: 3
"#;
    std::fs::write(&plan_path, template)
        .map_err(|e| format!("cannot write {}: {}", plan_path.display(), e))?;

    println!("Initialized plan at {}", path.display());
    println!("  Created: {}", plan_path.display());
    println!("  Created: {}/", ws.display());
    Ok(())
}

fn cmd_validate(file: &Path, json: bool) -> Result<(), String> {
    let plan = parser::parse_plan_file(file)?;
    let report = validator::validate_plan(&plan);

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
        if report.is_valid() {
            let ordered = procedure::ordered_operations(&plan.operations, &report)?;
            println!();
            println!("{}", procedure::render_outline(&ordered));
        }
    }

    if report.is_valid() {
        Ok(())
    } else {
        Err(format!("{} validation error(s)", report.errors().len()))
    }
}

/// Display a report summary.
fn print_report(report: &types::ValidationReport) {
    for e in report.errors() {
        eprintln!("  ERROR: {}", e);
    }
    for w in report.warnings() {
        eprintln!("  WARN:  {}", w);
    }
    if report.is_valid() {
        println!(
            "OK: {} operation(s), {} warning(s)",
            report.execution_order().len(),
            report.warnings().len()
        );
    } else {
        println!(
            "INVALID: {} error(s), {} warning(s)",
            report.errors().len(),
            report.warnings().len()
        );
    }
}

fn cmd_feedback(file: &Path) -> Result<(), String> {
    let plan = parser::parse_plan_file(file)?;
    let report = validator::validate_plan(&plan);
    match feedback::format_feedback(&report) {
        Some(text) => println!("{}", text),
        None => println!("Plan is valid; no feedback."),
    }
    Ok(())
}

fn cmd_graph(file: &Path) -> Result<(), String> {
    let plan = parser::parse_plan_file(file)?;
    let graph = DependencyGraph::build(&plan.operations);

    println!("Producers:");
    for (obj, op) in graph.producers() {
        println!("  {} <- {}", obj, op);
    }
    println!("Consumers:");
    for (obj, ops) in graph.consumers() {
        println!("  {} -> {}", obj, ops.join(", "));
    }
    println!("Dependencies ({} edge(s)):", graph.edge_count());
    for (obj, deps) in graph.edges() {
        let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
        println!("  {} needs {}", obj, deps.join(", "));
    }

    let found = cycles::detect_cycles(&graph);
    if found.is_empty() {
        println!("Cycles: none");
    } else {
        println!("Cycles:");
        for cycle in &found {
            println!("  {}", cycles::format_cycle(cycle));
        }
    }

    let order = sequencer::object_dependency_order(&graph);
    println!(
        "Object order (products before inputs){}:",
        if order.complete { "" } else { " [incomplete]" }
    );
    for obj in &order.objects {
        println!("  {}", obj);
    }
    Ok(())
}

fn cmd_retry(
    file: &Path,
    candidates: &[PathBuf],
    max_attempts: Option<u32>,
    ws: &Path,
) -> Result<(), String> {
    let plan = parser::parse_plan_file(file)?;
    let mut policy = plan.policy.clone();
    if let Some(n) = max_attempts {
        policy.max_attempts = n;
    }

    let mut generator = retry::ReplayGenerator::from_files(candidates)?;
    let mut recorder = workspace::WorkspaceRecorder::start(ws, &policy)?;
    let outcome = retry::run_with_retry(
        &mut generator,
        &plan.identified_objects,
        &policy,
        &mut recorder,
    )?;
    recorder.finish(&outcome)?;

    for a in &outcome.attempts {
        println!(
            "attempt {}: {} ({} error(s), {} warning(s)){}",
            a.attempt,
            if a.valid { "valid" } else { "invalid" },
            a.error_count,
            a.warning_count,
            if a.repeated { " [repeated]" } else { "" }
        );
    }
    println!();
    println!("{}", outcome.report.to_json()?);
    println!("Run {} recorded in {}", recorder.run_id(), ws.display());

    if outcome.is_valid() {
        Ok(())
    } else {
        Err(format!(
            "plan still invalid after {} attempt(s)",
            outcome.attempts.len()
        ))
    }
}

fn cmd_batch(input: &Path, output: &Path) -> Result<(), String> {
    let file = std::fs::File::open(input)
        .map_err(|e| format!("cannot open {}: {}", input.display(), e))?;
    let reader = std::io::BufReader::new(file);

    let mut results = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("read error {}: {}", input.display(), e))?;
        if line.trim().is_empty() {
            continue;
        }
        let (id, plan) = parser::parse_task_line(&line);
        let result = match plan {
            Ok(plan) => {
                let report = validator::validate_plan(&plan);
                println!(
                    "{}: {}",
                    id,
                    if report.is_valid() { "valid" } else { "invalid" }
                );
                types::TaskResult {
                    id,
                    report: Some(report),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(line = lineno + 1, task = %id, error = %e, "skipping malformed task");
                eprintln!("  ERROR: {} (line {}): {}", id, lineno + 1, e);
                types::TaskResult {
                    id,
                    report: None,
                    error: Some(e),
                }
            }
        };
        results.push(result);
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
    }
    let mut out = std::fs::File::create(output)
        .map_err(|e| format!("cannot create {}: {}", output.display(), e))?;
    for result in &results {
        let json =
            serde_json::to_string(result).map_err(|e| format!("JSON serialize error: {}", e))?;
        writeln!(out, "{}", json).map_err(|e| format!("write error: {}", e))?;
    }

    println!(
        "{} task(s) processed, results saved to {}",
        results.len(),
        output.display()
    );
    Ok(())
}

fn cmd_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(types::PlanDocument);
    let json =
        serde_json::to_string_pretty(&schema).map_err(|e| format!("JSON serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}
