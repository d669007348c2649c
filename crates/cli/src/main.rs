//! `rusty-automation-tool` CLI entry-point.
//!
//! Available sub-commands:
//! - `validate` — validate a workflow definition file, printing the wave order.
//! - `execute`  — validate, schedule, and run a workflow definition file.
//! - `serve`    — start the REST API server.
//! - `migrate`  — run pending database migrations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use contract::{ExecutionMode, UuidIdSource, WorkflowDefinition, WorkflowStep};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "rusty-automation-tool",
    about = "Contract-driven workflow executor",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// On-disk shape a `validate`/`execute` input file is expected to have:
/// a `WorkflowDefinition` plus its `WorkflowStep` list, the same pair
/// `engine::validate`/`engine::execute` take.
#[derive(serde::Deserialize)]
struct WorkflowFile {
    definition: WorkflowDefinition,
    steps: Vec<WorkflowStep>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a workflow definition file without running it.
    Validate {
        /// Path to a JSON file containing `{"definition": ..., "steps": [...]}`.
        path: PathBuf,
    },
    /// Validate, schedule, and execute a workflow definition file.
    Execute {
        /// Path to a JSON file containing `{"definition": ..., "steps": [...]}`.
        path: PathBuf,
        /// Override the definition's `execution_mode` for this run only.
        #[arg(long, value_enum)]
        mode: Option<CliExecutionMode>,
    },
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CliExecutionMode {
    Sequential,
    Parallel,
    Batch,
}

impl From<CliExecutionMode> for ExecutionMode {
    fn from(mode: CliExecutionMode) -> Self {
        match mode {
            CliExecutionMode::Sequential => ExecutionMode::Sequential,
            CliExecutionMode::Parallel => ExecutionMode::Parallel,
            CliExecutionMode::Batch => ExecutionMode::Batch,
        }
    }
}

fn load_workflow_file(path: &PathBuf) -> WorkflowFile {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read file {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("invalid workflow file: {e}"))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { path } => {
            let wf = load_workflow_file(&path);
            match engine::validate(&wf.definition, &wf.steps) {
                Ok(()) => {
                    let waves = engine::schedule(&wf.steps);
                    println!("workflow is valid, {} wave(s):", waves.len());
                    for (i, wave) in waves.iter().enumerate() {
                        println!("  wave {i}: {wave:?}");
                    }
                }
                Err(errors) => {
                    eprintln!("validation failed with {} error(s):", errors.0.len());
                    for err in &errors.0 {
                        eprintln!("  - {}", err.message);
                    }
                    std::process::exit(1);
                }
            }
        }
        Command::Execute { path, mode } => {
            let wf = load_workflow_file(&path);
            if let Err(errors) = engine::validate(&wf.definition, &wf.steps) {
                eprintln!("validation failed with {} error(s):", errors.0.len());
                for err in &errors.0 {
                    eprintln!("  - {}", err.message);
                }
                std::process::exit(1);
            }

            let id_source = UuidIdSource;
            let result = engine::execute(
                &wf.definition,
                &wf.steps,
                wf.definition.workflow_id,
                mode.map(ExecutionMode::from),
                &id_source,
            );

            println!("{}", serde_json::to_string_pretty(&result).expect("WorkflowResult is JSON-serializable"));
        }
        Command::Serve { bind, database_url } => {
            info!("Starting API server on {bind}");
            let pool = db::pool::create_pool(&database_url, 10)
                .await
                .expect("failed to connect to database");
            api::serve(&bind, pool).await.expect("server error");
        }
        Command::Migrate { database_url } => {
            info!("Running migrations against {database_url}");
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .expect("failed to connect to database");
            db::pool::run_migrations(&pool).await.expect("migration failed");
            info!("Migrations applied successfully");
        }
    }
}
