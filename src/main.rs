use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

use db_explorer::api::{HttpTransport, UploadForm};
use db_explorer::config::Config;
use db_explorer::models::{BackendKind, QueryConstruct};
use db_explorer::services::{StatusMessage, WorkflowController};
use db_explorer::services::dialect::constructs_for;

#[derive(Debug, Parser)]
#[command(name = "db-explorer", version, about = "Explore relational and document databases through one workflow")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the query constructs offered for a backend
    Constructs {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
    },
    /// List tables or collections
    Tables {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
    },
    /// Show the schema of a table or collection
    Schema {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
        object: String,
    },
    /// Show sample rows or documents
    Preview {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
        object: String,
    },
    /// Generate sample queries for a construct
    Samples {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
        object: String,
        #[arg(value_parser = parse_construct)]
        construct: QueryConstruct,
        /// Execute the Nth generated query (1-based)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        run: Option<u64>,
    },
    /// Execute a query: SQL text, or a JSON filter/pipeline for documents
    Query {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
        object: String,
        query: String,
    },
    /// Translate a natural-language question into a query
    Ask {
        #[arg(value_parser = parse_backend)]
        backend: BackendKind,
        object: String,
        text: String,
        /// Execute the translated query
        #[arg(long)]
        execute: bool,
    },
    /// Upload a CSV or JSON dataset
    Upload {
        file: PathBuf,
        table: String,
    },
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    BackendKind::from_str(s).map_err(|e| e.to_string())
}

fn parse_construct(s: &str) -> Result<QueryConstruct, String> {
    QueryConstruct::from_str(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize logging on stderr so stdout carries only rendered output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_ansi(config.logging.style != "never")
        .with_writer(std::io::stderr)
        .init();

    let transport = HttpTransport::new(&config).map_err(|e| {
        error!("Failed to create HTTP client: {}", e);
        e
    })?;
    let controller = WorkflowController::new(Arc::new(transport));
    tracing::debug!("Started session {} against {}", controller.session_id(), config.server.base_url);

    let status = run(&controller, cli.command).await?;
    Ok(if status.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Drive one workflow session and print what it produced
async fn run(controller: &WorkflowController, command: Command) -> anyhow::Result<StatusMessage> {
    let status = match command {
        Command::Constructs { backend } => {
            for construct in constructs_for(backend) {
                println!("{}", construct);
            }
            StatusMessage::info(format!("{} constructs for {}", constructs_for(backend).len(), backend))
        }
        Command::Tables { backend } => {
            let status = controller.select_backend(backend).await;
            for object in controller.snapshot().await.objects {
                println!("{}", object);
            }
            status
        }
        Command::Schema { backend, object } => {
            let status = open_object(controller, backend, &object).await;
            if status.is_failure() {
                status
            } else {
                let status = controller.load_schema().await;
                if let Some(schema) = controller.snapshot().await.schema {
                    println!("{}", schema.to_pretty_string());
                }
                status
            }
        }
        Command::Preview { backend, object } => {
            let status = open_object(controller, backend, &object).await;
            if status.is_failure() {
                status
            } else {
                let status = controller.load_preview().await;
                if let Some(preview) = controller.snapshot().await.preview {
                    print!("{}", preview);
                }
                status
            }
        }
        Command::Samples { backend, object, construct, run } => {
            let status = open_object(controller, backend, &object).await;
            if status.is_failure() {
                return Ok(report(status));
            }
            let status = controller.load_schema().await;
            if status.is_failure() {
                return Ok(report(status));
            }

            let status = controller.generate_queries(construct).await;
            if let Some(samples) = controller.snapshot().await.sample_queries {
                print!("{}", samples);
            }

            match run {
                Some(n) if !status.is_failure() => {
                    if let Err(status) = controller.use_sample_query((n - 1) as usize).await {
                        return Ok(report(status));
                    }
                    execute_and_print(controller).await
                }
                _ => status,
            }
        }
        Command::Query { backend, object, query } => {
            let status = open_object(controller, backend, &object).await;
            if status.is_failure() {
                status
            } else {
                controller.set_query_input(&query).await;
                execute_and_print(controller).await
            }
        }
        Command::Ask { backend, object, text, execute } => {
            let status = open_object(controller, backend, &object).await;
            if status.is_failure() {
                return Ok(report(status));
            }

            let status = controller.translate(&text).await;
            if let Some(card) = controller.snapshot().await.translation_card {
                print!("{}", card);
            }

            if execute && !status.is_failure() {
                let status = controller.promote_translation().await;
                if let Some(result) = controller.snapshot().await.result {
                    print!("{}", result);
                }
                status
            } else {
                status
            }
        }
        Command::Upload { file, table } => {
            let form = UploadForm::from_path(&file, &table)
                .await
                .with_context(|| format!("Failed to prepare upload of {}", file.display()))?;
            controller.upload_dataset(form).await
        }
    };

    Ok(report(status))
}

/// Select the backend, then the object, without requiring the object to be listed
async fn open_object(controller: &WorkflowController, backend: BackendKind, object: &str) -> StatusMessage {
    let status = controller.select_backend(backend).await;
    if status.is_failure() {
        return status;
    }
    controller.select_object(object).await
}

async fn execute_and_print(controller: &WorkflowController) -> StatusMessage {
    let status = controller.execute_query().await;
    if let Some(result) = controller.snapshot().await.result {
        // The rendered result already leads with the status line
        if !status.is_failure() {
            print!("{}", result);
        }
    }
    status
}

fn report(status: StatusMessage) -> StatusMessage {
    if status.is_failure() {
        eprintln!("{}", status);
    }
    status
}
