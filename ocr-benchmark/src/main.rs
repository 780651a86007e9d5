//! OCR Benchmark CLI

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ocr_benchmark::{
    config::Config,
    dataset::load_documents,
    reporting::{
        create_run_folder, list_runs, load_run, print_summary, write_results,
        RUN_TIMESTAMP_FORMAT,
    },
    runner::{ConsoleProgress, Executor, ExecutorConfig},
};

#[derive(Parser)]
#[command(name = "ocr-benchmark")]
#[command(about = "OCR and structured-extraction benchmark across model providers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the benchmark over the data directory
    Run {
        /// Data directory with document JSON files (overrides config)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Results directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only run pipelines whose label contains one of these
        /// comma-separated names
        #[arg(short, long)]
        models: Option<String>,
    },

    /// List configured model pipelines
    ListModels,

    /// Summarize a persisted run
    Report {
        /// Run timestamp (defaults to the newest run)
        #[arg(short, long)]
        run: Option<String>,

        /// Results directory (overrides config)
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },

    /// Write a sample configuration file
    InitConfig {
        /// Output path for the configuration file
        #[arg(short, long, default_value = "benchmark.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("ocr_benchmark=debug,info")
    } else {
        EnvFilter::new("ocr_benchmark=info,warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default(),
    };

    match cli.command {
        Commands::Run {
            data_dir,
            output,
            models,
        } => run_benchmark(config, data_dir, output, models).await?,

        Commands::ListModels => list_models(&config),

        Commands::Report { run, results_dir } => generate_report(&config, run, results_dir)?,

        Commands::InitConfig { output } => {
            Config::sample().save_toml(&output)?;
            println!("Wrote sample configuration to {}", output.display());
        }
    }

    Ok(())
}

async fn run_benchmark(
    config: Config,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    models_filter: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let run_id = Utc::now().format(RUN_TIMESTAMP_FORMAT).to_string();

    println!("=== OCR Benchmark ===");
    println!("Run ID: {}", run_id);

    let models = match &models_filter {
        Some(filter) => {
            let names: Vec<&str> = filter.split(',').map(str::trim).collect();
            config
                .models
                .iter()
                .filter(|spec| {
                    let label = spec.label();
                    names.iter().any(|name| label.contains(name))
                })
                .cloned()
                .collect()
        }
        None => config.models.clone(),
    };

    if models.is_empty() {
        eprintln!("Error: no model pipelines configured.");
        eprintln!("Create a benchmark.toml (see `ocr-benchmark init-config`) or relax --models.");
        std::process::exit(2);
    }

    for spec in &models {
        println!("  {}", spec.label());
    }

    let data_dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.benchmark.data_dir));
    let documents = load_documents(&data_dir)?;
    if documents.is_empty() {
        eprintln!("Error: no documents found in {}", data_dir.display());
        std::process::exit(1);
    }
    println!("Documents: {}\n", documents.len());

    let executor =
        Executor::new(ExecutorConfig::from_config(&config)).with_progress(Arc::new(ConsoleProgress));
    let results = executor.run(&models, &documents).await;

    let results_dir = output.unwrap_or_else(|| PathBuf::from(&config.benchmark.results_dir));
    let folder = create_run_folder(&results_dir, &run_id)?;
    let results_path = folder.join("results.json");
    write_results(&results_path, &results)?;

    print_summary(&results);
    println!("Results written to {}", results_path.display());

    Ok(())
}

fn list_models(config: &Config) {
    if config.models.is_empty() {
        println!("No model pipelines configured.");
        return;
    }
    println!("Configured pipelines:");
    for spec in &config.models {
        println!("  {}", spec.label());
    }
}

fn generate_report(
    config: &Config,
    run: Option<String>,
    results_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let results_dir = results_dir.unwrap_or_else(|| PathBuf::from(&config.benchmark.results_dir));

    let timestamp = match run {
        Some(timestamp) => timestamp,
        None => {
            let runs = list_runs(&results_dir);
            match runs.first() {
                Some(latest) => latest.timestamp.clone(),
                None => {
                    eprintln!("Error: no runs found in {}", results_dir.display());
                    std::process::exit(1);
                }
            }
        }
    };

    let results = load_run(&results_dir, &timestamp)?;
    println!("Run: {}", timestamp);
    print_summary(&results);

    Ok(())
}
