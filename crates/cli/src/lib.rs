//! CLI for offload-bench.
//!
//! This crate provides the `offload-bench` command: `compare` times the
//! benchmark conversation with and without accelerator offload, `profile`
//! times a single configuration, and `status` shows the resolved settings.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use offload_bench_adapters::{available_backends, loader_for};
use offload_bench_benchmarks::{
    io, markdown, report, run_comparison, ComparisonHarness, RunPlan,
};
use offload_bench_core::{BenchConfig, Offload, ProfileConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// offload-bench CLI.
#[derive(Parser, Debug)]
#[command(name = "offload-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file (default: ./offload-bench.toml if present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Time inference with accelerator offload, then CPU-only, and compare.
    ///
    /// Unless --no-write is given, results are written to:
    /// - <output>/raw/<id>.json - The comparison as JSON
    /// - <output>/all_results.json - Combined JSON file
    /// - <output>/summary.md - Markdown summary
    Compare {
        /// Engine settings.
        #[command(flatten)]
        engine: EngineArgs,

        /// Layers to offload in the accelerated run (-1 for all).
        #[arg(long, allow_hyphen_values = true)]
        gpu_layers: Option<i32>,

        /// Output directory override.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format printed to stdout.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Skip writing result files.
        #[arg(long)]
        no_write: bool,
    },

    /// Time model acquisition and inference for one configuration.
    Profile {
        /// Engine settings.
        #[command(flatten)]
        engine: EngineArgs,

        /// Accelerator offload: none, max, or a layer count.
        #[arg(long, default_value = "none", value_parser = parse_offload)]
        offload: Offload,

        /// Label for the run (default: the matching profile's label).
        #[arg(long)]
        label: Option<String>,

        /// Format printed to stdout.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show version, backends and configuration.
    Status {
        /// Print the fully resolved configuration.
        #[arg(short, long)]
        detailed: bool,
    },
}

/// Engine settings shared by `compare` and `profile`.
#[derive(Args, Debug, Default, Clone)]
pub struct EngineArgs {
    /// Engine backend (mistralrs, scripted).
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Model repository on the Hugging Face hub.
    #[arg(long)]
    pub repo_id: Option<String>,

    /// GGUF file inside the repository.
    #[arg(long)]
    pub filename: Option<String>,

    /// CPU threads.
    #[arg(short, long)]
    pub threads: Option<u32>,

    /// Context window in tokens.
    #[arg(long)]
    pub context_size: Option<u32>,
}

impl EngineArgs {
    /// Apply flags on top of loaded configuration.
    pub fn apply(&self, config: &mut BenchConfig) {
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        if let Some(repo_id) = &self.repo_id {
            config.model.repo_id = repo_id.clone();
        }
        if let Some(filename) = &self.filename {
            config.model.filename = filename.clone();
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(context_size) = self.context_size {
            config.context_size = context_size;
        }
    }
}

/// What `compare` and `profile` print.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report.
    Text,
    /// Markdown report.
    Markdown,
    /// Pretty-printed JSON.
    Json,
}

/// Parse `none`, `max`, or a layer count.
pub fn parse_offload(value: &str) -> std::result::Result<Offload, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "cpu" | "0" => Ok(Offload::None),
        "max" | "all" | "-1" => Ok(Offload::Max),
        other => other
            .parse::<u32>()
            .map(Offload::Layers)
            .map_err(|_| format!("expected none, max, or a layer count, got '{value}'")),
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
/// Logs go to stderr so reports on stdout stay clean.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse arguments from the process and run.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli).await
}

/// Run a parsed command line.
///
/// Configuration is loaded from `--config` (or `./offload-bench.toml`) and
/// the process environment.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = BenchConfig::load(cli.config.as_deref()).context("loading configuration")?;
    execute_with(cli, config).await
}

/// Run a parsed command line against an already loaded configuration.
///
/// `cli.config` is ignored; command-line overrides still apply.
pub async fn execute_with(cli: Cli, mut config: BenchConfig) -> Result<()> {
    match cli.command {
        Commands::Compare {
            engine,
            gpu_layers,
            output,
            format,
            no_write,
        } => {
            engine.apply(&mut config);
            if let Some(gpu_layers) = gpu_layers {
                config.accelerated.gpu_layers = gpu_layers;
            }
            if let Some(output) = output {
                config.output_dir = output;
            }
            config.validate()?;

            let loader = loader_for(&config)?;
            info!(backend = loader.name(), model = %config.model, "starting comparison");
            let comparison = run_comparison(loader.as_ref(), &config).await?;

            let rendered = match format {
                OutputFormat::Text => report::render_comparison(&comparison)?,
                OutputFormat::Markdown => {
                    markdown::generate_detailed_report(std::slice::from_ref(&comparison))?
                }
                OutputFormat::Json => serde_json::to_string_pretty(&comparison)?,
            };
            println!("{rendered}");

            if !no_write {
                io::write_all_outputs(&config.output_dir, std::slice::from_ref(&comparison))
                    .with_context(|| {
                        format!("writing results to {}", config.output_dir.display())
                    })?;
                eprintln!(
                    "{} {}",
                    "Results written to".green(),
                    config.output_dir.display()
                );
            }
            Ok(())
        }

        Commands::Profile {
            engine,
            offload,
            label,
            format,
        } => {
            engine.apply(&mut config);
            config.validate()?;

            let profile = profile_for(&config, offload, label);
            let plan = RunPlan::from_profile(&config, &profile);
            let loader = loader_for(&config)?;
            let harness = ComparisonHarness::new(loader.as_ref(), config.conversation()?);

            info!(label = %plan.label, offload = %offload, "profiling single configuration");
            let run = harness.profile(&plan).await?;

            let rendered = match format {
                OutputFormat::Text => report::render_run(&run)?,
                OutputFormat::Markdown => markdown::generate_run_report(&run)?,
                OutputFormat::Json => serde_json::to_string_pretty(&run)?,
            };
            println!("{rendered}");
            Ok(())
        }

        Commands::Status { detailed } => {
            println!("offload-bench");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Backends: {}", available_backends().join(", "));
            println!("Configured backend: {}", config.backend);
            println!("Model: {}", config.model);

            if detailed {
                println!("\nResolved configuration:");
                println!("{}", toml::to_string_pretty(&config)?);
                println!("Output files:");
                let dir = config.output_dir.display();
                println!("  - {dir}/{}/", io::RAW_DIR);
                println!("  - {dir}/{}", io::ALL_RESULTS_FILE);
                println!("  - {dir}/{}", io::SUMMARY_FILE);
            }
            Ok(())
        }
    }
}

/// Profile settings for a single run with `offload`.
fn profile_for(config: &BenchConfig, offload: Offload, label: Option<String>) -> ProfileConfig {
    let default_label = if offload == Offload::None {
        config.baseline.label.clone()
    } else {
        config.accelerated.label.clone()
    };
    ProfileConfig {
        label: label.unwrap_or(default_label),
        gpu_layers: offload.as_gpu_layers(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::collections::HashMap;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compare_flags() {
        let cli = Cli::try_parse_from([
            "offload-bench",
            "compare",
            "--backend",
            "scripted",
            "--threads",
            "4",
            "--gpu-layers",
            "-1",
            "--format",
            "json",
            "--no-write",
        ])
        .unwrap();

        match cli.command {
            Commands::Compare {
                engine,
                gpu_layers,
                format,
                no_write,
                ..
            } => {
                assert_eq!(engine.backend.as_deref(), Some("scripted"));
                assert_eq!(engine.threads, Some(4));
                assert_eq!(gpu_layers, Some(-1));
                assert_eq!(format, OutputFormat::Json);
                assert!(no_write);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_offload_values() {
        assert_eq!(parse_offload("none"), Ok(Offload::None));
        assert_eq!(parse_offload("MAX"), Ok(Offload::Max));
        assert_eq!(parse_offload("-1"), Ok(Offload::Max));
        assert_eq!(parse_offload("24"), Ok(Offload::Layers(24)));
        assert!(parse_offload("lots").is_err());
    }

    #[test]
    fn test_engine_args_override_config() {
        let mut config = BenchConfig::default();
        let args = EngineArgs {
            backend: Some("scripted".to_string()),
            filename: Some("small.gguf".to_string()),
            context_size: Some(2048),
            ..EngineArgs::default()
        };
        args.apply(&mut config);
        assert_eq!(config.backend, "scripted");
        assert_eq!(config.model.filename, "small.gguf");
        assert_eq!(config.context_size, 2048);
        assert_eq!(config.model.repo_id, BenchConfig::default().model.repo_id);
    }

    #[test]
    fn test_profile_label_follows_offload() {
        let config = BenchConfig::default();
        assert_eq!(profile_for(&config, Offload::None, None).label, "CPU");
        let gpu = profile_for(&config, Offload::Layers(8), None);
        assert_eq!(gpu.label, "GPU");
        assert_eq!(gpu.gpu_layers, 8);
        assert_eq!(
            profile_for(&config, Offload::Max, Some("CUDA".to_string())).label,
            "CUDA"
        );
    }

    /// Configuration from `contents` alone, ignoring the process environment.
    fn isolated_config(contents: &str) -> (tempfile::TempDir, BenchConfig) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offload-bench.toml");
        std::fs::write(&path, contents).unwrap();
        let env = BenchConfig::environment().source(Some(HashMap::new()));
        let config = BenchConfig::load_with_env(Some(&path), env).unwrap();
        (dir, config)
    }

    #[tokio::test]
    async fn test_compare_with_scripted_backend_writes_results() {
        let (dir, config) = isolated_config("backend = \"scripted\"\n");
        let output = dir.path().join("results");
        let cli = Cli::try_parse_from([
            "offload-bench".to_string(),
            "compare".to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ])
        .unwrap();

        execute_with(cli, config).await.unwrap();
        assert!(output.join(io::SUMMARY_FILE).is_file());
        assert!(output.join(io::ALL_RESULTS_FILE).is_file());

        let written = io::read_results_json(output.join(io::ALL_RESULTS_FILE)).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].backend, "scripted");
    }

    #[tokio::test]
    async fn test_no_write_leaves_output_dir_untouched() {
        let (dir, config) = isolated_config("backend = \"scripted\"\n");
        let output = dir.path().join("results");
        let cli = Cli::try_parse_from([
            "offload-bench".to_string(),
            "compare".to_string(),
            "--output".to_string(),
            output.display().to_string(),
            "--no-write".to_string(),
        ])
        .unwrap();

        execute_with(cli, config).await.unwrap();
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_profile_with_scripted_backend() {
        for format in ["text", "markdown", "json"] {
            let (_dir, config) = isolated_config("");
            let cli = Cli::try_parse_from([
                "offload-bench",
                "profile",
                "--backend",
                "scripted",
                "--offload",
                "max",
                "--format",
                format,
            ])
            .unwrap();
            execute_with(cli, config).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_invalid_override_is_rejected() {
        let cli = Cli::try_parse_from([
            "offload-bench",
            "compare",
            "--backend",
            "scripted",
            "--threads",
            "0",
            "--no-write",
        ])
        .unwrap();
        assert!(execute_with(cli, BenchConfig::default()).await.is_err());
    }
}
