//! CLI command definitions for tuiforge.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use crate::interact::StdinQuestioner;
use crate::llm::OpenAiCompatClient;
use crate::pipeline::{PipelineOrchestrator, RunConfig};
use crate::probe::SubprocessProbe;
use crate::progress::TracingStageProgress;
use crate::prompts::SUPPORTED_LIBRARIES;

/// Default output path for the generated script.
const DEFAULT_OUTPUT: &str = "tui.py";

/// LLM-driven terminal UI generator.
#[derive(Parser)]
#[command(name = "tuiforge")]
#[command(about = "Generate a working TUI program from a natural-language request")]
#[command(version)]
#[command(
    long_about = "tuiforge clarifies your request through a short dialogue, designs the TUI, \
synthesizes a Python implementation against the chosen toolkit, and repairs it against its \
own runtime failures until it executes cleanly.\n\nExample usage:\n  \
tuiforge build \"a process monitor with kill shortcuts\" --library textual --fix-iters 5"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a TUI program from a request.
    #[command(alias = "gen")]
    Build(BuildArgs),

    /// List the supported TUI toolkits.
    #[command(alias = "libs")]
    Libraries,
}

/// Arguments for `tuiforge build`.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// The natural-language request describing the TUI.
    pub request: String,

    /// TUI toolkit the generated program must use.
    #[arg(short = 'L', long, default_value = "urwid")]
    pub library: String,

    /// Maximum repair attempts before giving up.
    #[arg(long, default_value = "10")]
    pub fix_iters: usize,

    /// Run the design-refinement pass.
    #[arg(long)]
    pub refine: bool,

    /// Refinement iterations when --refine is set.
    #[arg(long, default_value = "1")]
    pub refine_iters: usize,

    /// Maximum clarification questions to ask.
    #[arg(long, default_value = "10")]
    pub max_questions: usize,

    /// Model for clarification and design (defaults to the provider default).
    #[arg(long, env = "TUIFORGE_REASONING_MODEL")]
    pub reasoning_model: Option<String>,

    /// Model for synthesis and repair (defaults to the provider default).
    #[arg(long, env = "TUIFORGE_CODING_MODEL")]
    pub coding_model: Option<String>,

    /// Where to write the generated script.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "TUIFORGE_API_BASE")]
    pub api_base: Option<String>,

    /// API key for the endpoint (can also be set via TUIFORGE_API_KEY).
    #[arg(long, env = "TUIFORGE_API_KEY")]
    pub api_key: Option<String>,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs the CLI with parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build(args) => run_build(args).await,
        Commands::Libraries => {
            for library in SUPPORTED_LIBRARIES {
                println!("{library}");
            }
            Ok(())
        }
    }
}

async fn run_build(args: BuildArgs) -> anyhow::Result<()> {
    if !SUPPORTED_LIBRARIES.contains(&args.library.as_str()) {
        warn!(
            library = %args.library,
            "Unknown toolkit; continuing without library hints"
        );
    }

    let mut config = RunConfig::new()
        .with_library(&args.library)
        .with_fix_iters(args.fix_iters)
        .with_refine(args.refine)
        .with_refine_iters(args.refine_iters)
        .with_max_questions(args.max_questions);
    if let Some(model) = args.reasoning_model {
        config = config.with_reasoning_model(model);
    }
    if let Some(model) = args.coding_model {
        config = config.with_coding_model(model);
    }

    let llm = match args.api_base {
        Some(api_base) => Arc::new(OpenAiCompatClient::new(
            api_base,
            args.api_key,
            std::env::var("TUIFORGE_DEFAULT_MODEL").unwrap_or_default(),
        )),
        None => Arc::new(OpenAiCompatClient::from_env()?),
    };

    let orchestrator = PipelineOrchestrator::new(config, llm, Arc::new(SubprocessProbe::new()));

    let result = orchestrator
        .run(&args.request, &StdinQuestioner, &TracingStageProgress)
        .await?;

    let script = result.outcome.script();
    std::fs::write(&args.output, &script.code)?;

    if result.outcome.is_success() {
        info!(
            output = %args.output.display(),
            lines = script.line_count(),
            "TUI generated and verified"
        );
        println!("Wrote {}", args.output.display());
    } else {
        warn!(
            output = %args.output.display(),
            "Retry budget exhausted; the script still fails"
        );
        println!("Wrote {} (still failing)", args.output.display());
        if let Some(diagnostic) = script.diagnostic() {
            eprintln!("Last diagnostic:\n{diagnostic}");
        }
    }

    Ok(())
}
