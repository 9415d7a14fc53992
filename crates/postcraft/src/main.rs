mod config;
mod render;
mod web;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use postcraft_core::{models_from_env, LoopOutcome, LoopRunner, RefinementRequest};
use postcraft_logging::{init_tracing, LogFormat, Logger};
use postcraft_model::{ApiToken, ModelRole, ModelSettings, API_TOKEN_ENV};

use config::{ProjectConfig, CONFIG_FILE_NAME};
use render::{colorize_hashtags, hashtags};

#[derive(Parser, Debug)]
#[command(
    name = "postcraft",
    about = "Draft, critique and polish social posts with hosted LLMs",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Working directory holding postcraft.toml (default: current directory)
    #[arg(short = 'd', long, global = true)]
    working_dir: Option<PathBuf>,

    /// Model to use for every role (overrides postcraft.toml)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log_format: LogFormatChoice,

    /// Tracing filter for internal diagnostics (RUST_LOG wins when set)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Also append JSON log events to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the refinement loop once and print the final post
    Craft {
        /// What the post should be about
        #[arg(short, long)]
        topic: String,

        /// Tone hint, e.g. "funny" or "inspirational"
        #[arg(long)]
        mood: Option<String>,

        /// Account whose voice to imitate (with or without @)
        #[arg(short, long)]
        style_account: Option<String>,

        /// Maximum drafts to produce (default: postcraft.toml or 3)
        #[arg(short = 'n', long)]
        max_iterations: Option<usize>,

        /// Output the final result as JSON
        #[arg(long)]
        json_output: bool,

        /// Print every draft, not only the final one
        #[arg(long)]
        show_history: bool,

        /// Exit with status 1 when the critic never approved the post
        #[arg(long)]
        require_approval: bool,
    },
    /// Serve the web form
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, default_value_t = 8501)]
        port: u16,

        /// Open the form in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Show resolved configuration without calling any model
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
    Silent,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
            LogFormatChoice::Silent => LogFormat::Silent,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing(&cli.log_level, log_format);

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let project = ProjectConfig::load(&working_dir)?.unwrap_or_default();
    let settings = project.model_settings(cli.model.as_deref());

    if let Command::Check = cli.command {
        print_check(&working_dir, &project, &settings);
        return Ok(());
    }

    let models = models_from_env(&settings)?;
    let logger = match &cli.log_file {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };
    let runner = LoopRunner::new(models, Arc::new(logger));

    match cli.command {
        Command::Craft {
            topic,
            mood,
            style_account,
            max_iterations,
            json_output,
            show_history,
            require_approval,
        } => {
            let request = RefinementRequest {
                topic,
                mood,
                style_account,
                max_iterations: max_iterations.unwrap_or(project.max_iterations()),
            };
            let outcome = runner.run(request).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome, show_history);
            }

            if require_approval {
                std::process::exit(outcome.exit_code());
            }
        }
        Command::Serve { host, port, open } => {
            web::handle_serve_command(runner, project.max_iterations(), &host, port, open).await?;
        }
        Command::Check => {}
    }

    Ok(())
}

fn print_check(working_dir: &std::path::Path, project: &ProjectConfig, settings: &ModelSettings) {
    let config_path = working_dir.join(CONFIG_FILE_NAME);
    println!("=== Dry Run ===");
    if config_path.exists() {
        println!("Config: {}", config_path.display());
    } else {
        println!("Config: none (using defaults)");
    }
    println!("Endpoint: {}", settings.base_url);
    for role in [ModelRole::Generator, ModelRole::Evaluator, ModelRole::Optimizer] {
        println!("{}: {}", role, settings.model_for(role));
    }
    match settings.timeout {
        Some(timeout) => println!("Timeout: {}s", timeout.as_secs()),
        None => println!("Timeout: none"),
    }
    println!("Max iterations: {}", project.max_iterations());
    match ApiToken::from_env() {
        Some(token) => println!("{}: {}", API_TOKEN_ENV, token.preview()),
        None => println!("{}: {}", API_TOKEN_ENV, "missing".red()),
    }
}

fn print_outcome(outcome: &LoopOutcome, show_history: bool) {
    if show_history {
        eprintln!();
        for (i, draft) in outcome.state.draft_history().iter().enumerate() {
            eprintln!("{} {}", format!("[draft {}]", i + 1).dimmed(), draft);
        }
    }

    eprintln!();
    if outcome.is_approved() {
        eprintln!("=== APPROVED ===");
    } else {
        eprintln!("=== BEST EFFORT ===");
        eprintln!("Reached maximum iterations ({})", outcome.iterations());
    }
    eprintln!("Iterations: {}", outcome.iterations());
    eprintln!("Duration: {:.1}s", outcome.total_duration_secs);
    let tags = hashtags(outcome.final_draft());
    if !tags.is_empty() {
        eprintln!("Hashtags: {}", tags.join(" "));
    }
    eprintln!();

    println!("{}", colorize_hashtags(outcome.final_draft()));
}
