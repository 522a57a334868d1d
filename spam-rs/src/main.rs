//! spam-rs: Email/SMS spam classifier
//!
//! # Usage
//!
//! ```bash
//! # Classify a message (prints {"label": "spam"} or {"label": "not_spam"})
//! spam-rs classify "WINNER!! Claim your FREE prize now"
//!
//! # Read the message from stdin, print "Spam" / "Not Spam"
//! echo "See you at lunch" | spam-rs classify - --format text
//!
//! # Show every normalization stage
//! spam-rs normalize "Running to the shops!" --explain
//!
//! # Validate the configured artifacts
//! spam-rs --config spam.toml check
//!
//! # Serve the HTTP API
//! spam-rs serve --listen 0.0.0.0:8080
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use spam_rs::api::ApiServer;
use spam_rs::config::{Config, LoggingConfig};
use spam_rs::error::ClassifyError;
use spam_rs::model::{ArtifactCache, ModelArtifacts};
use spam_rs::spam::{ClassifyOutcome, PredictionService};
use spam_rs::text::Normalizer;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_ARTIFACT: u8 = 1;
const EXIT_EMPTY_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "spam-rs")]
#[command(version, about = "Classify email/SMS messages as spam or not spam", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one message
    Classify {
        /// Message text, or "-" to read stdin
        message: String,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Include the normalized text in the output
        #[arg(long)]
        explain: bool,
    },
    /// Print the normalized form of a message
    Normalize {
        /// Message text, or "-" to read stdin
        message: String,
        /// Show every intermediate stage
        #[arg(long)]
        explain: bool,
    },
    /// Load and validate the configured artifacts
    Check,
    /// Serve the HTTP API
    Serve {
        /// Listen address, overrides server.listen_addr
        #[arg(short, long)]
        listen: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Classify {
            message,
            format,
            explain,
        } => {
            let message = read_message(message)?;
            let service = match load_service(&config) {
                Ok(service) => service,
                Err(code) => return Ok(code),
            };
            Ok(classify(&service, &message, format, explain)?)
        }
        Commands::Normalize { message, explain } => {
            let message = read_message(message)?;
            let normalizer = Normalizer::from_config(&config.normalizer);
            if explain {
                let trace = normalizer.explain(&message);
                println!("{}", serde_json::to_string_pretty(&trace)?);
            } else {
                println!("{}", normalizer.normalize(&message));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => match ModelArtifacts::load(&config.artifacts) {
            Ok(artifacts) => {
                println!(
                    "✓ Artifacts OK ({} features)\n  vectorizer: {}\n  model:      {}",
                    artifacts.n_features(),
                    config.artifacts.vectorizer_path.display(),
                    config.artifacts.model_path.display()
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("✗ {} artifact failed: {}", e.kind(), e);
                Ok(ExitCode::from(EXIT_ARTIFACT))
            }
        },
        Commands::Serve { listen } => {
            let service = match load_service(&config) {
                Ok(service) => service,
                Err(code) => return Ok(code),
            };
            let addr = listen.unwrap_or_else(|| config.server.listen_addr.clone());

            info!("Starting spam-rs v{}", env!("CARGO_PKG_VERSION"));
            ApiServer::new(Arc::new(service), addr)
                .run()
                .await
                .context("API server failed")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("spam_rs={},tower_http={}", config.level, config.level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load artifacts once at startup; a failure stops the command
fn load_service(config: &Config) -> Result<PredictionService, ExitCode> {
    let cache = ArtifactCache::global(&config.artifacts);
    PredictionService::from_cache(Normalizer::from_config(&config.normalizer), cache).map_err(|e| {
        error!("Cannot serve predictions: {}", e);
        eprintln!("✗ Failed to load model/vectorizer: {}", e);
        ExitCode::from(EXIT_ARTIFACT)
    })
}

fn classify(
    service: &PredictionService,
    message: &str,
    format: OutputFormat,
    explain: bool,
) -> anyhow::Result<ExitCode> {
    let classification = match service.classify_detailed(message) {
        Ok(classification) => classification,
        Err(err) => {
            let code = match err {
                ClassifyError::EmptyInput => {
                    eprintln!("⚠ Please enter a message before predicting.");
                    EXIT_EMPTY_INPUT
                }
                ClassifyError::Artifact(ref e) => {
                    error!("Classification failed: {}", e);
                    EXIT_ARTIFACT
                }
            };
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string(&ClassifyOutcome::from(Err(err)))?);
            }
            return Ok(ExitCode::from(code));
        }
    };

    match format {
        OutputFormat::Text => {
            println!("{}", classification.label);
            if explain {
                println!("normalized: {}", classification.normalized);
            }
        }
        OutputFormat::Json if explain => println!("{}", serde_json::to_string(&classification)?),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&ClassifyOutcome::from(Ok(classification.label)))?
        ),
    }

    Ok(ExitCode::SUCCESS)
}

/// Take the message from the argument, or stdin for "-"
fn read_message(message: String) -> anyhow::Result<String> {
    if message != "-" {
        return Ok(message);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read message from stdin")?;
    Ok(buf)
}
