use anyhow::{Context, Result};
use chat_contact_parser::config::{self, ConfigOverrides};
use chat_contact_parser::models::{MessageRecord, ParseOutcome};
use chat_contact_parser::{ContactParser, api, processor, validate_customer_data};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Extract structured contact details from pasted chat messages",
    long_about = None
)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(long, global = true, env = "CONTACT_PARSER_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a single message and print the contact as JSON
    Parse {
        /// Message text. Read from --file or stdin when omitted
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing the message text
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Also run the strict validator
        #[arg(long)]
        validate: bool,
    },
    /// Process a JSON file containing message records
    Batch {
        /// Path to the input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the output JSON file. Printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of concurrent workers
        #[arg(short, long, env = "CONTACT_PARSER_WORKERS")]
        workers: Option<usize>,

        /// Run the strict validator on every record
        #[arg(long)]
        validate: bool,
    },
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "CONTACT_PARSER_PORT")]
        port: Option<u16>,

        /// Maximum number of requests handled at once
        #[arg(long, env = "CONTACT_PARSER_MAX_CONCURRENCY")]
        max_concurrency: Option<usize>,
    },
}

impl Commands {
    fn overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Parse { .. } => ConfigOverrides::default(),
            Commands::Batch {
                workers, validate, ..
            } => ConfigOverrides {
                workers: *workers,
                validate: *validate,
                ..Default::default()
            },
            Commands::Serve {
                port,
                max_concurrency,
            } => ConfigOverrides {
                port: *port,
                max_concurrency: *max_concurrency,
                ..Default::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = config::build_config(cli.config.as_deref(), &cli.command.overrides())?;
    let parser = Arc::new(ContactParser::new(config.weights));

    match cli.command {
        Commands::Parse {
            text,
            file,
            validate,
        } => {
            let message = read_message(text, file)?;
            let contact = parser.parse(&message);
            let validation = validate.then(|| validate_customer_data(&contact));
            let outcome = ParseOutcome {
                contact,
                validation,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Batch { input, output, .. } => {
            info!("Processing messages from {}", input.display());
            process_file(
                parser,
                input,
                output,
                config.batch_workers,
                config.validate_in_batch,
            )
            .await?;
        }
        Commands::Serve { .. } => {
            info!("Starting API server on port {}", config.server_port);
            api::start_api_server(parser, config.server_port, config.max_concurrency).await?;
        }
    }

    Ok(())
}

fn read_message(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read message file: {}", path.display()));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read message from stdin")?;
    Ok(buffer)
}

async fn process_file(
    parser: Arc<ContactParser>,
    input: PathBuf,
    output: Option<PathBuf>,
    workers: usize,
    validate: bool,
) -> Result<()> {
    let input_data = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let records: Vec<MessageRecord> = serde_json::from_str(&input_data)
        .with_context(|| format!("Failed to parse message records from {}", input.display()))?;

    info!("Loaded {} messages from {}", records.len(), input.display());

    let progress_bar = processor::progress_bar(records.len() as u64);
    let results = processor::process_batch(parser, records, workers, validate, progress_bar).await?;

    let skipped = results.iter().filter(|r| r.skipped).count();
    let output_data = serde_json::to_string_pretty(&results)?;
    match output {
        Some(path) => {
            std::fs::write(&path, output_data)
                .with_context(|| format!("Failed to write results to {}", path.display()))?;
            info!(
                "Wrote {} results ({} skipped) to {}",
                results.len(),
                skipped,
                path.display()
            );
        }
        None => println!("{}", output_data),
    }

    Ok(())
}
