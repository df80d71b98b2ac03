//! Main entry point for Book Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use book_translator::cli::commands::{self, Commands};
use book_translator::{CancellationSignal, TranslatorConfig};

/// Book Translator - long-text translation with retries and pacing
#[derive(Parser, Debug)]
#[command(name = "book-translator", version, about, long_about = None)]
struct Args {
    /// Config file (JSON, YAML or TOML); defaults to environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Maximum attempts per chunk
    #[arg(long)]
    max_retries: Option<u32>,

    /// Delay between chunks in milliseconds
    #[arg(long)]
    inter_unit_delay_ms: Option<u64>,

    /// Abort remaining chunks after this many milliseconds
    #[arg(long)]
    job_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// First Ctrl+C stops the job after the current chunk; a second one exits.
fn cancel_on_ctrl_c() -> CancellationSignal {
    let cancel = CancellationSignal::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl+C received, finishing current chunk and skipping the rest");
            handle.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("book_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Override config with CLI args if provided
    let mut config = TranslatorConfig::load(args.config.as_deref())?;
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(delay) = args.inter_unit_delay_ms {
        config.inter_unit_delay_ms = delay;
    }
    if args.job_timeout_ms.is_some() {
        config.job_timeout_ms = args.job_timeout_ms;
    }
    config.validate()?;

    // Execute command
    match args.command {
        Some(Commands::Translate {
            file,
            text,
            output,
            source_lang,
            target_lang,
            unit_size,
            report,
        }) => {
            let cancel = cancel_on_ctrl_c();
            commands::handle_translate(
                config, cancel, file, text, output, source_lang, target_lang, unit_size, report,
            )
            .await?;
        }
        Some(Commands::Book {
            file,
            output,
            source_lang,
            target_lang,
            recursive,
        }) => {
            let cancel = cancel_on_ctrl_c();
            commands::handle_book(config, cancel, file, output, source_lang, target_lang, recursive)
                .await?;
        }
        Some(Commands::Detect { file, text }) => {
            commands::handle_detect(config, file, text).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages();
        }
        Some(Commands::Server { host, port }) => {
            commands::handle_server(config, host, port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
