//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::core::cancel::CancellationSignal;
use crate::core::config::TranslatorConfig;
use crate::core::models::{language_name, supported_languages};
use crate::core::pacing::ProgressCallback;
use crate::core::translator::AsyncTranslator;
use crate::processors::book::{output_path_for, BookProcessor};

/// Commands for Book Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a text file or inline text
    Translate {
        /// Input text file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Inline text to translate
        #[arg(long)]
        text: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language (default: auto-detect)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default from config)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Maximum characters per chunk
        #[arg(long)]
        unit_size: Option<usize>,

        /// Print the per-chunk report as JSON to stderr
        #[arg(long)]
        report: bool,
    },

    /// Translate book text files
    Book {
        /// Input file or directory (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language (default: auto-detect)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default from config)
        #[arg(short, long)]
        target_lang: Option<String>,

        /// Recursively translate subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Detect the language of a text file or inline text
    Detect {
        /// Input text file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Inline text
        #[arg(long)]
        text: Option<String>,
    },

    /// List supported languages
    Languages,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Drive `pb` from pipeline progress notifications
fn progress_callback(pb: &ProgressBar) -> ProgressCallback {
    let pb = pb.clone();
    Arc::new(move |completed, total| {
        pb.set_length(total as u64);
        pb.set_position(completed as u64);
    })
}

fn resolve_langs(
    config: &TranslatorConfig,
    source_lang: Option<String>,
    target_lang: Option<String>,
) -> (String, String) {
    (
        source_lang.unwrap_or_else(|| config.source_lang.clone()),
        target_lang.unwrap_or_else(|| config.target_lang.clone()),
    )
}

async fn read_input(file: Option<PathBuf>, text: Option<String>) -> anyhow::Result<String> {
    match (file, text) {
        (Some(path), _) => Ok(tokio::fs::read_to_string(&path).await?),
        (None, Some(text)) => Ok(text),
        (None, None) => anyhow::bail!("Provide --file or --text"),
    }
}

/// Handle translate command
#[allow(clippy::too_many_arguments)]
pub async fn handle_translate(
    config: TranslatorConfig,
    cancel: CancellationSignal,
    file: Option<PathBuf>,
    text: Option<String>,
    output: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: Option<String>,
    unit_size: Option<usize>,
    report: bool,
) -> anyhow::Result<()> {
    let text = read_input(file, text).await?;

    let (source_lang, target_lang) = resolve_langs(&config, source_lang, target_lang);
    let translator = AsyncTranslator::from_config(config)?;

    let mut request = translator.request(text).with_source_lang(source_lang);
    request.target_lang = target_lang;
    if let Some(limit) = unit_size {
        request = request.with_unit_size_limit(limit);
    }

    let pb = progress_bar();
    let result = translator
        .translate_request(&request, Some(progress_callback(&pb)), Some(&cancel))
        .await;
    pb.finish_and_clear();

    match output {
        Some(path) => {
            tokio::fs::write(&path, &result.text).await?;
            info!("Wrote translation to {}", path.display());
        }
        None => println!("{}", result.text),
    }

    if report {
        eprintln!("{}", serde_json::to_string_pretty(&result)?);
    }

    if result.has_failures() {
        eprintln!(
            "⚠️  {} of {} chunk(s) failed: {:?}",
            result.failed_count,
            result.unit_count,
            result.failed_units().iter().map(|i| i + 1).collect::<Vec<_>>()
        );
    }

    Ok(())
}

/// Handle book translation command
pub async fn handle_book(
    config: TranslatorConfig,
    cancel: CancellationSignal,
    file: PathBuf,
    output: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: Option<String>,
    recursive: bool,
) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let (source_lang, target_lang) = resolve_langs(&config, source_lang, target_lang);

    let output = output.unwrap_or_else(|| {
        if file.is_dir() {
            file.join("translated")
        } else {
            file.with_extension(format!("{}.txt", target_lang))
        }
    });

    info!("Starting book translation");
    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Target language: {}", target_lang);
    info!("Recursive: {}", recursive);

    let translator = AsyncTranslator::from_config(config)?;
    let processor = BookProcessor::new(translator);

    let jobs: Vec<(PathBuf, PathBuf)> = if file.is_dir() {
        let files = if recursive {
            processor.find_files_recursive(&file)?
        } else {
            processor.find_files(&file)?
        };
        files
            .into_iter()
            .map(|input| {
                let out = output_path_for(&input, &file, &output, &target_lang);
                (input, out)
            })
            .collect()
    } else {
        vec![(file.clone(), output.clone())]
    };

    if jobs.is_empty() {
        anyhow::bail!("No text files found");
    }

    let mut processed = 0;
    let mut partial = 0;
    let mut failed = 0;

    for (input, out) in jobs {
        if cancel.is_cancelled() {
            break;
        }

        let pb = progress_bar();
        pb.set_message(display_name(&input));

        match processor
            .translate_file(
                &input,
                &out,
                &source_lang,
                &target_lang,
                Some(progress_callback(&pb)),
                Some(&cancel),
            )
            .await
        {
            Ok(report) => {
                processed += 1;
                if report.has_failures() {
                    partial += 1;
                }
                pb.finish_with_message(format!("{} -> {}", display_name(&input), out.display()));
            }
            Err(e) => {
                failed += 1;
                pb.abandon_with_message(format!("Failed: {}", e));
                eprintln!("Error processing {}: {}", input.display(), e);
            }
        }
    }

    let duration = start_time.elapsed();
    info!(
        "Completed: {} processed ({} with failed chunks), {} failed in {:?}",
        processed, partial, failed, duration
    );

    println!("\n✅ Book translation completed!");
    println!("   Processed: {}", processed);
    println!("   With failed chunks: {}", partial);
    println!("   Failed: {}", failed);
    println!("   Time: {:?}", duration);

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Handle detect command
pub async fn handle_detect(
    config: TranslatorConfig,
    file: Option<PathBuf>,
    text: Option<String>,
) -> anyhow::Result<()> {
    let text = read_input(file, text).await?;
    let translator = AsyncTranslator::from_config(config)?;

    let code = translator.detect_language(&text).await;
    match language_name(&code) {
        Some(name) => println!("{} ({})", code, name),
        None => println!("{}", code),
    }

    Ok(())
}

/// Handle languages command
pub fn handle_languages() {
    for (code, name) in supported_languages() {
        println!("{:<6} {}", code, name);
    }
}

/// Handle server command
pub async fn handle_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(config, host, port).await?;

    Ok(())
}
