// src/main.rs
// =============================================================================
// Entry point of the github-retriever CLI.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default github_retriever=info) on stderr
// 2. Parse command-line arguments using clap
// 3. Wire Ctrl-C to the cancellation token shared by all fetches
// 4. Dispatch to the subcommand handler
// 5. Exit with proper code (0 = success, 1 = some batch entries failed, 2 = error)
//
// Batch outputs are only written under --output-dir; entry names that would
// escape it are reported as failures.
// =============================================================================

mod cli;

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use github_retriever::batch::{self, FetchOutcome, ReportStatus};
use github_retriever::config::BatchManifest;
use github_retriever::{GithubRetriever, RetrieverError};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("github_retriever=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Commands::Fetch {
            repository_slug,
            file_path,
            branch,
            token,
            timeout_secs,
            output,
        } => {
            let retriever = GithubRetriever::new(repository_slug, file_path)
                .with_branch(branch)
                .with_token(token.unwrap_or_default())
                .with_timeout(timeout_secs.map(Duration::from_secs).unwrap_or_default());
            handle_fetch(&retriever, output.as_deref(), &cancel).await
        }
        Commands::Batch {
            manifest,
            token,
            output_dir,
            json,
        } => {
            let manifest = BatchManifest::load(&manifest)?;
            handle_batch(&manifest, token.as_deref(), output_dir.as_deref(), json, &cancel).await
        }
    }
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling in-flight requests");
            cancel.cancel();
        }
    });
}

// Handles the 'fetch' subcommand
//
// Parameters:
//   retriever: the configured GitHub retriever
//   output: file to write to; stdout when None
//   cancel: shared cancellation token (Ctrl-C)
//
// Returns: Ok(0) on success, Err if fetching or writing failed
async fn handle_fetch(
    retriever: &GithubRetriever,
    output: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<i32> {
    info!(url = %retriever.raw_url(), "fetching");

    let bytes = retriever
        .retrieve(cancel)
        .await
        .with_context(|| format!("could not fetch {}", retriever.raw_url()))?;

    match output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("could not write {}", path.display()))?;
            info!(bytes = bytes.len(), path = %path.display(), "saved");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(0)
}

// Handles the 'batch' subcommand
//
// Parameters:
//   manifest: the parsed manifest listing the files to fetch
//   token: default GitHub token for entries without their own
//   output_dir: where to save fetched files, if anywhere
//   json: whether to output JSON format
//   cancel: shared cancellation token (Ctrl-C)
//
// Returns: exit code, 0 when every entry was fetched (and saved), 1 otherwise
async fn handle_batch(
    manifest: &BatchManifest,
    token: Option<&str>,
    output_dir: Option<&Path>,
    json: bool,
    cancel: &CancellationToken,
) -> Result<i32> {
    let retrievers = manifest.retrievers(token);
    if retrievers.is_empty() {
        if json {
            println!("{}", render_results(&[], true)?);
        } else {
            println!("No files listed in manifest");
        }
        return Ok(0);
    }

    let mut outcomes = batch::fetch_all(retrievers, manifest.concurrency, cancel).await;

    if let Some(dir) = output_dir {
        save_outcomes(dir, &mut outcomes)?;
    }

    println!("{}", render_results(&outcomes, json)?);

    Ok(batch_exit_code(&outcomes))
}

// 1 as soon as one entry failed, 0 otherwise
fn batch_exit_code(outcomes: &[FetchOutcome]) -> i32 {
    if outcomes.iter().any(|o| !o.is_ok()) {
        1
    } else {
        0
    }
}

// Resolves where an entry named `name` is saved under `dir`
//
// Only plain relative names are accepted: no "..", no root, no drive prefix,
// and not empty. Anything else could land outside `dir`.
//
// Returns: Some(path inside dir), or None if the name is unsafe
fn output_path(dir: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let mut components = relative.components().peekable();
    if components.peek().is_none() {
        return None;
    }
    if components.all(|c| matches!(c, Component::Normal(_))) {
        Some(dir.join(relative))
    } else {
        None
    }
}

// Writes every successful fetch to <dir>/<name>, creating parent directories
//
// Parameters:
//   dir: output directory
//   outcomes: batch outcomes; entries whose name is unsafe are not written
//     and are turned into failures so they show up in the report
//
// Returns: Err only on I/O failures
fn save_outcomes(dir: &Path, outcomes: &mut [FetchOutcome]) -> Result<()> {
    for outcome in outcomes.iter_mut() {
        if !outcome.is_ok() {
            continue;
        }

        let Some(path) = output_path(dir, &outcome.name) else {
            warn!(name = %outcome.name, "refusing to write outside the output directory");
            outcome.result = Err(RetrieverError::UnsafeOutputName {
                name: outcome.name.clone(),
            });
            continue;
        };

        if let Ok(bytes) = &outcome.result {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
            std::fs::write(&path, bytes)
                .with_context(|| format!("could not write {}", path.display()))?;
        }
    }
    Ok(())
}

// Formats the outcomes either as a table or JSON
fn render_results(outcomes: &[FetchOutcome], json: bool) -> Result<String> {
    let reports: Vec<_> = outcomes.iter().map(FetchOutcome::report).collect();

    if json {
        return Ok(serde_json::to_string_pretty(&reports)?);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{:<30} {:<8} {:<10} {}\n",
        "NAME", "STATUS", "BYTES", "MESSAGE"
    ));
    out.push_str(&"=".repeat(80));
    out.push('\n');
    for report in &reports {
        let status = match report.status {
            ReportStatus::Ok => "OK",
            ReportStatus::Error => "ERROR",
        };
        let bytes = report.bytes.map(|b| b.to_string()).unwrap_or_default();
        let message = report.message.as_deref().unwrap_or("");
        out.push_str(&format!(
            "{:<30} {:<8} {:<10} {}\n",
            report.name, status, bytes, message
        ));
    }

    let ok_count = reports.iter().filter(|r| r.status == ReportStatus::Ok).count();
    out.push_str(&format!(
        "\nSummary: {} ok, {} failed, {} total",
        ok_count,
        reports.len() - ok_count,
        reports.len()
    ));
    Ok(out)
}
