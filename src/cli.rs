// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - fetch: download one file and write it to stdout or a file
// - batch: download every file listed in a JSON manifest
//
// The token can be passed with --token or through GITHUB_TOKEN.
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "github-retriever",
    version,
    about = "Fetch raw file contents from GitHub repositories",
    long_about = "github-retriever downloads files from raw.githubusercontent.com, \
                  optionally authenticated with a GitHub token."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a single file
    ///
    /// Example: github-retriever fetch owner/repo config/flags.yaml --branch dev
    Fetch {
        /// Repository slug (e.g., owner/repo)
        repository_slug: String,

        /// Path of the file inside the repository
        file_path: String,

        /// Branch to read from (default: main)
        #[arg(long, default_value = "")]
        branch: String,

        /// GitHub token, sent as "Authorization: token <TOKEN>"
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Request timeout in seconds (default: 10)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write the file here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Fetch every file listed in a JSON manifest
    ///
    /// Example: github-retriever batch files.json --output-dir fetched/
    Batch {
        /// Path to the manifest
        manifest: PathBuf,

        /// Default GitHub token for entries without their own
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Save fetched files under this directory, one per entry name
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },
}
