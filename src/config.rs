// src/config.rs
// =============================================================================
// Batch manifest: a JSON file listing the files to fetch in one run.
//
// {
//   "timeout_secs": 5,
//   "concurrency": 8,
//   "files": [
//     { "name": "flags", "repository_slug": "owner/repo",
//       "branch": "dev", "file_path": "config/flags.yaml" }
//   ]
// }
//
// Everything except repository_slug and file_path is optional. Empty slugs
// or paths are not rejected here; they fail per file when fetched.
// Entry names (explicit, or the file path) must be unique since they double
// as output file names.
// =============================================================================

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::github::GithubRetriever;

/// How many files are fetched at once when the manifest does not say.
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("duplicate entry name '{0}', set a distinct \"name\" for each file")]
    DuplicateName(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchManifest {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    pub files: Vec<FileSource>,
}

/// One entry of the manifest.
#[derive(Clone, Deserialize)]
pub struct FileSource {
    /// Label used in reports and as output file name; defaults to `file_path`.
    #[serde(default)]
    pub name: Option<String>,
    pub repository_slug: String,
    #[serde(default)]
    pub branch: String,
    pub file_path: String,
    /// Overrides the token given on the command line.
    #[serde(default)]
    pub github_token: Option<String>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl BatchManifest {
    // Parses and checks a manifest
    //
    // Parameters:
    //   text: the JSON document
    //
    // Returns: the manifest, or an error if the JSON is malformed,
    //   concurrency is 0, or two entries end up with the same name
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let manifest: BatchManifest = serde_json::from_str(text)?;
        if manifest.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        let mut seen = HashSet::new();
        for file in &manifest.files {
            if !seen.insert(file.display_name()) {
                return Err(ConfigError::DuplicateName(file.display_name().to_string()));
            }
        }

        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Zero when unset, which leaves the default to the HTTP retriever.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs.map(Duration::from_secs).unwrap_or_default()
    }

    /// Builds one named retriever per entry.
    pub fn retrievers(&self, default_token: Option<&str>) -> Vec<(String, GithubRetriever)> {
        self.files
            .iter()
            .map(|file| {
                let retriever = file.retriever(default_token, self.timeout());
                (file.display_name().to_string(), retriever)
            })
            .collect()
    }
}

impl FileSource {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.file_path)
    }

    pub fn retriever(&self, default_token: Option<&str>, timeout: Duration) -> GithubRetriever {
        let token = self
            .github_token
            .as_deref()
            .or(default_token)
            .unwrap_or_default();

        GithubRetriever::new(&self.repository_slug, &self.file_path)
            .with_branch(&self.branch)
            .with_token(token)
            .with_timeout(timeout)
    }
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("name", &self.name)
            .field("repository_slug", &self.repository_slug)
            .field("branch", &self.branch)
            .field("file_path", &self.file_path)
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .finish()
    }
}
