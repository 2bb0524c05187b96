//! Artifact sink: where steps persist intermediate and final documents.
//!
//! `store(name, content)` returns a location string. [`FileArtifactStore`] writes files
//! under one directory; [`InMemoryArtifactStore`] keeps them in a map for tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Error returned by an artifact store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArtifactError {
    /// Names must be a single non-empty path component.
    #[error("invalid artifact name: {0:?}")]
    InvalidName(String),

    #[error("artifact io: {0}")]
    Io(String),
}

/// Persists named text artifacts.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores `content` under `name` (overwriting) and returns where it went.
    async fn store(&self, name: &str, content: &str) -> Result<String, ArtifactError>;
}

fn check_name(name: &str) -> Result<(), ArtifactError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\');
    if bad {
        Err(ArtifactError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Turns free text (e.g. a task) into a file-name-safe stem.
///
/// Keeps alphanumerics (any script), maps runs of anything else to `_`, trims
/// underscores and caps the length.
pub fn slugify(text: &str) -> String {
    let mut out = String::new();
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let slug: String = out.trim_matches('_').chars().take(48).collect();
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "article".to_string()
    } else {
        slug
    }
}

/// Writes artifacts as files in one directory (created on first write).
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactStore for FileArtifactStore {
    async fn store(&self, name: &str, content: &str) -> Result<String, ArtifactError> {
        check_name(name)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ArtifactError::Io(e.to_string()))?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ArtifactError::Io(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(path.display().to_string())
    }
}

/// Keeps artifacts in memory; locations are `memory://<name>`.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    items: DashMap<String, String>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.items.get(name).map(|v| v.clone())
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.items.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn store(&self, name: &str, content: &str) -> Result<String, ArtifactError> {
        check_name(name)?;
        self.items.insert(name.to_string(), content.to_string());
        Ok(format!("memory://{}", name))
    }
}
