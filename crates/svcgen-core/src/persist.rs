//! Destinations finished artifacts are persisted to.
//!
//! The driver only asks a writer to persist one artifact and reports what
//! came back; it never retries and never inspects partial writes. Each
//! writer decides what atomic means for its medium.

// Internal imports (std, crate)
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::artifact::Artifact;
use crate::error::{Error, Result};

// External imports (alphabetized)
use tokio::fs;

/// Sink for finished artifacts.
pub trait ArtifactWriter {
    /// Persist `artifact`, returning where it landed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persist`] when the artifact could not be stored.
    fn persist(&self, artifact: &Artifact) -> impl Future<Output = Result<PathBuf>> + Send;

    /// Whether something is already stored at the relative `path`.
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;
}

/// Writes artifacts below a root directory.
///
/// Content goes to a hidden sibling file first and is renamed into place, so
/// a destination either keeps its previous content or holds the new one.
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn write_atomically(destination: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = destination.parent() {
            log::debug!("Ensuring parent directory exists: {}", parent.display());
            fs::create_dir_all(parent).await?;
        }

        let file_name = destination
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"))?;
        let staging = destination.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&staging, content).await?;
        if let Err(e) = fs::rename(&staging, destination).await {
            // Leave no staging file behind
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }
        Ok(())
    }
}

impl ArtifactWriter for FsWriter {
    async fn persist(&self, artifact: &Artifact) -> Result<PathBuf> {
        let destination = self.root.join(&artifact.path);
        log::debug!("Writing {} artifact to: {}", artifact.kind, destination.display());

        match Self::write_atomically(&destination, &artifact.content).await {
            Ok(()) => Ok(destination),
            Err(source) => {
                log::error!("Failed to persist {}: {}", destination.display(), source);
                Err(Error::Persist {
                    path: destination,
                    source,
                })
            }
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(self.root.join(path)).await.unwrap_or(false)
    }
}

/// Keeps artifacts in memory, keyed by their relative path.
///
/// Used for dry runs and tests; [`MemoryWriter::fail_on`] makes persisting a
/// given path fail.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<PathBuf, String>>,
    failing: BTreeSet<PathBuf>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every attempt to persist `path`.
    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Everything persisted so far
    pub fn files(&self) -> BTreeMap<PathBuf, String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
            .cloned()
    }
}

impl ArtifactWriter for MemoryWriter {
    async fn persist(&self, artifact: &Artifact) -> Result<PathBuf> {
        if self.failing.contains(&artifact.path) {
            return Err(Error::Persist {
                path: artifact.path.clone(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "write refused"),
            });
        }
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(artifact.path.clone(), artifact.content.clone());
        Ok(artifact.path.clone())
    }

    async fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}
