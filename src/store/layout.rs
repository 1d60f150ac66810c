//! Path conventions of an Ollama-style model store.
//!
//! A store root contains `manifests/<registry>/<namespace>/<name>/<tag>`
//! (JSON documents) and `blobs/<digest-with-separator-substituted>` (opaque
//! files). Both the source store and the export destination use the same
//! layout, so one type serves both sides of a copy.

use std::path::{Path, PathBuf};

use crate::store::reference::ModelReference;

/// Registry host used by the default Ollama store
pub const REGISTRY: &str = "registry.ollama.ai";

/// Namespace under which locally pulled models live
pub const NAMESPACE: &str = "library";

/// Paths within a model store rooted at one directory
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Top-level manifest directory
    #[must_use]
    pub fn manifests_dir(&self) -> PathBuf {
        self.root.join("manifests")
    }

    /// The registry/namespace directory that catalog scans walk
    #[must_use]
    pub fn namespace_dir(&self) -> PathBuf {
        self.manifests_dir().join(REGISTRY).join(NAMESPACE)
    }

    /// Flat directory holding every content-addressed blob
    #[must_use]
    pub fn blobs_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    /// Absolute path of the manifest file for a reference
    #[must_use]
    pub fn manifest_path(&self, reference: &ModelReference) -> PathBuf {
        self.root.join(reference.manifest_rel_path())
    }

    /// Absolute path of the blob file backing a digest
    #[must_use]
    pub fn blob_path(&self, digest: &str) -> PathBuf {
        self.blobs_dir().join(digest_to_filename(digest))
    }
}

/// Translate a digest (`sha256:<hex>`) into its on-disk blob filename
/// (`sha256-<hex>`). Blob filenames cannot contain `:` on all platforms.
#[must_use]
pub fn digest_to_filename(digest: &str) -> String {
    digest.replacen(':', "-", 1)
}

/// Inverse of [`digest_to_filename`]
#[must_use]
pub fn filename_to_digest(filename: &str) -> String {
    filename.replacen('-', ":", 1)
}
