use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ollex
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Model catalog not found: {0}\n\nTroubleshooting:\n- Is this an Ollama model store? Expected manifests/ and blobs/ under the store root\n- Override the store root with --source or the OLLAMA_MODELS environment variable")]
    CatalogNotFound(String),

    #[error("Manifest for '{reference}' not found at {}", .path.display())]
    ManifestNotFound { reference: String, path: PathBuf },

    #[error("Failed to parse manifest for '{reference}': {cause}")]
    ManifestParse { reference: String, cause: String },

    #[error("Blob {digest} is referenced by a manifest but missing from {}\n\nTroubleshooting:\n- The source store may be corrupt, or the manifest uses an unsupported format version\n- Re-pull the model with 'ollama pull' and retry", .blob_dir.display())]
    BlobMissing { digest: String, blob_dir: PathBuf },

    #[error("Copy failed for {}: {cause}", .path.display())]
    Copy { path: PathBuf, cause: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
