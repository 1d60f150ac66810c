use std::fs;
use std::path::Path;

use crate::error::{ExportError, Result};
use crate::store::{ResolvedModel, StoreLayout};

/// Copies resolved manifests and their referenced blobs from one store into
/// another, leaving the source untouched.
pub struct Copier {
    source: StoreLayout,
    dest: StoreLayout,
}

impl Copier {
    pub fn new(source: StoreLayout, dest: StoreLayout) -> Self {
        Self { source, dest }
    }

    /// Materialize one resolved model in the destination store.
    ///
    /// The manifest is copied first, mirroring its source-relative path; then
    /// every referenced blob is copied into the flat destination blob
    /// directory. A referenced digest with no backing file in the source is
    /// a consistency fault and fails the whole model, never a silent skip.
    ///
    /// Returns the number of blobs newly copied. Re-running against an
    /// already-populated destination is safe: blobs already present are
    /// skipped, the manifest is overwritten with identical bytes.
    pub fn copy_model(&self, resolved: &ResolvedModel) -> Result<usize> {
        let manifest_src = self.source.root().join(&resolved.manifest_rel_path);
        let manifest_dst = self.dest.root().join(&resolved.manifest_rel_path);
        copy_file_atomic(&manifest_src, &manifest_dst)?;
        tracing::debug!("Copied manifest {}", resolved.manifest_rel_path.display());

        fs::create_dir_all(self.dest.blobs_dir())?;

        let mut copied = 0;
        for digest in &resolved.digests {
            let blob_src = self.source.blob_path(digest);
            if !blob_src.is_file() {
                return Err(ExportError::BlobMissing {
                    digest: digest.clone(),
                    blob_dir: self.source.blobs_dir(),
                });
            }

            let blob_dst = self.dest.blob_path(digest);
            if blob_dst.exists() {
                tracing::debug!("Blob {digest} already exported, skipping");
                continue;
            }

            copy_file_atomic(&blob_src, &blob_dst)?;
            tracing::debug!("Copied blob {digest}");
            copied += 1;
        }

        Ok(copied)
    }
}

/// Copy `src` to `dst` through a temporary sibling plus rename, so the final
/// path is never visible in a partially-written state.
fn copy_file_atomic(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = dst.with_extension("tmp");
    fs::copy(src, &tmp_path).map_err(|e| ExportError::Copy {
        path: src.to_path_buf(),
        cause: e.to_string(),
    })?;
    fs::rename(&tmp_path, dst).map_err(|e| ExportError::Copy {
        path: dst.to_path_buf(),
        cause: e.to_string(),
    })?;

    Ok(())
}
