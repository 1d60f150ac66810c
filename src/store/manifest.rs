use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{ExportError, Result};
use crate::store::{ModelReference, StoreLayout};

/// One layer entry of a model manifest; only the digest matters here
#[derive(Debug, Clone, Deserialize)]
pub struct LayerReference {
    pub digest: String,
}

/// The subset of an Ollama manifest document this tool decodes.
/// Unknown fields are ignored so newer format revisions still resolve.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelManifest {
    #[serde(default)]
    pub config: Option<LayerReference>,
    #[serde(default)]
    pub layers: Vec<LayerReference>,
}

/// A model resolved to its manifest path and the blobs it references
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    pub reference: ModelReference,
    pub manifest_rel_path: PathBuf,
    pub digests: BTreeSet<String>,
}

/// Locate and decode the manifest for `reference`, collecting every layer
/// digest plus the config digest into a set (duplicates collapse).
///
/// Blob existence is deliberately not checked here: a bad manifest and a
/// missing blob must surface as distinct error kinds, and the latter is the
/// copier's to report.
pub fn resolve(layout: &StoreLayout, reference: &ModelReference) -> Result<ResolvedModel> {
    let path = layout.manifest_path(reference);
    if !path.is_file() {
        return Err(ExportError::ManifestNotFound {
            reference: reference.to_string(),
            path,
        });
    }

    let content = fs::read_to_string(&path)?;
    let manifest: ModelManifest =
        serde_json::from_str(&content).map_err(|e| ExportError::ManifestParse {
            reference: reference.to_string(),
            cause: e.to_string(),
        })?;

    let mut digests: BTreeSet<String> =
        manifest.layers.into_iter().map(|layer| layer.digest).collect();
    if let Some(config) = manifest.config {
        digests.insert(config.digest);
    }

    tracing::debug!(
        "Resolved {reference} to {} digest(s) via {}",
        digests.len(),
        path.display()
    );

    Ok(ResolvedModel {
        reference: reference.clone(),
        manifest_rel_path: reference.manifest_rel_path(),
        digests,
    })
}
