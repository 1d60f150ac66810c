use std::collections::HashSet;
use std::fs;

use crate::diagnostics;
use crate::error::Result;
use crate::export::Copier;
use crate::store::{catalog, manifest, ModelReference, StoreLayout};

/// How many source blob paths to log when an export comes up empty
const EMPTY_EXPORT_SAMPLE: usize = 5;

/// Outcome of one export run
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub models_processed: usize,
    pub blobs_copied: usize,
    /// (reference, cause) for every model that failed to export
    pub failed: Vec<(String, String)>,
}

/// Drives a full export: selection → resolution → copy.
///
/// A pure function of (source store, destination store, selection): no
/// ambient working directory or argument list is consulted here.
pub struct ExportDriver {
    source: StoreLayout,
    dest: StoreLayout,
}

impl ExportDriver {
    pub fn new(source: StoreLayout, dest: StoreLayout) -> Self {
        Self { source, dest }
    }

    /// Export every model in `selection`; an empty selection means every
    /// model the catalog scan can find.
    ///
    /// One bad model never aborts the run: its error is recorded in the
    /// summary and the remaining models are still processed. Only a failed
    /// catalog scan (nothing to enumerate) aborts outright.
    pub fn run(&self, selection: &[String]) -> Result<ExportSummary> {
        let tokens = if selection.is_empty() {
            tracing::info!("No models specified, exporting all available models");
            catalog::list_available_models(&self.source)?
        } else {
            selection.to_vec()
        };

        let references = dedup_references(&tokens);
        let copier = Copier::new(self.source.clone(), self.dest.clone());
        let mut summary = ExportSummary::default();

        for reference in &references {
            tracing::info!("Exporting {reference}");
            match manifest::resolve(&self.source, reference)
                .and_then(|resolved| copier.copy_model(&resolved))
            {
                Ok(copied) => {
                    summary.models_processed += 1;
                    summary.blobs_copied += copied;
                }
                Err(e) => {
                    tracing::error!("Failed to export {reference}: {e}");
                    summary.failed.push((reference.to_string(), e.to_string()));
                }
            }
        }

        if !references.is_empty() {
            self.warn_if_empty_export();
        }

        Ok(summary)
    }

    /// An empty destination blob directory after a non-empty selection
    /// usually means every requested model failed to resolve. Warn and show
    /// a sample of what the source blob directory actually holds.
    fn warn_if_empty_export(&self) {
        let dest_blobs = self.dest.blobs_dir();
        let exported = fs::read_dir(&dest_blobs)
            .map(|entries| entries.flatten().count())
            .unwrap_or(0);
        if exported > 0 {
            return;
        }

        tracing::warn!("No blobs were exported");
        let sample = diagnostics::sample_files(&self.source.blobs_dir(), EMPTY_EXPORT_SAMPLE);
        if sample.is_empty() {
            tracing::warn!("Source blob directory is empty or unreadable");
        } else {
            tracing::warn!("Source blob directory contains, for example:");
            for path in sample {
                tracing::warn!("  {}", path.display());
            }
        }
    }
}

/// Parse selection tokens and deduplicate on the fully-qualified (name, tag)
/// pair, keeping first-seen order. `"llama2"` and `"llama2:latest"` collapse.
fn dedup_references(tokens: &[String]) -> Vec<ModelReference> {
    let mut seen = HashSet::new();
    let mut references = Vec::new();
    for token in tokens {
        let reference = ModelReference::parse(token);
        if seen.insert(reference.clone()) {
            references.push(reference);
        }
    }
    references
}
