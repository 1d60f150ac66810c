use std::fs;

use crate::error::{ExportError, Result};
use crate::store::StoreLayout;

/// List every `"name:tag"` pair available in the store, sorted.
///
/// The namespace directory has a fixed depth: one directory per model name,
/// one leaf file per tag. Anything else is skipped.
pub fn list_available_models(layout: &StoreLayout) -> Result<Vec<String>> {
    let namespace_dir = layout.namespace_dir();

    let entries = fs::read_dir(&namespace_dir)
        .map_err(|_| ExportError::CatalogNotFound(namespace_dir.display().to_string()))?;

    let mut models = Vec::new();
    for entry in entries {
        let name_path = entry?.path();
        if !name_path.is_dir() {
            continue;
        }
        let Some(name) = name_path.file_name().and_then(|n| n.to_str()).map(String::from)
        else {
            continue;
        };

        for tag_entry in fs::read_dir(&name_path)? {
            let tag_path = tag_entry?.path();
            if !tag_path.is_file() {
                continue;
            }
            if let Some(tag) = tag_path.file_name().and_then(|t| t.to_str()) {
                models.push(format!("{name}:{tag}"));
            }
        }
    }

    if models.is_empty() {
        return Err(ExportError::CatalogNotFound(format!(
            "no models under {}",
            namespace_dir.display()
        )));
    }

    models.sort();
    Ok(models)
}
