use std::fmt;
use std::path::{Path, PathBuf};

use crate::store::layout::{NAMESPACE, REGISTRY};

/// Tag assumed when a model is named without one
pub const DEFAULT_TAG: &str = "latest";

/// A fully-qualified (name, tag) pair identifying one model in the store.
///
/// Equality keys on the resolved pair, so `"llama2"` and `"llama2:latest"`
/// are the same reference once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference {
    pub name: String,
    pub tag: String,
}

impl ModelReference {
    /// Parse a `name[:tag]` token; tag defaults to "latest"
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.split_once(':') {
            Some((name, tag)) if !tag.is_empty() => Self {
                name: name.to_string(),
                tag: tag.to_string(),
            },
            Some((name, _)) => Self {
                name: name.to_string(),
                tag: DEFAULT_TAG.to_string(),
            },
            None => Self {
                name: token.to_string(),
                tag: DEFAULT_TAG.to_string(),
            },
        }
    }

    /// Store-relative path of this reference's manifest file
    #[must_use]
    pub fn manifest_rel_path(&self) -> PathBuf {
        Path::new("manifests")
            .join(REGISTRY)
            .join(NAMESPACE)
            .join(&self.name)
            .join(&self.tag)
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}
