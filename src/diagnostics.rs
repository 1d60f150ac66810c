//! Best-effort filesystem inspection helpers for diagnostics output.

use std::fs;
use std::path::{Path, PathBuf};

/// Collect up to `limit` regular files under `dir`, recursively.
///
/// Never fails: an unreadable directory simply contributes nothing. The
/// result is for human-readable diagnostics only, so no ordering guarantee
/// beyond directory iteration order.
#[must_use]
pub fn sample_files(dir: &Path, limit: usize) -> Vec<PathBuf> {
    let mut sample = Vec::new();
    collect(dir, limit, &mut sample);
    sample
}

fn collect(dir: &Path, limit: usize, sample: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if sample.len() >= limit {
            return;
        }
        let path = entry.path();
        if path.is_dir() {
            collect(&path, limit, sample);
        } else {
            sample.push(path);
        }
    }
}
