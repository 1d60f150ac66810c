//! Gzip-compressed tar output for a populated export tree.

use std::fs::File;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::Result;

/// Build a `.tar.gz` of everything under `root` at `archive_path`.
///
/// Entries are stored relative to `root`, so unpacking with
/// `tar -xzvf <archive> -C <dir>` recreates the tree in place.
pub fn compress(root: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder.append_dir_all(".", root)?;
    builder.into_inner()?.finish()?;

    Ok(())
}
