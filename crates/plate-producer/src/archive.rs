//! Zip packaging of generated fabrication outputs.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;
use zip::{write::FileOptions, ZipWriter};

/// Zip the contents of `dir` into `zip_path`. Entry names are relative to
/// `dir`, with forward slashes.
pub fn zip_directory(dir: &Path, zip_path: &Path) -> Result<()> {
    if let Some(parent) = zip_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let zip_file = fs::File::create(zip_path)
        .with_context(|| format!("failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(zip_file);
    add_directory_to_zip(&mut zip, dir, dir)?;
    zip.finish()?;
    debug!("wrote {}", zip_path.display());
    Ok(())
}

/// Recursively add directory contents to zip
fn add_directory_to_zip(zip: &mut ZipWriter<fs::File>, dir: &Path, base_path: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            add_directory_to_zip(zip, &path, base_path)?;
        } else {
            let file_name = path
                .strip_prefix(base_path)?
                .to_string_lossy()
                .replace('\\', "/");
            zip.start_file(file_name, FileOptions::<()>::default())?;
            std::io::copy(&mut fs::File::open(&path)?, zip)?;
        }
    }
    Ok(())
}
