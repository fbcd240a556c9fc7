use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating {}", parent.display()))?;
    }
    Ok(())
}

/// Sibling path the output is staged at before being renamed into place.
fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|x| x.to_str())
        .unwrap_or("output");
    path.with_file_name(format!("{file_name}.tmp"))
}

fn commit_tmp(tmp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp_path, path)
        .with_context(|| format!("Failed moving {} -> {}", tmp_path.display(), path.display()))
}

/// Lets `write` fill the staging file, then renames it over `path`. On failure
/// the staging file is removed and `path` is left untouched.
pub fn write_staged(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    ensure_parent_dir(path)?;
    let tmp_path = tmp_path_for(path);
    if let Err(err) = write(&tmp_path).and_then(|()| commit_tmp(&tmp_path, path)) {
        if tmp_path.exists() {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                tracing::warn!("Failed removing {}: {cleanup}", tmp_path.display());
            }
        }
        return Err(err);
    }
    Ok(())
}

pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    write_staged(path, |tmp_path| {
        fs::write(tmp_path, contents)
            .with_context(|| format!("Failed writing {}", tmp_path.display()))
    })
}
