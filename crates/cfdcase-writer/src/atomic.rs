//! Atomic replacement of a case directory.
//!
//! The new tree is assembled in a staging directory next to the target,
//! then swapped in with renames. Readers of the target see either the old
//! tree or the new one, never a mix. If the swap fails, the old tree is
//! moved back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::WriteError;
use crate::render::RenderedFile;

const STAGED_NAME: &str = "staged";
const PREVIOUS_NAME: &str = "previous";

fn parent_of(target: &Path) -> Result<&Path, WriteError> {
    match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => Ok(p),
        Some(_) => Ok(Path::new(".")),
        None => Err(WriteError::io(
            target,
            io::Error::new(io::ErrorKind::InvalidInput, "case directory has no parent"),
        )),
    }
}

fn write_file(root: &Path, file: &RenderedFile) -> Result<PathBuf, WriteError> {
    let path = root.join(&file.path);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| WriteError::io(dir, e))?;
    }
    fs::write(&path, file.contents.as_bytes()).map_err(|e| WriteError::io(&path, e))?;
    Ok(path)
}

/// Replace the directory `target` with exactly `files`.
///
/// Anything previously under `target` is discarded on success. On any
/// failure the previous contents of `target` are left in place (or
/// restored) and the staging area is removed.
pub fn replace_dir(target: &Path, files: &[RenderedFile]) -> Result<(), WriteError> {
    let parent = parent_of(target)?;
    fs::create_dir_all(parent).map_err(|e| WriteError::io(parent, e))?;

    // 1. Assemble the new tree beside the target so the renames below stay
    //    on one filesystem.
    let staging = tempfile::Builder::new()
        .prefix(".cfdcase-staging-")
        .tempdir_in(parent)
        .map_err(|e| WriteError::io(parent, e))?;
    let staged = staging.path().join(STAGED_NAME);
    fs::create_dir(&staged).map_err(|e| WriteError::io(&staged, e))?;
    for file in files {
        write_file(&staged, file)?;
    }

    // 2. Move the old tree out of the way.
    let backup = staging.path().join(PREVIOUS_NAME);
    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, &backup).map_err(|e| WriteError::io(target, e))?;
    }

    // 3. Swap the new tree in, restoring the old one on failure.
    if let Err(e) = fs::rename(&staged, target) {
        if had_previous {
            if let Err(restore) = fs::rename(&backup, target) {
                log::warn!(
                    "could not restore {} after failed write: {restore}",
                    target.display()
                );
                // Keep the old tree on disk rather than deleting it with
                // the staging directory.
                let _ = staging.keep();
            } else {
                log::warn!("write to {} failed, previous contents restored", target.display());
            }
        }
        return Err(WriteError::io(target, e));
    }

    // 4. Dropping the staging directory deletes the old tree.
    if let Err(e) = staging.close() {
        log::warn!("could not remove previous contents of {}: {e}", target.display());
    }
    Ok(())
}

/// Read every regular file under `root`, as paths relative to `root`,
/// sorted. A missing `root` reads as empty.
pub fn read_tree(root: &Path) -> Result<Vec<(PathBuf, Vec<u8>)>, WriteError> {
    let mut out = Vec::new();
    if !root.exists() {
        return Ok(out);
    }
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| WriteError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| WriteError::io(&dir, e))?;
            let path = entry.path();
            let kind = entry.file_type().map_err(|e| WriteError::io(&path, e))?;
            if kind.is_dir() {
                pending.push(path);
            } else if kind.is_file() {
                let bytes = fs::read(&path).map_err(|e| WriteError::io(&path, e))?;
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                out.push((relative, bytes));
            }
        }
    }
    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}
