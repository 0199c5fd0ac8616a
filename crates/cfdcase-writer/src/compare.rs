//! Dry-run comparison of a rendered case against what is on disk.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::atomic::read_tree;
use crate::error::WriteError;
use crate::render::RenderedFile;

/// How one file would change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The file does not exist yet.
    Create,
    /// The file exists with different contents.
    Modify,
    /// The file exists but would not be part of the new tree.
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Modify => write!(f, "modify"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// One file a write would touch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedChange {
    /// Path relative to the case directory.
    pub path: PathBuf,
    /// What would happen to it.
    pub kind: ChangeKind,
}

/// Compare `files` against the tree under `dir`, without writing.
///
/// Changes are listed in path order. Files identical on disk are omitted.
pub fn diff_tree(files: &[RenderedFile], dir: &Path) -> Result<Vec<PlannedChange>, WriteError> {
    let mut existing: BTreeMap<PathBuf, Vec<u8>> = read_tree(dir)?.into_iter().collect();
    let mut changes = Vec::new();
    for file in files {
        let kind = match existing.remove(&file.path) {
            None => Some(ChangeKind::Create),
            Some(bytes) if bytes != file.contents.as_bytes() => Some(ChangeKind::Modify),
            Some(_) => None,
        };
        if let Some(kind) = kind {
            changes.push(PlannedChange {
                path: file.path.clone(),
                kind,
            });
        }
    }
    changes.extend(existing.into_keys().map(|path| PlannedChange {
        path,
        kind: ChangeKind::Delete,
    }));
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
}
