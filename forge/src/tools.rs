//! Filesystem primitives scoped to one job workspace.
//!
//! These are the only side effects the coder loop performs. All paths are
//! resolved relative to the workspace root; callers never hand the model an
//! absolute path outside it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Handle to a job's output directory.
#[derive(Debug, Clone)]
pub struct JobWorkspace {
    root: PathBuf,
}

impl JobWorkspace {
    /// Open a workspace, creating the root directory if missing.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create workspace {}", root.display()))?;
        Ok(Self { root })
    }

    /// Workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file's contents, returning an empty string if it does not exist.
    pub fn read_file(&self, rel_path: &str) -> Result<String> {
        let path = self.root.join(rel_path);
        if !path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    /// Write contents to a file, creating parent directories and overwriting
    /// any existing content.
    pub fn write_file(&self, rel_path: &str, contents: &str) -> Result<()> {
        let path = self.root.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    /// List entry names under a directory, sorted. Empty for a missing path.
    pub fn list_entries(&self, rel_path: &str) -> Result<Vec<String>> {
        let path = self.root.join(rel_path);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let entries =
            fs::read_dir(&path).with_context(|| format!("read dir {}", path.display()))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("read dir entry in {}", path.display()))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
