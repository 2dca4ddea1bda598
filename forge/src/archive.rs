//! Lazy zip archives for job output directories.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Path of the cached archive for a job, beside its directory.
pub fn archive_path(jobs_root: &Path, job_id: &str) -> PathBuf {
    jobs_root.join(format!("{job_id}.zip"))
}

/// Zip a job's output directory, creating the archive only once.
///
/// Subsequent calls reuse the existing archive instead of rebuilding it.
/// Fails if the job directory does not exist.
pub fn ensure_archive(jobs_root: &Path, job_id: &str) -> Result<PathBuf> {
    let job_dir = jobs_root.join(job_id);
    if !job_dir.is_dir() {
        return Err(anyhow!("missing job directory {}", job_dir.display()));
    }

    let zip_path = archive_path(jobs_root, job_id);
    if zip_path.exists() {
        debug!(path = %zip_path.display(), "reusing cached archive");
        return Ok(zip_path);
    }

    zip_directory(&job_dir, &zip_path)?;
    debug!(path = %zip_path.display(), "archive created");
    Ok(zip_path)
}

/// Write a deflate-compressed zip of `dir` to `zip_path`, with entry names
/// relative to `dir`.
fn zip_directory(dir: &Path, zip_path: &Path) -> Result<()> {
    let file = fs::File::create(zip_path)
        .with_context(|| format!("create archive {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    // Sorted walk keeps entry order stable across rebuilds.
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("relativize {}", entry.path().display()))?;
        let name = rel.to_string_lossy().replace('\\', "/");
        zip.start_file(name, options)
            .with_context(|| format!("add archive entry {}", rel.display()))?;
        let contents = fs::read(entry.path())
            .with_context(|| format!("read {}", entry.path().display()))?;
        zip.write_all(&contents)
            .with_context(|| format!("write archive entry {}", rel.display()))?;
    }

    zip.finish().context("finalize archive")?;
    Ok(())
}
