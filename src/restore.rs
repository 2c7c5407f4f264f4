//! Copying a found file to a folder of the user's choice

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::{split_extension, FileRecord};

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("the file no longer exists at {0}")]
    SourceMissing(String),

    #[error("destination folder does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),

    #[error("failed to copy to {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Copies `record` into `destination` and returns the path written.
///
/// An existing file is never overwritten: `name_recuperadoN.ext` is used
/// with the first free N.
pub fn restore(record: &FileRecord, destination: &Path) -> Result<PathBuf, RestoreError> {
    let source = Path::new(&record.path);
    let source_meta = check_source(record)?;
    if !destination.is_dir() {
        return Err(RestoreError::DestinationMissing(destination.to_path_buf()));
    }

    let target = free_destination(destination, &record.name);
    let bytes = fs::copy(source, &target).map_err(|source| RestoreError::Copy {
        path: target.clone(),
        source,
    })?;
    log::info!("restored {} ({} bytes) to {}", record.path, bytes, target.display());

    if let Err(e) = copy_times(&source_meta, &target) {
        log::warn!("could not preserve timestamps on {}: {}", target.display(), e);
    }
    Ok(target)
}

/// The record must still point at a regular file. Recycle Bin entries and
/// unresolved shortcut targets fail here.
pub fn check_source(record: &FileRecord) -> Result<fs::Metadata, RestoreError> {
    match fs::metadata(&record.path) {
        Ok(meta) if meta.is_file() => Ok(meta),
        _ => Err(RestoreError::SourceMissing(record.path.clone())),
    }
}

/// First of `name`, `stem_recuperado1.ext`, `stem_recuperado2.ext`, ...
/// that does not exist in `dir`
pub fn free_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = split_extension(name);
    (1u64..)
        .map(|n| dir.join(format!("{}_recuperado{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

fn copy_times(source: &fs::Metadata, target: &Path) -> io::Result<()> {
    let mut times = FileTimes::new();
    if let Ok(accessed) = source.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = source.modified() {
        times = times.set_modified(modified);
    }
    File::options().write(true).open(target)?.set_times(times)
}
