//! Search backends
//!
//! Each backend adapts one source of candidate files (recycle bin, live disks,
//! autosave folders, recent-items shortcuts, shadow copies) into
//! [`FileRecord`]s. Backends absorb their own failures: a search always
//! returns a list, possibly empty.

mod disk;
mod recent;
mod recycle;
mod shadow;
mod temp;

pub use disk::{DiskByNameBackend, DiskRecentBackend};
pub use recent::RecentItemsBackend;
pub use recycle::RecycleBinBackend;
pub use shadow::ShadowCopyBackend;
pub use temp::TempFilesBackend;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::config::DocumentKind;
use crate::record::{extension_of, FileRecord};

pub const ORIGIN_RECYCLE_BIN: &str = "Recycle Bin";
pub const ORIGIN_TEMP: &str = "Autorecuperacion / Temp";
pub const ORIGIN_SHADOW: &str = "Shadow Copy (VSS)";
pub const ORIGIN_RECENT_EXISTS: &str = "Recent (Exists)";
pub const ORIGIN_RECENT_MISSING: &str = "Recent (NOT found)";

pub fn disk_origin(label: &str) -> String {
    format!("Disk ({})", label)
}

/// What the user is looking for: a name fragment and a set of extensions
#[derive(Debug, Clone)]
pub struct SearchQuery {
    name_filter: String,
    extensions: HashSet<String>,
}

impl SearchQuery {
    pub fn new(name_filter: &str, extensions: &[&str]) -> Self {
        SearchQuery {
            name_filter: name_filter.trim().to_lowercase(),
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn for_kind(name_filter: &str, kind: DocumentKind) -> Self {
        Self::new(name_filter, &kind.extensions())
    }

    #[cfg(test)]
    pub fn name_filter(&self) -> &str {
        &self.name_filter
    }

    /// Lowercased extension of `file_name` is in the set
    pub fn has_extension(&self, file_name: &str) -> bool {
        extension_of(file_name).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Empty filter matches everything; otherwise case-insensitive substring
    pub fn matches_name(&self, file_name: &str) -> bool {
        self.name_filter.is_empty() || file_name.to_lowercase().contains(&self.name_filter)
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.has_extension(file_name) && self.matches_name(file_name)
    }
}

/// Whether a backend can run at all in the current process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable(String),
}

/// A single source of candidate files
pub trait SearchBackend {
    /// Short human label used in progress and summary lines
    fn label(&self) -> &str;

    fn availability(&self) -> Availability {
        Availability::Available
    }

    /// Runs the search. `progress` is called with each directory entered
    /// and must return promptly.
    fn search(&self, query: &SearchQuery, progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord>;
}

/// Result of running one backend inside a multi-backend search
#[derive(Debug)]
pub enum BackendOutcome {
    Completed(Vec<FileRecord>),
    /// Not attempted, with the reason
    Skipped(String),
}

pub fn run_backend(
    backend: &dyn SearchBackend,
    query: &SearchQuery,
    progress: &mut dyn FnMut(&Path),
) -> BackendOutcome {
    match backend.availability() {
        Availability::Available => {
            let records = backend.search(query, progress);
            log::info!("{}: {} match(es)", backend.label(), records.len());
            BackendOutcome::Completed(records)
        }
        Availability::Unavailable(reason) => {
            log::info!("{}: skipped ({})", backend.label(), reason);
            BackendOutcome::Skipped(reason)
        }
    }
}

/// Stats a found file and turns it into a record; vanished or non-regular
/// files yield `None`.
pub(crate) fn record_for(path: &Path, origin: &str) -> Option<FileRecord> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Some(FileRecord::from_metadata(
            path.to_string_lossy().into_owned(),
            &meta,
            origin,
        )),
        Ok(_) => None,
        Err(e) => {
            log::debug!("cannot stat {}: {}", path.display(), e);
            None
        }
    }
}
