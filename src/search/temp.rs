//! Office autorecovery folders and temp directories

use std::path::{Path, PathBuf};

use super::{record_for, SearchBackend, SearchQuery, ORIGIN_TEMP};
use crate::config::{AUTORECOVERY_EXTENSIONS, TEMP_EXTENSIONS, TEMP_PREFIXES};
use crate::prober::walk;
use crate::record::{extension_of, FileRecord};

pub struct TempFilesBackend {
    paths: Vec<PathBuf>,
}

impl TempFilesBackend {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        TempFilesBackend { paths }
    }
}

/// Lock/scratch files (`~$Book.xlsx`, `~DF12.tmp`), autorecovery files
/// (`.xar`, `.asd`) and plain documents of the requested kind.
pub fn is_recovery_candidate(file_name: &str, query: &SearchQuery) -> bool {
    let lower = file_name.to_lowercase();
    let Some(ext) = extension_of(&lower) else {
        return false;
    };

    if TEMP_PREFIXES.iter().any(|p| lower.starts_with(p))
        && (query.has_extension(&lower) || TEMP_EXTENSIONS.contains(&ext.as_str()))
    {
        return true;
    }
    if AUTORECOVERY_EXTENSIONS.contains(&ext.as_str()) {
        return true;
    }
    query.has_extension(&lower)
}

impl SearchBackend for TempFilesBackend {
    fn label(&self) -> &str {
        "Temp / autorecovery"
    }

    fn search(&self, query: &SearchQuery, progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord> {
        let mut records = Vec::new();
        for base in &self.paths {
            if !base.is_dir() {
                log::debug!("recovery folder {} not present", base.display());
                continue;
            }
            for (dir, files) in walk(base, &[], None) {
                progress(&dir);
                for name in &files {
                    if !is_recovery_candidate(name, query) || !query.matches_name(name) {
                        continue;
                    }
                    if let Some(record) = record_for(&dir.join(name), ORIGIN_TEMP) {
                        records.push(record);
                    }
                }
            }
        }
        records
    }
}
