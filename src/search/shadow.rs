//! Shadow copy (VSS) backend

use std::path::Path;

use super::{record_for, Availability, SearchBackend, SearchQuery, ORIGIN_SHADOW};
use crate::config::{SHADOW_COMMON_DIRS, SHADOW_MAX_DEPTH};
use crate::privilege::is_elevated;
use crate::process::CommandRunner;
use crate::record::FileRecord;
use crate::vss::{list_shadow_copies, ShadowCopyDescriptor};

/// Looks for older copies of documents inside every shadow copy.
///
/// With an original path, only that file is probed in each matching
/// snapshot; otherwise the user profile folders are walked by name.
pub struct ShadowCopyBackend<R: CommandRunner> {
    runner: R,
    original_path: Option<String>,
    privileged: bool,
}

impl<R: CommandRunner> ShadowCopyBackend<R> {
    pub fn new(runner: R) -> Self {
        ShadowCopyBackend {
            runner,
            original_path: None,
            privileged: is_elevated(),
        }
    }

    pub fn with_original_path(mut self, path: &str) -> Self {
        let path = path.trim();
        self.original_path = (!path.is_empty()).then(|| path.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_privilege(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }
}

impl<R: CommandRunner> SearchBackend for ShadowCopyBackend<R> {
    fn label(&self) -> &str {
        "Shadow copies"
    }

    fn availability(&self) -> Availability {
        if self.privileged {
            Availability::Available
        } else {
            Availability::Unavailable("administrator privileges required".to_string())
        }
    }

    fn search(&self, query: &SearchQuery, progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord> {
        let shadows = list_shadow_copies(&self.runner);
        log::debug!("{} shadow copies listed", shadows.len());

        let mut records = Vec::new();
        for shadow in &shadows {
            match self.original_path.as_deref() {
                Some(original) => records.extend(probe_original(shadow, original)),
                None => records.extend(search_shadow(shadow, query, progress)),
            }
        }
        records
    }
}

/// `C:\Users\ana\x.xlsx` inside a snapshot device: the drive prefix is
/// replaced by the device path.
pub fn translate_to_shadow(device_path: &str, original: &str) -> String {
    let rest = match drive_letter_of(original) {
        Some(_) => &original[2..],
        None => original,
    };
    format!("{}{}", device_path, rest)
}

fn drive_letter_of(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let letter = chars.next().filter(|c| c.is_ascii_alphabetic())?;
    (chars.next() == Some(':')).then_some(letter)
}

fn probe_original(shadow: &ShadowCopyDescriptor, original: &str) -> Option<FileRecord> {
    if let Some(letter) = drive_letter_of(original) {
        if !letter.eq_ignore_ascii_case(&shadow.drive_letter) {
            return None;
        }
    }
    let candidate = translate_to_shadow(&shadow.device_path, original);
    record_for(Path::new(&candidate), ORIGIN_SHADOW).map(|r| stamp(r, shadow))
}

fn search_shadow(
    shadow: &ShadowCopyDescriptor,
    query: &SearchQuery,
    progress: &mut dyn FnMut(&Path),
) -> Vec<FileRecord> {
    let mut records = Vec::new();
    for common in SHADOW_COMMON_DIRS {
        let root = Path::new(&shadow.device_path).join(common);
        if !root.is_dir() {
            continue;
        }
        for (dir, files) in crate::prober::walk(&root, &[], Some(SHADOW_MAX_DEPTH)) {
            progress(&dir);
            for name in files.iter().filter(|n| query.matches(n)) {
                if let Some(record) = record_for(&dir.join(name), ORIGIN_SHADOW) {
                    records.push(stamp(record, shadow));
                }
            }
        }
    }
    records
}

/// Shadow results carry the snapshot date, not the file's own mtime
fn stamp(mut record: FileRecord, shadow: &ShadowCopyDescriptor) -> FileRecord {
    record.modified = shadow.creation_date.clone();
    record
}
