//! Recycle Bin backend

use std::path::Path;

use super::{SearchBackend, SearchQuery, ORIGIN_RECYCLE_BIN};
use crate::process::CommandRunner;
use crate::record::{file_name_of, FileRecord, UNKNOWN};
use crate::recycle_bin::{list_recycle_bin, RecycleBinItem};

pub struct RecycleBinBackend<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> RecycleBinBackend<R> {
    pub fn new(runner: R) -> Self {
        RecycleBinBackend { runner }
    }
}

impl<R: CommandRunner> SearchBackend for RecycleBinBackend<R> {
    fn label(&self) -> &str {
        "Recycle Bin"
    }

    fn search(&self, query: &SearchQuery, _progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord> {
        list_recycle_bin(&self.runner)
            .into_iter()
            .filter_map(|item| to_record(item, query))
            .collect()
    }
}

fn to_record(item: RecycleBinItem, query: &SearchQuery) -> Option<FileRecord> {
    let name = item.name.filter(|n| !n.is_empty())?;
    if !query.matches(&name) {
        return None;
    }
    let Some(location) = item.original_path.filter(|p| !p.is_empty()) else {
        log::debug!("recycle bin: '{}' has no original location, dropped", name);
        return None;
    };

    Some(FileRecord {
        path: original_file_path(&location, &name),
        name,
        size: item.size.filter(|s| !s.is_empty()).unwrap_or_else(|| UNKNOWN.to_string()),
        modified: item
            .delete_date
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        origin: ORIGIN_RECYCLE_BIN.to_string(),
        exists: false,
        modified_at: None,
    })
}

/// The shell reports the folder an item was deleted from; the record path
/// is that folder plus the item name.
pub fn original_file_path(location: &str, name: &str) -> String {
    if file_name_of(location).eq_ignore_ascii_case(name) {
        return location.to_string();
    }
    format!("{}\\{}", location.trim_end_matches('\\'), name)
}
