//! Windows "Recent Items" shortcuts

use std::fs;
use std::path::{Path, PathBuf};

use super::{SearchBackend, SearchQuery, ORIGIN_RECENT_EXISTS, ORIGIN_RECENT_MISSING};
use crate::record::{file_name_of, format_size, format_time, FileRecord, NOT_AVAILABLE, UNKNOWN};
use crate::shortcut::parse_shortcut_target;

/// Resolves every `.lnk` in the Recent Items folder and reports the targets
/// that match, whether or not they still exist.
pub struct RecentItemsBackend {
    folder: Option<PathBuf>,
}

impl RecentItemsBackend {
    pub fn new(folder: Option<PathBuf>) -> Self {
        RecentItemsBackend { folder }
    }
}

impl SearchBackend for RecentItemsBackend {
    fn label(&self) -> &str {
        "Windows recent items"
    }

    fn search(&self, query: &SearchQuery, progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord> {
        let Some(folder) = self.folder.as_deref() else {
            return Vec::new();
        };
        let entries = match fs::read_dir(folder) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("recent items folder {}: {}", folder.display(), e);
                return Vec::new();
            }
        };
        progress(folder);

        let mut records = Vec::new();
        for entry in entries.flatten() {
            let lnk_name = entry.file_name().to_string_lossy().to_lowercase();
            if !lnk_name.ends_with(".lnk") {
                continue;
            }
            let Some(target) = parse_shortcut_target(&entry.path()) else {
                continue;
            };
            let target_name = file_name_of(&target).to_string();
            if !query.matches(&target_name) {
                continue;
            }
            records.push(describe_target(target, target_name));
        }
        records
    }
}

fn describe_target(target: String, name: String) -> FileRecord {
    let metadata = fs::metadata(&target).ok().filter(|m| m.is_file());
    let exists = metadata.is_some();

    let (size, modified, modified_at) = match metadata {
        Some(meta) => {
            let modified_at = meta.modified().ok();
            (
                format_size(meta.len()),
                modified_at
                    .map(format_time)
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                modified_at,
            )
        }
        None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string(), None),
    };

    FileRecord {
        name,
        path: target,
        size,
        modified,
        origin: if exists {
            ORIGIN_RECENT_EXISTS
        } else {
            ORIGIN_RECENT_MISSING
        }
        .to_string(),
        exists,
        modified_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXCEL_EXTENSIONS;
    use byteorder::{LittleEndian, WriteBytesExt};

    /// Header + LinkInfo with a local base path, no ID list
    fn lnk_bytes(target: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0x4C).unwrap();
        buf.resize(0x14, 0);
        buf.write_u32::<LittleEndian>(0x02).unwrap();
        buf.resize(0x4C, 0);
        buf.write_u32::<LittleEndian>(0x1C + target.len() as u32 + 1).unwrap();
        buf.write_u32::<LittleEndian>(0x1C).unwrap();
        buf.write_u32::<LittleEndian>(0x01).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0x1C).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.extend_from_slice(target.as_bytes());
        buf.push(0);
        buf
    }

    #[test]
    fn test_reports_existing_and_missing_targets() {
        let dir = tempfile::tempdir().unwrap();
        let recent = dir.path().join("Recent");
        fs::create_dir_all(&recent).unwrap();

        let live = dir.path().join("Cierre mensual.xlsx");
        fs::write(&live, vec![0u8; 2048]).unwrap();
        let live_str = live.to_string_lossy().into_owned();

        fs::write(recent.join("Cierre mensual.xlsx.lnk"), lnk_bytes(&live_str)).unwrap();
        fs::write(
            recent.join("Cierre anual.xlsx.lnk"),
            lnk_bytes("C:\\Users\\ana\\Cierre anual.xlsx"),
        )
        .unwrap();
        fs::write(recent.join("Cierre.docx.lnk"), lnk_bytes("C:\\Cierre.docx")).unwrap();
        fs::write(recent.join("broken.lnk"), b"not a shortcut").unwrap();
        fs::write(recent.join("Cierre.xlsx"), lnk_bytes("C:\\x.xlsx")).unwrap();

        let backend = RecentItemsBackend::new(Some(recent));
        let mut records = backend.search(&SearchQuery::new("cierre", EXCEL_EXTENSIONS), &mut |_| {});
        records.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(records.len(), 2);

        let missing = &records[0];
        assert_eq!(missing.name, "Cierre anual.xlsx");
        assert_eq!(missing.path, "C:\\Users\\ana\\Cierre anual.xlsx");
        assert!(!missing.exists);
        assert_eq!(missing.origin, "Recent (NOT found)");
        assert_eq!(missing.size, "N/A");
        assert_eq!(missing.modified, "N/A");

        let present = &records[1];
        assert_eq!(present.path, live_str);
        assert!(present.exists);
        assert_eq!(present.origin, "Recent (Exists)");
        assert_eq!(present.size, "2.0 KB");
    }

    #[test]
    fn test_unset_or_missing_folder() {
        let query = SearchQuery::new("", EXCEL_EXTENSIONS);
        assert!(RecentItemsBackend::new(None).search(&query, &mut |_| {}).is_empty());

        let dir = tempfile::tempdir().unwrap();
        let backend = RecentItemsBackend::new(Some(dir.path().join("nope")));
        assert!(backend.search(&query, &mut |_| {}).is_empty());
    }
}
