//! Full-disk walks: by name, and by recency

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::{disk_origin, record_for, SearchBackend, SearchQuery};
use crate::config::{RECENT_DAYS, SECONDS_PER_DAY, SKIP_DIRS};
use crate::prober::{list_roots, root_label, walk};
use crate::record::FileRecord;

/// Walks every root looking for files whose extension and name match
pub struct DiskByNameBackend {
    roots: Vec<PathBuf>,
}

impl DiskByNameBackend {
    pub fn new() -> Self {
        Self::with_roots(list_roots())
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        DiskByNameBackend { roots }
    }
}

impl SearchBackend for DiskByNameBackend {
    fn label(&self) -> &str {
        "Disks"
    }

    fn search(&self, query: &SearchQuery, progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord> {
        scan_roots(&self.roots, progress, |name| query.matches(name))
    }
}

/// Every document of the chosen kind modified within the last N days,
/// newest first. The name filter is not applied.
pub struct DiskRecentBackend {
    roots: Vec<PathBuf>,
    days: u64,
    now: Option<SystemTime>,
}

impl DiskRecentBackend {
    pub fn new() -> Self {
        Self::with_roots(list_roots())
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        DiskRecentBackend {
            roots,
            days: RECENT_DAYS,
            now: None,
        }
    }

    #[cfg(test)]
    pub fn days(mut self, days: u64) -> Self {
        self.days = days;
        self
    }

    /// Pins "now" instead of reading the clock at search time
    #[cfg(test)]
    pub fn reference_time(mut self, now: SystemTime) -> Self {
        self.now = Some(now);
        self
    }

    fn cutoff(&self) -> SystemTime {
        let now = self.now.unwrap_or_else(SystemTime::now);
        let window = Duration::from_secs(self.days * SECONDS_PER_DAY);
        now.checked_sub(window).unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

impl SearchBackend for DiskRecentBackend {
    fn label(&self) -> &str {
        "Recent on disk"
    }

    fn search(&self, query: &SearchQuery, progress: &mut dyn FnMut(&Path)) -> Vec<FileRecord> {
        let cutoff = self.cutoff();
        let mut records: Vec<FileRecord> =
            scan_roots(&self.roots, progress, |name| query.has_extension(name))
                .into_iter()
                .filter(|r| r.modified_at.is_some_and(|t| t >= cutoff))
                .collect();

        records.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        records
    }
}

fn scan_roots<F>(roots: &[PathBuf], progress: &mut dyn FnMut(&Path), accept: F) -> Vec<FileRecord>
where
    F: Fn(&str) -> bool,
{
    let mut records = Vec::new();
    for root in roots {
        let origin = disk_origin(&root_label(root));
        log::debug!("scanning {}", root.display());

        for (dir, files) in walk(root, SKIP_DIRS, None) {
            progress(&dir);
            for name in files.iter().filter(|n| accept(n.as_str())) {
                if let Some(record) = record_for(&dir.join(name), &origin) {
                    records.push(record);
                }
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EXCEL_EXTENSIONS, SKIP_DIRS};
    use std::fs::{self, File, FileTimes};

    fn write_with_mtime(path: &Path, mtime: SystemTime) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"data").unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_times(FileTimes::new().set_modified(mtime)).unwrap();
    }

    #[test]
    fn test_by_name_matches_and_prunes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Users/ana")).unwrap();
        fs::write(root.join("Users/ana/Ventas Q1.xlsx"), b"1").unwrap();
        fs::write(root.join("Users/ana/ventas.docx"), b"1").unwrap();
        fs::write(root.join("Users/ana/compras.xlsx"), b"1").unwrap();
        fs::create_dir_all(root.join(SKIP_DIRS[0])).unwrap();
        fs::write(root.join(SKIP_DIRS[0]).join("ventas.xlsx"), b"1").unwrap();

        let backend = DiskByNameBackend::with_roots(vec![root.to_path_buf()]);
        let query = SearchQuery::new("ventas", EXCEL_EXTENSIONS);
        let mut visited = Vec::new();
        let records = backend.search(&query, &mut |d: &Path| visited.push(d.to_path_buf()));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ventas Q1.xlsx");
        assert_eq!(records[0].size, "1.0 B");
        assert!(records[0].exists);
        assert_eq!(records[0].origin, format!("Disk ({})", root_label(root)));
        assert!(visited.contains(&root.join("Users/ana")));
        assert!(!visited.iter().any(|d| d.ends_with(SKIP_DIRS[0])));
    }

    #[test]
    fn test_recency_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_800_000_000);
        let window = Duration::from_secs(30 * 86_400);

        write_with_mtime(&root.join("edge.xlsx"), now - window);
        write_with_mtime(&root.join("older.xlsx"), now - window - Duration::from_secs(1));
        write_with_mtime(&root.join("fresh.xlsx"), now - Duration::from_secs(60));
        write_with_mtime(&root.join("fresh.txt"), now - Duration::from_secs(60));

        let backend = DiskRecentBackend::with_roots(vec![root.to_path_buf()]).reference_time(now);
        let records = backend.search(&SearchQuery::new("", EXCEL_EXTENSIONS), &mut |_| {});

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["fresh.xlsx", "edge.xlsx"]);
    }

    #[test]
    fn test_recent_ignores_name_filter_and_sorts_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_800_000_000);
        write_with_mtime(&root.join("a/old.csv"), now - Duration::from_secs(5 * 86_400));
        write_with_mtime(&root.join("b/new.xlsx"), now - Duration::from_secs(3_600));
        write_with_mtime(&root.join("mid.xls"), now - Duration::from_secs(86_400));

        let backend = DiskRecentBackend::with_roots(vec![root.to_path_buf()])
            .days(7)
            .reference_time(now);
        let records = backend.search(&SearchQuery::new("zzz", EXCEL_EXTENSIONS), &mut |_| {});

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new.xlsx", "mid.xls", "old.csv"]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = DiskByNameBackend::with_roots(vec![dir.path().join("gone")]);
        assert!(backend
            .search(&SearchQuery::new("", EXCEL_EXTENSIONS), &mut |_| {})
            .is_empty());
    }
}
