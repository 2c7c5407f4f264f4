//! Drive enumeration and directory walking

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Root of every drive letter that exists, A to Z
#[cfg(windows)]
pub fn list_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root| root.exists())
        .collect()
}

/// Non-Windows hosts have a single root
#[cfg(not(windows))]
pub fn list_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

/// Short label for a root: "C" for `C:\`, the path itself otherwise
pub fn root_label(root: &Path) -> String {
    let text = root.to_string_lossy();
    let trimmed = text.trim_end_matches(['\\', '/']).trim_end_matches(':');
    if trimmed.is_empty() {
        text.into_owned()
    } else {
        trimmed.to_string()
    }
}

type Entries = Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>;

/// Top-down walk yielding `(directory, file names)` one directory at a time.
///
/// Directories named in the skip-list are never entered. With a depth limit,
/// directories deeper than the limit are pruned silently along with their files.
/// Unreadable entries are skipped.
pub struct Walk {
    entries: Entries,
    current: Option<(PathBuf, Vec<String>)>,
    max_depth: Option<usize>,
}

pub fn walk(root: &Path, skip_names: &[&str], max_depth: Option<usize>) -> Walk {
    let skip: Vec<String> = skip_names.iter().map(|s| s.to_string()).collect();

    // Files sort before subdirectories, so a directory's files arrive
    // contiguously right after the directory itself.
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth + 1);
    }

    let entries = walker
        .into_iter()
        .filter_entry(move |entry| entry.depth() == 0 || !is_skipped(entry, &skip));

    Walk {
        entries: Box::new(entries),
        current: None,
        max_depth,
    }
}

fn is_skipped(entry: &DirEntry, skip: &[String]) -> bool {
    entry.file_type().is_dir() && skip.iter().any(|name| entry.file_name() == OsStr::new(name))
}

impl Iterator for Walk {
    type Item = (PathBuf, Vec<String>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next() {
                None => return self.current.take(),
                Some(Err(e)) => {
                    log::debug!("walk: skipping unreadable entry: {}", e);
                    continue;
                }
                Some(Ok(entry)) => entry,
            };

            if entry.file_type().is_dir() {
                if self.max_depth.is_some_and(|max| entry.depth() > max) {
                    continue;
                }
                let finished = self.current.replace((entry.into_path(), Vec::new()));
                if finished.is_some() {
                    return finished;
                }
            } else if let Some((_, files)) = self.current.as_mut() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    fn collect(walk: Walk) -> HashMap<PathBuf, Vec<String>> {
        walk.map(|(dir, mut files)| {
            files.sort();
            (dir, files)
        })
        .collect()
    }

    #[test]
    fn test_walk_groups_files_by_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("top.xlsx"));
        touch(&root.join("a/one.xlsx"));
        touch(&root.join("a/two.docx"));
        touch(&root.join("a/b/three.xlsx"));
        touch(&root.join("c/four.csv"));

        let groups = collect(walk(root, &[], None));
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[root], vec!["top.xlsx"]);
        assert_eq!(groups[&root.join("a")], vec!["one.xlsx", "two.docx"]);
        assert_eq!(groups[&root.join("a/b")], vec!["three.xlsx"]);
        assert_eq!(groups[&root.join("c")], vec!["four.csv"]);
    }

    #[test]
    fn test_walk_prunes_skip_list() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Windows/System32/hidden.xlsx"));
        touch(&root.join("windows/kept.xlsx"));
        touch(&root.join("Users/ana/kept.xlsx"));

        let groups = collect(walk(root, crate::config::SKIP_DIRS, None));
        assert!(!groups.keys().any(|d| d.starts_with(root.join("Windows"))));
        // exact, case-sensitive match only
        assert_eq!(groups[&root.join("windows")], vec!["kept.xlsx"]);
        assert_eq!(groups[&root.join("Users/ana")], vec!["kept.xlsx"]);
    }

    #[test]
    fn test_walk_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("d0.xlsx"));
        touch(&root.join("l1/d1.xlsx"));
        touch(&root.join("l1/l2/d2.xlsx"));
        touch(&root.join("l1/l2/l3/d3.xlsx"));

        let groups = collect(walk(root, &[], Some(1)));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[root], vec!["d0.xlsx"]);
        assert_eq!(groups[&root.join("l1")], vec!["d1.xlsx"]);
    }

    #[test]
    fn test_walk_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(walk(&dir.path().join("nope"), &[], None).count(), 0);
    }

    #[test]
    fn test_root_label() {
        assert_eq!(root_label(Path::new("C:\\")), "C");
        assert_eq!(root_label(Path::new("D:")), "D");
        assert_eq!(root_label(Path::new("/")), "/");
    }

    #[test]
    fn test_list_roots_not_empty() {
        assert!(!list_roots().is_empty());
    }
}
