//! The record type every search backend produces, plus the small
//! formatting and filename helpers they share.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::time::SystemTime;

/// Shown when a size or date cannot be read at all
pub const UNKNOWN: &str = "?";
/// Shown for a record whose file is known to be gone
pub const NOT_AVAILABLE: &str = "N/A";

/// A candidate file found by one backend
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Display filename, extension included
    pub name: String,
    /// Absolute path; the dedup key
    pub path: String,
    /// Human-readable size ("1.5 MB") or a sentinel
    pub size: String,
    /// Formatted timestamp or a sentinel
    pub modified: String,
    /// Which backend produced the record
    pub origin: String,
    pub exists: bool,
    /// Raw mtime, kept for ordering only
    #[serde(skip)]
    pub modified_at: Option<SystemTime>,
}

impl FileRecord {
    /// Builds a record for a file that is present on disk
    pub fn from_metadata(path: String, metadata: &Metadata, origin: impl Into<String>) -> Self {
        let modified_at = metadata.modified().ok();
        FileRecord {
            name: file_name_of(&path).to_string(),
            size: format_size(metadata.len()),
            modified: modified_at
                .map(format_time)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            path,
            origin: origin.into(),
            exists: true,
            modified_at,
        }
    }
}

/// Formats a byte count the way Explorer-style listings do: one decimal, binary units.
pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

pub fn format_time(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// Last path component, accepting both `\` and `/` separators
/// regardless of the host platform.
pub fn file_name_of(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['\\', '/']);
    match trimmed.rfind(['\\', '/']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Splits a filename into stem and extension (dot included).
///
/// A leading dot does not start an extension (`.profile` has none),
/// and neither does a trailing one.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Lowercased extension of the final path component, dot included
pub fn extension_of(path: &str) -> Option<String> {
    let (_, ext) = split_extension(file_name_of(path));
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_572_864), "1.5 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024 * 1024), "2.0 TB");
    }

    #[test]
    fn test_file_name_of_mixed_separators() {
        assert_eq!(file_name_of("C:\\Users\\ana\\Informe.xlsx"), "Informe.xlsx");
        assert_eq!(file_name_of("/home/ana/Informe.xlsx"), "Informe.xlsx");
        assert_eq!(file_name_of("Informe.xlsx"), "Informe.xlsx");
        assert_eq!(file_name_of("C:\\Users\\ana\\"), "ana");
    }

    #[test]
    fn test_extension_rules() {
        assert_eq!(extension_of("C:\\a\\Book1.XLSX"), Some(".xlsx".to_string()));
        assert_eq!(extension_of("~$Book1.xlsx"), Some(".xlsx".to_string()));
        assert_eq!(extension_of("C:\\dir.v2\\README"), None);
        assert_eq!(extension_of(".xlsx"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(split_extension("report.xlsx"), ("report", ".xlsx"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
    }
}
