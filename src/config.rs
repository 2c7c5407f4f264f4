//! Static search tables and the recovery folders resolved from the environment

use std::path::PathBuf;
use std::time::Duration;

pub const EXCEL_EXTENSIONS: &[&str] = &[".xlsx", ".xls", ".xlsm", ".xlsb", ".csv"];
pub const WORD_EXTENSIONS: &[&str] = &[".docx", ".doc", ".docm", ".dotx", ".dotm", ".rtf"];
pub const POWERPOINT_EXTENSIONS: &[&str] = &[".pptx", ".ppt", ".pptm", ".potx", ".ppsx"];

/// Prefixes Office gives to lock and scratch files (`~$Book1.xlsx`, `~ABC.tmp`)
pub const TEMP_PREFIXES: &[&str] = &["~$", "~"];
pub const TEMP_EXTENSIONS: &[&str] = &[".tmp", ".xlk", ".wbk"];
pub const AUTORECOVERY_EXTENSIONS: &[&str] = &[".xar", ".asd"];

/// Directory names never descended into during a disk walk (exact, case-sensitive)
pub const SKIP_DIRS: &[&str] = &[
    "$Recycle.Bin",
    "System Volume Information",
    "Windows",
    "$WinREAgent",
    "Recovery",
];

pub const RECENT_DAYS: u64 = 30;
pub const SECONDS_PER_DAY: u64 = 86_400;

pub const SHADOW_MAX_DEPTH: usize = 5;
/// Folders walked inside each shadow copy when the original path is unknown
pub const SHADOW_COMMON_DIRS: &[&str] = &["Users", "Documents and Settings"];

pub const RECYCLE_BIN_TIMEOUT: Duration = Duration::from_secs(30);
pub const VSSADMIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variable holding the `env_logger` filter
pub const LOG_ENV_VAR: &str = "LOST_FILE_FINDER_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Which family of documents a search is looking for.
///
/// Every backend, the disk walks included, searches the session's current
/// kind. Excel is the starting kind; `Office` widens to all three families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    #[default]
    Excel,
    Word,
    PowerPoint,
    Office,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Excel,
        DocumentKind::Word,
        DocumentKind::PowerPoint,
        DocumentKind::Office,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Excel => "Excel",
            DocumentKind::Word => "Word",
            DocumentKind::PowerPoint => "PowerPoint",
            DocumentKind::Office => "Office (all)",
        }
    }

    pub fn extensions(&self) -> Vec<&'static str> {
        match self {
            DocumentKind::Excel => EXCEL_EXTENSIONS.to_vec(),
            DocumentKind::Word => WORD_EXTENSIONS.to_vec(),
            DocumentKind::PowerPoint => POWERPOINT_EXTENSIONS.to_vec(),
            DocumentKind::Office => EXCEL_EXTENSIONS
                .iter()
                .chain(WORD_EXTENSIONS)
                .chain(POWERPOINT_EXTENSIONS)
                .copied()
                .collect(),
        }
    }
}

/// Well-known autosave/temp folders plus the Windows "Recent Items" folder.
///
/// Resolved once at startup. A source whose environment variable is unset
/// resolves to nothing and is skipped by the backends.
#[derive(Debug, Clone, Default)]
pub struct RecoveryPaths {
    pub autorecovery: Vec<PathBuf>,
    pub recent_items: Option<PathBuf>,
}

impl RecoveryPaths {
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty()).map(PathBuf::from);

        let mut autorecovery = Vec::new();
        if let Some(appdata) = var("APPDATA") {
            for app in ["Excel", "Word", "PowerPoint"] {
                autorecovery.push(appdata.join("Microsoft").join(app));
            }
        }
        if let Some(local) = var("LOCALAPPDATA") {
            autorecovery.push(local.join("Microsoft").join("Office").join("UnsavedFiles"));
        }
        if let Some(temp) = var("TEMP") {
            autorecovery.push(temp);
        }

        let recent_items = var("APPDATA").map(|appdata| {
            appdata
                .join("Microsoft")
                .join("Windows")
                .join("Recent")
        });

        RecoveryPaths {
            autorecovery,
            recent_items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_office_is_union_of_families() {
        let office = DocumentKind::Office.extensions();
        assert_eq!(
            office.len(),
            EXCEL_EXTENSIONS.len() + WORD_EXTENSIONS.len() + POWERPOINT_EXTENSIONS.len()
        );
        assert!(office.contains(&".xlsm"));
        assert!(office.contains(&".rtf"));
        assert!(office.contains(&".ppsx"));
    }

    #[test]
    fn test_default_kind_is_excel_and_office_covers_disk_scans() {
        assert_eq!(DocumentKind::default(), DocumentKind::Excel);
        let office = DocumentKind::Office.extensions();
        for ext in [".xlsx", ".docx", ".pptx"] {
            assert!(office.contains(&ext), "{ext}");
        }
    }

    #[test]
    fn test_recovery_paths_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("APPDATA", "/home/u/AppData/Roaming"),
            ("LOCALAPPDATA", "/home/u/AppData/Local"),
            ("TEMP", "/tmp/u"),
        ]
        .into_iter()
        .collect();

        let paths = RecoveryPaths::resolve(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(paths.autorecovery.len(), 5);
        assert_eq!(
            paths.autorecovery[0],
            PathBuf::from("/home/u/AppData/Roaming/Microsoft/Excel")
        );
        assert_eq!(
            paths.autorecovery[3],
            PathBuf::from("/home/u/AppData/Local/Microsoft/Office/UnsavedFiles")
        );
        assert_eq!(paths.autorecovery[4], PathBuf::from("/tmp/u"));
        assert_eq!(
            paths.recent_items,
            Some(PathBuf::from("/home/u/AppData/Roaming/Microsoft/Windows/Recent"))
        );
    }

    #[test]
    fn test_unset_variables_skip_their_sources() {
        let paths = RecoveryPaths::resolve(|key| match key {
            "TEMP" => Some("C:\\Temp".to_string()),
            "APPDATA" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(paths.autorecovery, vec![PathBuf::from("C:\\Temp")]);
        assert!(paths.recent_items.is_none());
    }
}
