//! Recycle Bin enumeration through Shell.Application automation

use serde::{Deserialize, Serialize};

use crate::config::RECYCLE_BIN_TIMEOUT;
use crate::process::CommandRunner;

/// Walks the Recycle Bin namespace (0x0A) and prints one compact JSON document
const LIST_SCRIPT: &str = r#"
[Console]::OutputEncoding = [System.Text.Encoding]::UTF8
$shell = New-Object -ComObject Shell.Application
$folder = $shell.NameSpace(0x0a)
$results = @()
foreach ($item in $folder.Items()) {
    $results += @{
        Name = $folder.GetDetailsOf($item, 0)
        OriginalPath = $folder.GetDetailsOf($item, 1)
        DeleteDate = $folder.GetDetailsOf($item, 2)
        Size = $folder.GetDetailsOf($item, 3)
    }
}
$results | ConvertTo-Json -Compress
"#;

/// One item as reported by the shell's Recycle Bin folder
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RecycleBinItem {
    #[serde(default)]
    pub name: Option<String>,
    /// Folder the item was deleted from
    #[serde(default)]
    pub original_path: Option<String>,
    #[serde(default)]
    pub delete_date: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

/// `ConvertTo-Json` emits a bare object for a single item and an array otherwise
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RecycleBinItem>),
    One(RecycleBinItem),
}

/// Lists every item in the Recycle Bin; any failure yields an empty list
pub fn list_recycle_bin<R: CommandRunner>(runner: &R) -> Vec<RecycleBinItem> {
    let output = match runner.run(
        "powershell",
        &["-NoProfile", "-NonInteractive", "-Command", LIST_SCRIPT],
        RECYCLE_BIN_TIMEOUT,
    ) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("recycle bin: {}", e);
            return Vec::new();
        }
    };

    if !output.success() {
        log::warn!(
            "recycle bin: powershell exited with {:?}: {}",
            output.exit_code,
            output.stderr.trim()
        );
        return Vec::new();
    }

    parse_recycle_bin_json(&output.stdout)
}

pub fn parse_recycle_bin_json(text: &str) -> Vec<RecycleBinItem> {
    let text = text.trim().trim_start_matches('\u{feff}');
    if text.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<OneOrMany>(text) {
        Ok(OneOrMany::Many(items)) => items.into_iter().map(clean_item).collect(),
        Ok(OneOrMany::One(item)) => vec![clean_item(item)],
        Err(e) => {
            log::warn!("recycle bin: unparsable script output: {}", e);
            Vec::new()
        }
    }
}

/// Explorer pads detail columns with bidi marks (notably around dates)
fn clean_item(item: RecycleBinItem) -> RecycleBinItem {
    let clean = |value: Option<String>| {
        value.map(|v| {
            v.chars()
                .filter(|c| !matches!(c, '\u{200e}' | '\u{200f}'))
                .collect::<String>()
                .trim()
                .to_string()
        })
    };
    RecycleBinItem {
        name: clean(item.name),
        original_path: clean(item.original_path),
        delete_date: clean(item.delete_date),
        size: clean(item.size),
    }
}
