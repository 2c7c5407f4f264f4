//! Volume Shadow Copy Service (VSS) Integration
//!
//! Lists the shadow copies Windows keeps so older versions of a file can be
//! found under their `\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopyN` device path.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::VSSADMIN_TIMEOUT;
use crate::process::CommandRunner;
use crate::record::UNKNOWN;

const DEVICE_PREFIX: &str = "\\\\?\\GLOBALROOT\\Device\\HarddiskVolumeShadowCopy";

// vssadmin output is localized and, when piped, arrives in the OEM code page,
// so accented letters decode as U+FFFD. Keys stop before the first accent.
const SET_START_KEYS: &[&str] = &["shadow copy set", "conjunto de instant"];
const CREATION_KEYS: &[&str] = &["creation time", "creation date", "creaci"];
const ORIGINAL_VOLUME_KEYS: &[&str] = &["original volume", "volumen original"];

/// One snapshot as reported by `vssadmin list shadows`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowCopyDescriptor {
    /// e.g. `\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopy3`
    pub device_path: String,
    /// Letter of the volume the snapshot was taken from
    pub drive_letter: char,
    /// Snapshot creation time, normalized when recognizable
    pub creation_date: String,
}

#[derive(Default)]
struct PendingShadow {
    device_path: Option<String>,
    drive_letter: Option<char>,
}

/// Enumerates all shadow copies on the machine; failures yield an empty list
pub fn list_shadow_copies<R: CommandRunner>(runner: &R) -> Vec<ShadowCopyDescriptor> {
    let output = match runner.run("vssadmin", &["list", "shadows"], VSSADMIN_TIMEOUT) {
        Ok(output) => output,
        Err(e) => {
            log::warn!("VSS: {}", e);
            return Vec::new();
        }
    };

    if !output.success() {
        // Typically "Access is denied" without elevation
        log::warn!(
            "VSS: vssadmin exited with {:?}: {}",
            output.exit_code,
            first_line(&output.stdout, &output.stderr)
        );
        return Vec::new();
    }

    let shadows = parse_vssadmin_output(&output.stdout);
    log::info!("VSS: found {} shadow copies", shadows.len());
    shadows
}

fn first_line<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    let text = if stderr.trim().is_empty() { stdout } else { stderr };
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}

/// Line-parses the human-readable `vssadmin list shadows` report.
///
/// A descriptor is emitted as soon as both the device path and the drive
/// letter of the current entry are known; the accumulator then starts over.
/// The creation time is printed once per shadow copy set and applies to
/// every shadow listed in that set.
pub fn parse_vssadmin_output(output: &str) -> Vec<ShadowCopyDescriptor> {
    let mut shadows = Vec::new();
    let mut current = PendingShadow::default();
    let mut set_date: Option<String> = None;

    for line in output.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();

        // The device token is the same in every locale
        if let Some(device) = extract_device_path(line) {
            current.device_path = Some(device);
        } else if contains_any(&lower, SET_START_KEYS) {
            set_date = None;
        } else if contains_any(&lower, CREATION_KEYS) {
            if let Some((_, value)) = line.split_once(':') {
                let value = value.trim();
                if !value.is_empty() {
                    set_date = Some(normalize_creation_date(value));
                }
            }
        } else if contains_any(&lower, ORIGINAL_VOLUME_KEYS) {
            if let Some(letter) = extract_drive_letter(line) {
                current.drive_letter = Some(letter);
            }
        }

        if let PendingShadow {
            device_path: Some(device_path),
            drive_letter: Some(drive_letter),
        } = &current
        {
            shadows.push(ShadowCopyDescriptor {
                device_path: device_path.clone(),
                drive_letter: *drive_letter,
                creation_date: set_date.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            });
            current = PendingShadow::default();
        }
    }

    shadows
}

fn contains_any(haystack: &str, keys: &[&str]) -> bool {
    keys.iter().any(|k| haystack.contains(k))
}

/// Pulls `\\?\GLOBALROOT\Device\HarddiskVolumeShadowCopyN` out of a line
fn extract_device_path(line: &str) -> Option<String> {
    let start = line.find(DEVICE_PREFIX)?;
    let rest = &line[start + DEVICE_PREFIX.len()..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    Some(line[start..start + DEVICE_PREFIX.len() + digits].to_string())
}

/// Finds the `(C:)` or `(C:\)` marker vssadmin prints after "Original Volume"
fn extract_drive_letter(line: &str) -> Option<char> {
    let chars: Vec<char> = line.chars().collect();
    chars.windows(4).find_map(|w| {
        let closes = w[3] == ')' || w[3] == '\\';
        if w[0] == '(' && w[1].is_ascii_alphabetic() && w[2] == ':' && closes {
            Some(w[1].to_ascii_uppercase())
        } else {
            None
        }
    })
}

/// Converts the locale-dependent vssadmin timestamp to `YYYY-MM-DD HH:MM`,
/// keeping the raw text when no known layout matches.
pub fn normalize_creation_date(raw: &str) -> String {
    // Day-first layouts win for ambiguous dates (es-MX, en-GB)
    const FORMATS: &[&str] = &[
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %I:%M:%S %p",
        "%d-%m-%Y %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    let cleaned = raw
        .replace("a. m.", "AM")
        .replace("p. m.", "PM")
        .replace("a.m.", "AM")
        .replace("p.m.", "PM");
    let cleaned = cleaned.trim();

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, format) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }

    log::debug!("VSS: unrecognized creation date '{}', kept as-is", raw);
    raw.to_string()
}
