//! Windows Shell Link (.lnk) reader
//!
//! Extracts only the LinkInfo local base path, which is enough to locate the
//! file a "Recent Items" shortcut points at. Unicode targets, environment
//! variable blocks and network paths are not decoded.

use byteorder::{LittleEndian, ReadBytesExt};
use std::fs;
use std::io::{Cursor, Seek, SeekFrom};
use std::path::Path;

use crate::record::extension_of;

// Shell Link header
const HEADER_SIZE: u32 = 0x4C;
const LINK_FLAGS_OFFSET: u64 = 0x14;

// LinkFlags
const HAS_LINK_TARGET_ID_LIST: u32 = 0x01;
const HAS_LINK_INFO: u32 = 0x02;

// LinkInfo
const LINK_INFO_FLAGS_OFFSET: usize = 8;
const LOCAL_BASE_PATH_OFFSET_FIELD: usize = 16;
const LINK_INFO_MIN_SIZE: usize = 20;
const VOLUME_ID_AND_LOCAL_BASE_PATH: u32 = 0x01;

/// Reads a shortcut file and returns its local target path, if it has one
pub fn parse_shortcut_target(path: &Path) -> Option<String> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            log::debug!("cannot read shortcut {}: {}", path.display(), e);
            return None;
        }
    };
    let target = parse_shortcut_bytes(&data);
    if target.is_none() {
        log::debug!("no local target in {}", path.display());
    }
    target
}

/// Decodes the local base path of an in-memory Shell Link.
///
/// Any malformed field yields `None`.
pub fn parse_shortcut_bytes(data: &[u8]) -> Option<String> {
    if data.len() < HEADER_SIZE as usize {
        return None;
    }

    let mut cursor = Cursor::new(data);
    if cursor.read_u32::<LittleEndian>().ok()? != HEADER_SIZE {
        return None;
    }

    cursor.seek(SeekFrom::Start(LINK_FLAGS_OFFSET)).ok()?;
    let flags = cursor.read_u32::<LittleEndian>().ok()?;

    let mut offset = HEADER_SIZE as usize;

    if flags & HAS_LINK_TARGET_ID_LIST != 0 {
        cursor.seek(SeekFrom::Start(offset as u64)).ok()?;
        let id_list_size = cursor.read_u16::<LittleEndian>().ok()?;
        offset = offset.checked_add(2 + id_list_size as usize)?;
    }

    if flags & HAS_LINK_INFO == 0 {
        return None;
    }

    let link_info_start = offset;
    if link_info_start.checked_add(LINK_INFO_MIN_SIZE)? > data.len() {
        return None;
    }

    cursor
        .seek(SeekFrom::Start((link_info_start + LINK_INFO_FLAGS_OFFSET) as u64))
        .ok()?;
    let link_info_flags = cursor.read_u32::<LittleEndian>().ok()?;
    if link_info_flags & VOLUME_ID_AND_LOCAL_BASE_PATH == 0 {
        // network-only target
        return None;
    }

    cursor
        .seek(SeekFrom::Start(
            (link_info_start + LOCAL_BASE_PATH_OFFSET_FIELD) as u64,
        ))
        .ok()?;
    let local_base_path_offset = cursor.read_u32::<LittleEndian>().ok()? as usize;

    let path_start = link_info_start.checked_add(local_base_path_offset)?;
    if path_start >= data.len() {
        return None;
    }

    let path = read_latin1_cstr(&data[path_start..])?;
    if path.is_empty() || extension_of(&path).is_none() {
        return None;
    }
    Some(path)
}

/// Reads a NUL-terminated string with one char per byte, so accented
/// ANSI bytes never fail to decode.
fn read_latin1_cstr(bytes: &[u8]) -> Option<String> {
    let end = bytes.iter().position(|&b| b == 0)?;
    Some(bytes[..end].iter().map(|&b| b as char).collect())
}
