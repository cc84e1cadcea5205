use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::checksum::{checksum, Checksum};
use crate::error::WriteError;
use crate::icon::IconPayload;
use crate::resource::{IconLayout, HEADER_LEN};

/// ICONDIR with a single ICONDIRENTRY: 48×48, 8-bit, 3752 bytes of image
/// data starting right after the 22-byte header.
pub const ICO_FILE_HEADER: [u8; 22] = [
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, // reserved, type = icon, count = 1
    0x30, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // 48x48, colors, reserved, planes, bpp
    0xA8, 0x0E, 0x00, 0x00, // data size
    0x16, 0x00, 0x00, 0x00, // data offset
];

/// Overwrites the body (everything after the 40-byte header) of the 48×48
/// resource at `offset` in the working copy.
pub fn patch_exe(mut blob: Vec<u8>, offset: usize, payload: &IconPayload) -> Vec<u8> {
    let start = offset + HEADER_LEN;
    let end = start + IconLayout::Large.body_len();
    blob[start..end].copy_from_slice(&payload.to_bytes());
    blob
}

pub fn build_ico(header: &[u8], payload: &IconPayload) -> Vec<u8> {
    let mut out = Vec::with_capacity(ICO_FILE_HEADER.len() + IconLayout::Large.total_len());
    out.extend_from_slice(&ICO_FILE_HEADER);
    out.extend_from_slice(header);
    out.extend_from_slice(&payload.to_bytes());
    out
}

pub fn write_exe(
    path: &Path,
    blob: Vec<u8>,
    offset: usize,
    payload: &IconPayload,
) -> Result<Checksum, WriteError> {
    persist(path, &patch_exe(blob, offset, payload))
}

pub fn write_ico(path: &Path, header: &[u8], payload: &IconPayload) -> Result<Checksum, WriteError> {
    persist(path, &build_ico(header, payload))
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Writes through a sibling temp file so a failed write never leaves a
/// truncated output behind, then re-reads the result for its checksum. An
/// output that cannot be read back is removed as well.
fn persist(path: &Path, bytes: &[u8]) -> Result<Checksum, WriteError> {
    let tmp = partial_path(path);
    let fail = |source: io::Error, leftover: &Path| {
        let _ = fs::remove_file(leftover);
        log::error!("writing {} failed: {}", path.display(), source);
        WriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    };

    fs::write(&tmp, bytes)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| fail(e, &tmp))?;
    let written = fs::read(path).map_err(|e| fail(e, path))?;

    let crc = checksum(&written);
    log::info!("wrote {} bytes to {} (checksum {})", written.len(), path.display(), crc);
    Ok(crc)
}
