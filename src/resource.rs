//! Signature-based lookup of the two icon resources embedded in the executable.
//!
//! The resources are raw `BITMAPINFOHEADER` + palette + index plane + AND mask
//! blocks. No resource directory is parsed: each block is found by scanning
//! for its header bytes, which are distinctive enough for this executable.

use std::fmt;

use crate::checksum::{checksum, Checksum};
use crate::error::TransplantError;

pub const HEADER_LEN: usize = 40;
pub const PALETTE_ENTRIES: usize = 256;
pub const PALETTE_ENTRY_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconLayout {
    /// 32×32, source of the new artwork.
    Small,
    /// 48×48, the resource that gets replaced.
    Large,
}

impl IconLayout {
    pub const fn side(self) -> usize {
        match self {
            IconLayout::Small => 32,
            IconLayout::Large => 48,
        }
    }

    /// AND-mask bytes per row (rows are padded to 32-bit boundaries).
    pub const fn mask_stride(self) -> usize {
        (self.side() + 31) / 32 * 4
    }

    pub const fn header_len(self) -> usize {
        HEADER_LEN
    }

    pub const fn palette_len(self) -> usize {
        PALETTE_ENTRIES * PALETTE_ENTRY_LEN
    }

    pub const fn pixels_len(self) -> usize {
        self.side() * self.side()
    }

    pub const fn mask_len(self) -> usize {
        self.side() * self.mask_stride()
    }

    /// Bytes after the header: palette, index plane and mask.
    pub const fn body_len(self) -> usize {
        self.palette_len() + self.pixels_len() + self.mask_len()
    }

    pub const fn total_len(self) -> usize {
        self.header_len() + self.body_len()
    }

    /// The leading 16 header bytes: biSize = 40, biWidth = side,
    /// biHeight = 2 * side (XOR + AND planes), biPlanes = 1, biBitCount = 8.
    pub const fn signature(self) -> [u8; 16] {
        let side = self.side() as u8;
        [
            0x28, 0, 0, 0, //
            side, 0, 0, 0, //
            side * 2, 0, 0, 0, //
            1, 0, 8, 0,
        ]
    }

    /// Checksum of the unmodified resource in the stock executable.
    pub const fn expected_checksum(self) -> Checksum {
        match self {
            IconLayout::Small => Checksum(0xe549_4664),
            IconLayout::Large => Checksum(0xfffd_fa49),
        }
    }
}

impl fmt::Display for IconLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{0}x{0}", self.side())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub layout: IconLayout,
    pub computed: Checksum,
    pub expected: Checksum,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.computed == self.expected
    }
}

/// A located icon resource, borrowing its bytes from the executable image.
#[derive(Debug, Clone, Copy)]
pub struct IconResource<'a> {
    layout: IconLayout,
    offset: usize,
    bytes: &'a [u8],
}

impl<'a> IconResource<'a> {
    pub fn layout(&self) -> IconLayout {
        self.layout
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn header(&self) -> &'a [u8] {
        &self.bytes[..HEADER_LEN]
    }

    pub fn color_table(&self) -> &'a [u8] {
        let start = HEADER_LEN;
        &self.bytes[start..start + self.layout.palette_len()]
    }

    pub fn pixels(&self) -> &'a [u8] {
        let start = HEADER_LEN + self.layout.palette_len();
        &self.bytes[start..start + self.layout.pixels_len()]
    }

    pub fn mask(&self) -> &'a [u8] {
        &self.bytes[self.layout.total_len() - self.layout.mask_len()..]
    }

    pub fn checksum(&self) -> Checksum {
        checksum(self.bytes)
    }

    pub fn validate(&self) -> Validation {
        Validation {
            layout: self.layout,
            computed: self.checksum(),
            expected: self.layout.expected_checksum(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LocatedIcons<'a> {
    pub small: IconResource<'a>,
    pub large: IconResource<'a>,
}

impl<'a> LocatedIcons<'a> {
    pub fn validations(&self) -> [Validation; 2] {
        [self.small.validate(), self.large.validate()]
    }
}

pub fn find_signature(blob: &[u8], signature: &[u8]) -> Option<usize> {
    blob.windows(signature.len()).position(|w| w == signature)
}

pub fn locate_one(blob: &[u8], layout: IconLayout) -> Result<IconResource<'_>, TransplantError> {
    let offset = find_signature(blob, &layout.signature())
        .ok_or(TransplantError::SignatureNotFound(layout))?;
    let end = offset + layout.total_len();
    if end > blob.len() {
        return Err(TransplantError::Truncated {
            layout,
            offset,
            available: blob.len() - offset,
        });
    }
    log::debug!("{} icon found at offset {:#x}", layout, offset);
    Ok(IconResource {
        layout,
        offset,
        bytes: &blob[offset..end],
    })
}

pub fn locate(blob: &[u8]) -> Result<LocatedIcons<'_>, TransplantError> {
    Ok(LocatedIcons {
        small: locate_one(blob, IconLayout::Small)?,
        large: locate_one(blob, IconLayout::Large)?,
    })
}
