use std::path::{Path, PathBuf};

use crate::checksum::Checksum;
use crate::error::TransplantError;
use crate::icon::resample::Kernel;
use crate::icon::{build_payload, IconPayload};
use crate::resource::{locate, LocatedIcons, Validation};
use crate::writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Patched copy of the input executable.
    Exe,
    /// Standalone single-image icon file.
    Ico,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "exe" => Some(Self::Exe),
            "ico" => Some(Self::Ico),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub ignore_checksum: bool,
    pub kernel: Kernel,
}

#[derive(Debug)]
pub struct Report {
    pub validations: Vec<Validation>,
    pub payload: IconPayload,
    /// Checksum of the file as persisted.
    pub checksum: Checksum,
}

/// Fails with `ChecksumMismatch` (carrying both results) unless every
/// resource matches or `ignore` is set.
pub fn verify(icons: &LocatedIcons<'_>, ignore: bool) -> Result<Vec<Validation>, TransplantError> {
    let validations = icons.validations().to_vec();
    for v in &validations {
        if v.is_valid() {
            log::info!("{} checksum ok ({})", v.layout, v.computed);
        } else {
            log::warn!("{} checksum mismatch: {} (expected {})", v.layout, v.computed, v.expected);
        }
    }
    if !ignore && validations.iter().any(|v| !v.is_valid()) {
        return Err(TransplantError::ChecksumMismatch(validations));
    }
    Ok(validations)
}

/// Runs the whole transformation on `blob` and writes the result. Nothing is
/// written unless every earlier step succeeded.
pub fn run(blob: &[u8], request: &Request) -> Result<Report, TransplantError> {
    let icons = locate(blob)?;
    let validations = verify(&icons, request.ignore_checksum)?;
    let payload = build_payload(&icons.small, request.kernel);

    let checksum = match request.format {
        OutputFormat::Exe => {
            writer::write_exe(&request.output, blob.to_vec(), icons.large.offset(), &payload)?
        }
        OutputFormat::Ico => writer::write_ico(&request.output, icons.large.header(), &payload)?,
    };

    Ok(Report {
        validations,
        payload,
        checksum,
    })
}
