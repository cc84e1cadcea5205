use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::resource::{IconLayout, Validation};

#[derive(Debug, Error)]
pub enum TransplantError {
    #[error("{0} icon signature not found in executable")]
    SignatureNotFound(IconLayout),

    #[error("{layout} icon at offset {offset:#x} is truncated ({available} of {} bytes present)", .layout.total_len())]
    Truncated {
        layout: IconLayout,
        offset: usize,
        available: usize,
    },

    #[error("icon checksum mismatch ({})", describe_mismatches(.0))]
    ChecksumMismatch(Vec<Validation>),

    #[error(transparent)]
    Write(#[from] WriteError),
}

impl TransplantError {
    /// Process exit code for this abort path.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SignatureNotFound(_) | Self::Truncated { .. } => 3,
            Self::ChecksumMismatch(_) => 4,
            Self::Write(_) => 5,
        }
    }
}

fn describe_mismatches(validations: &[Validation]) -> String {
    validations
        .iter()
        .filter(|v| !v.is_valid())
        .map(|v| format!("{}: got {}, expected {}", v.layout, v.computed, v.expected))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
