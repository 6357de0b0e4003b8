//! Compression used inside encoded save envelopes

use miniz_oxide::inflate::TINFLStatus;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// A DEFLATE-family compressor.
///
/// The envelope only relies on the byte contract: whatever `deflate`
/// produces, `inflate` must restore.
pub trait Deflate {
    fn deflate(&self, data: &[u8]) -> Vec<u8>;

    /// Inflate a stream declared to hold `expected_len` bytes.
    ///
    /// Output is bounded by the declared length: a stream that keeps producing
    /// past it fails with [`FormatError::IntegrityMismatch`] without being
    /// inflated to the end. A shorter stream is returned as is.
    fn inflate(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>>;
}

/// zlib-wrapped DEFLATE, the stream format the game writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zlib {
    level: u8,
}

impl Zlib {
    pub const MAX_LEVEL: u8 = 10;

    /// Levels above [`Zlib::MAX_LEVEL`] are clamped.
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(Self::MAX_LEVEL),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }
}

impl Default for Zlib {
    fn default() -> Self {
        Self::new(SaveOptions::default().compression_level)
    }
}

impl Deflate for Zlib {
    fn deflate(&self, data: &[u8]) -> Vec<u8> {
        miniz_oxide::deflate::compress_to_vec_zlib(data, self.level)
    }

    fn inflate(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        // One byte of headroom separates a stream ending at the limit from one
        // running past it.
        let limit = expected_len.saturating_add(1);
        miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(data, limit).map_err(|e| {
            match e.status {
                TINFLStatus::HasMoreOutput => FormatError::IntegrityMismatch {
                    what: "inflated length",
                    expected: expected_len as u64,
                    actual: e.output.len() as u64,
                },
                status => FormatError::Decompress {
                    message: format!("{status:?}"),
                },
            }
        })
    }
}

/// Options for writing save envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// zlib level, 0 (store) to 10.
    #[serde(default = "default_level")]
    pub compression_level: u8,
}

fn default_level() -> u8 {
    9
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            compression_level: default_level(),
        }
    }
}

impl SaveOptions {
    pub fn compressor(&self) -> Zlib {
        Zlib::new(self.compression_level)
    }
}
