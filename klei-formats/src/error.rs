//! Decode error types

use thiserror::Error;

/// Errors raised while decoding (or framing) a Klei asset.
///
/// Every variant is fatal for the buffer being decoded; there is no partial
/// result. Offsets are byte positions into the buffer the failing grammar
/// reads. That is the source file everywhere except the framing words of an
/// encoded save body, which are read from the base64-decoded body; their
/// `what` names say so.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Magic bytes, version number or envelope tag do not match the literal.
    #[error("{what} mismatch at offset {offset:#x}: expected {expected}, found {found}")]
    StructuralMismatch {
        what: &'static str,
        offset: usize,
        expected: String,
        found: String,
    },

    /// A read asked for more bytes than remain in the buffer.
    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    OutOfRange {
        offset: usize,
        need: usize,
        have: usize,
    },

    /// An enumerated field carries a code with no known meaning.
    #[error("unsupported {field} value {value} at offset {offset:#x}")]
    UnsupportedValue {
        field: &'static str,
        offset: usize,
        value: u32,
    },

    /// A declared length or framing word disagrees with what was observed.
    #[error("{what} mismatch: declared {expected}, actual {actual}")]
    IntegrityMismatch {
        what: &'static str,
        expected: u64,
        actual: u64,
    },

    /// The encoded envelope body is not valid base64.
    #[error("envelope body is not valid base64: {source}")]
    InvalidEncoding {
        #[source]
        source: base64::DecodeError,
    },

    /// The compressed stream could not be inflated.
    #[error("compressed payload does not inflate: {message}")]
    Decompress { message: String },

    /// A save payload is not literal-table text.
    #[error("save payload is not table text: {message}")]
    InvalidText { message: String },
}

pub type Result<T> = std::result::Result<T, FormatError>;

impl FormatError {
    pub(crate) fn magic(what: &'static str, offset: usize, expected: &[u8], found: &[u8]) -> Self {
        FormatError::StructuralMismatch {
            what,
            offset,
            expected: escape_bytes(expected),
            found: escape_bytes(found),
        }
    }

    pub(crate) fn version(offset: usize, expected: u32, found: u32) -> Self {
        FormatError::StructuralMismatch {
            what: "version",
            offset,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Render bytes the way a byte-string literal would show them.
pub(crate) fn escape_bytes(bytes: &[u8]) -> String {
    let escaped: String = bytes
        .iter()
        .flat_map(|b| std::ascii::escape_default(*b))
        .map(char::from)
        .collect();
    format!("b\"{escaped}\"")
}
