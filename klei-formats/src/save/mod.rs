//! Save-game envelope codec
//!
//! The only bidirectional format in this crate. A save file is:
//!
//! ```text
//! 0x00: tag "KLEI     1" (10 bytes)
//! 0x0A: type selector u8: 32 = plaintext, 68 = encoded
//! 0x0B: body
//! ```
//!
//! A plaintext body is the payload verbatim. An encoded body is base64 text
//! which decodes to:
//!
//! ```text
//! 0x00: magic u32 (= 1)
//! 0x04: magic u32 (= 16)
//! 0x08: inflated length u32
//! 0x0C: deflated length u32
//! 0x10: zlib stream (deflated length bytes)
//! ```
//!
//! Both declared lengths are checked exactly, and inflation stops as soon as
//! the output passes the declared inflated length. Offsets reported for the
//! framing words count from the start of the base64-decoded body, not the
//! file. The payload itself is the text of a literal table (`return { ... }`);
//! parsing it is left to the caller.

mod deflate;


pub use deflate::{Deflate, SaveOptions, Zlib};

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{FormatError, Result};
use crate::reader::Reader;

/// Literal tag at the start of every save file.
pub const SAVE_TAG: &[u8; 10] = b"KLEI     1";

/// Tag plus selector byte.
pub const ENVELOPE_HEADER_SIZE: usize = 11;

/// Prefix of the literal-table text inside a payload.
pub const TABLE_PREFIX: &str = "return ";

/// Which body follows the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EnvelopeKind {
    Plain,
    Encoded,
}

impl EnvelopeKind {
    pub const PLAIN_SELECTOR: u8 = 32;
    pub const ENCODED_SELECTOR: u8 = 68;

    pub fn from_selector(selector: u8) -> Option<Self> {
        match selector {
            Self::PLAIN_SELECTOR => Some(Self::Plain),
            Self::ENCODED_SELECTOR => Some(Self::Encoded),
            _ => None,
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Self::Plain => Self::PLAIN_SELECTOR,
            Self::Encoded => Self::ENCODED_SELECTOR,
        }
    }
}

/// The 16-byte header in front of the zlib stream of an encoded body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedFraming {
    pub inflated_len: u32,
    pub deflated_len: u32,
}

impl CompressedFraming {
    pub const SIZE: usize = 16;
    pub const MAGIC1: u32 = 1;
    pub const MAGIC2: u32 = 16;

    /// Parse the header and check both magic words.
    ///
    /// `reader` runs over the decoded body, so mismatch offsets are body
    /// positions.
    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        expect_word(reader, "framing magic1 (decoded body)", Self::MAGIC1)?;
        expect_word(reader, "framing magic2 (decoded body)", Self::MAGIC2)?;
        Ok(Self {
            inflated_len: reader.read_u32()?,
            deflated_len: reader.read_u32()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&Self::MAGIC1.to_le_bytes());
        bytes[4..8].copy_from_slice(&Self::MAGIC2.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.inflated_len.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.deflated_len.to_le_bytes());
        bytes
    }
}

fn expect_word(reader: &mut Reader<'_>, what: &'static str, expected: u32) -> Result<()> {
    let offset = reader.position();
    let found = reader.read_u32()?;
    if found != expected {
        return Err(FormatError::StructuralMismatch {
            what,
            offset,
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    Ok(())
}

/// A decoded save file. Plaintext payloads borrow from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEnvelope<'a> {
    pub kind: EnvelopeKind,
    pub payload: Cow<'a, [u8]>,
}

impl<'a> SaveEnvelope<'a> {
    pub fn decode(data: &'a [u8]) -> Result<Self> {
        Self::decode_with(data, &Zlib::default())
    }

    pub fn decode_with(data: &'a [u8], compressor: &dyn Deflate) -> Result<Self> {
        let mut reader = Reader::new(data);

        let tag = reader.read_array::<10>()?;
        if &tag != SAVE_TAG {
            return Err(FormatError::magic("save tag", 0, SAVE_TAG, &tag));
        }

        let selector_offset = reader.position();
        let selector = reader.read_u8()?;
        let kind =
            EnvelopeKind::from_selector(selector).ok_or(FormatError::UnsupportedValue {
                field: "envelope type",
                offset: selector_offset,
                value: selector as u32,
            })?;
        tracing::debug!(?kind, body = reader.remaining(), "decoding save envelope");

        let body = reader.read_rest();
        let payload = match kind {
            EnvelopeKind::Plain => Cow::Borrowed(body),
            EnvelopeKind::Encoded => Cow::Owned(decode_body(body, compressor)?),
        };
        Ok(Self { kind, payload })
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload.into_owned()
    }
}

fn decode_body(body: &[u8], compressor: &dyn Deflate) -> Result<Vec<u8>> {
    let text: Vec<u8> = body
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let framed = BASE64
        .decode(&text)
        .map_err(|source| FormatError::InvalidEncoding { source })?;

    let mut reader = Reader::new(&framed);
    let framing = CompressedFraming::parse(&mut reader)?;
    let stream = reader.read_rest();
    if stream.len() as u64 != framing.deflated_len as u64 {
        return Err(FormatError::IntegrityMismatch {
            what: "deflated length",
            expected: framing.deflated_len as u64,
            actual: stream.len() as u64,
        });
    }

    let payload = compressor.inflate(stream, framing.inflated_len as usize)?;
    if payload.len() as u64 != framing.inflated_len as u64 {
        return Err(FormatError::IntegrityMismatch {
            what: "inflated length",
            expected: framing.inflated_len as u64,
            actual: payload.len() as u64,
        });
    }
    tracing::trace!(
        deflated = framing.deflated_len,
        inflated = framing.inflated_len,
        "encoded body inflated"
    );
    Ok(payload)
}

/// Wrap `payload` in an envelope using the default compressor.
///
/// # Panics
///
/// Panics if an encoded payload or its zlib stream is longer than
/// `u32::MAX` bytes, which the framing cannot describe.
pub fn encode(payload: &[u8], kind: EnvelopeKind) -> Vec<u8> {
    encode_with(payload, kind, &Zlib::default())
}

/// Wrap `payload` in an envelope. Encoded bodies use `compressor`.
///
/// # Panics
///
/// Panics if an encoded payload or its zlib stream is longer than
/// `u32::MAX` bytes, which the framing cannot describe.
pub fn encode_with(payload: &[u8], kind: EnvelopeKind, compressor: &dyn Deflate) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENVELOPE_HEADER_SIZE + payload.len());
    out.extend_from_slice(SAVE_TAG);
    out.push(kind.selector());

    match kind {
        EnvelopeKind::Plain => out.extend_from_slice(payload),
        EnvelopeKind::Encoded => {
            let inflated_len = framing_len("payload", payload.len());
            let stream = compressor.deflate(payload);
            let framing = CompressedFraming {
                inflated_len,
                deflated_len: framing_len("zlib stream", stream.len()),
            };
            let mut framed = Vec::with_capacity(CompressedFraming::SIZE + stream.len());
            framed.extend_from_slice(&framing.to_bytes());
            framed.extend_from_slice(&stream);
            out.extend_from_slice(BASE64.encode(framed).as_bytes());
        }
    }
    out
}

/// A length for the framing header. Lengths past `u32::MAX` are a caller bug.
fn framing_len(what: &str, len: usize) -> u32 {
    u32::try_from(len)
        .unwrap_or_else(|_| panic!("{what} of {len} bytes does not fit the u32 save framing"))
}

/// The literal-table text of a payload, without its `return ` prefix.
pub fn table_source(payload: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(payload).map_err(|e| FormatError::InvalidText {
        message: e.to_string(),
    })?;
    text.strip_prefix(TABLE_PREFIX)
        .ok_or_else(|| FormatError::InvalidText {
            message: format!("missing `{}` prefix", TABLE_PREFIX.trim_end()),
        })
}
