//! Forward-only cursor over an immutable byte buffer
//!
//! Every grammar in this crate is built from the primitives here. All reads
//! are little-endian, advance the cursor by exactly the bytes consumed and
//! fail with [`FormatError::OutOfRange`] instead of returning a short read.
//! There is no seek or rewind: formats are positional, so fields must be read
//! in the order the file lays them out.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{FormatError, Result};

/// Read cursor over a byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Remaining bytes from current position.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Read `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Consume everything left in the buffer.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a length-prefixed byte run: u32 length, then that many bytes.
    pub fn read_string(&mut self) -> Result<ByteStr<'a>> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len).map(ByteStr)
    }

    /// Read a 4-byte tag and fail unless it equals `expected`.
    pub fn expect_magic(&mut self, expected: &[u8; 4]) -> Result<[u8; 4]> {
        let offset = self.pos;
        let found = self.read_array::<4>()?;
        if &found != expected {
            return Err(FormatError::magic("magic", offset, expected, &found));
        }
        Ok(found)
    }

    /// Read a u32 version and fail unless it equals `expected`.
    pub fn expect_version(&mut self, expected: u32) -> Result<u32> {
        let offset = self.pos;
        let found = self.read_u32()?;
        if found != expected {
            return Err(FormatError::version(offset, expected, found));
        }
        Ok(found)
    }

    /// Read a u32 count followed by that many records.
    pub fn read_list<T>(
        &mut self,
        mut read_item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let count = self.read_u32()? as usize;
        self.read_n(count, &mut read_item)
    }

    /// Read exactly `count` records.
    pub fn read_n<T>(
        &mut self,
        count: usize,
        mut read_item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(self.reserve_for::<T>(count));
        for _ in 0..count {
            items.push(read_item(self)?);
        }
        Ok(items)
    }

    /// Up-front capacity for `count` records of `T`.
    ///
    /// Counts come from the file, so the reservation is capped at the unread
    /// input in bytes, not items. Records larger in memory than on disk
    /// grow the vector as they are actually read.
    fn reserve_for<T>(&self, count: usize) -> usize {
        let per_item = std::mem::size_of::<T>().max(1);
        count.min(self.remaining() / per_item)
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(FormatError::OutOfRange {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// A length-prefixed string borrowed from the source buffer.
///
/// The formats store raw bytes with no declared encoding. Most are ASCII,
/// so this displays and serializes as text when the bytes are valid UTF-8
/// and as an escaped byte literal otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteStr<'a>(pub &'a [u8]);

impl<'a> ByteStr<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_str(self) -> Option<&'a str> {
        std::str::from_utf8(self.0).ok()
    }
}

impl fmt::Display for ByteStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(s) => f.write_str(s),
            None => f.write_str(&crate::error::escape_bytes(self.0)),
        }
    }
}

impl fmt::Debug for ByteStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

impl PartialEq<[u8]> for ByteStr<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteStr<'_> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.0 == other.as_slice()
    }
}

impl Serialize for ByteStr<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_bounded_by_input_bytes() {
        let data = vec![0u8; 1 << 20];
        let reader = Reader::new(&data);

        // A hostile count against large in-memory records
        let items = reader.reserve_for::<[u8; 56]>(u32::MAX as usize);
        assert_eq!(items, (1 << 20) / 56);
        assert!(items * 56 <= data.len());

        // Honest counts are reserved in full
        assert_eq!(reader.reserve_for::<u32>(10), 10);
        // Zero-sized records never divide by zero
        assert_eq!(reader.reserve_for::<()>(7), 7);
    }

    #[test]
    fn test_read_n_hostile_count_fails_cleanly() {
        let data = [1u8, 0, 0, 0, 2, 0, 0, 0];
        let mut reader = Reader::new(&data);
        let err = reader
            .read_n(u32::MAX as usize, |r| r.read_u32())
            .unwrap_err();
        assert!(matches!(err, FormatError::OutOfRange { offset: 8, need: 4, .. }));
    }

    #[test]
    fn test_primitives_little_endian() {
        let data = [
            0x78, 0x56, 0x34, 0x12, // u32
            0x34, 0x12, // u16
            0x00, 0x00, 0x80, 0x3F, // f32 1.0
            0xAB, // u8
        ];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert!(r.is_at_end());
    }

    #[test]
    fn test_read_string() {
        let data = [3, 0, 0, 0, b'a', b'b', b'c', 0xFF];
        let mut r = Reader::new(&data);
        let s = r.read_string().unwrap();
        assert_eq!(s, b"abc");
        assert_eq!(r.position(), 7);
        assert_eq!(r.remaining(), 1);
    }

    #[test]
    fn test_short_read_is_error_and_does_not_advance() {
        let data = [1, 2, 3];
        let mut r = Reader::new(&data);
        match r.read_u32() {
            Err(FormatError::OutOfRange { offset, need, have }) => {
                assert_eq!((offset, need, have), (0, 4, 3));
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn test_string_length_past_end() {
        // Declares 10 bytes, carries 2
        let data = [10, 0, 0, 0, b'h', b'i'];
        let mut r = Reader::new(&data);
        assert!(matches!(
            r.read_string(),
            Err(FormatError::OutOfRange {
                offset: 4,
                need: 10,
                have: 2
            })
        ));
    }

    #[test]
    fn test_expect_magic() {
        let mut r = Reader::new(b"KTEXrest");
        assert_eq!(&r.expect_magic(b"KTEX").unwrap(), b"KTEX");

        let mut r = Reader::new(b"XTEX");
        assert!(matches!(
            r.expect_magic(b"KTEX"),
            Err(FormatError::StructuralMismatch { what: "magic", offset: 0, .. })
        ));
    }

    #[test]
    fn test_read_list_huge_count_fails_cleanly() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 1, 0, 0, 0];
        let mut r = Reader::new(&data);
        assert!(matches!(
            r.read_list(|r| r.read_u32()),
            Err(FormatError::OutOfRange { offset: 8, .. })
        ));
    }

    #[test]
    fn test_byte_str_display() {
        assert_eq!(ByteStr(b"anim").to_string(), "anim");
        assert_eq!(ByteStr(&[0xFF, b'a']).to_string(), "b\"\\xffa\"");
    }
}
