//! Hash → string tables shared by the BILD and ANIM formats

use serde::Serialize;

use crate::error::Result;
use crate::reader::{ByteStr, Reader};

/// One entry of a trailing string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HashedString<'a> {
    pub hash: u32,
    pub string: ByteStr<'a>,
}

impl<'a> HashedString<'a> {
    pub(crate) fn read(reader: &mut Reader<'a>) -> Result<Self> {
        Ok(Self {
            hash: reader.read_u32()?,
            string: reader.read_string()?,
        })
    }
}

/// Read a u32 count followed by that many `(hash, string)` pairs.
pub(crate) fn read_string_table<'a>(reader: &mut Reader<'a>) -> Result<Vec<HashedString<'a>>> {
    reader.read_list(HashedString::read)
}

/// Look up the string registered for `hash`.
pub fn lookup<'a>(table: &[HashedString<'a>], hash: u32) -> Option<ByteStr<'a>> {
    table.iter().find(|h| h.hash == hash).map(|h| h.string)
}
