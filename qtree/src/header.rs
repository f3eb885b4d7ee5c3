use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};

use crate::tree::Error;

/// Identifier at the start of every binary quadtree file.
pub const MAGIC: [u8; 8] = *b"qtreeimg";

/// The only container version this crate writes or reads.
pub const VERSION: u8 = 1;

/// A binary quadtree file header. This must be included at the beginning
/// of a valid file, followed by the tree tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Identifier. Must be set to "qtreeimg".
    pub magic: [u8; 8],

    /// Version of the container layout.
    pub version: u8,

    /// Side length of the image in pixels.
    pub side: u32,

    /// Number of tree tokens following the header.
    pub token_count: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            side: 0,
            token_count: 0,
        }
    }
}

impl Header {
    pub const LEN: usize = 17;

    /// Number of pixels in the image described by this header.
    pub fn raw_size(&self) -> Result<usize, Error> {
        let side = self.side as usize;

        side.checked_mul(side).ok_or_else(|| {
            Error::InvalidDimension(format!("a {side}×{side} image has too many pixels"))
        })
    }

    pub fn write_into<T: WriteBytesExt + Write>(&self, output: &mut T) -> Result<usize, Error> {
        output.write_all(&self.magic)?;
        output.write_u8(self.version)?;
        output.write_u32::<LE>(self.side)?;
        output.write_u32::<LE>(self.token_count)?;

        Ok(Self::LEN)
    }

    pub fn read_from<T: Read + ReadBytesExt>(input: &mut T) -> Result<Self, Error> {
        let mut magic = [0u8; 8];
        input.read_exact(&mut magic).map_err(truncated)?;

        if magic != MAGIC {
            return Err(Error::InvalidIdentifier(magic));
        }

        let version = input.read_u8().map_err(truncated)?;
        if version != VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        Ok(Header {
            magic,
            version,
            side: input.read_u32::<LE>().map_err(truncated)?,
            token_count: input.read_u32::<LE>().map_err(truncated)?,
        })
    }
}

/// Turn an unexpected end of file into [`Error::TruncatedInput`], passing
/// other IO errors through.
pub(crate) fn truncated(err: std::io::Error) -> Error {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::TruncatedInput
    } else {
        Error::Io(err)
    }
}
