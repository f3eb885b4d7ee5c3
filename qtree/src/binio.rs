use std::io::{Read, Write};

use integer_encoding::{VarIntReader, VarIntWriter};

use crate::{header::truncated, tree::Error};

/// Writes tree tokens as zigzag varints. Leaves below 64 and split
/// markers take a single byte.
pub struct TokenWriter<'a, O: Write> {
    output: &'a mut O,

    byte_size: usize,
}

impl<'a, O: Write> TokenWriter<'a, O> {
    pub fn new(output: &'a mut O) -> Self {
        Self {
            output,

            byte_size: 0,
        }
    }

    /// Number of bytes written so far
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn write_token(&mut self, token: i32) -> Result<(), Error> {
        self.byte_size += self.output.write_varint(token)?;

        Ok(())
    }

    pub fn write_all(&mut self, tokens: &[i32]) -> Result<(), Error> {
        for &token in tokens {
            self.write_token(token)?;
        }

        Ok(())
    }
}

/// Reads zigzag varint tokens written by [`TokenWriter`].
pub struct TokenReader<'a, I: Read> {
    input: &'a mut I,
}

impl<'a, I: Read> TokenReader<'a, I> {
    pub fn new(input: &'a mut I) -> Self {
        Self { input }
    }

    pub fn read_token(&mut self) -> Result<i32, Error> {
        self.input.read_varint::<i32>().map_err(truncated)
    }

    /// Read exactly `count` tokens.
    pub fn read_tokens(&mut self, count: usize) -> Result<Vec<i32>, Error> {
        (0..count).map(|_| self.read_token()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn small_tokens_are_one_byte() {
        let mut buf = Vec::new();
        let mut writer = TokenWriter::new(&mut buf);
        writer.write_all(&[-1, 0, 63]).unwrap();

        assert_eq!(writer.byte_size(), 3);
        // zigzag: -1 -> 1, 0 -> 0, 63 -> 126
        assert_eq!(buf, vec![1, 0, 126]);
    }

    #[test]
    fn large_leaves() {
        let mut buf = Vec::new();
        let mut writer = TokenWriter::new(&mut buf);
        writer.write_all(&[255, 128, -1]).unwrap();
        assert_eq!(writer.byte_size(), 5);

        let mut input = Cursor::new(buf);
        let mut reader = TokenReader::new(&mut input);
        assert_eq!(reader.read_tokens(3).unwrap(), vec![255, 128, -1]);
    }

    #[test]
    fn runs_out() {
        let mut input = Cursor::new(vec![1u8, 0]);
        let mut reader = TokenReader::new(&mut input);

        assert!(matches!(reader.read_tokens(3), Err(Error::TruncatedInput)));
    }
}
