//! The line oriented text formats, one integer per line.
//!
//! A raw image is its pixels in row-major order. A compressed image is the
//! raw pixel count, then the preorder tokens of its tree.

use std::io::{BufRead, Write};

use log::trace;

use crate::{raster::Raster, tree::Error};

/// Read every integer in the input, skipping blank lines.
fn read_values<R: BufRead>(input: R) -> Result<Vec<i64>, Error> {
    let mut values = Vec::new();

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let value = text.parse::<i64>().map_err(|_| Error::Parse {
            line: i + 1,
            text: text.to_string(),
        })?;
        values.push(value);
    }

    Ok(values)
}

/// Read a raw image. There must be a power of two squared number of
/// values, all in `0..=255`.
pub fn read_raw<R: BufRead>(input: R) -> Result<Raster, Error> {
    let values = read_values(input)?;
    trace!("Read {} raw values", values.len());

    Raster::from_values(values)
}

/// Write a raw image, one pixel per line.
pub fn write_raw<W: Write>(raster: &Raster, mut output: W) -> Result<(), Error> {
    for pixel in raster.as_raw() {
        writeln!(output, "{pixel}")?;
    }

    output.flush()?;
    Ok(())
}

/// Read a compressed image, returning the raw pixel count from the first
/// line and the tokens after it.
pub fn read_compressed<R: BufRead>(input: R) -> Result<(usize, Vec<i32>), Error> {
    let mut values = read_values(input)?.into_iter();

    let raw_size = values.next().ok_or(Error::TruncatedInput)?;
    let raw_size = usize::try_from(raw_size).map_err(|_| Error::InvalidValue(raw_size))?;

    let tokens = values
        .map(|v| i32::try_from(v).map_err(|_| Error::InvalidValue(v)))
        .collect::<Result<Vec<i32>, Error>>()?;

    trace!("Read {} tokens for {raw_size} pixels", tokens.len());
    Ok((raw_size, tokens))
}

/// Write a compressed image: the raw pixel count, then one token per line.
pub fn write_compressed<W: Write>(raw_size: usize, tokens: &[i32], mut output: W) -> Result<(), Error> {
    writeln!(output, "{raw_size}")?;
    for token in tokens {
        writeln!(output, "{token}")?;
    }

    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn raw_round_trip() {
        let raster = Raster::from_rows(&[[10u8, 20], [30, 40]]).unwrap();

        let mut buf = Vec::new();
        write_raw(&raster, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "10\n20\n30\n40\n");

        assert_eq!(read_raw(Cursor::new(buf)).unwrap(), raster);
    }

    #[test]
    fn raw_skips_blank_lines() {
        let raster = read_raw(Cursor::new("1\n\n 2 \n3\r\n4\n\n")).unwrap();
        assert_eq!(raster.as_raw(), &[1, 2, 3, 4]);
    }

    #[test]
    fn raw_wrong_count() {
        let err = read_raw(Cursor::new("1\n2\n3\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension(_)));
    }

    #[test]
    fn raw_bad_line() {
        let err = read_raw(Cursor::new("1\n2\nthree\n4\n")).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
    }

    #[test]
    fn raw_out_of_range() {
        let err = read_raw(Cursor::new("1\n2\n300\n4\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(300)));
    }

    #[test]
    fn compressed_layout() {
        let mut buf = Vec::new();
        write_compressed(4, &[-1, 1, 2, 3, 4], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "4\n-1\n1\n2\n3\n4\n");

        let (raw_size, tokens) = read_compressed(Cursor::new(buf)).unwrap();
        assert_eq!(raw_size, 4);
        assert_eq!(tokens, vec![-1, 1, 2, 3, 4]);
    }

    #[test]
    fn compressed_empty() {
        assert!(matches!(
            read_compressed(Cursor::new("")),
            Err(Error::TruncatedInput)
        ));
    }

    #[test]
    fn compressed_negative_size() {
        assert!(matches!(
            read_compressed(Cursor::new("-4\n0\n")),
            Err(Error::InvalidValue(-4))
        ));
    }
}
