use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use byteorder::{ReadBytesExt, WriteBytesExt};
use log::debug;
use thiserror::Error;

use crate::{
    binio::{TokenReader, TokenWriter},
    codec::{compress, decompress},
    header::Header,
    node::Node,
    raster::Raster,
    text,
    tokens::{decode_framed, encode, preorder_string},
};

/// Options for compressing and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Reject streams with tokens left over after the tree. Trees deeper
    /// than their image allows are rejected either way.
    pub strict: bool,

    /// Build quadrants in parallel while compressing.
    pub parallel: bool,

    /// Smallest region side that is still split up between threads. Only
    /// applies when `parallel` is set.
    pub parallel_threshold: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict: true,
            parallel: false,
            parallel_threshold: 64,
        }
    }
}

/// A grayscale image held as a quadtree, along with its raw form.
///
/// A tree starts empty. Compressing fills in both the image and the tree,
/// while uncompressing reads a tree and expands it into the image.
#[derive(Debug, Clone, Default)]
pub struct QTree {
    root: Option<Node>,
    raster: Option<Raster>,

    dim: usize,
    raw_size: usize,
    compressed_size: usize,

    settings: Settings,
}

impl QTree {
    /// Create an initially empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree that uses the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// The side length of the image.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The raw image, if there is one.
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    /// The root of the tree, if there is one.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Number of pixels in the raw image.
    pub fn raw_size(&self) -> usize {
        self.raw_size
    }

    /// Number of tokens in the tree as last written or read.
    pub fn compressed_size(&self) -> usize {
        self.compressed_size
    }

    /// Compressed size as a fraction of the raw size.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_size == 0 {
            return 0.0;
        }

        self.compressed_size as f64 / self.raw_size as f64
    }

    /// Compress a raw image into this tree.
    pub fn compress(&mut self, raster: Raster) {
        let root = compress(&raster, &self.settings);

        self.dim = raster.side();
        self.raw_size = raster.area();
        self.compressed_size = root.node_count();
        self.root = Some(root);
        self.raster = Some(raster);
    }

    /// Compress an image given as rows of pixels. The rows must form a
    /// square with a power of two side.
    pub fn compress_rows<R: AsRef<[u8]>>(&mut self, rows: &[R]) -> Result<(), Error> {
        let raster = Raster::from_rows(rows)?;
        self.compress(raster);
        Ok(())
    }

    /// Compress a raw image read from the text format.
    pub fn compress_from<R: Read>(&mut self, input: R) -> Result<(), Error> {
        let raster = text::read_raw(BufReader::new(input))?;
        self.compress(raster);
        Ok(())
    }

    /// Compress the raw image file at `path`.
    pub fn open_raw<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let input = File::open(path)?;
        self.compress_from(input)
    }

    /// Read a compressed image in the text format and expand it.
    pub fn uncompress_from<R: Read>(&mut self, input: R) -> Result<(), Error> {
        let (raw_size, tokens) = text::read_compressed(BufReader::new(input))?;
        self.load(raw_size, &tokens)
    }

    /// Read and expand the compressed image file at `path`.
    pub fn open_compressed<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let input = File::open(path)?;
        self.uncompress_from(input)
    }

    fn load(&mut self, raw_size: usize, tokens: &[i32]) -> Result<(), Error> {
        let (root, side) = decode_framed(raw_size, tokens, &self.settings)?;
        let raster = decompress(&root, side)?;

        debug!("Uncompressed {} tokens into a {side}×{side} image", tokens.len());

        self.dim = side;
        self.raw_size = raw_size;
        self.compressed_size = root.node_count();
        self.root = Some(root);
        self.raster = Some(raster);

        Ok(())
    }

    fn tokens(&self) -> Result<Vec<i32>, Error> {
        self.root.as_ref().map(encode).ok_or(Error::NotCompressed)
    }

    /// Write the compressed image in the text format.
    pub fn write_compressed<W: Write>(&mut self, output: W) -> Result<(), Error> {
        let tokens = self.tokens()?;
        text::write_compressed(self.raw_size, &tokens, output)?;

        self.compressed_size = tokens.len();
        Ok(())
    }

    /// Write the compressed image to a file at `path`.
    pub fn save_compressed<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let output = BufWriter::new(File::create(path)?);
        self.write_compressed(output)
    }

    /// Write the raw image in the text format.
    pub fn write_uncompressed<W: Write>(&self, output: W) -> Result<(), Error> {
        let raster = self.raster.as_ref().ok_or(Error::NotUncompressed)?;
        text::write_raw(raster, output)
    }

    /// Write the raw image to a file at `path`.
    pub fn save_uncompressed<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let output = BufWriter::new(File::create(path)?);
        self.write_uncompressed(output)
    }

    /// Encode the tree into the binary container, returning the number of
    /// bytes written.
    pub fn encode_binary<O: Write + WriteBytesExt>(&mut self, mut output: O) -> Result<usize, Error> {
        let tokens = self.tokens()?;

        let header = Header {
            side: u32::try_from(self.dim)
                .map_err(|_| Error::InvalidDimension(format!("side length {} is too large", self.dim)))?,
            token_count: u32::try_from(tokens.len())
                .map_err(|_| Error::InvalidDimension(format!("{} tokens is too many", tokens.len())))?,
            ..Default::default()
        };

        // Write out the header
        let mut size = header.write_into(&mut output)?;

        // Write out the tokens
        let mut writer = TokenWriter::new(&mut output);
        writer.write_all(&tokens)?;
        size += writer.byte_size();

        output.flush()?;

        self.compressed_size = tokens.len();
        Ok(size)
    }

    /// Decode a tree from the binary container and expand it.
    pub fn decode_binary<I: Read + ReadBytesExt>(&mut self, mut input: I) -> Result<(), Error> {
        let header = Header::read_from(&mut input)?;

        let mut reader = TokenReader::new(&mut input);
        let tokens = reader.read_tokens(header.token_count as usize)?;

        self.load(header.raw_size()?, &tokens)
    }
}

impl fmt::Display for QTree {
    /// The preorder tokens of the tree, space separated.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self.root.as_ref().map(encode).unwrap_or_default();
        write!(f, "QTree: {}", preorder_string(&tokens))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("malformed tree: {0}")]
    MalformedTree(String),

    #[error("input ended before the tree was complete")]
    TruncatedInput,

    #[error("{remaining} tokens left over after the tree was complete")]
    TrailingData { remaining: usize },

    #[error("value {0} is not a valid intensity")]
    InvalidValue(i64),

    #[error("raw size {0} is not the area of a square image with a power of two side")]
    RawCountMismatch(usize),

    #[error("line {line} is not an integer: {text:?}")]
    Parse { line: usize, text: String },

    #[error("incorrect identifier, got {0:02X?}")]
    InvalidIdentifier([u8; 8]),

    #[error("unsupported container version {0}")]
    UnsupportedVersion(u8),

    #[error("the image has not been compressed")]
    NotCompressed,

    #[error("the image has not been uncompressed")]
    NotUncompressed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn starts_empty() {
        let tree = QTree::new();

        assert_eq!(tree.dim(), 0);
        assert_eq!(tree.raw_size(), 0);
        assert_eq!(tree.compressed_size(), 0);
        assert!(tree.root().is_none());
        assert!(tree.raster().is_none());
        assert_eq!(tree.to_string(), "QTree: ");
        assert_eq!(tree.compression_ratio(), 0.0);
    }

    #[test]
    fn empty_tree_cannot_be_written() {
        let mut tree = QTree::new();

        assert!(matches!(tree.write_compressed(Vec::new()), Err(Error::NotCompressed)));
        assert!(matches!(tree.write_uncompressed(Vec::new()), Err(Error::NotUncompressed)));
        assert!(matches!(tree.encode_binary(Vec::new()), Err(Error::NotCompressed)));
    }

    #[test]
    fn display_is_preorder() {
        let mut tree = QTree::new();
        tree.compress_rows(&[[1u8, 2], [3, 4]]).unwrap();

        assert_eq!(tree.to_string(), "QTree: -1 1 2 3 4");
    }

    #[test]
    fn sizes_after_compress() {
        let mut tree = QTree::new();
        tree.compress(Raster::filled(4, 7).unwrap());

        assert_eq!(tree.dim(), 4);
        assert_eq!(tree.raw_size(), 16);
        assert_eq!(tree.compressed_size(), 1);
        assert_eq!(tree.compression_ratio(), 1.0 / 16.0);
    }

    #[test]
    fn binary_round_trip() {
        let mut tree = QTree::new();
        tree.compress_rows(&[
            [0u8, 0, 1, 2],
            [0, 0, 3, 4],
            [200, 200, 9, 9],
            [200, 200, 9, 9],
        ])
        .unwrap();

        let mut buf = Vec::new();
        let size = tree.encode_binary(&mut buf).unwrap();
        assert_eq!(size, buf.len());

        let mut decoded = QTree::new();
        decoded.decode_binary(Cursor::new(buf)).unwrap();

        assert_eq!(decoded.root(), tree.root());
        assert_eq!(decoded.raster(), tree.raster());
        assert_eq!(decoded.dim(), 4);
        assert_eq!(decoded.compressed_size(), 9);
    }

    #[test]
    fn binary_short_payload() {
        let mut tree = QTree::new();
        tree.compress_rows(&[[1u8, 2], [3, 4]]).unwrap();

        let mut buf = Vec::new();
        tree.encode_binary(&mut buf).unwrap();
        buf.truncate(buf.len() - 2);

        let mut decoded = QTree::new();
        assert!(matches!(
            decoded.decode_binary(Cursor::new(buf)),
            Err(Error::TruncatedInput)
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn binary_unallocatable_side() {
        let header = Header {
            side: 1 << 31,
            token_count: 1,
            ..Default::default()
        };

        let mut buf = Vec::new();
        header.write_into(&mut buf).unwrap();
        buf.push(0);

        let mut decoded = QTree::new();
        assert!(matches!(
            decoded.decode_binary(Cursor::new(buf)),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let mut tree = QTree::new();
        tree.compress(Raster::filled(2, 5).unwrap());

        let result = tree.uncompress_from(Cursor::new("4\n-1\n5\n"));
        assert!(matches!(result, Err(Error::TruncatedInput)));
        assert_eq!(tree.root(), Some(&Node::Leaf(5)));
    }
}
