//! Quadtree compression for square grayscale images.
//!
//! An image whose side is a power of two is recursively split into four
//! quadrants until every region holds a single intensity. The resulting tree
//! can be written as a preorder stream of integers, where `-1` marks a split
//! and any other value is the intensity of a uniform block.
//!
//! Two on-disk layouts are supported: a line oriented text format with one
//! integer per line, and a compact binary container.
//!
//! # Example
//! ## Compressing an image
//! ```
//! use qtree::{QTree, Raster};
//!
//! let raster = Raster::from_rows(&[
//!     [1u8, 2],
//!     [3, 4],
//! ]).unwrap();
//!
//! let mut tree = QTree::new();
//! tree.compress(raster);
//!
//! let mut output = Vec::new();
//! tree.write_compressed(&mut output).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "4\n-1\n1\n2\n3\n4\n");
//! ```
//!
//! ## Uncompressing an image
//! ```
//! use qtree::QTree;
//!
//! let mut tree = QTree::new();
//! tree.uncompress_from("16\n7\n".as_bytes()).unwrap();
//!
//! let raster = tree.raster().unwrap();
//! assert_eq!(raster.side(), 4);
//! assert!(raster.as_raw().iter().all(|&p| p == 7));
//! ```

mod binio;

pub mod codec;
pub mod header;
pub mod node;
pub mod raster;
pub mod text;
pub mod tokens;
pub mod tree;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use tree::QTree;

#[doc(inline)]
pub use tree::Settings;

#[doc(inline)]
pub use tree::Error;

#[doc(inline)]
pub use node::Node;

#[doc(inline)]
pub use raster::{Raster, Region};

#[doc(inline)]
pub use tokens::QUAD_SPLIT;
