//! Flattening trees into a preorder stream of integer tokens and parsing
//! them back.
//!
//! A leaf is written as its intensity. A split is written as
//! [`QUAD_SPLIT`] followed by its upper-left, upper-right, lower-left and
//! lower-right children.

use log::{trace, warn};

use crate::{
    node::Node,
    raster::side_for_len,
    tree::{Error, Settings},
};

/// The token marking a split node. Never a valid intensity.
pub const QUAD_SPLIT: i32 = -1;

/// Deepest tree any image can have. The pixel count of a side of
/// `2^MAX_DEPTH` is the largest that still fits in a `usize`.
pub const MAX_DEPTH: u32 = usize::BITS / 2;

/// Flatten a tree into preorder tokens.
pub fn encode(root: &Node) -> Vec<i32> {
    let mut tokens = Vec::with_capacity(root.node_count());
    write_node(root, &mut tokens);
    tokens
}

fn write_node(node: &Node, output: &mut Vec<i32>) {
    match node {
        Node::Leaf(value) => output.push(i32::from(*value)),
        Node::Split(children) => {
            output.push(QUAD_SPLIT);
            for child in children.iter() {
                write_node(child, output);
            }
        }
    }
}

/// Parse exactly one tree from the front of `tokens`, leaving anything
/// after it unread.
///
/// The tree may be at most `max_depth` splits deep. A split past that is
/// rejected as soon as it is read.
pub fn decode_from<I: Iterator<Item = i32>>(tokens: &mut I, max_depth: u32) -> Result<Node, Error> {
    let token = tokens.next().ok_or(Error::TruncatedInput)?;

    if token == QUAD_SPLIT {
        let Some(depth) = max_depth.checked_sub(1) else {
            return Err(Error::MalformedTree(
                "split below a single pixel".to_string(),
            ));
        };

        let upper_left = decode_from(tokens, depth)?;
        let upper_right = decode_from(tokens, depth)?;
        let lower_left = decode_from(tokens, depth)?;
        let lower_right = decode_from(tokens, depth)?;

        return Ok(Node::split(upper_left, upper_right, lower_left, lower_right));
    }

    u8::try_from(token)
        .map(Node::Leaf)
        .map_err(|_| Error::InvalidValue(i64::from(token)))
}

/// Parse a tree from a complete token stream, at most `max_depth` splits
/// deep.
///
/// When `strict` is set, tokens left over once the tree is complete are an
/// error. Otherwise they are ignored.
pub fn decode_bounded(tokens: &[i32], max_depth: u32, strict: bool) -> Result<Node, Error> {
    let mut iter = tokens.iter().copied();
    let root = decode_from(&mut iter, max_depth)?;

    let remaining = iter.len();
    if remaining > 0 {
        if strict {
            return Err(Error::TrailingData { remaining });
        }
        warn!("Ignoring {remaining} tokens after the end of the tree");
    }

    Ok(root)
}

/// Parse a tree from a complete token stream with no known image size.
pub fn decode(tokens: &[i32], strict: bool) -> Result<Node, Error> {
    decode_bounded(tokens, MAX_DEPTH, strict)
}

/// Parse a tree whose stream was framed by the raw pixel count of the
/// image it encodes. Returns the tree and the image side length.
///
/// The tree must fit within the framed image in both strict and
/// permissive mode.
pub fn decode_framed(raw_size: usize, tokens: &[i32], settings: &Settings) -> Result<(Node, usize), Error> {
    let side = side_for_len(raw_size).map_err(|_| Error::RawCountMismatch(raw_size))?;
    let root = decode_bounded(tokens, side.trailing_zeros(), settings.strict)?;

    trace!("Decoded {} tokens for a {side}×{side} image", tokens.len());
    Ok((root, side))
}

/// Render tokens as a single space separated line.
pub fn preorder_string(tokens: &[i32]) -> String {
    tokens
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
