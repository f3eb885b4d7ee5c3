//! Building quadtrees from rasters and expanding them back.

use log::{debug, log_enabled, trace, Level};

use crate::{
    node::Node,
    raster::{Raster, Region},
    tree::{Error, Settings},
};

/// Compress a raster into a quadtree.
///
/// Uniform regions become leaves, everything else is split into quadrants
/// until it is uniform or a single pixel.
pub fn compress(raster: &Raster, settings: &Settings) -> Node {
    let parallel_from = settings.parallel.then_some(settings.parallel_threshold.max(2));

    trace!(
        "Compressing {0}×{0} image, parallel: {1:?}",
        raster.side(),
        parallel_from
    );

    let root = compress_region(raster, raster.region(), parallel_from);

    if log_enabled!(Level::Debug) {
        debug!(
            "Compressed {} pixels into {} nodes ({} leaves, depth {})",
            raster.area(),
            root.node_count(),
            root.leaf_count(),
            root.depth()
        );
    }

    root
}

fn compress_region(raster: &Raster, region: Region, parallel_from: Option<usize>) -> Node {
    if raster.is_uniform(region) {
        return Node::Leaf(raster.get(region.row, region.col));
    }

    let [ul, ur, ll, lr] = region.quadrants();

    match parallel_from {
        Some(threshold) if region.side >= threshold => {
            // Quadrants never overlap, so they can be built independently.
            // Joining keeps them in upper-left, upper-right, lower-left,
            // lower-right order no matter which finishes first.
            let ((upper_left, upper_right), (lower_left, lower_right)) = rayon::join(
                || {
                    rayon::join(
                        || compress_region(raster, ul, parallel_from),
                        || compress_region(raster, ur, parallel_from),
                    )
                },
                || {
                    rayon::join(
                        || compress_region(raster, ll, parallel_from),
                        || compress_region(raster, lr, parallel_from),
                    )
                },
            );

            Node::split(upper_left, upper_right, lower_left, lower_right)
        }
        _ => Node::split(
            compress_region(raster, ul, parallel_from),
            compress_region(raster, ur, parallel_from),
            compress_region(raster, ll, parallel_from),
            compress_region(raster, lr, parallel_from),
        ),
    }
}

/// Expand a quadtree into a `side`×`side` raster.
pub fn decompress(root: &Node, side: usize) -> Result<Raster, Error> {
    let mut raster = Raster::new(side)?;
    let region = raster.region();

    expand(root, region, &mut raster)?;

    trace!("Expanded tree into {0}×{0} image", side);
    Ok(raster)
}

fn expand(node: &Node, region: Region, raster: &mut Raster) -> Result<(), Error> {
    match node {
        Node::Leaf(value) => raster.fill(region, *value),
        Node::Split(children) => {
            if region.side == 1 {
                return Err(Error::MalformedTree(format!(
                    "split at single pixel ({}, {})",
                    region.row, region.col
                )));
            }

            for (child, quadrant) in children.iter().zip(region.quadrants()) {
                expand(child, quadrant, raster)?;
            }
        }
    }

    Ok(())
}
