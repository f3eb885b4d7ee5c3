//! Square grayscale bitmaps and the regions used to walk them.

use crate::tree::Error;

/// An N×N grid of intensities, where N is a power of two.
///
/// Pixels are stored row-major, origin at the top left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    side: usize,
    pixels: Vec<u8>,
}

impl Raster {
    /// Create a raster of the given side length with every pixel set to 0.
    pub fn new(side: usize) -> Result<Self, Error> {
        Self::filled(side, 0)
    }

    /// Create a raster of the given side length with every pixel set to `value`.
    pub fn filled(side: usize, value: u8) -> Result<Self, Error> {
        check_side(side)?;

        let area = side.checked_mul(side).ok_or_else(|| {
            Error::InvalidDimension(format!("a {side}×{side} image has too many pixels"))
        })?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(area).map_err(|_| {
            Error::InvalidDimension(format!("cannot allocate a {side}×{side} image"))
        })?;
        pixels.resize(area, value);

        Ok(Self { side, pixels })
    }

    /// Build a raster from row-major pixel data.
    ///
    /// The pixel count must be the area of a square with a power of two side.
    pub fn from_raw(pixels: Vec<u8>) -> Result<Self, Error> {
        let side = side_for_len(pixels.len())?;

        Ok(Self { side, pixels })
    }

    /// Build a raster from a list of rows. Every row must be as long as
    /// there are rows.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, Error> {
        let side = rows.len();
        let mut pixels = Vec::with_capacity(side * side);

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != side {
                return Err(Error::InvalidDimension(format!(
                    "row {i} has {} columns, but the image has {side} rows",
                    row.len()
                )));
            }
            pixels.extend_from_slice(row);
        }

        check_side(side)?;
        Ok(Self { side, pixels })
    }

    /// Build a raster from wider integers, checking each one is a valid
    /// intensity.
    pub fn from_values<I: IntoIterator<Item = i64>>(values: I) -> Result<Self, Error> {
        let pixels = values
            .into_iter()
            .map(|v| u8::try_from(v).map_err(|_| Error::InvalidValue(v)))
            .collect::<Result<Vec<u8>, Error>>()?;

        Self::from_raw(pixels)
    }

    /// Length of one side in pixels.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of pixels.
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.pixels[row * self.side + col]
    }

    /// Raw row-major pixel data.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// The region covering the whole raster.
    pub fn region(&self) -> Region {
        Region::new(0, 0, self.side)
    }

    /// Whether every pixel in `region` has the same value as its origin.
    ///
    /// Stops at the first pixel that differs.
    pub fn is_uniform(&self, region: Region) -> bool {
        let first = self.get(region.row, region.col);

        (region.row..region.row + region.side).all(|r| {
            let start = r * self.side + region.col;
            self.pixels[start..start + region.side]
                .iter()
                .all(|&p| p == first)
        })
    }

    /// Set every pixel in `region` to `value`.
    pub fn fill(&mut self, region: Region, value: u8) {
        for r in region.row..region.row + region.side {
            let start = r * self.side + region.col;
            self.pixels[start..start + region.side].fill(value);
        }
    }
}

/// A square window into a raster: an origin and a side length.
///
/// Regions are never stored in a tree, they only exist while walking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub side: usize,
}

impl Region {
    pub fn new(row: usize, col: usize, side: usize) -> Self {
        Self { row, col, side }
    }

    /// Split into upper-left, upper-right, lower-left and lower-right
    /// quadrants, each half the side of this one.
    pub fn quadrants(&self) -> [Region; 4] {
        let half = self.side / 2;

        [
            Region::new(self.row, self.col, half),
            Region::new(self.row, self.col + half, half),
            Region::new(self.row + half, self.col, half),
            Region::new(self.row + half, self.col + half, half),
        ]
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.side * self.side
    }

    /// All coordinates in the region, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let Region { row, col, side } = *self;
        (row..row + side).flat_map(move |r| (col..col + side).map(move |c| (r, c)))
    }
}

fn check_side(side: usize) -> Result<(), Error> {
    if !side.is_power_of_two() {
        return Err(Error::InvalidDimension(format!(
            "side length {side} is not a power of two"
        )));
    }

    Ok(())
}

/// Find the side length of a square image with `len` pixels.
pub(crate) fn side_for_len(len: usize) -> Result<usize, Error> {
    // The area of a 2^k side is 2^2k, so the exponent must be even
    let zeros = len.trailing_zeros();
    if !len.is_power_of_two() || zeros % 2 != 0 {
        return Err(Error::InvalidDimension(format!(
            "{len} pixels do not form a square image with a power of two side"
        )));
    }

    Ok(1 << (zeros / 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_lengths() {
        assert_eq!(side_for_len(1).unwrap(), 1);
        assert_eq!(side_for_len(4).unwrap(), 2);
        assert_eq!(side_for_len(256).unwrap(), 16);

        assert!(matches!(side_for_len(0), Err(Error::InvalidDimension(_))));
        assert!(matches!(side_for_len(9), Err(Error::InvalidDimension(_))));
        assert!(matches!(side_for_len(8), Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn ragged_rows() {
        let rows: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
        assert!(matches!(Raster::from_rows(&rows), Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn three_by_three() {
        let rows = [[0u8; 3]; 3];
        assert!(matches!(Raster::from_rows(&rows), Err(Error::InvalidDimension(_))));
    }

    #[test]
    fn out_of_range_values() {
        let err = Raster::from_values([0, 12, 256, 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(256)));

        let err = Raster::from_values([-1, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(-1)));
    }

    #[test]
    fn oversized_side() {
        let side = 1usize << (usize::BITS - 1);
        assert!(matches!(Raster::new(side), Err(Error::InvalidDimension(_))));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn unallocatable_side() {
        // 2^62 pixels, far more than any address space can hold
        assert!(matches!(
            Raster::filled(1 << 31, 0),
            Err(Error::InvalidDimension(_))
        ));
    }

    #[test]
    fn quadrant_origins() {
        let [ul, ur, ll, lr] = Region::new(4, 8, 4).quadrants();

        assert_eq!(ul, Region::new(4, 8, 2));
        assert_eq!(ur, Region::new(4, 10, 2));
        assert_eq!(ll, Region::new(6, 8, 2));
        assert_eq!(lr, Region::new(6, 10, 2));
    }

    #[test]
    fn fill_and_uniformity() {
        let mut raster = Raster::new(4).unwrap();
        let [_, ur, _, _] = raster.region().quadrants();

        raster.fill(ur, 9);

        assert!(raster.is_uniform(ur));
        assert!(!raster.is_uniform(raster.region()));
        assert_eq!(raster.get(0, 2), 9);
        assert_eq!(raster.get(1, 3), 9);
        assert_eq!(raster.get(2, 2), 0);
        assert_eq!(ur.cells().count(), ur.area());
    }

    #[test]
    fn rows_are_row_major() {
        let raster = Raster::from_rows(&[[1u8, 2], [3, 4]]).unwrap();

        assert_eq!(raster.as_raw(), &[1, 2, 3, 4]);
        assert_eq!(raster.get(1, 0), 3);
        assert_eq!(raster.area(), 4);
    }
}
