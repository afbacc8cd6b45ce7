//! The width x height grid of hit counts.  One durable copy lives in
//! the store; each worker owns a private copy for the duration of a
//! round.  Cells are kept in the on-disk order, x as the outer index,
//! so the byte codec is a single straight sweep.

use error::Error;

/// A grid of 32-bit hit counters, indexed by pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    width: u16,
    height: u16,
    cells: Vec<u32>,
}

impl Histogram {
    /// A zeroed histogram of the given dimensions.
    pub fn new(width: u16, height: u16) -> Histogram {
        Histogram {
            width,
            height,
            cells: vec![0; usize::from(width) * usize::from(height)],
        }
    }

    /// Rebuilds a histogram from the store's little-endian cell region.
    /// `bytes` must hold exactly `width * height` four-byte cells.
    pub fn from_le_bytes(width: u16, height: u16, bytes: &[u8]) -> Histogram {
        let mut cells = Vec::with_capacity(usize::from(width) * usize::from(height));
        for chunk in bytes.chunks_exact(4) {
            let mut raw = [0_u8; 4];
            raw.copy_from_slice(chunk);
            cells.push(u32::from_le_bytes(raw));
        }
        Histogram {
            width,
            height,
            cells,
        }
    }

    /// Serializes the cells into the store's on-disk order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.cells.len() * 4);
        for cell in &self.cells {
            bytes.extend_from_slice(&cell.to_le_bytes());
        }
        bytes
    }

    /// Grid width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Counts one hit on the cell at `(x, y)`.  The counter pins at
    /// the ceiling of u32 rather than wrapping; a durable cell must
    /// never shrink.
    pub fn record(&mut self, x: u16, y: u16) {
        let offset = self.offset(x, y);
        self.cells[offset] = self.cells[offset].saturating_add(1);
    }

    /// The count at `(x, y)`.
    pub fn get(&self, x: u16, y: u16) -> u32 {
        self.cells[self.offset(x, y)]
    }

    /// Adds `other` onto this histogram cell-wise.  The dimensions
    /// have to agree exactly.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), Error> {
        if self.width != other.width || self.height != other.height {
            return Err(Error::DimensionMismatch(
                self.width,
                self.height,
                other.width,
                other.height,
            ));
        }
        for (mine, theirs) in self.cells.iter_mut().zip(&other.cells) {
            *mine = mine.saturating_add(*theirs);
        }
        Ok(())
    }

    /// Sum over every cell.
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|cell| u64::from(*cell)).sum()
    }

    /// The largest single cell.
    pub fn max(&self) -> u32 {
        self.cells.iter().cloned().max().unwrap_or(0)
    }

    fn offset(&self, x: u16, y: u16) -> usize {
        usize::from(x) * usize::from(self.height) + usize::from(y)
    }
}
