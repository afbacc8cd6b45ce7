//! Turns a histogram of orbit hits into a grayscale PNG.
//!
//! Counts span many orders of magnitude, so a linear ramp would show
//! a handful of white pixels on black.  The curve here is
//! `255 * (1 - exp(-sqrt(n) / 2))`: steep enough near zero that lone
//! hits are visible, flat enough at the top that the hot cells along
//! the real axis do not wash out everything else.

extern crate image;

use std::io;
use std::path::{Path, PathBuf};

use image::ColorType;
use itertools::iproduct;

use histogram::Histogram;

/// Maps a cell count to an 8-bit shade.
pub fn tone_map(count: u32) -> u8 {
    let shade = 255.0 * (1.0 - (-0.5 * f64::from(count).sqrt()).exp());
    shade.round() as u8
}

/// Numbers snapshots `buddhabrot-0.png`, `buddhabrot-1.png`, ... in a
/// directory, starting past whatever is already there so reruns never
/// overwrite an earlier render.
#[derive(Debug)]
pub struct ImageWriter {
    directory: PathBuf,
    next_index: u32,
}

impl ImageWriter {
    /// A writer for `directory`, positioned at the first free index.
    pub fn new(directory: &Path) -> ImageWriter {
        let mut next_index = 0;
        while directory
            .join(format!("buddhabrot-{}.png", next_index))
            .exists()
        {
            next_index += 1;
        }
        ImageWriter {
            directory: directory.to_path_buf(),
            next_index,
        }
    }

    /// Renders `histogram` to the next numbered PNG and returns its
    /// path.  One grid cell becomes one pixel, rows top to bottom.
    pub fn write_snapshot(&mut self, histogram: &Histogram) -> io::Result<PathBuf> {
        let width = histogram.width();
        let height = histogram.height();
        let mut pixels = vec![0; usize::from(width) * usize::from(height) * 3];
        for (y, x) in iproduct!(0..height, 0..width) {
            let shade = tone_map(histogram.get(x, y));
            let base = 3 * (usize::from(y) * usize::from(width) + usize::from(x));
            pixels[base] = shade;
            pixels[base + 1] = shade;
            pixels[base + 2] = shade;
        }
        let path = self
            .directory
            .join(format!("buddhabrot-{}.png", self.next_index));
        image::save_buffer(
            &path,
            &pixels,
            u32::from(width),
            u32::from(height),
            ColorType::RGB(8),
        )?;
        info!(
            "snapshot {:?}: data maximum {}, image maximum {}",
            path,
            histogram.max(),
            tone_map(histogram.max())
        );
        self.next_index += 1;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn tone_map_pins_the_ends() {
        assert_eq!(tone_map(0), 0);
        assert_eq!(tone_map(1), 100);
        assert_eq!(tone_map(4), 161);
        assert_eq!(tone_map(u32::MAX), 255);
    }

    #[test]
    fn tone_map_is_monotone() {
        for count in 0..256 {
            assert!(tone_map(count) <= tone_map(count + 1));
        }
    }

    #[test]
    fn a_snapshot_is_a_png_of_the_grid_dimensions() {
        let dir = tempdir().unwrap();
        let mut histogram = Histogram::new(3, 2);
        histogram.record(1, 1);
        let mut writer = ImageWriter::new(dir.path());

        let path = writer.write_snapshot(&histogram).unwrap();

        assert_eq!(path, dir.path().join("buddhabrot-0.png"));
        let png = image::open(&path).unwrap().to_rgb();
        assert_eq!(png.dimensions(), (3, 2));
    }

    #[test]
    fn the_index_skips_existing_snapshots() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("buddhabrot-0.png"), b"taken").unwrap();
        fs::write(dir.path().join("buddhabrot-1.png"), b"taken").unwrap();
        let mut writer = ImageWriter::new(dir.path());

        let path = writer.write_snapshot(&Histogram::new(2, 2)).unwrap();
        assert_eq!(path, dir.path().join("buddhabrot-2.png"));

        let path = writer.write_snapshot(&Histogram::new(2, 2)).unwrap();
        assert_eq!(path, dir.path().join("buddhabrot-3.png"));
    }
}
