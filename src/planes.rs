//! Contains the BoundingBox struct, which names the rectangle of the
//! complex plane under study by its top-left and bottom-right corners,
//! and maps points of that rectangle onto an integral pixel grid whose
//! origin sits at the top-left.  Real parts grow left to right,
//! imaginary parts shrink top to bottom, exactly the way the finished
//! image reads.

use error::Error;
use num::Complex;

/// A rectangle on the complex plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    /// The top-left corner: the smallest real part, the largest
    /// imaginary part.
    pub a: Complex<f64>,
    /// The bottom-right corner: the largest real part, the smallest
    /// imaginary part.
    pub b: Complex<f64>,
}

impl BoundingBox {
    /// Constructor.  Checks that the corners really are a top-left and
    /// a bottom-right; the uniform sampler and the projection both
    /// lean on that invariant.
    pub fn new(a: Complex<f64>, b: Complex<f64>) -> Result<BoundingBox, Error> {
        if a.re >= b.re {
            return Err(Error::BadBounds(
                "corner a must lie strictly to the left of corner b".to_string(),
            ));
        }
        if a.im <= b.im {
            return Err(Error::BadBounds(
                "corner a must lie strictly above corner b".to_string(),
            ));
        }
        Ok(BoundingBox { a, b })
    }

    /// Extent of the box along the real axis.
    pub fn re_span(&self) -> f64 {
        self.b.re - self.a.re
    }

    /// Extent of the box along the imaginary axis.
    pub fn im_span(&self) -> f64 {
        self.a.im - self.b.im
    }

    /// Maps a complex point to a pixel of a `width` x `height` grid,
    /// `(0, 0)` being the top-left pixel.  An orbit wanders wherever it
    /// pleases, so the mapping answers `None` for points outside the
    /// frame and for arithmetic that has gone non-finite; such points
    /// are skipped by the caller, never clipped to the border.
    pub fn project(&self, point: Complex<f64>, width: u16, height: u16) -> Option<(u16, u16)> {
        let x = f64::from(width) * (point.re - self.a.re) / (self.b.re - self.a.re);
        let y = f64::from(height) * (point.im - self.a.im) / (self.b.im - self.a.im);
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (x, y) = (x.floor(), y.floor());
        if x < 0.0 || x >= f64::from(width) || y < 0.0 || y >= f64::from(height) {
            return None;
        }
        Some((x as u16, y as u16))
    }
}
