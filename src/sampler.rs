// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Monte-Carlo heart of the farm: drawing uniform sample points,
//! discarding the ones that analytically cannot escape, and tracing
//! the orbits of the ones that do.
//!
//! The Buddhabrot wants the journey, not the destination.  For an
//! escaping sample every visited `z` lands in the histogram, so the
//! whole orbit is kept until it has been plotted; samples that never
//! escape contribute nothing and are dropped wholesale.

use num::Complex;
use planes::BoundingBox;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = 1.0 / 16.0;

/// True when `c` sits in the main cardioid or the period-2 bulb, the
/// two regions of the Mandelbrot set known in closed form to never
/// escape.  Purely a short-circuit: a point inside one of them would
/// only burn its whole iteration budget and then be discarded anyway.
pub fn inside_cardioids(c: Complex<f64>) -> bool {
    let y2 = c.im * c.im;
    let q = (c.re - D4) * (c.re - D4) + y2;
    if q * (q + c.re - D4) < D4 * y2 {
        return true;
    }
    (c.re + 1.0) * (c.re + 1.0) + y2 < D16
}

/// A reusable orbit buffer.  Capacity is the iteration budget, so a
/// worker allocates once and then traces millions of samples into the
/// same storage.
#[derive(Debug)]
pub struct Orbit {
    points: Vec<Complex<f64>>,
}

impl Orbit {
    /// An empty buffer sized for orbits of at most `iterations` steps.
    pub fn with_capacity(iterations: u32) -> Orbit {
        Orbit {
            points: Vec::with_capacity(iterations as usize),
        }
    }

    /// The visited points of the last traced orbit, oldest first.
    pub fn points(&self) -> &[Complex<f64>] {
        &self.points
    }

    /// Number of points currently in the buffer.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the last sample was rejected, or nothing has been
    /// traced yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Traces the orbit of `c` under `z <- z*z + c`, starting from
/// `z = c`, into `orbit`.  Every computed `z` is appended and the
/// escape test runs after the append, so the escape point itself is
/// part of the trace.  Returns true as soon as `|z|^2 >= 4`; returns
/// false when the budget runs out first, leaving the buffer empty,
/// because a sample that never escapes is worthless to the image.
pub fn sample_orbit(c: Complex<f64>, max_iterations: u32, orbit: &mut Orbit) -> bool {
    orbit.points.clear();
    let mut z = c;
    for _ in 0..max_iterations {
        z = z * z + c;
        orbit.points.push(z);
        if z.norm_sqr() >= 4.0 {
            return true;
        }
    }
    orbit.points.clear();
    false
}

/// Draws uniform sample points from inside a bounding box.  The two
/// distributions are built once; the caller brings whatever `Rng` it
/// owns.
#[derive(Clone, Debug)]
pub struct PointSource {
    re: Uniform<f64>,
    im: Uniform<f64>,
}

impl PointSource {
    /// A source covering `bounds`.
    pub fn new(bounds: &BoundingBox) -> PointSource {
        PointSource {
            re: Uniform::new(bounds.a.re, bounds.b.re),
            im: Uniform::new(bounds.b.im, bounds.a.im),
        }
    }

    /// One uniform point inside the box.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Complex<f64> {
        Complex::new(self.re.sample(rng), self.im.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn the_origin_is_inside_the_cardioid() {
        assert!(inside_cardioids(Complex::new(0.0, 0.0)));
    }

    #[test]
    fn minus_two_is_outside_both_regions() {
        assert!(!inside_cardioids(Complex::new(-2.0, 0.0)));
    }

    #[test]
    fn the_bulb_interior_is_excluded() {
        assert!(inside_cardioids(Complex::new(-1.0, 0.0)));
    }

    #[test]
    fn the_orbit_of_the_origin_never_escapes() {
        let mut orbit = Orbit::with_capacity(50);
        assert!(!sample_orbit(Complex::new(0.0, 0.0), 50, &mut orbit));
        assert!(orbit.is_empty());
    }

    #[test]
    fn minus_two_escapes_in_one_step() {
        let mut orbit = Orbit::with_capacity(50);
        assert!(sample_orbit(Complex::new(-2.0, 0.0), 50, &mut orbit));
        assert_eq!(orbit.points(), &[Complex::new(2.0, 0.0)]);
    }

    #[test]
    fn two_escapes_straight_to_six() {
        let mut orbit = Orbit::with_capacity(50);
        assert!(sample_orbit(Complex::new(2.0, 0.0), 50, &mut orbit));
        assert_eq!(orbit.points(), &[Complex::new(6.0, 0.0)]);
    }

    #[test]
    fn an_escaping_orbit_keeps_every_visited_point() {
        let mut orbit = Orbit::with_capacity(50);
        assert!(sample_orbit(Complex::new(0.5, 0.5), 50, &mut orbit));
        let points = orbit.points();
        assert!(points.len() > 1);
        for z in &points[..points.len() - 1] {
            assert!(z.norm_sqr() < 4.0);
        }
        assert!(points.last().unwrap().norm_sqr() >= 4.0);
    }

    #[test]
    fn a_rejected_sample_empties_the_buffer() {
        let mut orbit = Orbit::with_capacity(50);
        assert!(sample_orbit(Complex::new(-2.0, 0.0), 50, &mut orbit));
        assert_eq!(orbit.len(), 1);
        assert!(!sample_orbit(Complex::new(0.0, 0.0), 50, &mut orbit));
        assert!(orbit.is_empty());
    }

    #[test]
    fn drawn_points_stay_inside_the_box() {
        let bounds = BoundingBox::new(Complex::new(-2.0, 1.5), Complex::new(1.0, -1.5)).unwrap();
        let source = PointSource::new(&bounds);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let c = source.draw(&mut rng);
            assert!(c.re >= -2.0 && c.re < 1.0);
            assert!(c.im >= -1.5 && c.im < 1.5);
        }
    }
}
