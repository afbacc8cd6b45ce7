//! One farm thread's world: draw, trace, plot, repeat, and hand the
//! private histogram back when the round is over.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use num::Complex;
use rand::Rng;

use coordinator::{Coordinator, StopFlag};
use header::Header;
use histogram::Histogram;
use planes::BoundingBox;
use sampler::{inside_cardioids, sample_orbit, Orbit, PointSource};

/// What a worker carries home from a round.
#[derive(Debug)]
pub struct WorkerReport {
    /// Everything this thread plotted, ready to merge.
    pub histogram: Histogram,
    /// Escaping samples completed, in whole batches.
    pub points: u64,
}

/// A single sampling thread's state.  Each worker owns a private
/// histogram and orbit buffer, so the hot loop touches nothing shared
/// except the coordinator's counter and its own gauge.
#[derive(Debug)]
pub struct Worker {
    index: usize,
    bounds: BoundingBox,
    iterations: u32,
    batch_size: u32,
    histogram: Histogram,
    orbit: Orbit,
    source: PointSource,
    gauge: Arc<AtomicU64>,
}

impl Worker {
    /// Builds a worker for the geometry in `header`.  The header's
    /// corners must already have been checked; `Farm::new` does that
    /// once for the whole run.
    pub fn new(header: &Header, index: usize, batch_size: u32, gauge: Arc<AtomicU64>) -> Worker {
        Worker {
            index,
            bounds: header.bounds,
            iterations: header.iterations,
            batch_size,
            histogram: Histogram::new(header.width, header.height),
            orbit: Orbit::with_capacity(header.iterations),
            source: PointSource::new(&header.bounds),
            gauge,
        }
    }

    /// Farms until the round is spent or a stop is requested, then
    /// reports.  Only escaping samples count against the quota;
    /// rejected and never-escaping draws are free as far as the
    /// accounting is concerned.  The gauge is reset at each batch and
    /// ticks once per banked sample, which is all the dashboard needs.
    pub fn run<R: Rng>(
        mut self,
        rng: &mut R,
        coordinator: &Coordinator,
        stop: &StopFlag,
    ) -> WorkerReport {
        let width = self.histogram.width();
        let height = self.histogram.height();
        let mut points = 0;
        loop {
            if stop.is_stopped() {
                break;
            }
            let batch = coordinator.reserve_batch(self.batch_size);
            if batch == 0 {
                break;
            }
            self.gauge.store(0, Ordering::Release);
            let mut escaped = 0;
            while escaped < batch {
                let c: Complex<f64> = self.source.draw(rng);
                if inside_cardioids(c) {
                    continue;
                }
                if !sample_orbit(c, self.iterations, &mut self.orbit) {
                    continue;
                }
                for z in self.orbit.points() {
                    if let Some((x, y)) = self.bounds.project(*z, width, height) {
                        self.histogram.record(x, y);
                    }
                }
                escaped += 1;
                self.gauge.fetch_add(1, Ordering::Relaxed);
            }
            points += u64::from(batch);
            debug!("worker {}: banked a batch of {}", self.index, batch);
        }
        WorkerReport {
            histogram: self.histogram,
            points,
        }
    }
}
