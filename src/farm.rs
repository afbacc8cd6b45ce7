// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The round loop.  A farm owns the store, and between checkpoints it
//! lends the geometry to a crew of workers: open a round, let them
//! pull batches until the ceiling, merge whatever they bring home,
//! save, maybe render, repeat.
//!
//! Rounds end at render boundaries, so the picture on disk grows in
//! even steps and a crash can only ever cost the round in flight.

extern crate crossbeam;
extern crate num_cpus;
extern crate rand;

use std::path::Path;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use coordinator::{Coordinator, StopFlag, UNBOUNDED};
use error::Error;
use header::Header;
use histogram::Histogram;
use planes::BoundingBox;
use render::ImageWriter;
use store::Store;
use worker::Worker;

/// Knobs for a farming run that live outside the store file.
#[derive(Clone, Copy, Debug)]
pub struct FarmOptions {
    /// Worker threads; 0 means one per logical CPU.
    pub threads: usize,
    /// Escaping samples per quota grant.
    pub batch_size: u32,
    /// Points between snapshots; 0 falls back to the store's target,
    /// or to never when the target is unbounded too.
    pub render_interval: u64,
}

/// Drives workers against a store until its target is met or someone
/// asks it to stop.
#[derive(Debug)]
pub struct Farm {
    store: Store,
    header: Header,
    batch_size: u32,
    render_interval: u64,
    coordinator: Arc<Coordinator>,
    stop: Arc<StopFlag>,
    gauges: Vec<Arc<AtomicU64>>,
    writer: ImageWriter,
}

impl Farm {
    /// Builds a farm over `store`.  The store's corners get checked
    /// here, once, so the workers can trust them; snapshots land next
    /// to the store file.
    pub fn new(store: Store, options: FarmOptions) -> Result<Farm, Error> {
        let header = store.load_header()?;
        BoundingBox::new(header.bounds.a, header.bounds.b)?;
        let threads = if options.threads == 0 {
            num_cpus::get()
        } else {
            options.threads
        };
        debug!("{} worker threads, batches of {}", threads, options.batch_size);
        let gauges = (0..threads).map(|_| Arc::new(AtomicU64::new(0))).collect();
        let writer = ImageWriter::new(store.path().parent().unwrap_or(Path::new(".")));
        Ok(Farm {
            store,
            header,
            batch_size: options.batch_size,
            render_interval: options.render_interval,
            coordinator: Arc::new(Coordinator::new()),
            stop: Arc::new(StopFlag::new()),
            gauges,
            writer,
        })
    }

    /// The geometry being farmed.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The shared batch counter, for anyone who wants to watch it.
    pub fn coordinator(&self) -> Arc<Coordinator> {
        self.coordinator.clone()
    }

    /// The latch that winds the farm down.
    pub fn stop_flag(&self) -> Arc<StopFlag> {
        self.stop.clone()
    }

    /// One per-batch progress gauge per worker.
    pub fn gauges(&self) -> &[Arc<AtomicU64>] {
        &self.gauges
    }

    /// Farms rounds until the store's target is reached or the stop
    /// flag goes up, returning the final progress.  Safe to call on a
    /// store that is already done; it returns without opening a round.
    pub fn run(&mut self) -> Result<u64, Error> {
        let mut progress = self.store.load_header()?.progress;
        loop {
            if self.stop.is_stopped() || self.finished(progress) {
                return Ok(progress);
            }
            progress = self.run_round(progress)?;
        }
    }

    fn finished(&self, progress: u64) -> bool {
        self.header.target_points > 0 && progress >= self.header.target_points
    }

    /// One round: spawn the crew, drain the quota, merge the
    /// survivors, checkpoint, maybe render.  A panicked worker costs
    /// only its own unreported batches; everyone else's work is still
    /// merged and progress advances by what actually came home.
    fn run_round(&mut self, progress: u64) -> Result<u64, Error> {
        let target = round_target(progress, self.header.target_points, self.render_interval);
        self.coordinator.begin_round(progress, target);
        if target == UNBOUNDED {
            info!("round opens at {} with no ceiling; stop with the s key", progress);
        } else {
            info!("round opens at {}, aiming for {}", progress, target);
        }

        let header = self.header;
        let batch_size = self.batch_size;
        let reports = crossbeam::scope(|spawner| {
            let handles: Vec<_> = self
                .gauges
                .iter()
                .enumerate()
                .map(|(index, gauge)| {
                    let coordinator = self.coordinator.clone();
                    let stop = self.stop.clone();
                    let gauge = gauge.clone();
                    spawner.spawn(move |_| {
                        let worker = Worker::new(&header, index, batch_size, gauge);
                        let mut rng = rand::thread_rng();
                        worker.run(&mut rng, &coordinator, &stop)
                    })
                })
                .collect();
            let mut reports = Vec::with_capacity(handles.len());
            for handle in handles {
                match handle.join() {
                    Ok(report) => reports.push(report),
                    Err(_) => warn!("a worker panicked; its share of this round is lost"),
                }
            }
            reports
        })
        .unwrap();

        let mut delta = Histogram::new(self.header.width, self.header.height);
        let mut completed = 0;
        for report in &reports {
            delta.merge(&report.histogram)?;
            completed += report.points;
        }
        if completed == 0 {
            info!("round closed with no completed batches");
            return Ok(progress);
        }

        let new_progress = progress + completed;
        let merged = self.store.merge_and_save(&delta, new_progress)?;
        info!(
            "round closed at {}: banked {} points, {} orbit hits on file",
            new_progress,
            completed,
            merged.total()
        );

        let interval = if self.render_interval > 0 {
            self.render_interval
        } else {
            self.header.target_points
        };
        let at_boundary = interval > 0 && new_progress % interval == 0;
        if at_boundary || self.finished(new_progress) {
            if let Err(cause) = self.writer.write_snapshot(&merged) {
                warn!("snapshot failed, farming on: {}", cause);
            }
        }
        Ok(new_progress)
    }
}

/// Where the next round must stop: the first render boundary strictly
/// past `progress`, clipped to the overall target.  No interval and no
/// target means the round runs until the stop flag.
fn round_target(progress: u64, target_points: u64, render_interval: u64) -> u64 {
    let interval = if render_interval > 0 {
        render_interval
    } else {
        target_points
    };
    if interval == 0 {
        return UNBOUNDED;
    }
    let boundary = (progress - progress % interval).saturating_add(interval);
    if target_points > 0 {
        boundary.min(target_points)
    } else {
        boundary
    }
}
