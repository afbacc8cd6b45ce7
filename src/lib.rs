#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Buddhabrot farm
//!
//! The Buddhabrot is the Mandelbrot set's ghost.  The Mandelbrot
//! iterates z <- z*z + c and asks how fast each point c runs off to
//! infinity; the Buddhabrot keeps the journey instead, plotting every
//! z an escaping point visits on its way out.  Pile enough of those
//! orbits into a histogram and the familiar silhouette becomes a
//! luminous seated figure.
//!
//! A good render needs more samples than anyone wants to wait for in
//! one sitting, so this crate farms them in checkpointed rounds.  A
//! store file holds the geometry, a progress count and the histogram
//! so far; each round claims batches of samples across a crew of
//! threads, merges what they plot, and saves before touching the
//! progress word.  Kill the process whenever you like; the next run
//! reads the store and carries on from where the file says it stopped.

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;
extern crate rand;

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

#[cfg(test)]
extern crate tempfile;

pub mod coordinator;
pub mod error;
pub mod farm;
pub mod header;
pub mod histogram;
pub mod planes;
pub mod render;
pub mod sampler;
pub mod store;
pub mod worker;

pub use error::Error;
pub use farm::{Farm, FarmOptions};
pub use header::Header;
pub use store::Store;
