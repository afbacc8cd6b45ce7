//! Lock-free work accounting shared by every farm thread.
//!
//! A round has a single ceiling, and workers pull batches from it by
//! bumping one atomic counter.  Nothing here knows about complex
//! numbers or histograms; it is bookkeeping, deliberately boring.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Round target meaning "no ceiling": grants keep coming until the
/// stop flag goes up.
pub const UNBOUNDED: u64 = u64::MAX;

/// Hands out batches of sample quota against a per-round target.
///
/// `claimed` only ever grows; a new round moves the target, never the
/// odometer.  That keeps the arithmetic monotone and makes resumption
/// trivial: seed `claimed` with the progress already on disk.
#[derive(Debug)]
pub struct Coordinator {
    claimed: AtomicU64,
    round_target: AtomicU64,
}

impl Coordinator {
    /// A coordinator with nothing claimed and nothing to claim.  The
    /// first `begin_round` puts it to work.
    pub fn new() -> Coordinator {
        Coordinator {
            claimed: AtomicU64::new(0),
            round_target: AtomicU64::new(0),
        }
    }

    /// Opens a round: the odometer jumps to `progress` (points already
    /// banked in earlier rounds or earlier runs) and grants are handed
    /// out until `target`.
    pub fn begin_round(&self, progress: u64, target: u64) {
        self.claimed.store(progress, Ordering::Release);
        self.round_target.store(target, Ordering::Release);
    }

    /// Claims up to `max_batch` points of quota, returning the granted
    /// size.  Zero means the round is spent and the caller should go
    /// report in.  Concurrent callers never overdraw: the grant is
    /// published with a compare-and-swap, so two threads cannot walk
    /// away with the same slice of the target.
    pub fn reserve_batch(&self, max_batch: u32) -> u32 {
        let target = self.round_target.load(Ordering::Acquire);
        let mut claimed = self.claimed.load(Ordering::Acquire);
        loop {
            if claimed >= target {
                return 0;
            }
            let grant = u64::from(max_batch).min(target - claimed);
            match self.claimed.compare_exchange_weak(
                claimed,
                claimed + grant,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                // grant never exceeds max_batch, so it fits back in a u32.
                Ok(_) => return grant as u32,
                Err(seen) => claimed = seen,
            }
        }
    }

    /// Points claimed so far, including the seed progress of the
    /// current round.
    pub fn progress(&self) -> u64 {
        self.claimed.load(Ordering::Acquire)
    }

    /// Ceiling of the current round.
    pub fn round_target(&self) -> u64 {
        self.round_target.load(Ordering::Acquire)
    }
}

/// A latch the keyboard listener raises and the workers poll.  Once
/// up, it stays up.
#[derive(Debug)]
pub struct StopFlag(AtomicBool);

impl StopFlag {
    /// A lowered flag.
    pub fn new() -> StopFlag {
        StopFlag(AtomicBool::new(false))
    }

    /// Raises the flag.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// True once anyone has asked the farm to wind down.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    extern crate crossbeam;

    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn a_fresh_coordinator_grants_nothing() {
        let coordinator = Coordinator::new();
        assert_eq!(coordinator.reserve_batch(1_000), 0);
    }

    #[test]
    fn grants_stop_at_the_round_target() {
        let coordinator = Coordinator::new();
        coordinator.begin_round(990, 1_000);
        assert_eq!(coordinator.reserve_batch(64), 10);
        assert_eq!(coordinator.reserve_batch(64), 0);
        assert_eq!(coordinator.progress(), 1_000);
    }

    #[test]
    fn an_unbounded_round_keeps_granting() {
        let coordinator = Coordinator::new();
        coordinator.begin_round(5, UNBOUNDED);
        for _ in 0..1_000 {
            assert_eq!(coordinator.reserve_batch(2_000), 2_000);
        }
        assert_eq!(coordinator.progress(), 2_000_005);
    }

    #[test]
    fn concurrent_callers_never_overdraw() {
        let coordinator = Coordinator::new();
        coordinator.begin_round(0, 100_000);
        let granted = AtomicU64::new(0);
        crossbeam::scope(|spawner| {
            for _ in 0..8 {
                spawner.spawn(|_| loop {
                    let grant = coordinator.reserve_batch(17);
                    if grant == 0 {
                        break;
                    }
                    granted.fetch_add(u64::from(grant), Ordering::Relaxed);
                });
            }
        })
        .unwrap();
        assert_eq!(granted.load(Ordering::Relaxed), 100_000);
        assert_eq!(coordinator.progress(), 100_000);
    }

    #[test]
    fn the_stop_flag_latches() {
        let stop = StopFlag::new();
        assert!(!stop.is_stopped());
        stop.request_stop();
        assert!(stop.is_stopped());
        stop.request_stop();
        assert!(stop.is_stopped());
    }
}
