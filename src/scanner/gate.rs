//! Admission control between the capture thread and the result dialog.
//!
//! At most one decoded value may be in flight to the UI at a time. The gate
//! is a three-state machine, `Idle -> Pending -> Displayed -> Idle`, shared
//! between the capture thread (which offers values) and command handlers on
//! the main thread (which show and dismiss the dialog). The `Idle -> Pending`
//! hop is a compare-and-set, so concurrent offers admit exactly one caller.

use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Mutex, PoisonError,
};
use std::time::{Duration, Instant};

const IDLE: u8 = 0;
const PENDING: u8 = 1;
const DISPLAYED: u8 = 2;

/// Delay between dialog dismissal and the gate re-opening, absorbing frames
/// that were already in flight when the dialog closed.
pub const REARM_DELAY: Duration = Duration::from_millis(300);

struct GateTiming {
    last_accepted: Option<Instant>,
    cooldown: Duration,
}

pub struct ScanGate {
    state: AtomicU8,
    processing: AtomicBool,
    timing: Mutex<GateTiming>,
}

impl ScanGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: AtomicU8::new(IDLE),
            processing: AtomicBool::new(false),
            timing: Mutex::new(GateTiming {
                last_accepted: None,
                cooldown,
            }),
        }
    }

    /// Try to claim the gate for one decoded value. Admission requires an
    /// idle gate, an unpaused pipeline, and an elapsed cooldown window. On
    /// success the cooldown stamp is taken and the gate is `Pending` until
    /// the caller either displays or reverts.
    pub fn try_admit(&self, now: Instant) -> bool {
        if self.processing.load(Ordering::SeqCst) {
            return false;
        }

        let mut timing = self
            .timing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = timing.last_accepted {
            if now.duration_since(last) < timing.cooldown {
                return false;
            }
        }

        if self
            .state
            .compare_exchange(IDLE, PENDING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        timing.last_accepted = Some(now);
        true
    }

    /// `Pending -> Displayed`, once the result is actually handed to the UI.
    pub fn mark_displayed(&self) {
        let _ = self
            .state
            .compare_exchange(PENDING, DISPLAYED, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Abandon a pending admission without clearing the cooldown stamp.
    /// Used for pass-through values and dispatch failures.
    pub fn revert(&self) {
        let _ = self
            .state
            .compare_exchange(PENDING, IDLE, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// `Displayed -> Idle`; called after the re-arm delay once the dialog
    /// is dismissed.
    pub fn release(&self) {
        let _ = self
            .state
            .compare_exchange(DISPLAYED, IDLE, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Full reset on scanner start: idle, unpaused, cooldown stamp cleared.
    pub fn reset(&self) {
        self.state.store(IDLE, Ordering::SeqCst);
        self.processing.store(false, Ordering::SeqCst);
        self.timing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_accepted = None;
    }

    /// Pause admission while the screen is hidden.
    pub fn pause(&self) {
        self.processing.store(true, Ordering::SeqCst);
    }

    /// Resume after a pause: unpause and drop any stale in-flight result,
    /// keeping the cooldown stamp.
    pub fn resume(&self) {
        self.processing.store(false, Ordering::SeqCst);
        self.state.store(IDLE, Ordering::SeqCst);
    }

    pub fn set_cooldown(&self, cooldown: Duration) {
        self.timing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cooldown = cooldown;
    }

    pub fn is_displayed(&self) -> bool {
        self.state.load(Ordering::SeqCst) == DISPLAYED
    }

    pub fn is_paused(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn gate(cooldown_ms: u64) -> ScanGate {
        ScanGate::new(Duration::from_millis(cooldown_ms))
    }

    #[test]
    fn admits_exactly_once_until_released() {
        let g = gate(0);
        assert!(g.try_admit(Instant::now()));
        assert!(!g.try_admit(Instant::now()));

        g.mark_displayed();
        assert!(g.is_displayed());
        assert!(!g.try_admit(Instant::now()));

        g.release();
        assert!(g.try_admit(Instant::now()));
    }

    #[test]
    fn cooldown_blocks_rapid_readmission() {
        let g = gate(500);
        let start = Instant::now();
        assert!(g.try_admit(start));
        g.revert();

        // Within the window the stamp alone rejects, even though the state
        // machine is back at idle.
        assert!(!g.try_admit(start + Duration::from_millis(100)));
        assert!(g.try_admit(start + Duration::from_millis(500)));
    }

    #[test]
    fn pause_blocks_admission() {
        let g = gate(0);
        g.pause();
        assert!(g.is_paused());
        assert!(!g.try_admit(Instant::now()));

        g.resume();
        assert!(g.try_admit(Instant::now()));
    }

    #[test]
    fn resume_drops_stale_result() {
        let g = gate(0);
        assert!(g.try_admit(Instant::now()));
        g.mark_displayed();

        g.pause();
        g.resume();
        assert!(!g.is_displayed());
        assert!(g.try_admit(Instant::now()));
    }

    #[test]
    fn revert_keeps_cooldown_stamp() {
        let g = gate(10_000);
        let start = Instant::now();
        assert!(g.try_admit(start));
        g.revert();
        assert!(!g.try_admit(start + Duration::from_millis(1)));
    }

    #[test]
    fn release_only_applies_to_displayed() {
        let g = gate(0);
        assert!(g.try_admit(Instant::now()));
        // Pending, not displayed: release is a no-op, revert opens it.
        g.release();
        assert!(!g.try_admit(Instant::now()));
        g.revert();
        assert!(g.try_admit(Instant::now()));
    }

    #[test]
    fn concurrent_offers_admit_one_winner() {
        let g = Arc::new(gate(0));
        let barrier = Arc::new(Barrier::new(8));
        let mut handles = Vec::new();

        for _ in 0..8 {
            let g = Arc::clone(&g);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                g.try_admit(Instant::now())
            }));
        }

        let admitted = handles
            .into_iter()
            .map(|h| h.join().expect("offer thread"))
            .filter(|won| *won)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn reset_clears_everything() {
        let g = gate(10_000);
        assert!(g.try_admit(Instant::now()));
        g.mark_displayed();
        g.pause();

        g.reset();
        assert!(!g.is_paused());
        assert!(!g.is_displayed());
        assert!(g.try_admit(Instant::now()));
    }
}
