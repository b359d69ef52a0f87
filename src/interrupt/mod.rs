//! Cooperative cancellation — a shared flag checked between and during the
//! blocking waits of a performance.
//!
//! The binary sets the flag from its signal handler; the player and the
//! audio backends poll it. There is no preemption: a wait already underway
//! finishes its current slice before the flag is seen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest stretch slept without looking at the flag.
const SLICE: Duration = Duration::from_millis(25);

/// A clonable stop flag shared between the signal handler thread and the
/// performance.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    raised: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Idempotent; safe from any thread.
    pub fn set(&self) {
        self.raised.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }

    /// Sleep for `len`, waking early if the flag is raised.
    ///
    /// Returns `true` if the full duration elapsed, `false` if the flag
    /// cut the wait short (or was already set on entry). A `len` past
    /// what the clock can represent never elapses on its own; only the
    /// flag ends that wait.
    pub fn sleep(&self, len: Duration) -> bool {
        let deadline = Instant::now().checked_add(len);
        loop {
            if self.is_set() {
                return false;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    SLICE.min(deadline - now)
                }
                None => SLICE,
            };
            thread::sleep(slice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset() {
        let flag = StopFlag::new();
        assert!(!flag.is_set());
    }

    #[test]
    fn set_is_visible_through_clones() {
        let flag = StopFlag::new();
        let other = flag.clone();
        other.set();
        assert!(flag.is_set());
    }

    #[test]
    fn sleep_completes_when_unset() {
        let flag = StopFlag::new();
        let started = Instant::now();
        assert!(flag.sleep(Duration::from_millis(30)));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn sleep_returns_immediately_when_already_set() {
        let flag = StopFlag::new();
        flag.set();
        let started = Instant::now();
        assert!(!flag.sleep(Duration::from_secs(10)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_wakes_early_when_set_from_another_thread() {
        let flag = StopFlag::new();
        let setter = flag.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            setter.set();
        });

        let started = Instant::now();
        let completed = flag.sleep(Duration::from_secs(10));
        handle.join().unwrap();

        assert!(!completed, "sleep should have been interrupted");
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "interrupted sleep took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn sleep_longer_than_the_clock_wakes_on_the_flag() {
        let flag = StopFlag::new();
        let setter = flag.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            setter.set();
        });

        assert!(
            !flag.sleep(Duration::MAX),
            "only the flag can end this wait"
        );
        handle.join().unwrap();
    }
}
