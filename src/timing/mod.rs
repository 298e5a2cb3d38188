//! Capture pacing
//!
//! The recorder waits one full frame interval after every frame. Time
//! spent capturing and encoding is not subtracted, so a session always
//! runs longer than its nominal duration.

use std::time::Duration;

/// Something that can hold the recording thread for a given interval
pub trait Pacer {
    fn pause(&mut self, interval: Duration);
}

/// Pacer that blocks the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    #[inline]
    fn pause(&mut self, interval: Duration) {
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, interval: Duration) {
        (**self).pause(interval)
    }
}

/// Delay between two snapshots at `frames_per_second`.
///
/// Whole milliseconds, truncated: 20 fps gives 50ms, 30 fps gives 33ms.
pub fn frame_interval(frames_per_second: u32) -> Duration {
    if frames_per_second == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(1000 / u64::from(frames_per_second))
}
