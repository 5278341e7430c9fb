// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Wall-clock driven reveal threshold.

use std::time::{Duration, Instant};

use crate::config::CanvasSize;

/**
Turns elapsed time into a replay threshold.

The threshold sweeps linearly from 0 to the canvas pixel count over the reveal duration,
then holds at the pixel count.  No recording can produce an index at or past the pixel
count, so the held value reveals everything.  It also never exceeds `u32::MAX`, the
largest order index a counter slot can hold.

```
use std::time::Duration;
use raster_order::config::CanvasSize;
use raster_order::images::clock::AnimationClock;

let clock = AnimationClock::start(1.0, CanvasSize::new(4, 4));
assert_eq!(clock.threshold_at(Duration::from_millis(500)), 8);
assert_eq!(clock.threshold_at(Duration::from_secs(3)), 16);
```
*/
#[derive(Debug, Clone, Copy)]
pub struct AnimationClock {
    started: Instant,
    reveal_seconds: f64,
    pixel_count: f64,
}

impl AnimationClock {
    pub fn start(reveal_seconds: f32, canvas: CanvasSize) -> Self {
        AnimationClock {
            started: Instant::now(),
            reveal_seconds: reveal_seconds as f64,
            pixel_count: canvas.pixel_count() as f64,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Threshold for the current instant.
    pub fn threshold(&self) -> u32 {
        self.threshold_at(self.elapsed())
    }

    /// Threshold after `elapsed`, rounded to nearest.
    pub fn threshold_at(&self, elapsed: Duration) -> u32 {
        let threshold = elapsed.as_secs_f64() / self.reveal_seconds * self.pixel_count;
        let ceiling = self.pixel_count.min(u32::MAX as f64);
        threshold.round().clamp(0.0, ceiling) as u32
    }

    /// Elapsed time at which every pixel of a full-coverage recording is revealed.
    pub fn fully_revealed_after(&self) -> Duration {
        Duration::from_secs_f64(self.reveal_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = AnimationClock::start(20.0, CanvasSize::new(1920, 1080));
        assert_eq!(clock.threshold_at(Duration::ZERO), 0);
    }

    #[test]
    fn saturates_at_pixel_count() {
        let canvas = CanvasSize::new(1920, 1080);
        let clock = AnimationClock::start(2.0, canvas);
        assert_eq!(clock.threshold_at(Duration::from_secs(2)), 1920 * 1080);
        assert_eq!(clock.threshold_at(clock.fully_revealed_after()), 1920 * 1080);
        assert_eq!(clock.threshold_at(Duration::from_secs(100)), 1920 * 1080);
    }

    #[test]
    fn clamps_instead_of_overflowing() {
        //more pixels than a counter slot can count
        let clock = AnimationClock::start(1.0, CanvasSize::new(100_000, 100_000));
        assert_eq!(clock.threshold_at(Duration::from_secs(3600)), u32::MAX);
        assert_eq!(clock.threshold_at(Duration::from_millis(500)), u32::MAX);
    }

    #[test]
    fn never_decreases() {
        let clock = AnimationClock::start(1.5, CanvasSize::new(37, 11));
        let mut last = 0;
        for ms in 0..3000 {
            let t = clock.threshold_at(Duration::from_millis(ms));
            assert!(t >= last);
            last = t;
        }
        assert_eq!(last, 37 * 11);
    }

    #[test]
    fn rounds_to_nearest() {
        let clock = AnimationClock::start(1.0, CanvasSize::new(10, 1));
        assert_eq!(clock.threshold_at(Duration::from_millis(140)), 1);
        assert_eq!(clock.threshold_at(Duration::from_millis(160)), 2);
    }
}
