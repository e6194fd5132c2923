//! Fixed-timestep accumulator.
//!
//! Wall time is banked between measurements; a tick is released only once the
//! bank strictly exceeds one tick duration, and exactly one tick's worth is
//! withdrawn per release so the remainder carries into the next measurement.

use std::time::{Duration, Instant};

const IDLE: Duration = Duration::from_millis(1);

#[derive(Clone, Debug)]
pub struct Scheduler {
    tick: Duration,
    last_time: Instant,
    accumulated: Duration,
}

impl Scheduler {
    pub fn new(tick_rate: f64, now: Instant) -> Self {
        let rate = if tick_rate.is_finite() && tick_rate > 0.0 {
            tick_rate
        } else {
            20.0
        };
        Self {
            tick: Duration::from_secs_f64(1.0 / rate),
            last_time: now,
            accumulated: Duration::ZERO,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    pub fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Banks the time since the last measurement. True when a tick is due.
    pub fn accumulate(&mut self, now: Instant) -> bool {
        self.accumulated += now.saturating_duration_since(self.last_time);
        self.last_time = now;
        if self.accumulated > self.tick {
            self.accumulated -= self.tick;
            true
        } else {
            false
        }
    }

    /// Sleeps in short naps until the next tick is due.
    pub fn wait_for_tick(&mut self) {
        while !self.accumulate(Instant::now()) {
            std::thread::sleep(IDLE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_duration_follows_rate() {
        let scheduler = Scheduler::new(20.0, Instant::now());
        assert_eq!(scheduler.tick_duration(), Duration::from_millis(50));
        assert!((scheduler.tick_seconds() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn nonsense_rates_fall_back() {
        let scheduler = Scheduler::new(0.0, Instant::now());
        assert_eq!(scheduler.tick_duration(), Duration::from_millis(50));
    }

    #[test]
    fn remainder_carries_forward() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(20.0, start);

        assert!(!scheduler.accumulate(start + Duration::from_millis(30)));
        assert!(scheduler.accumulate(start + Duration::from_millis(60)));
        assert_eq!(scheduler.accumulated(), Duration::from_millis(10));

        assert!(!scheduler.accumulate(start + Duration::from_millis(80)));
        assert!(scheduler.accumulate(start + Duration::from_millis(110)));
        assert_eq!(scheduler.accumulated(), Duration::from_millis(10));
    }

    #[test]
    fn exactly_one_tick_is_not_yet_due() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(20.0, start);
        assert!(!scheduler.accumulate(start + Duration::from_millis(50)));
        assert!(scheduler.accumulate(start + Duration::from_millis(51)));
    }

    #[test]
    fn long_stall_releases_one_tick_per_measurement() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(20.0, start);
        let later = start + Duration::from_millis(260);
        assert!(scheduler.accumulate(later));
        assert!(scheduler.accumulate(later));
        assert!(scheduler.accumulate(later));
        assert!(scheduler.accumulate(later));
        assert!(scheduler.accumulate(later));
        assert!(!scheduler.accumulate(later));
        assert_eq!(scheduler.accumulated(), Duration::from_millis(10));
    }

    #[test]
    fn wait_for_tick_returns() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new(200.0, start);
        scheduler.wait_for_tick();
        assert!(start.elapsed() > scheduler.tick_duration());
    }
}
