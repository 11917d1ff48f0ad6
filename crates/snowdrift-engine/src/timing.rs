//! Frame timing for the host loop.
//!
//! Produces the wall-clock delta handed to `ProjectileManager::tick`, either
//! measured from real time or synthesized at a fixed rate with optional
//! jitter (for headless runs that should still see uneven frames).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame timing manager.
#[derive(Debug)]
pub struct FrameTiming {
    /// Target frames per second
    target_fps: u32,
    /// Time budget per frame
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Measure real elapsed time instead of synthesizing it
    realtime: bool,
    /// Max fraction of the frame budget added/removed per synthetic frame
    jitter: f32,
    rng: fastrand::Rng,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameTiming {
    /// Create a new frame timing manager.
    ///
    /// # Arguments
    /// * `target_fps` - Target frames per second
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            last_frame: Instant::now(),
            realtime: false,
            jitter: 0.0,
            rng: fastrand::Rng::new(),
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Measure deltas from the wall clock.
    #[must_use]
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Vary synthetic frame deltas by up to `jitter` of the frame budget.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f32, seed: u64) -> Self {
        self.jitter = jitter.clamp(0.0, 0.9);
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Delta time for the next frame, in seconds.
    /// Also stores the frame time for FPS calculation.
    pub fn delta_time(&mut self) -> f32 {
        let dt = if self.realtime {
            let now = Instant::now();
            let dt = (now - self.last_frame).as_secs_f32();
            self.last_frame = now;
            dt
        } else {
            let budget = self.frame_budget.as_secs_f32();
            budget * (1.0 + (self.rng.f32() * 2.0 - 1.0) * self.jitter)
        };

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }

        dt
    }

    /// Sleep for the remainder of the frame budget (realtime mode only).
    pub fn sleep_remainder(&self) {
        if !self.realtime {
            return;
        }

        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Get the current FPS (averaged over recent frames).
    #[must_use]
    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let avg_frame_time: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;

        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }

    /// Get the target FPS.
    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Reset timing (call after pause or loading).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.frame_times.clear();
    }
}
