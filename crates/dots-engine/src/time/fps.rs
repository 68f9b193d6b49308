use std::time::{Duration, Instant};

/// Counts frames and reports the rate once per elapsed second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    last_fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
            last_fps: 0,
        }
    }

    /// Most recently completed one-second count.
    #[inline]
    pub fn fps(&self) -> u32 {
        self.last_fps
    }

    /// Records one frame at `now`. Returns the new rate when a second has passed.
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        if now.saturating_duration_since(self.window_start) < Duration::from_secs(1) {
            return None;
        }
        self.last_fps = self.frames;
        self.frames = 0;
        self.window_start = now;
        Some(self.last_fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
