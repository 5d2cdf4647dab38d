use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frames kept for the rolling FPS average
const FPS_WINDOW: usize = 60;

/// Rolling frame-time log, one sample per paint
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    samples: VecDeque<Duration>,
    frame_start: Option<Instant>,
    frames: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Closes the frame opened by `begin` and returns its duration.
    pub fn end(&mut self) -> Duration {
        let elapsed = self.frame_start.take().map(|start| start.elapsed()).unwrap_or_default();
        self.record(elapsed);
        elapsed
    }

    pub fn record(&mut self, frame: Duration) {
        self.samples.push_back(frame);
        if self.samples.len() > FPS_WINDOW {
            self.samples.pop_front();
        }
        self.frames += 1;
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn average_frame_time(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        self.samples.iter().sum::<Duration>() / self.samples.len() as u32
    }

    /// Average FPS over the window; zero before the first timed frame.
    pub fn fps(&self) -> f64 {
        let average = self.average_frame_time().as_secs_f64();
        if average > 0.0 { 1.0 / average } else { 0.0 }
    }
}

/// Outcome of one paint
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub price_rebuilt: bool,
    pub volume_rebuilt: bool,
    pub price_drawn: bool,
    pub volume_drawn: bool,
    pub frame_time: Duration,
    pub fps: f64,
}

impl FrameStats {
    pub fn rebuilt_any(&self) -> bool {
        self.price_rebuilt || self.volume_rebuilt
    }
}
