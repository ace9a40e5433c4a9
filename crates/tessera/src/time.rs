//! Frame pacing and FPS measurement.
//!
//! [`FramePacer`] brackets each frame with [`begin_frame`](FramePacer::begin_frame)
//! and [`end_frame`](FramePacer::end_frame). `end_frame` records how long the
//! last full frame took, folds it into a rolling average over the last
//! [`FPS_SAMPLES`] frames, and sleeps off whatever is left of the frame
//! budget when the frame finished early. The cap works without vsync.
//!
//! ```text
//!   begin_frame         work          end_frame            sleep
//!   ─────┬──────────────────────────────┬────────────────────────────┬──►
//!        │◄────────── elapsed ─────────►│◄── budget − elapsed ──────►│
//!        │◄──────────────────── 1 / max_fps ────────────────────────►│
//! ```

use std::time::{Duration, Instant};

/// Frames in the rolling FPS window.
pub const FPS_SAMPLES: usize = 100;

/// Reported before any measurable frame time has accumulated.
const FALLBACK_FPS: f32 = 60.0;

/// Fixed-size ring of recent frame times, in seconds.
#[derive(Debug, Clone)]
pub struct FrameTimeWindow {
    samples: [f32; FPS_SAMPLES],
    next: usize,
    len: usize,
}

impl FrameTimeWindow {
    pub fn new() -> Self {
        Self {
            samples: [0.0; FPS_SAMPLES],
            next: 0,
            len: 0,
        }
    }

    /// Record one frame time, evicting the oldest once full.
    pub fn push(&mut self, frame_time: Duration) {
        self.samples[self.next] = frame_time.as_secs_f32();
        self.next = (self.next + 1) % FPS_SAMPLES;
        self.len = (self.len + 1).min(FPS_SAMPLES);
    }

    /// Mean frame time over the recorded samples, in seconds.
    pub fn average(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        self.samples[..self.len].iter().sum::<f32>() / self.len as f32
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        let average = self.average();
        if average > 0.0 { 1.0 / average } else { FALLBACK_FPS }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for FrameTimeWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Caps the frame rate by sleeping at the end of fast frames.
#[derive(Debug, Clone)]
pub struct FramePacer {
    max_fps: f32,
    frame_start: Instant,
    last_end: Instant,
    frame_time: Duration,
    window: FrameTimeWindow,
    fps: f32,
}

impl FramePacer {
    /// Create a pacer capped at `max_fps`. A cap that is not a positive,
    /// finite number disables sleeping.
    pub fn new(max_fps: f32) -> Self {
        let now = Instant::now();
        Self {
            max_fps,
            frame_start: now,
            last_end: now,
            frame_time: Duration::ZERO,
            window: FrameTimeWindow::new(),
            fps: FALLBACK_FPS,
        }
    }

    pub fn set_max_fps(&mut self, max_fps: f32) {
        self.max_fps = max_fps;
    }

    pub fn max_fps(&self) -> f32 {
        self.max_fps
    }

    /// Mark the start of a frame.
    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    /// Finish the frame: update the FPS estimate, then sleep off any unused
    /// budget. Returns the smoothed FPS.
    pub fn end_frame(&mut self) -> f32 {
        let now = Instant::now();
        self.frame_time = now.saturating_duration_since(self.last_end);
        self.last_end = now;
        self.window.push(self.frame_time);
        self.fps = self.window.fps();

        if let Some(budget) = self.budget() {
            let elapsed = now.saturating_duration_since(self.frame_start);
            if elapsed < budget {
                std::thread::sleep(budget - elapsed);
            }
        }

        self.fps
    }

    /// Duration of the last full frame, end to end, including any sleep
    /// before it.
    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// The smoothed FPS as of the last [`end_frame`](Self::end_frame).
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// The time one frame may take, or `None` when uncapped.
    pub fn budget(&self) -> Option<Duration> {
        (self.max_fps.is_finite() && self.max_fps > 0.0)
            .then(|| Duration::from_secs_f64(1.0 / f64::from(self.max_fps)))
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(FALLBACK_FPS)
    }
}
