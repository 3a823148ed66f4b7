// Overlay surface: the buffer renderers draw into, plus its visibility.
// Visual: invisible until hovered, fades in over 250 ms, fades out on leave
// and is wiped 300 ms later unless the pointer came back.

use std::time::Duration;

use crate::types::FrameBuffer;

const FADE: Duration = Duration::from_millis(250);
const CLEAR_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct RenderSurface {
    pub fb: FrameBuffer,
    visible: bool,
    opacity: f32,
    last_tick: Option<Duration>,
    clear_at: Option<Duration>,
}

impl RenderSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self { fb: FrameBuffer::new(width, height), visible: false, opacity: 0.0, last_tick: None, clear_at: None }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.fb.width, self.fb.height)
    }

    /// Resize and clear. Returns false when the size was unchanged.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if self.size() == (width, height) {
            return false;
        }
        self.fb.resize(width, height);
        true
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.clear_at = None;
    }

    /// Start fading out and schedule the wipe.
    pub fn hide(&mut self, now: Duration) {
        self.visible = false;
        self.clear_at = Some(now + CLEAR_DELAY);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current composite opacity in [0, 1].
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Advance the fade and the delayed clear to host time `now`.
    pub fn tick(&mut self, now: Duration) {
        let dt = self.last_tick.map_or(Duration::ZERO, |t| now.saturating_sub(t));
        self.last_tick = Some(now);

        let step = dt.as_secs_f32() / FADE.as_secs_f32();
        let target = if self.visible { 1.0 } else { 0.0 };
        self.opacity = if self.opacity < target {
            (self.opacity + step).min(target)
        } else {
            (self.opacity - step).max(target)
        };

        if let Some(at) = self.clear_at
            && !self.visible
            && now >= at
        {
            self.fb.clear();
            self.clear_at = None;
        }
    }
}
