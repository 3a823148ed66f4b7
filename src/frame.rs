// Per-effect frame scheduling.
// The host owns the real clock and display refresh; an effect only keeps
// one outstanding `FrameHandle`. Running any other handle (cancelled,
// superseded, or fired after destroy) does nothing.
// Visual: at most one redraw per display frame, fewer for capped styles.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Outcome of presenting a handle to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not the pending handle: ignore silently.
    Stale,
    /// Too soon after the last accepted frame; reschedule without work.
    Throttled,
    /// Do the frame. `frame` counts accepted frames from 1.
    Run { frame: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct FrameLoop {
    next_id: u64,
    pending: Option<FrameHandle>,
    min_interval: Option<Duration>,
    last_accepted: Option<Duration>,
    frames: u64,
}

impl FrameLoop {
    pub fn new(max_fps: Option<u32>) -> Self {
        let mut fl = Self::default();
        fl.set_max_fps(max_fps);
        fl
    }

    pub fn set_max_fps(&mut self, max_fps: Option<u32>) {
        self.min_interval = max_fps.filter(|&f| f > 0).map(|f| Duration::from_secs(1) / f);
    }

    /// Schedule a frame. At most one is outstanding: if one is already
    /// pending it is returned instead of a new one.
    pub fn request(&mut self) -> FrameHandle {
        if let Some(h) = self.pending {
            return h;
        }
        self.next_id += 1;
        let h = FrameHandle(self.next_id);
        self.pending = Some(h);
        h
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Drop the outstanding handle; it becomes stale.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Consume `handle` at host time `now`.
    pub fn accept(&mut self, handle: FrameHandle, now: Duration) -> Tick {
        if self.pending != Some(handle) {
            return Tick::Stale;
        }
        self.pending = None;

        if let (Some(min), Some(last)) = (self.min_interval, self.last_accepted)
            && now.saturating_sub(last) < min
        {
            return Tick::Throttled;
        }
        self.last_accepted = Some(now);
        self.frames += 1;
        Tick::Run { frame: self.frames }
    }

    /// Force the next presented frame through the cap (after a re-sample or resume).
    pub fn reset_throttle(&mut self) {
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn test_single_outstanding_handle() {
        let mut fl = FrameLoop::new(None);
        let a = fl.request();
        let b = fl.request();
        assert_eq!(a, b);
        assert_eq!(fl.accept(a, MS(0)), Tick::Run { frame: 1 });
        let c = fl.request();
        assert_ne!(a, c);
    }

    #[test]
    fn test_cancelled_and_replayed_handles_are_stale() {
        let mut fl = FrameLoop::new(None);
        let a = fl.request();
        fl.cancel();
        assert_eq!(fl.pending(), None);
        assert_eq!(fl.accept(a, MS(0)), Tick::Stale);

        let b = fl.request();
        assert_eq!(fl.accept(b, MS(0)), Tick::Run { frame: 1 });
        assert_eq!(fl.accept(b, MS(16)), Tick::Stale);
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_fps_cap_throttles_early_frames() {
        let mut fl = FrameLoop::new(Some(30));
        let h = fl.request();
        assert_eq!(fl.accept(h, MS(0)), Tick::Run { frame: 1 });
        let h = fl.request();
        assert_eq!(fl.accept(h, MS(16)), Tick::Throttled);
        let h = fl.request();
        assert_eq!(fl.accept(h, MS(34)), Tick::Run { frame: 2 });
    }
}
