// Demo viewer window.
// Visual:
// 1) A window showing the source image at its own size.
// 2) Mouse presence over it becomes pointer enter / move / leave.
// 3) A few keys to tweak the running effect.

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::error::Error;
use crate::types::{FrameBuffer, Point};

/// What the pointer did since the previous poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter(Point),
    Move(Point),
    Leave,
}

/// Key presses the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RadiusUp,
    RadiusDown,
    CellSmaller,
    CellLarger,
    NextStyle,
}

pub struct Viewer {
    window: Window,      // the on-screen window you see
    last: Option<Point>, // pointer position at the previous poll
}

impl Viewer {
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window =
            Window::new(title, width, height, WindowOptions::default()).map_err(|e| Error::Window(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, last: None })
    }

    /// Visual: the window immediately displays `fb`.
    pub fn present(&mut self, fb: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&fb.pixels, fb.width, fb.height)
            .map_err(|e| Error::Window(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Compare the pointer with the previous poll. `Discard` mode reports
    /// nothing when the pointer is outside, which is our leave signal.
    pub fn poll_pointer(&mut self) -> Option<PointerEvent> {
        let now = self.window.get_mouse_pos(MouseMode::Discard).map(|(x, y)| Point::new(x, y));
        let event = match (self.last, now) {
            (None, Some(p)) => Some(PointerEvent::Enter(p)),
            (Some(a), Some(b)) if a != b => Some(PointerEvent::Move(b)),
            (Some(_), None) => Some(PointerEvent::Leave),
            _ => None,
        };
        self.last = now;
        event
    }

    pub fn pointer(&self) -> Option<Point> {
        self.last
    }

    /// Keys pressed this frame (no auto-repeat except for the radius).
    pub fn commands(&self) -> Vec<Command> {
        let w = &self.window;
        let mut out = Vec::new();
        if w.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            out.push(Command::RadiusUp);
        }
        if w.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            out.push(Command::RadiusDown);
        }
        if w.is_key_pressed(Key::LeftBracket, KeyRepeat::No) {
            out.push(Command::CellSmaller);
        }
        if w.is_key_pressed(Key::RightBracket, KeyRepeat::No) {
            out.push(Command::CellLarger);
        }
        if w.is_key_pressed(Key::Tab, KeyRepeat::No) {
            out.push(Command::NextStyle);
        }
        out
    }
}
