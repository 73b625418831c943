use std::fmt;
use std::time::Instant;

use crate::core::data::size::Size;
use crate::core::events::input::{
    DropEvent, KeyEvent, MouseButtonEvent, MouseMoveEvent, RuneEvent, ScrollEvent,
};
use crate::core::graphics::GraphicsContext;

pub type DrawFn = Box<dyn FnOnce(&mut dyn GraphicsContext) + Send>;
pub type RawClosure = Box<dyn FnOnce() + Send>;

/// A paint request stamped with the time it was issued.
pub struct RenderTask {
    pub stamped: Instant,
    pub draw: DrawFn,
}

impl RenderTask {
    pub fn new(stamped: Instant, draw: impl FnOnce(&mut dyn GraphicsContext) + Send + 'static) -> Self {
        Self {
            stamped,
            draw: Box::new(draw),
        }
    }
}

/// Everything that travels through a window's queues.
pub enum Event {
    Paint,
    MouseMove(MouseMoveEvent),
    MouseButton(MouseButtonEvent),
    Key(KeyEvent),
    Rune(RuneEvent),
    Drop(DropEvent),
    Scroll(ScrollEvent),
    Resize(Size),
    Close,
    RenderTask(RenderTask),
    RawClosure(RawClosure),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Paint,
    MouseMove,
    MouseButton,
    Key,
    Rune,
    Drop,
    Scroll,
    Resize,
    Close,
    RenderTask,
    RawClosure,
}

impl Event {
    pub fn raw(f: impl FnOnce() + Send + 'static) -> Self {
        Event::RawClosure(Box::new(f))
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Paint => EventKind::Paint,
            Event::MouseMove(_) => EventKind::MouseMove,
            Event::MouseButton(_) => EventKind::MouseButton,
            Event::Key(_) => EventKind::Key,
            Event::Rune(_) => EventKind::Rune,
            Event::Drop(_) => EventKind::Drop,
            Event::Scroll(_) => EventKind::Scroll,
            Event::Resize(_) => EventKind::Resize,
            Event::Close => EventKind::Close,
            Event::RenderTask(_) => EventKind::RenderTask,
            Event::RawClosure(_) => EventKind::RawClosure,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::MouseMove(ev) => f.debug_tuple("MouseMove").field(ev).finish(),
            Event::MouseButton(ev) => f.debug_tuple("MouseButton").field(ev).finish(),
            Event::Key(ev) => f.debug_tuple("Key").field(ev).finish(),
            Event::Rune(ev) => f.debug_tuple("Rune").field(ev).finish(),
            Event::Drop(ev) => f.debug_tuple("Drop").field(ev).finish(),
            Event::Scroll(ev) => f.debug_tuple("Scroll").field(ev).finish(),
            Event::Resize(size) => f.debug_tuple("Resize").field(size).finish(),
            Event::RenderTask(task) => f
                .debug_struct("RenderTask")
                .field("stamped", &task.stamped)
                .finish_non_exhaustive(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::input::ScrollEvent;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Event::Paint.kind(), EventKind::Paint);
        assert_eq!(Event::Close.kind(), EventKind::Close);
        assert_eq!(Event::raw(|| {}).kind(), EventKind::RawClosure);
        assert_eq!(
            Event::RenderTask(RenderTask::new(Instant::now(), |_| {})).kind(),
            EventKind::RenderTask
        );
    }

    #[test]
    fn test_debug_does_not_expose_closures() {
        let rendered = format!("{:?}", Event::raw(|| {}));
        assert_eq!(rendered, "RawClosure");

        let rendered = format!("{:?}", Event::Scroll(ScrollEvent { x: 0.0, y: 1.5 }));
        assert!(rendered.starts_with("Scroll("));
    }
}
