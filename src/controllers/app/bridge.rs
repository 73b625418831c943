//! Native callback bridge.
//!
//! Runs on the bound thread while the platform delivers input. It does
//! nothing but translate and enqueue; all handling happens on the pumps.

use crate::controllers::app::ports::NativeInput;
use crate::controllers::app::registry::Registry;
use crate::core::data::{Point, WindowId};
use crate::core::events::{DropEvent, Event, MouseMoveEvent, ScrollEvent};

pub(crate) fn translate(input: NativeInput, cursor_offset: Point) -> Event {
    match input {
        NativeInput::CursorPos(position) => Event::MouseMove(MouseMoveEvent {
            position: position + cursor_offset,
            delta: Point::default(),
        }),
        NativeInput::MouseButton(ev) => Event::MouseButton(ev),
        NativeInput::Key(ev) => Event::Key(ev),
        NativeInput::Char(ev) => Event::Rune(ev),
        NativeInput::Drop(paths) => Event::Drop(DropEvent { paths }),
        NativeInput::Scroll { x, y } => Event::Scroll(ScrollEvent { x, y }),
        NativeInput::FramebufferSize(size) => Event::Resize(size),
    }
}

pub(crate) fn deliver(registry: &Registry, window: WindowId, input: NativeInput, cursor_offset: Point) {
    match registry.get(window) {
        Some(screen) => screen.send_event(translate(input, cursor_offset)),
        None => tracing::trace!(%window, "input for unregistered window dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::Size;
    use crate::core::events::{EventKind, Modifiers, RuneEvent};
    use std::path::PathBuf;

    #[test]
    fn test_cursor_position_gets_offset() {
        let event = translate(
            NativeInput::CursorPos(Point::new(100.0, 50.0)),
            Point::new(-1.0, -2.0),
        );

        match event {
            Event::MouseMove(ev) => assert_eq!(ev.position, Point::new(99.0, 48.0)),
            other => panic!("expected MouseMove, got {other:?}"),
        }
    }

    #[test]
    fn test_each_signal_maps_to_its_event() {
        let offset = Point::default();
        let cases = [
            (
                NativeInput::Char(RuneEvent {
                    rune: 'x',
                    modifiers: Modifiers::NONE,
                }),
                EventKind::Rune,
            ),
            (NativeInput::Drop(vec![PathBuf::from("f")]), EventKind::Drop),
            (NativeInput::Scroll { x: 0.0, y: -1.0 }, EventKind::Scroll),
            (NativeInput::FramebufferSize(Size::new(2, 2)), EventKind::Resize),
        ];

        for (input, kind) in cases {
            assert_eq!(translate(input, offset).kind(), kind);
        }
    }

    #[test]
    fn test_input_for_unknown_window_is_dropped() {
        let registry = Registry::new();

        deliver(
            &registry,
            WindowId(42),
            NativeInput::Scroll { x: 0.0, y: 1.0 },
            Point::default(),
        );

        assert!(registry.is_empty());
    }
}
