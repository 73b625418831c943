use winit::event::{ElementState, KeyEvent as WinitKeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, ModifiersState};
use winit::platform::scancode::PhysicalKeyExtScancode;

use crate::controllers::app::NativeInput;
use crate::core::data::{Point, Size};
use crate::core::events::{Action, KeyEvent, Modifiers, MouseButton, MouseButtonEvent, RuneEvent};

/// Per-window input state the native layer only reports as deltas.
#[derive(Debug, Default)]
pub(crate) struct WindowInput {
    pub(crate) modifiers: Modifiers,
    pub(crate) close_requested: bool,
}

pub(crate) fn action(state: ElementState, repeat: bool) -> Action {
    match (state, repeat) {
        (ElementState::Pressed, false) => Action::Press,
        (ElementState::Pressed, true) => Action::Repeat,
        (ElementState::Released, _) => Action::Release,
    }
}

pub(crate) fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(code) => MouseButton::Other(code),
    }
}

pub(crate) fn modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        control: state.control_key(),
        alt: state.alt_key(),
        super_key: state.super_key(),
    }
}

fn key(event: &WinitKeyEvent, modifiers: Modifiers) -> KeyEvent {
    let key = match &event.logical_key {
        Key::Character(text) => text.chars().next().map_or(0, u32::from),
        _ => 0,
    };

    KeyEvent {
        key,
        scancode: event.physical_key.to_scancode().unwrap_or(0),
        action: action(event.state, event.repeat),
        modifiers,
    }
}

/// Maps one winit window event onto the signals the bridge understands.
/// Close requests and modifier changes only update `input`.
pub(crate) fn window_event(event: WindowEvent, input: &mut WindowInput) -> Vec<NativeInput> {
    match event {
        WindowEvent::CloseRequested => {
            input.close_requested = true;
            Vec::new()
        }
        WindowEvent::ModifiersChanged(state) => {
            input.modifiers = modifiers(state.state());
            Vec::new()
        }
        WindowEvent::CursorMoved { position, .. } => {
            vec![NativeInput::CursorPos(Point::new(position.x, position.y))]
        }
        WindowEvent::MouseInput { state, button, .. } => {
            vec![NativeInput::MouseButton(MouseButtonEvent {
                button: mouse_button(button),
                action: action(state, false),
                modifiers: input.modifiers,
            })]
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let mut signals = vec![NativeInput::Key(key(&event, input.modifiers))];
            if event.state == ElementState::Pressed {
                let text = event.text.as_deref().unwrap_or_default();
                signals.extend(text.chars().filter(|c| !c.is_control()).map(|rune| {
                    NativeInput::Char(RuneEvent {
                        rune,
                        modifiers: input.modifiers,
                    })
                }));
            }
            signals
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (x, y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (f64::from(x), f64::from(y)),
                MouseScrollDelta::PixelDelta(position) => (position.x, position.y),
            };
            vec![NativeInput::Scroll { x, y }]
        }
        WindowEvent::DroppedFile(path) => vec![NativeInput::Drop(vec![path])],
        WindowEvent::Resized(size) => {
            vec![NativeInput::FramebufferSize(Size::new(size.width, size.height))]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_only_applies_to_presses() {
        assert_eq!(action(ElementState::Pressed, false), Action::Press);
        assert_eq!(action(ElementState::Pressed, true), Action::Repeat);
        assert_eq!(action(ElementState::Released, true), Action::Release);
    }

    #[test]
    fn test_close_request_only_sets_flag() {
        let mut input = WindowInput::default();

        let signals = window_event(WindowEvent::CloseRequested, &mut input);

        assert!(signals.is_empty());
        assert!(input.close_requested);
    }

    #[test]
    fn test_resize_becomes_framebuffer_signal() {
        let mut input = WindowInput::default();

        let signals = window_event(
            WindowEvent::Resized(winit::dpi::PhysicalSize::new(640, 480)),
            &mut input,
        );

        assert_eq!(signals, vec![NativeInput::FramebufferSize(Size::new(640, 480))]);
    }

    #[test]
    fn test_extra_mouse_buttons_map_to_other() {
        assert_eq!(mouse_button(winit::event::MouseButton::Back), MouseButton::Other(3));
        assert_eq!(mouse_button(winit::event::MouseButton::Other(9)), MouseButton::Other(9));
        assert_eq!(mouse_button(winit::event::MouseButton::Left), MouseButton::Left);
    }

    #[test]
    fn test_modifier_state_is_copied() {
        let state = ModifiersState::SHIFT | ModifiersState::SUPER;

        let mapped = modifiers(state);

        assert!(mapped.shift && mapped.super_key);
        assert!(!mapped.control && !mapped.alt);
    }
}
