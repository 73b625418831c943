//! Payloads carried by input events.

use std::path::PathBuf;

use crate::core::data::point::Point;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        super_key: false,
    };

    #[must_use]
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.super_key
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseMoveEvent {
    pub position: Point,
    /// Motion since the previous cursor event of the same window.
    pub delta: Point,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub action: Action,
    pub modifiers: Modifiers,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: u32,
    pub scancode: u32,
    pub action: Action,
    pub modifiers: Modifiers,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RuneEvent {
    pub rune: char,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollEvent {
    pub x: f64,
    pub y: f64,
}
