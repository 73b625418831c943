pub mod event;
pub mod input;

pub use event::{DrawFn, Event, EventKind, RawClosure, RenderTask};
pub use input::{
    Action, DropEvent, KeyEvent, Modifiers, MouseButton, MouseButtonEvent, MouseMoveEvent,
    RuneEvent, ScrollEvent,
};
