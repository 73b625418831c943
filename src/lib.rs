//! Per-window threading core for a desktop UI toolkit.
//!
//! Every native call runs on the one thread the process started on, reached
//! through a [`Dispatcher`]. Each window then gets an event pump thread that
//! drives its widget tree and a render pump thread that owns its graphics
//! context. The [`App`] run loop waits on native input, forwards close
//! requests and tears windows down once their event pump lets go.

pub mod adapters;
pub mod controllers;
pub mod core;
pub mod presenters;

pub use crate::controllers::app::{
    App, AppError, MainContext, NativeInput, NativePlatform, PlatformError, Registry, main,
};
pub use crate::controllers::screen::{RenderStatsSnapshot, ScreenHandle, WidgetTree};
pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::config::{PumpConfig, WindowHints};
pub use crate::core::data::{Point, Size, WidgetId, WindowId};
pub use crate::core::dispatch::{Dispatcher, Waker};
pub use crate::core::events::Event;
pub use crate::core::graphics::{ContextError, GraphicsContext, Surface};
pub use crate::core::queue::BlockingDeque;
