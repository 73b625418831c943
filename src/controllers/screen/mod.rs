//! Per-window record and the two pumps that serve it.
//!
//! Every window gets two dedicated threads:
//! - **Event pump**: drains the UI-event queue and is the only code that
//!   mutates the widget tree.
//! - **Render pump**: owns the graphics context, drains the render queue and
//!   drops paint requests that have gone stale.
//!
//! The two queues are independent; nothing orders an event on one against an
//! event on the other.

mod close_notifier;
mod event_pump;
mod input_state;
pub mod ports;
mod render_pump;
mod record;
mod stats;

pub use event_pump::EventPump;
pub use input_state::InputState;
pub use ports::WidgetTree;
pub use render_pump::RenderPump;
pub use record::{ScreenHandle, SharedTree};
pub use stats::{RenderStats, RenderStatsSnapshot};

pub(crate) use close_notifier::{CloseNotifier, PumpNotice};
pub(crate) use record::Screen;
