//! Desktop native layer: winit windows and event loop, `pixels` surfaces.

mod context;
mod platform;
mod translate;

pub use context::WinitContext;
pub use platform::WinitPlatform;
