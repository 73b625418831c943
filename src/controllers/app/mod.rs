//! Application controller: the bound-thread context, the window registry and
//! the run loop that tears screens down once their event pump lets go.

mod bridge;
mod errors;
mod lifecycle;
mod main_context;
pub mod ports;
mod registry;

pub use errors::{AppError, PlatformError};
pub use lifecycle::{App, main};
pub use main_context::MainContext;
pub use ports::{NativeInput, NativePlatform};
pub use registry::Registry;
