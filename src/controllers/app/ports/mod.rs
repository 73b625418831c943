//! Port definitions for the application controller.

pub mod native_platform;

pub use native_platform::{NativeInput, NativePlatform};
