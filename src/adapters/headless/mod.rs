//! Display-less native layer. Drives the default binary and the test-suite.

mod context;
mod platform;

pub use context::{ContextJournal, HeadlessContext};
pub use platform::{HeadlessControl, HeadlessPlatform};
