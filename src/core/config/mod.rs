pub mod pump_config;
pub mod window_hints;

pub use pump_config::PumpConfig;
pub use window_hints::WindowHints;
