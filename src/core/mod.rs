pub mod clock;
pub mod config;
pub mod data;
pub mod dispatch;
pub mod events;
pub mod graphics;
pub mod queue;
