pub mod graphics_context;

pub use graphics_context::{ContextError, GraphicsContext, Surface};
