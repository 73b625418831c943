pub mod ids;
pub mod point;
pub mod size;

pub use ids::{WidgetId, WindowId};
pub use point::Point;
pub use size::Size;
