use std::time::Duration;

use crate::core::data::point::Point;

const DEFAULT_RENDER_STALENESS: Duration = Duration::from_millis(5);
const DEFAULT_CURSOR_OFFSET: Point = Point::new(-1.0, -2.0);
const DEFAULT_THREAD_NAME_PREFIX: &str = "screen";

/// Tunables shared by every screen an [`App`](crate::App) creates.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpConfig {
    /// Render tasks older than this when dequeued are dropped undrawn.
    pub render_staleness: Duration,
    /// Added to every native cursor position before it reaches the event pump.
    pub cursor_offset: Point,
    pub thread_name_prefix: String,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            render_staleness: DEFAULT_RENDER_STALENESS,
            cursor_offset: DEFAULT_CURSOR_OFFSET,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_owned(),
        }
    }
}

impl PumpConfig {
    #[must_use]
    pub fn with_render_staleness(mut self, staleness: Duration) -> Self {
        self.render_staleness = staleness;
        self
    }

    #[must_use]
    pub fn with_cursor_offset(mut self, offset: Point) -> Self {
        self.cursor_offset = offset;
        self
    }

    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub(crate) fn thread_name(&self, window: u64, role: &str) -> String {
        format!("{}-{}-{}", self.thread_name_prefix, window, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PumpConfig::default();

        assert_eq!(config.render_staleness, Duration::from_millis(5));
        assert_eq!(config.cursor_offset, Point::new(-1.0, -2.0));
        assert_eq!(config.thread_name(3, "render"), "screen-3-render");
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = PumpConfig::default()
            .with_render_staleness(Duration::from_millis(16))
            .with_cursor_offset(Point::default())
            .with_thread_name_prefix("demo");

        assert_eq!(config.render_staleness, Duration::from_millis(16));
        assert_eq!(config.cursor_offset, Point::new(0.0, 0.0));
        assert_eq!(config.thread_name(1, "events"), "demo-1-events");
    }
}
