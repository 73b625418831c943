use crate::core::data::size::Size;

const DEFAULT_TITLE: &str = "screen";
const DEFAULT_SIZE: Size = Size::new(800, 600);

/// Creation parameters handed to the native layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHints {
    pub title: String,
    pub size: Size,
    /// Multisample count; 0 disables multisampling.
    pub samples: u8,
    pub resizable: bool,
    pub fullscreen: bool,
}

impl Default for WindowHints {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            size: DEFAULT_SIZE,
            samples: 4,
            resizable: true,
            fullscreen: false,
        }
    }
}

impl WindowHints {
    #[must_use]
    pub fn new(title: impl Into<String>, size: Size) -> Self {
        Self {
            title: title.into(),
            size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_samples(mut self, samples: u8) -> Self {
        self.samples = samples;
        self
    }

    #[must_use]
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }
}
