use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("window creation failed: {0}")]
    WindowCreation(String),

    #[error("native event loop failed: {0}")]
    EventLoop(String),

    #[error("native platform already terminated")]
    Terminated,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
}
