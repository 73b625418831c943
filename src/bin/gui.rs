use screen_pump::adapters::winit::WinitPlatform;
use screen_pump::presenters::TileBoard;
use screen_pump::{App, PumpConfig, Size, WindowHints};
use tracing_subscriber::EnvFilter;

const BOARD_SIZE: Size = Size::new(800, 600);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let platform = WinitPlatform::new()?;

    screen_pump::main(platform, |dispatcher| {
        let mut app = App::new(dispatcher, PumpConfig::default());

        let screen = app.new_screen(
            WindowHints::new("Tiles", BOARD_SIZE),
            TileBoard::new(16, 12, BOARD_SIZE),
        );
        screen.set_resize_event_callback(|size: Size| {
            tracing::debug!(width = size.width, height = size.height, "resized");
            false
        });

        if let Err(e) = app.run() {
            tracing::error!("{e}");
        }
    });

    Ok(())
}
