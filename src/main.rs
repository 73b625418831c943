use std::time::Duration;

use screen_pump::adapters::headless::{HeadlessControl, HeadlessPlatform};
use screen_pump::controllers::screen::ScreenHandle;
use screen_pump::core::events::{Action, Modifiers, MouseButton, MouseButtonEvent, RuneEvent};
use screen_pump::presenters::TileBoard;
use screen_pump::{App, AppError, NativeInput, Point, PumpConfig, Size, WindowHints};
use tracing_subscriber::EnvFilter;

const BOARD_SIZE: Size = Size::new(320, 240);
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Clicks a tile, is refused a close because the board is not empty, clears
/// the board and closes for real.
fn script(control: &HeadlessControl, screen: &ScreenHandle) {
    let window = screen.id();
    let click = MouseButtonEvent {
        button: MouseButton::Left,
        action: Action::Press,
        modifiers: Modifiers::NONE,
    };

    control.inject(window, NativeInput::CursorPos(Point::new(41.0, 32.0)));
    control.inject(window, NativeInput::MouseButton(click));
    control.wait_until(SCRIPT_TIMEOUT, |_| screen.stats().frames_drawn >= 2);

    control.request_close(window);
    control.wait_until(SCRIPT_TIMEOUT, |c| !c.has_close_request(window));
    tracing::info!(%window, open = control.is_open(window), "close refused while tiles are lit");

    control.inject(
        window,
        NativeInput::Char(RuneEvent {
            rune: 'c',
            modifiers: Modifiers::NONE,
        }),
    );
    control.wait_until(SCRIPT_TIMEOUT, |_| screen.pending_events() == 0);
    control.request_close(window);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A second `main` in the same process keeps the first subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let platform = HeadlessPlatform::new();
    let control = platform.control();
    let (result_tx, result_rx) = crossbeam_channel::bounded::<Result<(), AppError>>(1);

    screen_pump::main(platform, move |dispatcher| {
        let mut app = App::new(dispatcher, PumpConfig::default());
        let screen = app.new_screen(
            WindowHints::new("tiles", BOARD_SIZE),
            TileBoard::new(8, 6, BOARD_SIZE),
        );

        let driver = {
            let control = control.clone();
            let screen = screen.clone();
            std::thread::spawn(move || script(&control, &screen))
        };

        result_tx.send(app.run()).ok();
        if driver.join().is_err() {
            tracing::warn!("script thread panicked");
        }

        let stats = screen.stats();
        tracing::info!(
            drawn = stats.frames_drawn,
            dropped = stats.frames_dropped,
            "board closed"
        );
    });

    result_rx.recv()??;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_returns_ok() {
        let result = main();

        assert!(result.is_ok());
    }
}
