mod app;
mod clipboard;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use bedrock_chat_core::{ChatClient, ChatController, Config};
use tracing::{info, warn};

use crate::app::App;
use crate::clipboard::SystemClipboard;
use crate::tui::EventHandler;

#[tokio::main]
async fn main() -> Result<()> {
    // A broken config file should not keep the client from starting
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    // Without a writable log file the client still runs, just unlogged
    logging::init_or_report(&config);
    if let Some(err) = config_error {
        warn!(error = %err, "could not load config, using defaults");
    }

    let client = ChatClient::with_timeout(&config.base_url(), config.request_timeout())?;
    info!(base_url = client.base_url(), "starting bedrock chat");
    let controller = ChatController::new(config.display_mode());
    let mut app = App::new(client, controller, Box::new(SystemClipboard::new()));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Some(task) = app.in_flight.take() {
        task.abort();
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(tui::TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event).await?;
        app.poll_round_trip().await;
    }

    Ok(())
}
