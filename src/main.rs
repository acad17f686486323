use color_eyre::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tasker_tui::{
    api::ApiClient,
    app::{App, Command},
    config::Config,
    events::{Event, EventHandler},
    location, logging,
    session::{Session, SessionStore},
    ui,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

const SESSION_DB: &str = "session.db";

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    install_panic_hook();
    color_eyre::install()?;

    let config = Config::load();
    let store = SessionStore::open(SESSION_DB)
        .map_err(|e| color_eyre::eyre::eyre!("session store: {}", e))?;
    let session = Session::load(&store)
        .map_err(|e| color_eyre::eyre::eyre!("session load: {}", e))?;
    info!(signed_in = session.is_signed_in(), "Session hydrated");

    let api = ApiClient::new(
        &config.api.base_url,
        config.api.timeout_seconds,
        session.token.clone(),
    )
    .map_err(|e| color_eyre::eyre::eyre!("api client: {}", e))?;

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut event_handler = EventHandler::new(config.ui.tick_rate_ms);

    // One-shot geolocation; the app searches with or without the result.
    let location_config = config.location.clone();
    let location_tx = event_handler.tx.clone();
    tokio::spawn(async move {
        let resolved = location::resolve(&location_config).await;
        let _ = location_tx.send(Event::LocationResolved(resolved));
    });

    let mut app = App::new(config, session);

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(event) = event_handler.next().await {
            match event {
                Event::Tick => app.on_tick(),
                Event::Input(key) => app.handle_key(key),
                Event::LocationResolved(resolved) => app.set_location(resolved),
                Event::SearchCompleted { seq, result } => app.apply_search_result(seq, result),
                Event::FavoriteCompleted {
                    provider_id,
                    add,
                    result,
                } => app.apply_favorite_result(&provider_id, add, result),
                Event::PreviousBookingLoaded {
                    provider_id,
                    result,
                } => app.apply_previous_booking(&provider_id, result),
                Event::RebookCompleted { result } => app.apply_rebook_result(result),
            }
        }

        // The app queues side effects; the loop owns the I/O.
        for command in app.take_commands() {
            dispatch(command, &api, &event_handler.tx, &store);
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Executes one queued command: network work is spawned and reports back
/// through the event channel, session wipes happen inline.
fn dispatch(command: Command, api: &ApiClient, tx: &UnboundedSender<Event>, store: &SessionStore) {
    match command {
        Command::Search { seq, request } => {
            let api = api.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = api.search(&request).await;
                let _ = tx.send(Event::SearchCompleted { seq, result });
            });
        }
        Command::Favorite { provider_id, add } => {
            let api = api.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = if add {
                    api.add_favorite(&provider_id).await
                } else {
                    api.remove_favorite(&provider_id).await
                };
                let _ = tx.send(Event::FavoriteCompleted {
                    provider_id,
                    add,
                    result,
                });
            });
        }
        Command::LoadPreviousBooking { provider_id } => {
            let api = api.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = api.previous_booking(&provider_id).await;
                let _ = tx.send(Event::PreviousBookingLoaded {
                    provider_id,
                    result,
                });
            });
        }
        Command::SubmitRebook { request } => {
            let api = api.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let result = api.quick_rebook(&request).await;
                let _ = tx.send(Event::RebookCompleted { result });
            });
        }
        Command::ClearSession => {
            if let Err(e) = store.wipe() {
                error!("Failed to clear stored session: {}", e);
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )
        .ok();
        original_hook(panic_info);
    }));
}
