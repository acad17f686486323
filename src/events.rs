//! Event types and the main event loop driver.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, and the
//! completions of async network work) and the [`EventHandler`], which runs a
//! background task that polls crossterm for key events and emits periodic
//! [`Event::Tick`]s. The main loop in `main.rs` receives events via
//! [`EventHandler::next`]; network tasks send their completions via a clone
//! of [`EventHandler::tx`]. Everything that mutates [`App`](crate::app::App)
//! state flows through this one channel, which is what keeps the client
//! single-threaded from the state's point of view.

use crate::error::ApiError;
use crate::models::{Coordinate, PreviousBooking, SearchResponse};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for UI refresh and notification expiry.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// Startup geolocation finished. `None` means unavailable/denied, which
    /// degrades distance semantics but never blocks the page.
    LocationResolved(Option<Coordinate>),
    /// A provider search came back. `seq` is the sequence number the app
    /// stamped on the request; stale completions are discarded by the app.
    SearchCompleted {
        seq: u64,
        result: Result<SearchResponse, ApiError>,
    },
    /// A favorite add/remove finished. Carries enough identity to revert
    /// the optimistic flip on failure.
    FavoriteCompleted {
        provider_id: String,
        add: bool,
        result: Result<(), ApiError>,
    },
    /// Previous-booking lookup for the rebook modal finished.
    PreviousBookingLoaded {
        provider_id: String,
        result: Result<Option<PreviousBooking>, ApiError>,
    },
    /// Rebook submission finished.
    RebookCompleted { result: Result<(), ApiError> },
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to network tasks, while the receiver is consumed by
/// [`next`](EventHandler::next) in the main loop. A background task polls
/// crossterm with a timeout and sends [`Event::Input`] on key press and
/// [`Event::Tick`] at the configured interval.
pub struct EventHandler {
    /// Sender for posting events from spawned tasks.
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The spawned task runs until the process exits. It polls crossterm
    /// with a timeout of `tick_rate_ms`; when a key is pressed it sends
    /// [`Event::Input`], and when the tick interval elapses it sends
    /// [`Event::Tick`].
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                if event::poll(timeout).expect("Poll failed") {
                    if let CrosstermEvent::Key(key) = event::read().expect("Read failed") {
                        event_tx.send(Event::Input(key)).ok();
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    event_tx.send(Event::Tick).ok();
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel. Returns `None` only when
    /// all senders have been dropped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
