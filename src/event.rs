use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use wrap_context::arg_context;

use crate::markup::NavigationMarkup;

#[derive(Debug)]
pub enum Event {
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// The navigation file finished loading in the background
    NavigationLoaded(anyhow::Result<NavigationMarkup>),
    /// The in-flight form submission settled
    Submitted(anyhow::Result<()>),
}

/// Terminal events plus a tick, merged with results of spawned tasks
#[derive(Debug)]
pub struct EventHandler {
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
    handler: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let event_sender = sender.clone();

        let handler = tokio::spawn(async move {
            let mut reader = EventStream::new();
            let mut tick = tokio::time::interval(tick_rate);

            loop {
                let tick_delay = tick.tick();
                let crossterm_event = reader.next().fuse();

                let event = tokio::select! {
                    _ = event_sender.closed() => break,
                    _ = tick_delay => Event::Tick,
                    Some(Ok(event)) = crossterm_event => match event {
                        // Release and repeat events are reported on some platforms
                        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
                        CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
                        CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
                        _ => continue,
                    },
                };

                if event_sender.send(event).is_err() {
                    break;
                }
            }
        });

        Self {
            sender,
            receiver,
            handler,
        }
    }

    /// For background tasks reporting back to the UI loop
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }

    pub async fn next(&mut self) -> anyhow::Result<Event> {
        let event = arg_context!(self.receiver.recv().await)?;
        anyhow::Ok(event)
    }

    pub fn stop(&self) {
        self.handler.abort();
    }
}
