use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, Terminal};
use std::io;

use wrap_context::{arg_context, raw_context};

use crate::{app::App, event::EventHandler, types::Render};

fn reset() -> anyhow::Result<()> {
    arg_context!(crossterm::execute!(
        io::stderr(),
        LeaveAlternateScreen,
        DisableMouseCapture
    ))?;
    arg_context!(terminal::disable_raw_mode())?;
    anyhow::Ok(())
}

#[derive(Debug)]
pub struct Tui<B: Backend> {
    terminal: Terminal<B>,
    pub events: EventHandler,
}

impl<B: Backend> Tui<B> {
    pub fn new(terminal: Terminal<B>, events: EventHandler) -> Self {
        Self { terminal, events }
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        arg_context!(crossterm::execute!(
            io::stderr(),
            EnterAlternateScreen,
            EnableMouseCapture
        ))?;
        arg_context!(terminal::enable_raw_mode())?;

        let panic_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = reset();
            panic_hook(panic_info);
        }));

        arg_context!(self.terminal.hide_cursor())?;
        arg_context!(self.terminal.clear())?;

        anyhow::Ok(())
    }

    pub fn draw(&mut self, app: &mut App) -> anyhow::Result<()> {
        raw_context!(self.terminal.draw(|frame| app.render(frame)))?;
        anyhow::Ok(())
    }

    pub fn exit(&mut self) -> anyhow::Result<()> {
        self.events.stop();
        arg_context!(reset())?;
        arg_context!(self.terminal.show_cursor())?;
        anyhow::Ok(())
    }
}
