use clap::Parser;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{io::stderr, path::PathBuf, time::Duration};
use tracing::info;
use wrap_context::{arg_context, raw_context, wohyna};

use crate::{
    app::App,
    event::{Event, EventHandler},
    logging,
    markup::SiteMarkup,
    navigation_model::load_navigation,
    preferences::{Preferences, DEFAULT_FORM_WIDTH, DEFAULT_LIST_ROWS, DEFAULT_MOBILE_BREAKPOINT, DEFAULT_TICK_RATE_MS},
    tui::Tui,
    utils::DEBUG_PRINT_LIMIT,
};

/// Terminal front end for a site with a searchable-combobox contact form
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Site markup (JSON)
    #[arg(value_name = "SITE")]
    pub site: PathBuf,

    /// Navigation markup (JSON), loaded in the background
    #[arg(short, long, value_name = "FILE")]
    pub navigation: Option<PathBuf>,

    /// Page shown first
    #[arg(short, long, default_value = "contact")]
    pub page: String,

    /// Overrides the form endpoint
    #[arg(short, long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Where log records are written
    #[arg(long, value_name = "FILE", default_value = "sitedeck.log")]
    pub log_file: PathBuf,

    /// Terminals narrower than this use the mobile navigation
    #[arg(long, default_value_t = DEFAULT_MOBILE_BREAKPOINT)]
    pub mobile_breakpoint: u16,

    /// Rows of an open option list
    #[arg(long, default_value_t = DEFAULT_LIST_ROWS)]
    pub list_rows: usize,

    /// Width of the page content
    #[arg(long, default_value_t = DEFAULT_FORM_WIDTH)]
    pub form_width: u16,

    /// Tick rate in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_RATE_MS)]
    pub tick_rate: u64,

    /// Debug print limit
    #[arg(short, long, default_value = "1")]
    pub debug_print_limit: usize,
}

impl Cli {
    pub fn preferences(&self) -> anyhow::Result<Preferences> {
        let mut preferences = Preferences::default();

        arg_context!(preferences.mobile_breakpoint_update(self.mobile_breakpoint))?;
        arg_context!(preferences.list_rows_update(self.list_rows))?;
        arg_context!(preferences.form_width_update(self.form_width))?;
        arg_context!(preferences.tick_rate_update(Duration::from_millis(self.tick_rate)))?;

        anyhow::Ok(preferences)
    }
}

fn exit<B: Backend>(tui: &mut Tui<B>) {
    if let Err(err) = tui.exit() {
        eprintln!(
            "Failed to restore terminal. Run `reset` / `stty sane` or restart your terminal to recover: {}",
            err
        );
    }
}

pub async fn run(args: Cli) -> anyhow::Result<()> {
    raw_context!(DEBUG_PRINT_LIMIT
        .set(args.debug_print_limit)
        .map_err(|err| wohyna!("Second initialization with value: {:?}", err)))?;

    arg_context!(logging::init(&args.log_file))?;

    let preferences = arg_context!(args.preferences())?;
    let site = arg_context!(SiteMarkup::from_file(&args.site))?;

    let backend = CrosstermBackend::new(stderr());
    let terminal = raw_context!(Terminal::new(backend))?;
    let terminal_size = arg_context!(terminal.size())?;
    let events = EventHandler::new(preferences.tick_rate());
    let sender = events.sender();

    let mut tui = Tui::new(terminal, events);
    arg_context!(tui.init()).map_err(|err| {
        exit(&mut tui);
        err
    })?;

    let mut app = raw_context!(App::new(
        terminal_size,
        site,
        &args.page,
        args.endpoint.clone(),
        preferences,
        sender.clone()
    ))
    .map_err(|err| {
        exit(&mut tui);
        err
    })?;

    if let Some(path) = args.navigation.clone() {
        tokio::spawn(async move {
            let result = load_navigation(&path).await;
            let _ = sender.send(Event::NavigationLoaded(result));
        });
    }

    info!(site = %args.site.display(), page = %args.page, "started");

    arg_context!(app.run(&mut tui).await).map_err(|err| {
        exit(&mut tui);
        err
    })?;

    exit(&mut tui);

    anyhow::Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["sitedeck", "site.json"]);

        assert_eq!(cli.page, "contact");
        assert_eq!(cli.log_file, PathBuf::from("sitedeck.log"));
        assert_eq!(cli.navigation, None);
        assert_eq!(cli.preferences().unwrap().list_rows(), DEFAULT_LIST_ROWS);
    }

    #[test]
    fn invalid_preferences_are_reported() {
        let cli = Cli::parse_from(["sitedeck", "site.json", "--form-width", "5"]);

        assert!(cli.preferences().is_err());
    }
}
