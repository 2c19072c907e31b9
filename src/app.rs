use ratatui::{
    backend::Backend,
    layout::{Alignment, Position, Rect, Size},
    style::{Style, Stylize},
    Frame,
};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use wrap_context::{arg_context, raw_context};

use crate::{
    event::Event,
    form_model::{FormKey, FormStatus, Payload, StatusKind},
    handler::{handle_key_events, handle_mouse_events},
    markup::{NavigationMarkup, SiteMarkup},
    navigation_model::{report_load_error, NavigationModel},
    outside_pointer::{OutsidePointerRegistry, SharedRegistry},
    page_model::{PageEvent, PageModel},
    page_view::PageView,
    preferences::Preferences,
    submit::post_json,
    textline_model::TextLineModel,
    textline_view::TextLineView,
    tui::Tui,
    types::{FocusDirection, Render, ViewModel},
    utils::MUTED,
};

pub const SUCCESS_PAGE: &str = "contact_success";
pub const SUCCESS_MESSAGE: &str = "Thanks! We've received your request.";

const HINTS: &str = " Tab/Shift-Tab move · ↑↓ pick · Enter submit · Ctrl-C quit ";

#[derive(Debug)]
pub struct App<'a> {
    running: bool,
    site: SiteMarkup,
    endpoint: Option<String>,
    registry: SharedRegistry,
    preferences: Preferences,
    terminal_size: Size,
    navigation: Option<NavigationMarkup>,
    client: reqwest::Client,
    sender: mpsc::UnboundedSender<Event>,

    page: ViewModel<PageView<'a>, PageModel>,
    hint_textline: ViewModel<TextLineView<'a>, TextLineModel>,
}

impl<'a> App<'a> {
    pub fn new(
        terminal_size: Size,
        site: SiteMarkup,
        page: &str,
        endpoint: Option<String>,
        preferences: Preferences,
        sender: mpsc::UnboundedSender<Event>,
    ) -> anyhow::Result<Self> {
        let hint_textline = ViewModel::default().model_set(
            TextLineModel::default()
                .hide_spans_set(vec![(HINTS.to_string(), Style::default())])
                .style_set(Style::default().bg(MUTED))
                .alignment_set(Alignment::Center),
        );

        let mut app = Self {
            running: true,
            site,
            endpoint,
            registry: OutsidePointerRegistry::shared(),
            preferences,
            terminal_size,
            navigation: None,
            client: reqwest::Client::new(),
            sender,
            page: ViewModel::default(),
            hint_textline,
        };

        arg_context!(app.switch_page(page))?;
        app.set_terminal_size(terminal_size);

        anyhow::Ok(app)
    }

    pub async fn run<B: Backend>(&mut self, tui: &mut Tui<B>) -> anyhow::Result<()> {
        let mut draw = true;

        while self.running {
            if draw {
                arg_context!(tui.draw(self))?;
                draw = false;
            }

            let event = arg_context!(tui.events.next().await)?;

            match event {
                Event::Tick => draw = self.tick(Instant::now()),
                Event::Key(key_event) => {
                    arg_context!(handle_key_events(key_event, self))?;
                    draw = true;
                }
                Event::Mouse(mouse_event) => {
                    draw = arg_context!(handle_mouse_events(mouse_event, self))?;
                }
                Event::Resize(width, height) => {
                    self.set_terminal_size(Size::new(width, height));
                    draw = true;
                }
                Event::NavigationLoaded(result) => {
                    self.navigation_loaded(result);
                    draw = true;
                }
                Event::Submitted(result) => {
                    raw_context!(self.submitted(result))?;
                    draw = true;
                }
            }
        }

        anyhow::Ok(())
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.page.with_model_mut(|model| model.tick(now))
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn page_model(&self) -> &PageModel {
        self.page.model()
    }

    // Pages

    /// Replaces the current page; its widgets unsubscribe from the registry as
    /// they are dropped
    pub fn switch_page(&mut self, name: &str) -> anyhow::Result<()> {
        let markup = arg_context!(self.site.page(name))?;

        let mut model = arg_context!(PageModel::from_markup(
            name,
            markup,
            self.endpoint.as_deref(),
            &self.registry,
            &self.preferences
        ))?;

        model.navigation_update(
            self.navigation
                .clone()
                .map(|navigation| NavigationModel::new(navigation, name)),
        );

        self.page = std::mem::take(&mut self.page).model_set(model);
        self.relayout();

        info!(page = %name, "page shown");
        anyhow::Ok(())
    }

    pub fn set_terminal_size(&mut self, terminal_size: Size) {
        self.terminal_size = terminal_size;
        self.relayout();
    }

    fn relayout(&mut self) {
        let terminal_area = Rect::new(0, 0, self.terminal_size.width, self.terminal_size.height);
        let page_area = Rect::new(0, 0, terminal_area.width, terminal_area.height.saturating_sub(1));
        let hint_area = Rect::new(0, page_area.bottom(), terminal_area.width, terminal_area.height.min(1));

        let mode = self.preferences.layout_mode(terminal_area.width);
        let content_width = self.preferences.apply_term_width(terminal_area.width);

        self.page.with_model_mut(|model| {
            model.area_update(page_area, mode, content_width);
        });

        self.hint_textline.with_model_mut(|model| {
            model.area_update(hint_area);
        });
    }

    pub fn navigation_loaded(&mut self, result: anyhow::Result<NavigationMarkup>) {
        match result {
            Ok(navigation) => {
                let page = self.page.model().name().clone();
                self.navigation = Some(navigation.clone());

                self.page.with_model_mut(|model| {
                    model.navigation_update(Some(NavigationModel::new(navigation, page)));
                });
                self.relayout();
            }
            Err(err) => report_load_error(&err),
        }
    }

    // Input

    pub fn focus_move(&mut self, direction: FocusDirection) {
        self.page.with_model_mut(|model| model.focus_move(direction));
    }

    pub fn key(&mut self, key: FormKey) -> anyhow::Result<()> {
        let event = self.page.with_model_mut(|model| model.key(key));
        raw_context!(self.page_event(event))?;
        anyhow::Ok(())
    }

    pub fn pointer_down(&mut self, position: Position) -> anyhow::Result<()> {
        let event = self.page.with_model_mut(|model| model.pointer_down(position));
        raw_context!(self.page_event(event))?;
        anyhow::Ok(())
    }

    pub fn pointer_move(&mut self, position: Position) -> bool {
        self.page
            .with_model_mut(|model| model.pointer_move(position, Instant::now()))
    }

    fn page_event(&mut self, event: Option<PageEvent>) -> anyhow::Result<()> {
        match event {
            Some(PageEvent::Navigate(page)) => {
                arg_context!(self.switch_page(&page))?;
            }
            Some(PageEvent::Submit { endpoint, payload }) => self.spawn_submit(endpoint, payload),
            None => {}
        }

        anyhow::Ok(())
    }

    // Submission

    fn spawn_submit(&self, endpoint: String, payload: Payload) {
        let client = self.client.clone();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let result = post_json(&client, &endpoint, &payload).await;
            if sender.send(Event::Submitted(result)).is_err() {
                warn!("submission settled after the UI stopped");
            }
        });
    }

    pub fn submitted(&mut self, result: anyhow::Result<()>) -> anyhow::Result<()> {
        let succeeded = result.is_ok();
        if let Err(err) = &result {
            error!("Form submission failed: {:#}", err);
        }

        self.page.with_model_mut(|model| model.finish_submit(succeeded));

        if succeeded {
            if self.site.pages.contains_key(SUCCESS_PAGE) {
                raw_context!(self.switch_page(SUCCESS_PAGE))?;
            } else {
                self.page.with_model_mut(|model| {
                    if let Some(form) = model.form_mut() {
                        form.status_update(Some(FormStatus {
                            message: SUCCESS_MESSAGE.to_string(),
                            kind: StatusKind::Success,
                        }));
                    }
                });
            }
        }

        anyhow::Ok(())
    }
}

impl<'a> Render for App<'a> {
    fn render(&mut self, frame: &mut Frame) {
        self.page.render(frame);
        self.hint_textline.render(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::NavItemMarkup;
    use pretty_assertions::assert_eq;

    fn site() -> SiteMarkup {
        serde_json::from_str(
            r#"{
                "pages": {
                    "home": { "title": "Home" },
                    "contact": {
                        "title": "Contact",
                        "contact_form": {
                            "id": "contact-form",
                            "fields": [
                                { "type": "combobox", "label": "Industry",
                                  "container": { "data_name": "industry", "input": {},
                                                 "list": { "options": [ { "label": "Banking" } ] } } }
                            ]
                        }
                    },
                    "contact_success": { "title": "Thank you", "body": ["Thanks! We've received your request."] }
                }
            }"#,
        )
        .unwrap()
    }

    fn app() -> App<'static> {
        let (sender, _receiver) = mpsc::unbounded_channel();
        App::new(
            Size::new(120, 40),
            site(),
            "contact",
            None,
            Preferences::default(),
            sender,
        )
        .unwrap()
    }

    #[test]
    fn unknown_start_page_fails() {
        let (sender, _receiver) = mpsc::unbounded_channel();
        let app = App::new(
            Size::new(80, 24),
            site(),
            "missing",
            None,
            Preferences::default(),
            sender,
        );

        assert!(app.is_err());
    }

    #[test]
    fn switching_page_releases_form_widgets() {
        let mut app = app();
        assert_eq!(app.registry.borrow().len(), 1);

        app.switch_page("home").unwrap();
        assert_eq!(app.page_model().name(), "home");
        assert!(app.registry.borrow().is_empty());
    }

    #[test]
    fn successful_submission_shows_success_page() {
        let mut app = app();

        app.submitted(Ok(())).unwrap();
        assert_eq!(app.page_model().name(), SUCCESS_PAGE);
    }

    #[test]
    fn failed_submission_stays_on_form() {
        let mut app = app();

        app.submitted(Err(anyhow::anyhow!("Request failed: 502"))).unwrap();
        assert_eq!(app.page_model().name(), "contact");
        assert_eq!(
            app.page_model()
                .form()
                .as_ref()
                .and_then(|form| form.status().clone())
                .map(|status| status.kind),
            Some(StatusKind::Error)
        );
    }

    #[test]
    fn loaded_navigation_follows_page_switches() {
        let mut app = app();

        app.navigation_loaded(Ok(NavigationMarkup {
            items: vec![NavItemMarkup::Link {
                label: "Home".into(),
                page: "home".into(),
            }],
        }));
        assert!(app.page_model().navigation().is_some());

        app.pointer_down(Position::new(2, 0)).unwrap();
        assert_eq!(app.page_model().name(), "home");
        assert!(app
            .page_model()
            .navigation()
            .as_ref()
            .is_some_and(|navigation| navigation.is_active("home")));
    }

    #[test]
    fn failed_navigation_load_keeps_page_without_bar() {
        let mut app = app();

        app.navigation_loaded(Err(anyhow::anyhow!("missing file")));
        assert!(app.page_model().navigation().is_none());
        assert_eq!(app.page_model().nav_area().height, 0);
    }
}
