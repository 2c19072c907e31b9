use impl_helper::ImplHelper;
use itertools::Itertools;
use ratatui::layout::{Position, Rect};
use std::time::Instant;
use tracing::debug;
use wrap_context::arg_context;

use crate::{
    form_model::{FormKey, FormModel, Payload, SubmitOutcome},
    markup::PageMarkup,
    navigation_model::{LayoutMode, NavigationModel},
    outside_pointer::SharedRegistry,
    preferences::Preferences,
    types::FocusDirection,
    utils::split_top,
};

/// What the application has to do after the page handled an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Navigate(String),
    Submit { endpoint: String, payload: Payload },
}

#[derive(Debug, Default, ImplHelper)]
pub struct PageModel {
    #[helper(get)]
    name: String,

    #[helper(get)]
    title: String,

    #[helper(get)]
    body: Vec<String>,

    #[helper(get, get_mut)]
    navigation: Option<NavigationModel>,

    #[helper(get, get_mut)]
    form: Option<FormModel>,

    registry: SharedRegistry,

    #[helper(copy)]
    mode: LayoutMode,

    #[helper(copy)]
    area: Rect,

    #[helper(copy)]
    nav_area: Rect,

    #[helper(copy)]
    title_area: Rect,

    #[helper(copy)]
    body_area: Rect,

    #[helper(copy)]
    form_area: Rect,

    content_width: u16,
}

/// Rows `lines` take once wrapped at `width`
pub fn wrapped_height(lines: &[String], width: u16) -> u16 {
    let width = usize::from(width.max(1));

    let rows: usize = lines
        .iter()
        .map(|line| line.chars().count().div_ceil(width).max(1))
        .sum();

    u16::try_from(rows).unwrap_or(u16::MAX)
}

impl PageModel {
    pub fn from_markup(
        name: &str,
        markup: &PageMarkup,
        endpoint_override: Option<&str>,
        registry: &SharedRegistry,
        preferences: &Preferences,
    ) -> anyhow::Result<Self> {
        let form = match &markup.contact_form {
            Some(form) => Some(arg_context!(FormModel::from_markup(
                form,
                endpoint_override,
                registry,
                preferences.list_rows()
            ))?),
            None => None,
        };

        anyhow::Ok(Self {
            name: name.to_string(),
            title: markup.title.clone(),
            body: markup.body.clone(),
            navigation: None,
            form,
            registry: registry.clone(),
            ..Self::default()
        })
    }

    pub fn navigation_update(&mut self, navigation: Option<NavigationModel>) -> &mut Self {
        self.navigation = navigation;
        self.layout();
        self
    }

    pub fn area_update(&mut self, area: Rect, mode: LayoutMode, content_width: u16) -> &mut Self {
        self.area = area;
        self.mode = mode;
        self.content_width = content_width;
        self.layout();
        self
    }

    fn layout(&mut self) {
        let nav_height = if self.navigation.is_some() { 1 } else { 0 };
        let (nav_area, rest) = split_top(&self.area, nav_height);

        let width = self.content_width.min(rest.width);
        let content = Rect::new(
            rest.x + (rest.width - width) / 2,
            rest.y,
            width,
            rest.height,
        );

        let (_, content) = split_top(&content, 1);
        let (title_area, content) = split_top(&content, 1);
        let (_, content) = split_top(&content, 1);
        let (body_area, content) = split_top(&content, wrapped_height(&self.body, width));
        let (_, form_area) = split_top(&content, if self.body.is_empty() { 0 } else { 1 });

        self.nav_area = nav_area;
        self.title_area = title_area;
        self.body_area = body_area;
        self.form_area = form_area;

        let (area, mode) = (self.area, self.mode);
        if let Some(navigation) = &mut self.navigation {
            navigation.area_update(nav_area, area, mode);
        }

        if let Some(form) = &mut self.form {
            form.area_update(form_area);
        }
    }

    // Input

    pub fn focus_move(&mut self, direction: FocusDirection) {
        if let Some(form) = &mut self.form {
            form.focus_move(direction);
        }
    }

    pub fn key(&mut self, key: FormKey) -> Option<PageEvent> {
        let form = self.form.as_mut()?;
        let outcome = form.key(key)?;
        Self::submit_event(form, outcome)
    }

    /// The widget under the pointer handles the press first, then every
    /// combobox the press landed outside of is closed
    pub fn pointer_down(&mut self, position: Position) -> Option<PageEvent> {
        let mut event = None;

        let (page, consumed) = match &mut self.navigation {
            Some(navigation) => navigation.pointer_down(position),
            None => (None, false),
        };

        if let Some(page) = page {
            event = Some(PageEvent::Navigate(page));
        } else if !consumed {
            if let Some(form) = &mut self.form {
                if let Some(outcome) = form.pointer_down(position) {
                    event = Self::submit_event(form, outcome);
                }
            }
        }

        let outside = self.registry.borrow().outside(position);
        if let Some(form) = &mut self.form {
            form.close_outside(&outside);
        }

        event
    }

    pub fn pointer_move(&mut self, position: Position, now: Instant) -> bool {
        let mut changed = false;

        if let Some(navigation) = &mut self.navigation {
            changed |= navigation.pointer_move(position, now);
        }

        let over_menu = self
            .navigation
            .as_ref()
            .and_then(|navigation| navigation.hit(position))
            .is_some();

        if !over_menu {
            if let Some(form) = &mut self.form {
                form.pointer_move(position);
                changed = true;
            }
        }

        changed
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.navigation
            .as_mut()
            .is_some_and(|navigation| navigation.tick(now))
    }

    pub fn finish_submit(&mut self, succeeded: bool) {
        if let Some(form) = &mut self.form {
            form.finish_submit(succeeded);
        }
    }

    fn submit_event(form: &FormModel, outcome: SubmitOutcome) -> Option<PageEvent> {
        match outcome {
            SubmitOutcome::Post(payload) => Some(PageEvent::Submit {
                endpoint: form.endpoint().clone(),
                payload,
            }),
            outcome => {
                debug!(?outcome, "form submit handled locally");
                None
            }
        }
    }

    pub fn body_lines(&self) -> Vec<&str> {
        self.body.iter().map(String::as_str).collect_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        markup::{NavItemMarkup, NavigationMarkup, SiteMarkup},
        outside_pointer::OutsidePointerRegistry,
    };
    use pretty_assertions::assert_eq;

    fn site() -> SiteMarkup {
        serde_json::from_str(
            r#"{
                "pages": {
                    "home": { "title": "Home", "body": ["Welcome."] },
                    "contact": {
                        "title": "Contact us",
                        "body": ["Tell us about yourself."],
                        "contact_form": {
                            "id": "contact-form",
                            "fields": [
                                { "type": "combobox", "label": "Industry",
                                  "container": { "data_name": "industry", "input": {},
                                                 "list": { "options": [ { "label": "Banking" }, { "label": "Retail" } ] } } },
                                { "type": "text", "name": "company_name", "label": "Company" }
                            ]
                        }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    fn navigation() -> NavigationModel {
        NavigationModel::new(
            NavigationMarkup {
                items: vec![NavItemMarkup::Link {
                    label: "Home".into(),
                    page: "home".into(),
                }],
            },
            "contact",
        )
    }

    fn contact_page(registry: &SharedRegistry) -> PageModel {
        let site = site();
        let mut page = PageModel::from_markup(
            "contact",
            site.page("contact").unwrap(),
            None,
            registry,
            &Preferences::default(),
        )
        .unwrap();
        page.area_update(Rect::new(0, 0, 120, 40), LayoutMode::Desktop, 60);
        page
    }

    #[test]
    fn lays_out_centered_content() {
        let registry = OutsidePointerRegistry::shared();
        let mut page = contact_page(&registry);

        assert_eq!(page.nav_area(), Rect::new(0, 0, 120, 0));
        assert_eq!(page.title_area(), Rect::new(30, 1, 60, 1));
        assert_eq!(page.body_area(), Rect::new(30, 3, 60, 1));
        assert_eq!(page.form_area(), Rect::new(30, 5, 60, 35));

        page.navigation_update(Some(navigation()));
        assert_eq!(page.nav_area(), Rect::new(0, 0, 120, 1));
        assert_eq!(page.title_area(), Rect::new(30, 2, 60, 1));
    }

    #[test]
    fn wrapped_height_counts_rows() {
        let lines = vec!["a".repeat(25), String::new(), "b".repeat(10)];

        assert_eq!(wrapped_height(&lines, 10), 5);
        assert_eq!(wrapped_height(&[], 10), 0);
    }

    #[test]
    fn navigation_link_requests_page_switch() {
        let registry = OutsidePointerRegistry::shared();
        let mut page = contact_page(&registry);
        page.navigation_update(Some(navigation()));

        assert_eq!(
            page.pointer_down(Position::new(2, 0)),
            Some(PageEvent::Navigate("home".into()))
        );
    }

    #[test]
    fn pointer_outside_closes_open_combobox() {
        let registry = OutsidePointerRegistry::shared();
        let mut page = contact_page(&registry);

        let input = page.form().as_ref().unwrap().fields()[0].area();
        page.pointer_down(Position::new(input.x + 2, input.y + 1));
        let is_open = |page: &PageModel| {
            page.form().as_ref().unwrap().fields()[0]
                .combobox()
                .unwrap()
                .is_open()
        };
        assert!(is_open(&page));

        page.pointer_down(Position::new(0, 39));
        assert!(!is_open(&page));
    }

    #[test]
    fn dropping_page_releases_subscriptions() {
        let registry = OutsidePointerRegistry::shared();
        let page = contact_page(&registry);
        assert_eq!(registry.borrow().len(), 1);

        drop(page);
        assert!(registry.borrow().is_empty());
    }
}
