//! Site navigation bar.
//!
//! Desktop mode lays the items out on one row; dropdown menus open on hover and
//! close 100 ms after the pointer leaves their button. Mobile mode collapses
//! everything behind a hamburger button that opens a side menu over an overlay,
//! with dropdowns shown as an accordion.

use impl_helper::ImplHelper;
use itertools::Itertools;
use ratatui::layout::{Position, Rect};
use std::{
    path::Path,
    time::{Duration, Instant},
};
use tracing::{debug, error};
use wrap_context::arg_context;

use crate::{
    markup::{NavItemMarkup, NavigationMarkup},
    utils::{clip_string, rect_contains},
};

pub const CLOSE_DELAY: Duration = Duration::from_millis(100);
pub const HAMBURGER: &str = " ☰ ";
pub const MOBILE_MENU_WIDTH: u16 = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutMode {
    #[default]
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Link(usize),
    DropdownButton(usize),
    DropdownLink(usize, usize),
    DropdownMenu(usize),
    Hamburger,
    MobileItem(usize),
    MobileLink(usize, usize),
    MobileMenu,
    Overlay,
}

/// Desktop hover region, used to derive enter and leave transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverRegion {
    Button(usize),
    Menu(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CloseTimer {
    id: u64,
    dropdown: usize,
    deadline: Instant,
}

/// One row of the open mobile menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileRow {
    Item(usize),
    Link(usize, usize),
}

pub async fn load_navigation(path: &Path) -> anyhow::Result<NavigationMarkup> {
    let navigation = arg_context!(NavigationMarkup::from_file(path).await)?;
    debug!(items = navigation.items.len(), "navigation loaded");
    anyhow::Ok(navigation)
}

/// Logs a failed load; the page keeps rendering without a navigation bar
pub fn report_load_error(err: &anyhow::Error) {
    error!("Error loading navigation: {:#}", err);
}

#[derive(Debug, Default, ImplHelper)]
pub struct NavigationModel {
    #[helper(get)]
    items: Vec<NavItemMarkup>,

    #[helper(get)]
    current_page: String,

    #[helper(copy)]
    mode: LayoutMode,

    /// Mobile menu and its overlay are shown together
    #[helper(copy)]
    mobile_menu_open: bool,

    /// Mobile accordion panels, one flag per item
    #[helper(get)]
    open_panels: Vec<bool>,

    /// Desktop dropdown menus currently displayed, one flag per item
    #[helper(get)]
    shown_menus: Vec<bool>,

    timers: Vec<CloseTimer>,
    latest_timer: Option<u64>,
    next_timer: u64,
    hover: Option<HoverRegion>,

    #[helper(copy)]
    area: Rect,

    #[helper(copy)]
    bounds: Rect,

    #[helper(get)]
    item_areas: Vec<Rect>,

    #[helper(get)]
    menu_areas: Vec<Rect>,

    #[helper(copy)]
    hamburger_area: Rect,

    #[helper(copy)]
    mobile_menu_area: Rect,
}

impl NavigationModel {
    pub fn new(markup: NavigationMarkup, current_page: impl Into<String>) -> Self {
        let count = markup.items.len();

        Self {
            items: markup.items,
            current_page: current_page.into(),
            open_panels: vec![false; count],
            shown_menus: vec![false; count],
            item_areas: vec![Rect::default(); count],
            menu_areas: vec![Rect::default(); count],
            ..Self::default()
        }
    }

    pub fn is_active(&self, page: &str) -> bool {
        self.current_page == page
    }

    pub fn current_page_update(&mut self, page: impl Into<String>) -> &mut Self {
        self.current_page = page.into();
        self
    }

    /// Label as shown on the bar, dropdowns carry an arrow
    pub fn item_label(&self, index: usize) -> String {
        match self.items.get(index) {
            Some(NavItemMarkup::Link { label, .. }) => format!(" {} ", label),
            Some(NavItemMarkup::Dropdown { label, .. }) => format!(" {} ▾ ", label),
            None => String::default(),
        }
    }

    pub fn links(&self, index: usize) -> &[crate::markup::NavLinkMarkup] {
        match self.items.get(index) {
            Some(NavItemMarkup::Dropdown { links, .. }) => links.as_slice(),
            _ => &[],
        }
    }

    // Layout

    /// `area` is the bar row, `bounds` the whole page the menus may cover
    pub fn area_update(&mut self, area: Rect, bounds: Rect, mode: LayoutMode) -> &mut Self {
        self.area = area;
        self.bounds = bounds;
        self.mode = mode;
        self.layout();
        self
    }

    fn layout(&mut self) {
        let count = self.items.len();
        self.item_areas = vec![Rect::default(); count];
        self.menu_areas = vec![Rect::default(); count];
        self.hamburger_area = Rect::default();
        self.mobile_menu_area = Rect::default();

        if self.area.is_empty() {
            return;
        }

        match self.mode {
            LayoutMode::Desktop => {
                let mut x = self.area.x;

                for index in 0..count {
                    let width = u16::try_from(self.item_label(index).chars().count())
                        .unwrap_or(u16::MAX)
                        .min(self.area.right().saturating_sub(x));

                    self.item_areas[index] = Rect::new(x, self.area.y, width, 1);
                    x = x.saturating_add(width);

                    let links = self.links(index);
                    if self.shown_menus.get(index).copied().unwrap_or(false) && !links.is_empty() {
                        let inner = links
                            .iter()
                            .map(|link| link.label.chars().count() + 2)
                            .max()
                            .unwrap_or(0);
                        let width = u16::try_from(inner + 2).unwrap_or(u16::MAX);
                        let height = u16::try_from(links.len() + 2).unwrap_or(u16::MAX);

                        self.menu_areas[index] = Rect::new(
                            self.item_areas[index].x,
                            self.area.bottom(),
                            width,
                            height,
                        )
                        .intersection(self.bounds);
                    }
                }
            }
            LayoutMode::Mobile => {
                let width = HAMBURGER.chars().count() as u16;
                self.hamburger_area = Rect::new(
                    self.area.right().saturating_sub(width),
                    self.area.y,
                    width.min(self.area.width),
                    1,
                );

                if self.mobile_menu_open {
                    let rows = u16::try_from(self.mobile_rows().len() + 2).unwrap_or(u16::MAX);
                    self.mobile_menu_area = Rect::new(
                        self.bounds.x,
                        self.area.bottom(),
                        MOBILE_MENU_WIDTH,
                        rows,
                    )
                    .intersection(self.bounds);
                }
            }
        }
    }

    /// Rows of the mobile menu in display order: items, each open panel followed by its links
    pub fn mobile_rows(&self) -> Vec<MobileRow> {
        self.items
            .iter()
            .enumerate()
            .flat_map(|(index, item)| {
                let links = match item {
                    NavItemMarkup::Dropdown { links, .. }
                        if self.open_panels.get(index).copied().unwrap_or(false) =>
                    {
                        (0..links.len())
                            .map(|link| MobileRow::Link(index, link))
                            .collect_vec()
                    }
                    _ => vec![],
                };

                std::iter::once(MobileRow::Item(index)).chain(links)
            })
            .collect_vec()
    }

    pub fn mobile_row_label(&self, row: MobileRow, width: usize) -> String {
        let label = match row {
            MobileRow::Item(index) => match self.items.get(index) {
                Some(NavItemMarkup::Link { label, .. }) => label.clone(),
                Some(NavItemMarkup::Dropdown { label, .. }) => {
                    let arrow = if self.open_panels.get(index).copied().unwrap_or(false) {
                        "▴"
                    } else {
                        "▾"
                    };
                    format!("{} {}", label, arrow)
                }
                None => String::default(),
            },
            MobileRow::Link(index, link) => self
                .links(index)
                .get(link)
                .map(|link| format!("  {}", link.label))
                .unwrap_or_default(),
        };

        clip_string(label, "…", width)
    }

    pub fn mobile_row_page(&self, row: MobileRow) -> Option<&str> {
        match row {
            MobileRow::Item(index) => match self.items.get(index) {
                Some(NavItemMarkup::Link { page, .. }) => Some(page.as_str()),
                _ => None,
            },
            MobileRow::Link(index, link) => {
                self.links(index).get(link).map(|link| link.page.as_str())
            }
        }
    }

    fn mobile_menu_inner(&self) -> Rect {
        let area = self.mobile_menu_area;
        if area.width < 2 || area.height < 2 {
            return Rect::default();
        }

        Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2)
    }

    // Hit testing

    pub fn hit(&self, position: Position) -> Option<NavTarget> {
        match self.mode {
            LayoutMode::Desktop => self.desktop_hit(position),
            LayoutMode::Mobile => self.mobile_hit(position),
        }
    }

    fn desktop_hit(&self, position: Position) -> Option<NavTarget> {
        for (index, area) in self.menu_areas.iter().enumerate() {
            if !rect_contains(area, position) {
                continue;
            }

            let row = usize::from(position.y.saturating_sub(area.y));
            let inside_border = position.x > area.x && position.x + 1 < area.right();

            return match row.checked_sub(1) {
                Some(link) if inside_border && link < self.links(index).len() => {
                    Some(NavTarget::DropdownLink(index, link))
                }
                _ => Some(NavTarget::DropdownMenu(index)),
            };
        }

        for (index, area) in self.item_areas.iter().enumerate() {
            if rect_contains(area, position) {
                return match self.items.get(index) {
                    Some(NavItemMarkup::Dropdown { .. }) => Some(NavTarget::DropdownButton(index)),
                    _ => Some(NavTarget::Link(index)),
                };
            }
        }

        None
    }

    fn mobile_hit(&self, position: Position) -> Option<NavTarget> {
        if rect_contains(&self.hamburger_area, position) {
            return Some(NavTarget::Hamburger);
        }

        if !self.mobile_menu_open {
            return None;
        }

        if rect_contains(&self.mobile_menu_area, position) {
            let inner = self.mobile_menu_inner();
            if !rect_contains(&inner, position) {
                return Some(NavTarget::MobileMenu);
            }

            let row = usize::from(position.y - inner.y);
            return match self.mobile_rows().get(row) {
                Some(MobileRow::Item(index)) => Some(NavTarget::MobileItem(*index)),
                Some(MobileRow::Link(index, link)) => Some(NavTarget::MobileLink(*index, *link)),
                None => Some(NavTarget::MobileMenu),
            };
        }

        // The overlay covers the page under the bar
        if position.y >= self.area.bottom() && rect_contains(&self.bounds, position) {
            return Some(NavTarget::Overlay);
        }

        None
    }

    // Pointer

    /// Returns the page to switch to when a link was activated, and whether the
    /// navigation consumed the pointer press
    pub fn pointer_down(&mut self, position: Position) -> (Option<String>, bool) {
        let Some(target) = self.hit(position) else {
            return (None, false);
        };

        let page = match target {
            NavTarget::Link(index) => match self.items.get(index) {
                Some(NavItemMarkup::Link { page, .. }) => Some(page.clone()),
                _ => None,
            },
            NavTarget::DropdownLink(index, link) => {
                self.links(index).get(link).map(|link| link.page.clone())
            }
            NavTarget::DropdownButton(_) | NavTarget::DropdownMenu(_) => None,
            NavTarget::Hamburger => {
                self.open_mobile_menu();
                None
            }
            NavTarget::Overlay => {
                self.close_mobile_menu();
                None
            }
            NavTarget::MobileItem(index) => match self.items.get(index) {
                Some(NavItemMarkup::Dropdown { .. }) => {
                    self.toggle_panel(index);
                    None
                }
                Some(NavItemMarkup::Link { page, .. }) => {
                    let page = page.clone();
                    self.close_mobile_menu();
                    Some(page)
                }
                None => None,
            },
            NavTarget::MobileLink(index, link) => {
                let page = self.links(index).get(link).map(|link| link.page.clone());
                self.close_mobile_menu();
                page
            }
            NavTarget::MobileMenu => None,
        };

        if let Some(page) = &page {
            debug!(%page, "navigation link activated");
        }

        (page, true)
    }

    pub fn open_mobile_menu(&mut self) {
        self.mobile_menu_open = true;
        self.layout();
    }

    pub fn close_mobile_menu(&mut self) {
        self.mobile_menu_open = false;
        self.layout();
    }

    /// Accordion: every other panel closes, this one toggles
    pub fn toggle_panel(&mut self, index: usize) {
        let was_open = self.open_panels.get(index).copied().unwrap_or(false);

        self.open_panels.iter_mut().for_each(|open| *open = false);
        if !was_open {
            if let Some(open) = self.open_panels.get_mut(index) {
                *open = true;
            }
        }

        self.layout();
    }

    /// Desktop hover tracking. Returns true when anything visible changed.
    pub fn pointer_move(&mut self, position: Position, now: Instant) -> bool {
        if self.mode != LayoutMode::Desktop {
            return false;
        }

        let region = match self.desktop_hit(position) {
            Some(NavTarget::DropdownButton(index)) => Some(HoverRegion::Button(index)),
            Some(NavTarget::DropdownMenu(index)) | Some(NavTarget::DropdownLink(index, _)) => {
                Some(HoverRegion::Menu(index))
            }
            _ => None,
        };

        if region == self.hover {
            return false;
        }

        let before = self.shown_menus.clone();

        match self.hover {
            Some(HoverRegion::Button(index)) => self.schedule_close(index, now),
            Some(HoverRegion::Menu(index)) => self.set_menu_shown(index, false),
            None => {}
        }

        match region {
            Some(HoverRegion::Button(index)) => {
                self.cancel_close();
                self.set_menu_shown(index, true);
            }
            Some(HoverRegion::Menu(_)) => self.cancel_close(),
            None => {}
        }

        self.hover = region;
        self.layout();

        before != self.shown_menus
    }

    /// Fires the close timers that are due. Returns true when a menu was hidden.
    pub fn tick(&mut self, now: Instant) -> bool {
        let (due, pending): (Vec<CloseTimer>, Vec<CloseTimer>) = self
            .timers
            .iter()
            .partition(|timer| timer.deadline <= now);

        if due.is_empty() {
            return false;
        }

        self.timers = pending;
        for timer in due {
            self.set_menu_shown(timer.dropdown, false);
        }
        self.layout();

        true
    }

    pub fn has_pending_close(&self) -> bool {
        !self.timers.is_empty()
    }

    // A single shared handle: only the latest scheduled close can be cancelled
    fn schedule_close(&mut self, dropdown: usize, now: Instant) {
        let id = self.next_timer;
        self.next_timer += 1;

        self.timers.push(CloseTimer {
            id,
            dropdown,
            deadline: now + CLOSE_DELAY,
        });
        self.latest_timer = Some(id);
    }

    fn cancel_close(&mut self) {
        if let Some(id) = self.latest_timer {
            self.timers.retain(|timer| timer.id != id);
        }
    }

    fn set_menu_shown(&mut self, index: usize, shown: bool) {
        if let Some(menu) = self.shown_menus.get_mut(index) {
            *menu = shown;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::NavLinkMarkup;
    use pretty_assertions::assert_eq;

    fn markup() -> NavigationMarkup {
        NavigationMarkup {
            items: vec![
                NavItemMarkup::Link {
                    label: "Home".into(),
                    page: "home".into(),
                },
                NavItemMarkup::Dropdown {
                    id: "services".into(),
                    label: "Services".into(),
                    links: vec![
                        NavLinkMarkup {
                            label: "Advisory".into(),
                            page: "advisory".into(),
                        },
                        NavLinkMarkup {
                            label: "Custody".into(),
                            page: "custody".into(),
                        },
                    ],
                },
                NavItemMarkup::Dropdown {
                    id: "company".into(),
                    label: "Company".into(),
                    links: vec![NavLinkMarkup {
                        label: "About".into(),
                        page: "about".into(),
                    }],
                },
                NavItemMarkup::Link {
                    label: "Contact".into(),
                    page: "contact".into(),
                },
            ],
        }
    }

    fn desktop() -> NavigationModel {
        let mut navigation = NavigationModel::new(markup(), "contact");
        navigation.area_update(Rect::new(0, 0, 80, 1), Rect::new(0, 0, 80, 24), LayoutMode::Desktop);
        navigation
    }

    fn mobile() -> NavigationModel {
        let mut navigation = NavigationModel::new(markup(), "contact");
        navigation.area_update(Rect::new(0, 0, 40, 1), Rect::new(0, 0, 40, 24), LayoutMode::Mobile);
        navigation
    }

    fn center(area: Rect) -> Position {
        Position::new(area.x + area.width / 2, area.y + area.height / 2)
    }

    #[test]
    fn highlights_current_page() {
        let mut navigation = desktop();

        assert!(navigation.is_active("contact"));
        assert!(!navigation.is_active("home"));

        navigation.current_page_update("home");
        assert!(navigation.is_active("home"));
    }

    #[test]
    fn desktop_items_sit_side_by_side() {
        let navigation = desktop();

        assert_eq!(navigation.item_areas()[0], Rect::new(0, 0, 6, 1));
        assert_eq!(navigation.item_areas()[1], Rect::new(6, 0, 12, 1));
        assert_eq!(
            navigation.hit(Position::new(8, 0)),
            Some(NavTarget::DropdownButton(1))
        );
        assert_eq!(navigation.hit(Position::new(1, 0)), Some(NavTarget::Link(0)));
        assert_eq!(navigation.hit(Position::new(79, 0)), None);
    }

    #[test]
    fn desktop_link_switches_page() {
        let mut navigation = desktop();

        let (page, consumed) = navigation.pointer_down(center(navigation.item_areas()[0]));
        assert_eq!(page.as_deref(), Some("home"));
        assert!(consumed);

        let (page, consumed) = navigation.pointer_down(Position::new(5, 10));
        assert_eq!(page, None);
        assert!(!consumed);
    }

    #[test]
    fn hover_menu_closes_after_delay() {
        let mut navigation = desktop();
        let start = Instant::now();
        let button = center(navigation.item_areas()[1]);

        assert!(navigation.pointer_move(button, start));
        assert!(navigation.shown_menus()[1]);

        navigation.pointer_move(Position::new(60, 10), start);
        assert!(navigation.shown_menus()[1]);
        assert!(!navigation.tick(start + Duration::from_millis(50)));
        assert!(navigation.shown_menus()[1]);

        assert!(navigation.tick(start + CLOSE_DELAY));
        assert!(!navigation.shown_menus()[1]);
        assert_eq!(navigation.menu_areas()[1], Rect::default());
    }

    #[test]
    fn entering_menu_cancels_close_and_leaving_hides() {
        let mut navigation = desktop();
        let start = Instant::now();

        navigation.pointer_move(center(navigation.item_areas()[1]), start);
        let menu = navigation.menu_areas()[1];
        assert_eq!(menu, Rect::new(6, 1, 12, 4));

        // Down from the button onto the first link
        let link = Position::new(menu.x + 2, menu.y + 1);
        navigation.pointer_move(link, start);
        assert_eq!(navigation.hit(link), Some(NavTarget::DropdownLink(1, 0)));
        assert!(!navigation.has_pending_close());

        assert!(!navigation.tick(start + Duration::from_secs(1)));
        assert!(navigation.shown_menus()[1]);

        let (page, _) = navigation.pointer_down(Position::new(menu.x + 2, menu.y + 2));
        assert_eq!(page.as_deref(), Some("custody"));

        assert!(navigation.pointer_move(Position::new(60, 20), start));
        assert!(!navigation.shown_menus()[1]);
    }

    #[test]
    fn entering_another_button_cancels_pending_close() {
        let mut navigation = desktop();
        let start = Instant::now();
        let services = center(navigation.item_areas()[1]);
        let company = center(navigation.item_areas()[2]);

        navigation.pointer_move(services, start);
        navigation.pointer_move(Position::new(60, 20), start);
        navigation.pointer_move(company, start);
        navigation.tick(start + CLOSE_DELAY);

        // The close scheduled for services shared the handle and got cancelled
        assert_eq!(navigation.shown_menus(), &vec![false, true, true, false]);

        navigation.pointer_move(Position::new(60, 20), start);
        navigation.tick(start + CLOSE_DELAY);
        assert_eq!(navigation.shown_menus(), &vec![false, true, false, false]);
    }

    #[test]
    fn hamburger_opens_menu_and_overlay_closes_it() {
        let mut navigation = mobile();
        assert_eq!(navigation.item_areas()[0], Rect::default());

        let hamburger = navigation.hamburger_area();
        assert_eq!(hamburger, Rect::new(37, 0, 3, 1));

        navigation.pointer_down(center(hamburger));
        assert!(navigation.mobile_menu_open());
        assert_eq!(navigation.mobile_menu_area(), Rect::new(0, 1, 32, 6));

        // Clicking the hamburger again keeps it open
        navigation.pointer_down(center(hamburger));
        assert!(navigation.mobile_menu_open());

        let (page, consumed) = navigation.pointer_down(Position::new(35, 20));
        assert_eq!(page, None);
        assert!(consumed);
        assert!(!navigation.mobile_menu_open());
    }

    #[test]
    fn mobile_accordion_keeps_one_panel_open() {
        let mut navigation = mobile();
        navigation.open_mobile_menu();

        // Rows start inside the border: Home, Services, Company, Contact
        let services = Position::new(2, 3);
        let company = Position::new(2, 4);
        assert_eq!(navigation.hit(services), Some(NavTarget::MobileItem(1)));

        navigation.pointer_down(services);
        assert_eq!(navigation.open_panels(), &vec![false, true, false, false]);
        assert_eq!(
            navigation.mobile_row_label(MobileRow::Item(1), 20),
            "Services ▴"
        );
        assert_eq!(
            navigation.mobile_rows(),
            vec![
                MobileRow::Item(0),
                MobileRow::Item(1),
                MobileRow::Link(1, 0),
                MobileRow::Link(1, 1),
                MobileRow::Item(2),
                MobileRow::Item(3),
            ]
        );

        // Company moved down by the two open links
        let company_now = Position::new(company.x, company.y + 2);
        navigation.pointer_down(company_now);
        assert_eq!(navigation.open_panels(), &vec![false, false, true, false]);

        navigation.pointer_down(Position::new(2, 4));
        assert_eq!(navigation.open_panels(), &vec![false, false, false, false]);
    }

    #[test]
    fn mobile_link_closes_menu_and_switches_page() {
        let mut navigation = mobile();
        navigation.open_mobile_menu();
        navigation.toggle_panel(1);

        let (page, _) = navigation.pointer_down(Position::new(3, 4));
        assert_eq!(page.as_deref(), Some("advisory"));
        assert!(!navigation.mobile_menu_open());
    }
}
