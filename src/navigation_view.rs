use itertools::Itertools;
use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem},
    Frame,
};

use crate::{
    markup::NavItemMarkup,
    navigation_model::{LayoutMode, NavigationModel, HAMBURGER},
    types::Render,
    utils::{clip_string, ACCENT, MUTED},
};

#[derive(Debug, Clone, Default)]
pub struct NavigationView<'a> {
    area: Rect,
    items: Vec<(Rect, Span<'a>)>,
    menus: Vec<(Rect, List<'a>)>,
    overlay: Option<Rect>,
    mobile_menu: Option<(Rect, List<'a>)>,
}

fn link_style(active: bool) -> Style {
    if active {
        Style::default().fg(ACCENT).bold().underlined()
    } else {
        Style::default()
    }
}

impl<'a> From<&NavigationModel> for NavigationView<'a> {
    fn from(model: &NavigationModel) -> Self {
        let area = model.area();
        let mut items = vec![];
        let mut menus = vec![];
        let mut overlay = None;
        let mut mobile_menu = None;

        match model.mode() {
            LayoutMode::Desktop => {
                for (index, item_area) in model.item_areas().iter().enumerate() {
                    if item_area.is_empty() {
                        continue;
                    }

                    let label = clip_string(model.item_label(index), "…", usize::from(item_area.width));
                    let shown = model.shown_menus().get(index).copied().unwrap_or(false);

                    let style = match model.items().get(index) {
                        Some(NavItemMarkup::Link { page, .. }) => link_style(model.is_active(page)),
                        _ if shown => Style::default().reversed(),
                        _ => Style::default(),
                    };

                    items.push((*item_area, Span::styled(label, style)));
                }

                for (index, menu_area) in model.menu_areas().iter().enumerate() {
                    if menu_area.is_empty() {
                        continue;
                    }

                    let width = usize::from(menu_area.width.saturating_sub(2));
                    let rows = model
                        .links(index)
                        .iter()
                        .map(|link| {
                            ListItem::new(Line::styled(
                                clip_string(format!(" {}", link.label), "…", width),
                                link_style(model.is_active(&link.page)),
                            ))
                        })
                        .collect_vec();

                    menus.push((*menu_area, List::new(rows).block(Block::bordered())));
                }
            }
            LayoutMode::Mobile => {
                let hamburger = model.hamburger_area();
                if !hamburger.is_empty() {
                    let style = if model.mobile_menu_open() {
                        Style::default().reversed()
                    } else {
                        Style::default()
                    };
                    items.push((hamburger, Span::styled(HAMBURGER, style)));
                }

                if model.mobile_menu_open() {
                    let bounds = model.bounds();
                    let below = area.bottom().min(bounds.bottom());
                    overlay = Some(Rect::new(
                        bounds.x,
                        below,
                        bounds.width,
                        bounds.bottom().saturating_sub(below),
                    ));

                    let menu_area = model.mobile_menu_area();
                    let width = usize::from(menu_area.width.saturating_sub(2));
                    let rows = model
                        .mobile_rows()
                        .into_iter()
                        .map(|row| {
                            let active = model
                                .mobile_row_page(row)
                                .is_some_and(|page| model.is_active(page));
                            ListItem::new(Line::styled(
                                model.mobile_row_label(row, width),
                                link_style(active),
                            ))
                        })
                        .collect_vec();

                    mobile_menu = Some((menu_area, List::new(rows).block(Block::bordered())));
                }
            }
        }

        Self {
            area,
            items,
            menus,
            overlay,
            mobile_menu,
        }
    }
}

impl<'a> NavigationView<'a> {
    /// Menus and the mobile overlay cover the page, so they are drawn last
    pub fn render_overlay(&mut self, frame: &mut Frame) {
        if let Some(area) = self.overlay {
            frame.render_widget(Clear, area);
            frame.render_widget(Block::default().bg(MUTED), area);
        }

        if let Some((area, menu)) = &self.mobile_menu {
            frame.render_widget(Clear, *area);
            frame.render_widget(menu, *area);
        }

        for (area, menu) in self.menus.iter() {
            frame.render_widget(Clear, *area);
            frame.render_widget(menu, *area);
        }
    }
}

impl<'a> Render for NavigationView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);
        frame.render_widget(Block::default().bg(MUTED), self.area);

        for (area, span) in self.items.iter() {
            frame.render_widget(span, *area);
        }
    }
}
