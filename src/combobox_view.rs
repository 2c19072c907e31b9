use itertools::Itertools;
use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    combobox_model::{ComboboxModel, NO_MATCHES},
    types::Render,
    utils::{clip_string, ACCENT, MUTED},
};

#[derive(Debug, Clone, Default)]
pub struct ComboboxView<'a> {
    area: Rect,
    input: Paragraph<'a>,
    list_area: Rect,
    list: Option<List<'a>>,
    state: ListState,
}

impl<'a> From<&ComboboxModel> for ComboboxView<'a> {
    fn from(model: &ComboboxModel) -> Self {
        let aria = model.aria();
        let area = model.area();
        let text_width = usize::from(model.text_area().width);

        let controls = match (model.has_value(), aria.expanded) {
            (true, true) => " × ▴",
            (true, false) => " × ▾",
            (false, true) => "   ▴",
            (false, false) => "   ▾",
        };

        let text = if model.input_text().is_empty() {
            Span::from(clip_string(
                model.placeholder().clone(),
                "…",
                text_width.saturating_sub(controls.chars().count()),
            ))
            .fg(MUTED)
            .italic()
        } else {
            Span::from(clip_string(
                model.input_text().clone(),
                "…",
                text_width.saturating_sub(controls.chars().count()),
            ))
        };

        let padding = text_width
            .saturating_sub(text.content.chars().count())
            .saturating_sub(controls.chars().count());

        let line = Line::from(vec![text, Span::from(" ".repeat(padding)), Span::from(controls)]);

        let border_style = if model.focused() {
            Style::default().fg(ACCENT)
        } else {
            Style::default()
        };

        let input = Paragraph::new(line).block(Block::bordered().border_style(border_style));

        let list_area = model.list_area();
        let list_width = usize::from(model.list_inner_area().width);

        let (list, state) = if !aria.expanded || list_area.is_empty() {
            (None, ListState::default())
        } else if model.placeholder_row() {
            let row = ListItem::new(Line::from(NO_MATCHES).fg(MUTED).italic());
            (
                Some(List::new(vec![row]).block(Block::bordered())),
                ListState::default(),
            )
        } else {
            let visible = model.visible_indices();

            let rows = visible
                .iter()
                .filter_map(|index| model.options().get(*index))
                .map(|option| {
                    let marker = if option.selected() { "✓ " } else { "  " };
                    ListItem::new(Line::from(clip_string(
                        format!("{}{}", marker, option.label()),
                        "…",
                        list_width,
                    )))
                })
                .collect_vec();

            let selected = model
                .active_index()
                .and_then(|active| visible.iter().position(|index| *index == active));

            (
                Some(
                    List::new(rows)
                        .block(Block::bordered())
                        .highlight_style(Style::default().bg(ACCENT)),
                ),
                ListState::default()
                    .with_offset(model.scroll_offset())
                    .with_selected(selected),
            )
        };

        Self {
            area,
            input,
            list_area,
            list,
            state,
        }
    }
}

impl<'a> ComboboxView<'a> {
    /// The option list floats over whatever is below the input, so it is drawn
    /// after every other control
    pub fn render_list(&mut self, frame: &mut Frame) {
        if let Some(list) = &self.list {
            frame.render_widget(Clear, self.list_area);
            frame.render_stateful_widget(list, self.list_area, &mut self.state);
        }
    }
}

impl<'a> Render for ComboboxView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);
        frame.render_widget(&self.input, self.area);
    }
}
