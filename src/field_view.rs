use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};

use crate::{
    field_model::{CheckboxModel, TextFieldModel},
    types::Render,
    utils::{clip_string, ACCENT},
};

#[derive(Debug, Clone, Default)]
pub struct TextFieldView<'a> {
    area: Rect,
    input: Paragraph<'a>,
}

impl<'a> From<&TextFieldModel> for TextFieldView<'a> {
    fn from(model: &TextFieldModel) -> Self {
        let area = model.area();
        let width = usize::from(area.width.saturating_sub(2));

        // Keep the end of the value (where the caret is) in sight
        let value = model.value();
        let skip = value.chars().count().saturating_sub(width.saturating_sub(1));
        let mut shown = value.chars().skip(skip).collect::<String>();
        if model.focused() {
            shown.push('▏');
        }

        let border_style = if model.focused() {
            Style::default().fg(ACCENT)
        } else {
            Style::default()
        };

        let input = Paragraph::new(Line::from(shown))
            .block(Block::bordered().border_style(border_style));

        Self { area, input }
    }
}

impl<'a> Render for TextFieldView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);
        frame.render_widget(&self.input, self.area);
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckboxView<'a> {
    area: Rect,
    line: Line<'a>,
}

impl<'a> From<&CheckboxModel> for CheckboxView<'a> {
    fn from(model: &CheckboxModel) -> Self {
        let area = model.area();

        let mark = if model.checked() { "[x] " } else { "[ ] " };
        let mark = if model.focused() {
            Span::from(mark).fg(ACCENT).bold()
        } else {
            Span::from(mark)
        };

        let label = clip_string(
            model.label().clone(),
            "…",
            usize::from(area.width).saturating_sub(4),
        );

        Self {
            area,
            line: Line::from(vec![mark, Span::from(label)]),
        }
    }
}

impl<'a> Render for CheckboxView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);
        frame.render_widget(&self.line, self.area);
    }
}
