use itertools::Itertools;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Clear,
    Frame,
};

use crate::{textline_model::TextLineModel, types::Render};

#[derive(Debug, Default)]
pub struct TextLineView<'a> {
    area: Rect,
    line: Line<'a>,
    transparent: bool,
}

impl<'a> From<&TextLineModel> for TextLineView<'a> {
    fn from(model: &TextLineModel) -> Self {
        let line = Line::from(
            model
                .show_spans()
                .iter()
                .map(|(content, style)| Span::styled(content.clone(), *style))
                .collect_vec(),
        )
        .style(*model.style())
        .alignment(*model.alignment());

        Self {
            area: model.area(),
            line,
            transparent: *model.transparent(),
        }
    }
}

impl<'a> Render for TextLineView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        if !self.transparent {
            frame.render_widget(Clear, self.area);
        }

        frame.render_widget(&self.line, self.area);
    }
}
