use itertools::Itertools;
use ratatui::{
    layout::Rect,
    style::Stylize,
    text::Line,
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    form_view::FormView, navigation_view::NavigationView, page_model::PageModel, types::Render,
    utils::clip_string,
};

#[derive(Debug, Clone, Default)]
pub struct PageView<'a> {
    area: Rect,
    navigation: Option<NavigationView<'a>>,
    title: (Rect, Line<'a>),
    body: (Rect, Paragraph<'a>),
    form: Option<FormView<'a>>,
}

impl<'a> From<&PageModel> for PageView<'a> {
    fn from(model: &PageModel) -> Self {
        let title_area = model.title_area();
        let title = Line::from(clip_string(
            model.title().clone(),
            "…",
            usize::from(title_area.width),
        ))
        .bold();

        let body = Paragraph::new(
            model
                .body_lines()
                .into_iter()
                .map(|line| Line::from(line.to_string()))
                .collect_vec(),
        )
        .wrap(Wrap { trim: false });

        Self {
            area: model.area(),
            navigation: model.navigation().as_ref().map(NavigationView::from),
            title: (title_area, title),
            body: (model.body_area(), body),
            form: model.form().as_ref().map(FormView::from),
        }
    }
}

impl<'a> Render for PageView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);

        if let Some(navigation) = &mut self.navigation {
            navigation.render(frame);
        }

        let (area, title) = &self.title;
        frame.render_widget(title, *area);

        let (area, body) = &self.body;
        frame.render_widget(body, *area);

        if let Some(form) = &mut self.form {
            form.render(frame);
        }

        if let Some(navigation) = &mut self.navigation {
            navigation.render_overlay(frame);
        }
    }
}
