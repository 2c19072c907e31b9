use ratatui::{
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    combobox_view::ComboboxView,
    field_view::{CheckboxView, TextFieldView},
    form_model::{FocusTarget, FormField, FormModel, StatusKind},
    types::Render,
    utils::{clip_string, ACCENT, ERROR, MUTED, SUCCESS},
};

#[derive(Debug, Clone)]
enum FieldView<'a> {
    Text(TextFieldView<'a>),
    Combobox(ComboboxView<'a>),
    Checkbox(CheckboxView<'a>),
}

impl<'a> Render for FieldView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        match self {
            FieldView::Text(view) => view.render(frame),
            FieldView::Combobox(view) => view.render(frame),
            FieldView::Checkbox(view) => view.render(frame),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormView<'a> {
    area: Rect,
    labels: Vec<(Rect, Line<'a>)>,
    fields: Vec<FieldView<'a>>,
    validity: Option<(Rect, Line<'a>)>,
    button: (Rect, Paragraph<'a>),
    status: Option<(Rect, Line<'a>)>,
}

impl<'a> From<&FormModel> for FormView<'a> {
    fn from(model: &FormModel) -> Self {
        let mut labels = vec![];
        let mut fields = vec![];

        for index in model.visible_fields() {
            let Some(field) = model.fields().get(index) else {
                continue;
            };

            let area = field.area();
            if area.is_empty() {
                continue;
            }

            if field.has_label_row() && area.y > model.area().y {
                let marker = if field.required() { " *" } else { "" };
                let label = clip_string(
                    format!("{}{}", field.label(), marker),
                    "…",
                    usize::from(area.width),
                );
                labels.push((Rect::new(area.x, area.y - 1, area.width, 1), Line::from(label)));
            }

            fields.push(match field {
                FormField::Text { model, .. } => FieldView::Text(TextFieldView::from(model)),
                FormField::Combobox { model, .. } => {
                    FieldView::Combobox(ComboboxView::from(model))
                }
                FormField::Checkbox { model, .. } => {
                    FieldView::Checkbox(CheckboxView::from(model))
                }
            });
        }

        // Shown on the spacer row under the offending control
        let validity = model.validity().as_ref().and_then(|validity| {
            let area = model.fields().get(validity.field)?.area();
            (!area.is_empty()).then(|| {
                (
                    Rect::new(area.x, area.bottom(), area.width, 1),
                    Line::from(clip_string(
                        format!("! {}", validity.message),
                        "…",
                        usize::from(area.width),
                    ))
                    .fg(ERROR),
                )
            })
        });

        let button_style = if model.button_disabled() {
            Style::default().fg(MUTED)
        } else if model.focus() == Some(FocusTarget::Submit) {
            Style::default().bg(ACCENT).bold()
        } else {
            Style::default().reversed()
        };

        let button = (
            model.button_area(),
            Paragraph::new(Line::from(Span::styled(
                format!(" {} ", model.button_label()),
                button_style,
            )))
            .alignment(Alignment::Left),
        );

        let status = model.status().as_ref().map(|status| {
            let color = match status.kind {
                StatusKind::Success => SUCCESS,
                StatusKind::Error => ERROR,
            };

            (
                model.status_area(),
                Line::from(clip_string(
                    status.message.clone(),
                    "…",
                    usize::from(model.status_area().width),
                ))
                .fg(color),
            )
        });

        Self {
            area: model.area(),
            labels,
            fields,
            validity,
            button,
            status,
        }
    }
}

impl<'a> Render for FormView<'a> {
    fn render(&mut self, frame: &mut Frame) {
        frame.render_widget(Clear, self.area);

        for (area, label) in self.labels.iter() {
            frame.render_widget(label, *area);
        }

        for field in self.fields.iter_mut() {
            field.render(frame);
        }

        if let Some((area, line)) = &self.validity {
            frame.render_widget(line, *area);
        }

        let (area, button) = &self.button;
        frame.render_widget(button, *area);

        if let Some((area, line)) = &self.status {
            frame.render_widget(line, *area);
        }

        // Open lists overlay the controls below them
        for field in self.fields.iter_mut() {
            if let FieldView::Combobox(view) = field {
                view.render_list(frame);
            }
        }
    }
}
