//! Two-step contact form.
//!
//! Step one collects the contact details, step two the profile comboboxes and
//! the consent checkbox. Submitting step one only validates and advances;
//! submitting step two validates, mirrors free text into empty hidden fields
//! and hands the payload to the caller for posting.

use impl_helper::ImplHelper;
use indexmap::IndexMap;
use itertools::Itertools;
use ratatui::layout::{Position, Rect};
use tracing::{debug, info};
use wrap_context::{arg_context, raw_context};

use crate::{
    combobox_model::{ComboboxKey, ComboboxModel, ComboboxTarget, INPUT_HEIGHT},
    field_model::{CheckboxModel, TextFieldModel, CHECKBOX_HEIGHT, FILL_OUT_MESSAGE, TEXT_FIELD_HEIGHT},
    markup::{FieldMarkup, FormMarkup, StepMarkup, DEFAULT_ENDPOINT},
    outside_pointer::{SharedRegistry, SubscriptionId},
    types::FocusDirection,
    utils::{rect_contains, split_top},
};

pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const CONSENT_MESSAGE: &str = "Please agree to be contacted to proceed.";
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong. Please try again.";
pub const CHECKED_VALUE: &str = "on";

pub type Payload = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStep {
    #[default]
    One,
    Two,
}

impl From<StepMarkup> for FormStep {
    fn from(step: StepMarkup) -> Self {
        match step {
            StepMarkup::One => FormStep::One,
            StepMarkup::Two => FormStep::Two,
        }
    }
}

#[derive(Debug)]
pub enum FormField {
    Text {
        step: FormStep,
        model: TextFieldModel,
    },
    Combobox {
        step: FormStep,
        label: String,
        model: ComboboxModel,
    },
    Checkbox {
        step: FormStep,
        model: CheckboxModel,
    },
}

impl FormField {
    pub fn from_markup(
        markup: &FieldMarkup,
        registry: &SharedRegistry,
        list_rows: usize,
    ) -> anyhow::Result<Self> {
        let field = match markup {
            FieldMarkup::Text {
                name,
                label,
                kind,
                required,
                step,
                missing_message,
            } => FormField::Text {
                step: (*step).into(),
                model: TextFieldModel::new(name.clone(), label.clone(), *kind)
                    .required_set(*required)
                    .missing_message_set(missing_message.clone()),
            },
            FieldMarkup::Combobox {
                label,
                step,
                container,
            } => {
                let mut model = arg_context!(ComboboxModel::from_markup(container))?.attach(registry);
                model.max_rows_update(list_rows);

                FormField::Combobox {
                    step: (*step).into(),
                    label: label.clone(),
                    model,
                }
            }
            FieldMarkup::Checkbox {
                id,
                name,
                label,
                required,
                step,
            } => FormField::Checkbox {
                step: (*step).into(),
                model: CheckboxModel::new(id.clone(), name.clone(), label.clone())
                    .required_set(*required),
            },
        };

        anyhow::Ok(field)
    }

    pub fn step(&self) -> FormStep {
        match self {
            FormField::Text { step, .. }
            | FormField::Combobox { step, .. }
            | FormField::Checkbox { step, .. } => *step,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FormField::Text { model, .. } => model.label(),
            FormField::Combobox { label, .. } => label,
            FormField::Checkbox { model, .. } => model.label(),
        }
    }

    pub fn required(&self) -> bool {
        match self {
            FormField::Text { model, .. } => model.required(),
            FormField::Combobox { model, .. } => model.required(),
            FormField::Checkbox { model, .. } => model.required(),
        }
    }

    pub fn area(&self) -> Rect {
        match self {
            FormField::Text { model, .. } => model.area(),
            FormField::Combobox { model, .. } => model.area(),
            FormField::Checkbox { model, .. } => model.area(),
        }
    }

    /// Whether the label gets a row of its own above the control
    pub fn has_label_row(&self) -> bool {
        !matches!(self, FormField::Checkbox { .. })
    }

    fn control_height(&self) -> u16 {
        match self {
            FormField::Text { .. } => TEXT_FIELD_HEIGHT,
            FormField::Combobox { .. } => INPUT_HEIGHT,
            FormField::Checkbox { .. } => CHECKBOX_HEIGHT,
        }
    }

    fn set_area(&mut self, area: Rect, bounds: Rect) {
        match self {
            FormField::Text { model, .. } => {
                model.area_update(area);
            }
            FormField::Combobox { model, .. } => {
                model.area_update(area, bounds);
            }
            FormField::Checkbox { model, .. } => {
                model.area_update(area);
            }
        }
    }

    /// `run_handlers` is false when focus is restored programmatically by a
    /// control of the widget itself (toggle, clear), which must not refilter
    fn focus(&mut self, run_handlers: bool) {
        match self {
            FormField::Text { model, .. } => {
                model.focused_update(true);
            }
            FormField::Combobox { model, .. } => {
                if run_handlers {
                    model.focus();
                } else {
                    model.focused_update(true);
                }
            }
            FormField::Checkbox { model, .. } => {
                model.focused_update(true);
            }
        }
    }

    fn blur(&mut self) {
        match self {
            FormField::Text { model, .. } => {
                model.focused_update(false);
            }
            FormField::Combobox { model, .. } => model.blur(),
            FormField::Checkbox { model, .. } => {
                model.focused_update(false);
            }
        }
    }

    pub fn combobox(&self) -> Option<&ComboboxModel> {
        match self {
            FormField::Combobox { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn combobox_mut(&mut self) -> Option<&mut ComboboxModel> {
        match self {
            FormField::Combobox { model, .. } => Some(model),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(usize),
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Field(usize),
    Combobox(usize, ComboboxTarget),
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Char(char),
    Backspace,
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormStatus {
    pub message: String,
    pub kind: StatusKind,
}

/// A failed constraint, reported next to the field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    pub field: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request is already in flight
    Busy,
    Invalid,
    Advanced,
    Post(Payload),
}

#[derive(Debug, ImplHelper)]
pub struct FormModel {
    #[helper(get)]
    id: String,

    #[helper(get)]
    endpoint: String,

    #[helper(get)]
    submit_label: String,

    #[helper(get)]
    button_label: String,

    #[helper(copy)]
    button_disabled: bool,

    #[helper(copy)]
    step: FormStep,

    #[helper(get)]
    fields: Vec<FormField>,

    #[helper(copy)]
    focus: Option<FocusTarget>,

    #[helper(get, upd)]
    status: Option<FormStatus>,

    #[helper(get)]
    validity: Option<Validity>,

    #[helper(copy)]
    area: Rect,

    #[helper(copy)]
    button_area: Rect,

    #[helper(copy)]
    status_area: Rect,
}

impl FormModel {
    pub fn from_markup(
        markup: &FormMarkup,
        endpoint_override: Option<&str>,
        registry: &SharedRegistry,
        list_rows: usize,
    ) -> anyhow::Result<Self> {
        let fields = raw_context!(markup
            .fields
            .iter()
            .map(|field| FormField::from_markup(field, registry, list_rows))
            .collect::<anyhow::Result<Vec<FormField>>>())?;

        let endpoint = endpoint_override
            .map(str::to_string)
            .or_else(|| markup.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let mut form = Self {
            id: markup.id.clone(),
            endpoint,
            submit_label: markup.submit_label.clone(),
            button_label: markup.submit_label.clone(),
            button_disabled: false,
            step: FormStep::One,
            fields,
            focus: None,
            status: None,
            validity: None,
            area: Rect::default(),
            button_area: Rect::default(),
            status_area: Rect::default(),
        };
        form.show_step(FormStep::One);

        anyhow::Ok(form)
    }

    /// Fields shown on the current step, in document order
    pub fn visible_fields(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.step() == self.step)
            .map(|(i, _)| i)
            .collect_vec()
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut FormField> {
        self.fields.get_mut(index)
    }

    pub fn show_step(&mut self, step: FormStep) {
        self.set_focus(None, false);
        self.step = step;
        self.button_label = self.submit_label.clone();
        self.layout();
    }

    // Layout

    pub fn area_update(&mut self, area: Rect) -> &mut Self {
        self.area = area;
        self.layout();
        self
    }

    fn layout(&mut self) {
        let bounds = self.area;
        let visible = self.visible_fields();
        let mut rest = self.area;

        for (i, field) in self.fields.iter_mut().enumerate() {
            if !visible.contains(&i) {
                field.set_area(Rect::default(), bounds);
                continue;
            }

            if field.has_label_row() {
                (_, rest) = split_top(&rest, 1);
            }

            let (control, after) = split_top(&rest, field.control_height());
            field.set_area(control, bounds);
            (_, rest) = split_top(&after, 1);
        }

        let (button_area, after) = split_top(&rest, 1);
        let (_, after) = split_top(&after, 1);
        let (status_area, _) = split_top(&after, 1);

        self.button_area = button_area;
        self.status_area = status_area;
    }

    // Focus

    pub fn focus_update(&mut self, target: Option<FocusTarget>) {
        self.set_focus(target, true);
    }

    fn set_focus(&mut self, target: Option<FocusTarget>, run_handlers: bool) {
        if self.focus == target {
            return;
        }

        if let Some(FocusTarget::Field(index)) = self.focus {
            if let Some(field) = self.fields.get_mut(index) {
                field.blur();
            }
        }

        self.focus = target;

        if let Some(FocusTarget::Field(index)) = target {
            if let Some(field) = self.fields.get_mut(index) {
                field.focus(run_handlers);
            }
        }
    }

    pub fn focus_move(&mut self, direction: FocusDirection) {
        let ring = self
            .visible_fields()
            .into_iter()
            .map(FocusTarget::Field)
            .chain([FocusTarget::Submit])
            .collect_vec();

        let position = self
            .focus
            .and_then(|focus| ring.iter().position(|target| *target == focus));

        let next = match (direction, position) {
            (FocusDirection::Next, None) => 0,
            (FocusDirection::Next, Some(position)) => (position + 1) % ring.len(),
            (FocusDirection::Prev, None) => ring.len() - 1,
            (FocusDirection::Prev, Some(position)) => (position + ring.len() - 1) % ring.len(),
        };

        self.set_focus(ring.get(next).copied(), true);
    }

    // Input

    /// Returns the outcome when the key submitted the form
    pub fn key(&mut self, key: FormKey) -> Option<SubmitOutcome> {
        let focus = self.focus?;

        let index = match focus {
            FocusTarget::Submit => {
                return match key {
                    FormKey::Enter | FormKey::Char(' ') => Some(self.submit()),
                    _ => None,
                };
            }
            FocusTarget::Field(index) => index,
        };

        if matches!(key, FormKey::Char(_) | FormKey::Backspace) {
            self.clear_validity(index);
        }

        let mut submit = false;

        match self.fields.get_mut(index)? {
            FormField::Text { model, .. } => match key {
                FormKey::Char(c) => model.insert_char(c),
                FormKey::Backspace => model.delete_char(),
                FormKey::Enter => submit = true,
                _ => {}
            },
            FormField::Combobox { model, .. } => match key {
                FormKey::Char(c) => model.insert_char(c),
                FormKey::Backspace => model.delete_char(),
                FormKey::Up => model.key(ComboboxKey::ArrowUp),
                FormKey::Down => model.key(ComboboxKey::ArrowDown),
                // Without an active option Enter falls through to the form
                FormKey::Enter if model.active_index().is_none() => {
                    model.close();
                    submit = true;
                }
                FormKey::Enter => model.key(ComboboxKey::Enter),
                FormKey::Escape => model.key(ComboboxKey::Escape),
            },
            FormField::Checkbox { model, .. } => match key {
                FormKey::Char(' ') => model.toggle(),
                FormKey::Enter => submit = true,
                _ => {}
            },
        }

        submit.then(|| self.submit())
    }

    pub fn hit(&self, position: Position) -> Option<FormTarget> {
        // Open lists float above every other control
        for (i, field) in self.fields.iter().enumerate() {
            if let Some(model) = field.combobox() {
                if model.is_open() && rect_contains(&model.list_area(), position) {
                    return model.hit(position).map(|target| FormTarget::Combobox(i, target));
                }
            }
        }

        for i in self.visible_fields() {
            let Some(field) = self.fields.get(i) else {
                continue;
            };

            if let Some(model) = field.combobox() {
                if let Some(target) = model.hit(position) {
                    return Some(FormTarget::Combobox(i, target));
                }
            } else if rect_contains(&field.area(), position) {
                return Some(FormTarget::Field(i));
            }
        }

        if rect_contains(&self.button_area, position) {
            return Some(FormTarget::Submit);
        }

        None
    }

    /// Pointer pressed inside the form area. Widget handlers run here, before
    /// the caller closes the comboboxes the pointer landed outside of.
    pub fn pointer_down(&mut self, position: Position) -> Option<SubmitOutcome> {
        match self.hit(position) {
            Some(FormTarget::Combobox(index, target)) => {
                match target {
                    ComboboxTarget::Input => self.set_focus(Some(FocusTarget::Field(index)), true),
                    ComboboxTarget::Option(option) => {
                        self.set_focus(Some(FocusTarget::Field(index)), false);
                        if let Some(model) = self.combobox_at(index) {
                            model.pointer_down_option(option);
                        }
                    }
                    ComboboxTarget::Toggle => {
                        self.set_focus(Some(FocusTarget::Field(index)), false);
                        if let Some(model) = self.combobox_at(index) {
                            model.toggle();
                        }
                    }
                    ComboboxTarget::Clear => {
                        self.set_focus(Some(FocusTarget::Field(index)), false);
                        self.clear_validity(index);
                        if let Some(model) = self.combobox_at(index) {
                            model.clear();
                        }
                    }
                    ComboboxTarget::Placeholder | ComboboxTarget::List => {}
                }
                None
            }
            Some(FormTarget::Field(index)) => {
                self.set_focus(Some(FocusTarget::Field(index)), true);
                if let Some(FormField::Checkbox { model, .. }) = self.fields.get_mut(index) {
                    model.toggle();
                }
                None
            }
            Some(FormTarget::Submit) => {
                self.set_focus(Some(FocusTarget::Submit), true);
                Some(self.submit())
            }
            None => {
                self.set_focus(None, true);
                None
            }
        }
    }

    pub fn pointer_move(&mut self, position: Position) {
        if let Some(FormTarget::Combobox(index, ComboboxTarget::Option(option))) = self.hit(position) {
            if let Some(model) = self.combobox_at(index) {
                model.pointer_move_option(option);
            }
        }
    }

    /// Document-level pointer-down: closes every combobox the pointer is outside of
    pub fn close_outside(&mut self, outside: &[SubscriptionId]) {
        for field in self.fields.iter_mut() {
            if let Some(model) = field.combobox_mut() {
                if model
                    .subscription_id()
                    .is_some_and(|id| outside.contains(&id))
                    && model.is_open()
                {
                    model.close();
                }
            }
        }
    }

    fn combobox_at(&mut self, index: usize) -> Option<&mut ComboboxModel> {
        self.fields.get_mut(index).and_then(FormField::combobox_mut)
    }

    fn clear_validity(&mut self, index: usize) {
        if self
            .validity
            .as_ref()
            .is_some_and(|validity| validity.field == index)
        {
            self.validity = None;
        }
    }

    // Submission

    pub fn submit(&mut self) -> SubmitOutcome {
        if self.button_disabled {
            return SubmitOutcome::Busy;
        }

        match self.step {
            FormStep::One => {
                if !self.validate_step(FormStep::One) {
                    return SubmitOutcome::Invalid;
                }

                info!(form = %self.id, "step one complete");
                self.show_step(FormStep::Two);
                SubmitOutcome::Advanced
            }
            FormStep::Two => {
                if !self.validate_step(FormStep::Two) {
                    return SubmitOutcome::Invalid;
                }

                self.fill_hidden_fallback();
                let payload = self.payload();

                self.button_disabled = true;
                self.button_label = SUBMITTING_LABEL.to_string();
                self.status = None;

                info!(form = %self.id, endpoint = %self.endpoint, entries = payload.len(), "submitting");
                SubmitOutcome::Post(payload)
            }
        }
    }

    /// Checks the fields of `step` in order and focuses the first invalid one
    pub fn validate_step(&mut self, step: FormStep) -> bool {
        self.status = None;
        self.validity = None;

        let indices = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.step() == step)
            .map(|(i, _)| i)
            .collect_vec();

        for index in indices {
            let Some(field) = self.fields.get(index) else {
                continue;
            };

            match field {
                FormField::Text { model, .. } => {
                    if let Some(message) = model.check_validity() {
                        debug!(field = %model.name(), %message, "invalid field");
                        self.validity = Some(Validity {
                            field: index,
                            message,
                        });
                        self.set_focus(Some(FocusTarget::Field(index)), true);
                        return false;
                    }
                }
                FormField::Combobox { model, .. } => {
                    if model.required() && model.input_text().trim().is_empty() {
                        debug!(field = %model.name(), "required combobox is empty");
                        self.validity = Some(Validity {
                            field: index,
                            message: FILL_OUT_MESSAGE.to_string(),
                        });
                        self.set_focus(Some(FocusTarget::Field(index)), true);
                        return false;
                    }
                }
                FormField::Checkbox { model, .. } => {
                    if model.required() && !model.checked() {
                        self.status = Some(FormStatus {
                            message: CONSENT_MESSAGE.to_string(),
                            kind: StatusKind::Error,
                        });
                        self.set_focus(Some(FocusTarget::Field(index)), true);
                        return false;
                    }
                }
            }
        }

        true
    }

    /// A combobox whose hidden field is still empty submits its typed text
    pub fn fill_hidden_fallback(&mut self) {
        self.fields
            .iter_mut()
            .filter_map(FormField::combobox_mut)
            .for_each(ComboboxModel::fill_hidden_fallback);
    }

    /// Form entries in document order: text values, hidden combobox values and
    /// checked checkboxes
    pub fn payload(&self) -> Payload {
        let mut payload = Payload::default();

        for field in self.fields.iter() {
            match field {
                FormField::Text { model, .. } => {
                    payload.insert(model.name().clone(), model.value().clone());
                }
                FormField::Combobox { model, .. } => {
                    payload.insert(model.hidden().name().clone(), model.hidden().value().clone());
                }
                FormField::Checkbox { model, .. } => {
                    if model.checked() {
                        payload.insert(model.name().clone(), CHECKED_VALUE.to_string());
                    }
                }
            }
        }

        payload
    }

    /// The in-flight request settled; the button is restored either way
    pub fn finish_submit(&mut self, succeeded: bool) {
        if !succeeded {
            self.status = Some(FormStatus {
                message: FAILURE_MESSAGE.to_string(),
                kind: StatusKind::Error,
            });
        }

        self.button_disabled = false;
        self.button_label = self.submit_label.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{markup::FormMarkup, outside_pointer::OutsidePointerRegistry};
    use pretty_assertions::assert_eq;

    fn contact_form(registry: &SharedRegistry) -> FormModel {
        let markup: FormMarkup = serde_json::from_str(
            r#"{
                "id": "contact-form",
                "fields": [
                    { "type": "text", "name": "full_name", "label": "Full name", "required": true },
                    { "type": "text", "name": "email", "label": "Email", "kind": "email", "required": true },
                    { "type": "text", "name": "mobile", "label": "Mobile", "kind": "tel", "required": true,
                      "missing_message": "Please enter a mobile number" },
                    { "type": "text", "name": "company_name", "label": "Company" },
                    { "type": "combobox", "label": "Job title", "step": "2",
                      "container": { "data_name": "job_title", "input": {},
                                     "list": { "options": [ { "label": "Analyst" }, { "label": "Director", "value": "dir" } ] } } },
                    { "type": "combobox", "label": "Assets", "step": "2",
                      "container": { "data_name": "assets", "input": { "required": true },
                                     "list": { "options": [ { "label": "Under 1M", "value": "lt1m" } ] },
                                     "hidden": { "name": "assets" } } },
                    { "type": "checkbox", "id": "consent-updates", "name": "consent", "label": "Contact me",
                      "required": true, "step": "2" }
                ]
            }"#,
        )
        .unwrap();

        let mut form = FormModel::from_markup(&markup, None, registry, 4).unwrap();
        form.area_update(Rect::new(0, 0, 40, 60));
        form
    }

    fn type_into(form: &mut FormModel, index: usize, text: &str) {
        form.focus_update(Some(FocusTarget::Field(index)));
        for c in text.chars() {
            form.key(FormKey::Char(c));
        }
    }

    fn complete_step_one(form: &mut FormModel) {
        type_into(form, 0, "Jane Doe");
        type_into(form, 1, "jane@example.com");
        type_into(form, 2, "+44 20 7946 0000");
        assert_eq!(form.submit(), SubmitOutcome::Advanced);
    }

    #[test]
    fn starts_on_step_one() {
        let registry = OutsidePointerRegistry::shared();
        let form = contact_form(&registry);

        assert_eq!(form.step(), FormStep::One);
        assert_eq!(form.visible_fields(), vec![0, 1, 2, 3]);
        assert_eq!(form.button_label(), "PROCEED");
        assert_eq!(form.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(registry.borrow().len(), 2);
    }

    #[test]
    fn step_one_reports_first_invalid_field() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);

        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(form.validity().as_ref().map(|v| v.field), Some(0));
        assert_eq!(form.focus(), Some(FocusTarget::Field(0)));

        type_into(&mut form, 0, "Jane");
        type_into(&mut form, 1, "jane@");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(
            form.validity(),
            &Some(Validity {
                field: 1,
                message: "Please enter a valid email address.".into(),
            })
        );

        type_into(&mut form, 1, "example.com");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(
            form.validity().as_ref().map(|v| v.message.as_str()),
            Some("Please enter a mobile number")
        );
        assert_eq!(form.step(), FormStep::One);
    }

    #[test]
    fn editing_invalid_field_clears_its_message() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);

        form.submit();
        form.key(FormKey::Char('J'));
        assert_eq!(form.validity(), &None);
    }

    #[test]
    fn valid_step_one_advances_without_posting() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);

        complete_step_one(&mut form);
        assert_eq!(form.step(), FormStep::Two);
        assert_eq!(form.visible_fields(), vec![4, 5, 6]);
        assert_eq!(form.fields()[0].area(), Rect::default());
        assert_eq!(form.button_label(), "PROCEED");
    }

    #[test]
    fn step_two_requires_assets_then_consent() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);

        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(form.validity().as_ref().map(|v| v.field), Some(5));
        assert_eq!(form.focus(), Some(FocusTarget::Field(5)));

        type_into(&mut form, 5, "under");
        assert_eq!(form.submit(), SubmitOutcome::Invalid);
        assert_eq!(
            form.status(),
            &Some(FormStatus {
                message: CONSENT_MESSAGE.into(),
                kind: StatusKind::Error,
            })
        );
        assert_eq!(form.focus(), Some(FocusTarget::Field(6)));
    }

    #[test]
    fn posting_builds_payload_with_hidden_fallback() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);

        // Job title picked from the list, assets typed freely
        form.focus_update(Some(FocusTarget::Field(4)));
        form.key(FormKey::Down);
        form.key(FormKey::Down);
        form.key(FormKey::Enter);
        type_into(&mut form, 5, " 5M+ ");
        form.focus_update(Some(FocusTarget::Field(6)));
        form.key(FormKey::Char(' '));

        let SubmitOutcome::Post(payload) = form.submit() else {
            panic!("expected a post");
        };

        assert_eq!(
            payload.into_iter().collect_vec(),
            vec![
                ("full_name".to_string(), "Jane Doe".to_string()),
                ("email".to_string(), "jane@example.com".to_string()),
                ("mobile".to_string(), "+44 20 7946 0000".to_string()),
                ("company_name".to_string(), String::new()),
                ("job_title".to_string(), "dir".to_string()),
                ("assets".to_string(), "5M+".to_string()),
                ("consent".to_string(), "on".to_string()),
            ]
        );
        assert!(form.button_disabled());
        assert_eq!(form.button_label(), SUBMITTING_LABEL);
        assert_eq!(form.submit(), SubmitOutcome::Busy);
    }

    #[test]
    fn failed_post_restores_button_and_reports() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);
        type_into(&mut form, 5, "5M+");
        form.focus_update(Some(FocusTarget::Field(6)));
        form.key(FormKey::Char(' '));
        assert!(matches!(form.submit(), SubmitOutcome::Post(_)));

        form.finish_submit(false);
        assert!(!form.button_disabled());
        assert_eq!(form.button_label(), "PROCEED");
        assert_eq!(
            form.status().as_ref().map(|status| status.message.as_str()),
            Some(FAILURE_MESSAGE)
        );
    }

    #[test]
    fn tab_ring_covers_visible_fields_and_button() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);

        form.focus_move(FocusDirection::Prev);
        assert_eq!(form.focus(), Some(FocusTarget::Submit));
        form.focus_move(FocusDirection::Next);
        assert_eq!(form.focus(), Some(FocusTarget::Field(0)));
        for _ in 0..4 {
            form.focus_move(FocusDirection::Next);
        }
        assert_eq!(form.focus(), Some(FocusTarget::Submit));
    }

    #[test]
    fn enter_in_combobox_submits_without_active_option() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);

        form.focus_update(Some(FocusTarget::Field(4)));
        assert!(form.fields()[4].combobox().unwrap().is_open());

        assert_eq!(form.key(FormKey::Enter), Some(SubmitOutcome::Invalid));
        assert!(!form.fields()[4].combobox().unwrap().is_open());
        assert_eq!(form.validity().as_ref().map(|v| v.field), Some(5));
    }

    #[test]
    fn enter_in_combobox_commits_active_option_only() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);

        form.focus_update(Some(FocusTarget::Field(4)));
        form.key(FormKey::Down);

        assert_eq!(form.key(FormKey::Enter), None);
        assert_eq!(form.fields()[4].combobox().unwrap().input_text(), "Analyst");
    }

    #[test]
    fn leaving_combobox_closes_it() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);

        form.focus_update(Some(FocusTarget::Field(4)));
        assert!(form.fields()[4].combobox().unwrap().is_open());

        form.focus_move(FocusDirection::Next);
        assert!(!form.fields()[4].combobox().unwrap().is_open());
    }

    #[test]
    fn pointer_selection_runs_before_outside_close() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);

        // Job title input sits below its label row
        let input = form.fields()[4].area();
        form.pointer_down(Position::new(input.x + 2, input.y + 1));
        let job_title = form.fields()[4].combobox().unwrap();
        assert!(job_title.is_open());

        let row = job_title.list_inner_area();
        let position = Position::new(row.x + 1, row.y + 1);
        assert_eq!(
            form.hit(position),
            Some(FormTarget::Combobox(4, ComboboxTarget::Option(1)))
        );

        form.pointer_down(position);
        let outside = registry.borrow().outside(position);
        form.close_outside(&outside);

        let job_title = form.fields()[4].combobox().unwrap();
        assert_eq!(job_title.hidden().value(), "dir");
        assert_eq!(job_title.input_text(), "Director");
        assert!(!job_title.is_open());
    }

    #[test]
    fn pointer_down_elsewhere_closes_open_list() {
        let registry = OutsidePointerRegistry::shared();
        let mut form = contact_form(&registry);
        complete_step_one(&mut form);
        form.focus_update(Some(FocusTarget::Field(4)));

        let position = Position::new(39, 59);
        form.pointer_down(position);
        let outside = registry.borrow().outside(position);
        form.close_outside(&outside);

        assert!(!form.fields()[4].combobox().unwrap().is_open());
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn endpoint_override_wins() {
        let registry = OutsidePointerRegistry::shared();
        let markup = FormMarkup {
            id: "f".into(),
            endpoint: Some("https://example.com/a".into()),
            submit_label: "SEND".into(),
            fields: vec![],
        };

        let form = FormModel::from_markup(&markup, None, &registry, 4).unwrap();
        assert_eq!(form.endpoint(), "https://example.com/a");

        let form =
            FormModel::from_markup(&markup, Some("http://localhost:9000"), &registry, 4).unwrap();
        assert_eq!(form.endpoint(), "http://localhost:9000");
    }
}
