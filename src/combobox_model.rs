//! Searchable dropdown: a text input paired with a filterable, keyboard
//! navigable option list that commits to a single value.
//!
//! The widget is a two state machine (`Closed`/`Open`). Every option keeps its
//! own `visible` and `selected` flags; views are rebuilt from this model and
//! never act as a second source of truth.

use impl_helper::ImplHelper;
use itertools::Itertools;
use ratatui::layout::{Position, Rect};
use tracing::debug;
use wrap_context::liab;

use crate::{
    markup::{ComboboxMarkup, DEFAULT_HIDDEN_NAME},
    outside_pointer::{OutsidePointerRegistry, OutsidePointerSubscription, SharedRegistry},
    utils::{label_matches, normalize_query, rect_contains},
};

pub const NO_MATCHES: &str = "No matches";
pub const OPTION_ID_PREFIX: &str = "cb-opt";
pub const DEFAULT_LIST_ROWS: usize = 6;

/// Height of the bordered text input
pub const INPUT_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComboboxState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboboxKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// Part of the widget under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboboxTarget {
    Input,
    Toggle,
    Clear,
    Option(usize),
    Placeholder,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, ImplHelper)]
pub struct ComboboxOption {
    #[helper(get)]
    id: String,

    #[helper(get)]
    label: String,

    #[helper(get)]
    value: String,

    #[helper(copy)]
    visible: bool,

    #[helper(copy)]
    selected: bool,
}

impl ComboboxOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, value: Option<String>) -> Self {
        let label: String = label.into();
        let label = label.trim().to_string();
        let value = value.unwrap_or_else(|| label.clone());

        Self {
            id: id.into(),
            label,
            value,
            visible: true,
            selected: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, ImplHelper)]
pub struct HiddenField {
    #[helper(get)]
    name: String,

    #[helper(get, upd)]
    value: String,
}

impl HiddenField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// ARIA surface of the widget, rendered from state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AriaState {
    pub expanded: bool,
    pub active_descendant: Option<String>,
    pub selected: Vec<(String, bool)>,
}

#[derive(Debug, ImplHelper)]
pub struct ComboboxModel {
    #[helper(get)]
    name: String,

    #[helper(get)]
    input_text: String,

    #[helper(get)]
    placeholder: String,

    #[helper(copy)]
    required: bool,

    #[helper(get)]
    hidden: HiddenField,

    #[helper(get)]
    options: Vec<ComboboxOption>,

    #[helper(copy)]
    active_index: Option<usize>,

    #[helper(copy)]
    state: ComboboxState,

    /// The non-interactive "No matches" row
    #[helper(copy)]
    placeholder_row: bool,

    #[helper(copy)]
    has_value: bool,

    #[helper(copy, upd)]
    focused: bool,

    #[helper(copy)]
    scroll_offset: usize,

    #[helper(copy)]
    max_rows: usize,

    #[helper(copy)]
    area: Rect,

    #[helper(copy)]
    bounds: Rect,

    #[helper(copy)]
    list_area: Rect,

    subscription: Option<OutsidePointerSubscription>,
}

impl ComboboxModel {
    pub fn new(name: impl Into<String>, hidden: HiddenField, options: Vec<ComboboxOption>) -> Self {
        Self {
            name: name.into(),
            input_text: String::default(),
            placeholder: String::default(),
            required: false,
            hidden,
            options,
            active_index: None,
            state: ComboboxState::Closed,
            placeholder_row: false,
            has_value: false,
            focused: false,
            scroll_offset: 0,
            max_rows: DEFAULT_LIST_ROWS,
            area: Rect::default(),
            bounds: Rect::default(),
            list_area: Rect::default(),
            subscription: None,
        }
    }

    /// Reads the container once; options are fixed from here on
    pub fn from_markup(markup: &ComboboxMarkup) -> anyhow::Result<Self> {
        let hidden = match &markup.hidden {
            Some(hidden) => HiddenField::new(hidden.name.clone(), hidden.value.clone()),
            None => HiddenField::new(
                markup
                    .data_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HIDDEN_NAME.to_string()),
                "",
            ),
        };

        let name = markup
            .data_name
            .clone()
            .unwrap_or_else(|| hidden.name().clone());

        let Some(input) = &markup.input else {
            liab!("Combobox {:?} has no text input", name);
        };
        let Some(list) = &markup.list else {
            liab!("Combobox {:?} has no option list", name);
        };

        let options = list
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| {
                let id = option
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}-{}", OPTION_ID_PREFIX, name, i));
                ComboboxOption::new(id, option.label.clone(), option.value.clone())
            })
            .collect_vec();

        let mut model = Self::new(name, hidden, options);
        model.placeholder = input.placeholder.clone();
        model.required = input.required;
        model.input_text = input.value.clone();
        model.update_has_value();

        anyhow::Ok(model)
    }

    /// Registers the container with the document-level pointer listeners; the
    /// registration lives as long as the widget
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn attach(mut self, registry: &SharedRegistry) -> Self {
        self.subscription = Some(OutsidePointerRegistry::subscribe(registry));
        self.sync_container();
        self
    }

    pub fn subscription_id(&self) -> Option<u64> {
        self.subscription.as_ref().map(|subscription| subscription.id())
    }

    pub fn max_rows_update(&mut self, rows: usize) -> &mut Self {
        self.max_rows = rows.max(1);
        self.place_list();
        self
    }

    pub fn is_open(&self) -> bool {
        self.state == ComboboxState::Open
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.visible)
            .map(|(i, _)| i)
            .collect_vec()
    }

    pub fn selected_option(&self) -> Option<&ComboboxOption> {
        self.options.iter().find(|option| option.selected)
    }

    pub fn active_option(&self) -> Option<&ComboboxOption> {
        self.active_index.and_then(|index| self.options.get(index))
    }

    pub fn aria(&self) -> AriaState {
        AriaState {
            expanded: self.is_open(),
            active_descendant: self.active_option().map(|option| option.id.clone()),
            selected: self
                .options
                .iter()
                .map(|option| (option.id.clone(), option.selected))
                .collect_vec(),
        }
    }

    /// Rows the list needs: the visible options, or the placeholder row
    pub fn list_rows(&self) -> usize {
        self.visible_indices().len().clamp(1, self.max_rows)
    }

    // Focus

    pub fn focus(&mut self) {
        self.focused = true;
        self.filter();
        self.update_has_value();
    }

    /// Keyboard focus moved to another control
    pub fn blur(&mut self) {
        self.focused = false;
        self.close();
    }

    // Typing

    /// The text input changed; the previous selection no longer mirrors it
    pub fn input(&mut self, text: impl Into<String>) {
        self.input_text = text.into();
        self.hidden.value.clear();
        self.options
            .iter_mut()
            .for_each(|option| option.selected = false);

        self.filter();
        self.update_has_value();
    }

    pub fn insert_char(&mut self, c: char) {
        let mut text = self.input_text.clone();
        text.push(c);
        self.input(text);
    }

    pub fn delete_char(&mut self) {
        let mut text = self.input_text.clone();
        if text.pop().is_some() {
            self.input(text);
        }
    }

    pub fn key(&mut self, key: ComboboxKey) {
        match key {
            ComboboxKey::ArrowDown => {
                if !self.is_open() {
                    self.open();
                }

                let visible = self.visible_indices();
                let next = match self.active_position(&visible) {
                    Some(position) => Some((position + 1).min(visible.len().saturating_sub(1))),
                    None => (!visible.is_empty()).then_some(0),
                };

                self.set_active(next.and_then(|position| visible.get(position).copied()));
            }
            ComboboxKey::ArrowUp => {
                if !self.is_open() {
                    self.open();
                }

                let visible = self.visible_indices();
                let prev = match self.active_position(&visible) {
                    Some(position) => Some(position.saturating_sub(1)),
                    None => visible.len().checked_sub(1),
                };

                self.set_active(prev.and_then(|position| visible.get(position).copied()));
            }
            ComboboxKey::Enter => match self.active_index {
                Some(index) => self.select(index),
                None => self.close(),
            },
            ComboboxKey::Escape => self.close(),
        }
    }

    // Filtering

    pub fn filter(&mut self) {
        let query = normalize_query(&self.input_text);

        for option in self.options.iter_mut() {
            option.visible = label_matches(&option.label, &query);
        }

        self.placeholder_row = !self.options.iter().any(|option| option.visible);
        self.scroll_offset = 0;
        self.set_active(None);
        self.open();
    }

    fn show_all(&mut self) {
        self.options
            .iter_mut()
            .for_each(|option| option.visible = true);
        self.placeholder_row = false;
        self.scroll_offset = 0;
        self.set_active(None);
    }

    // Selection

    pub fn select(&mut self, index: usize) {
        let Some(option) = self.options.get(index) else {
            return;
        };

        let label = option.label.clone();
        let value = option.value.clone();

        debug!(combobox = %self.name, %value, "option selected");

        self.input_text = label;
        self.hidden.value = value;
        for (i, option) in self.options.iter_mut().enumerate() {
            option.selected = i == index;
        }

        self.update_has_value();
        self.close();
    }

    /// Free text typed without picking an option is submitted as the value
    pub fn fill_hidden_fallback(&mut self) {
        let text = self.input_text.trim();

        if self.hidden.value.trim().is_empty() && !text.is_empty() {
            self.hidden.value = text.to_string();
        }
    }

    /// Pointer pressed on an option row. Dispatched before any outside-pointer
    /// handling so the selection is evaluated while the widget is still open.
    pub fn pointer_down_option(&mut self, index: usize) {
        if self.options.get(index).is_some_and(|option| option.visible) {
            self.select(index);
        }
    }

    pub fn pointer_move_option(&mut self, index: usize) {
        if self.is_open() && self.options.get(index).is_some_and(|option| option.visible) {
            self.set_active(Some(index));
        }
    }

    // Controls

    pub fn clear(&mut self) {
        self.input_text.clear();
        self.hidden.value.clear();
        self.options
            .iter_mut()
            .for_each(|option| option.selected = false);
        self.filter();
        self.update_has_value();
        self.focused = true;
    }

    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close();
        } else {
            // The full list, not what is left over from an earlier query
            self.show_all();
            self.open();
        }

        self.focused = true;
    }

    pub fn open(&mut self) {
        self.state = ComboboxState::Open;
        self.place_list();
    }

    pub fn close(&mut self) {
        self.state = ComboboxState::Closed;
        self.set_active(None);
        self.place_list();
    }

    // Layout

    pub fn area_update(&mut self, area: Rect, bounds: Rect) -> &mut Self {
        self.area = area;
        self.bounds = bounds;
        self.place_list();
        self
    }

    /// The input's inner row (inside the border)
    pub fn text_area(&self) -> Rect {
        if self.area.width < 2 || self.area.height < 2 {
            return Rect::default();
        }

        Rect::new(self.area.x + 1, self.area.y + 1, self.area.width - 2, 1)
    }

    pub fn toggle_area(&self) -> Rect {
        let text_area = self.text_area();
        if text_area.width == 0 {
            return Rect::default();
        }

        Rect::new(text_area.right() - 1, text_area.y, 1, 1)
    }

    pub fn clear_area(&self) -> Rect {
        let text_area = self.text_area();
        if !self.has_value || text_area.width < 3 {
            return Rect::default();
        }

        Rect::new(text_area.right() - 3, text_area.y, 1, 1)
    }

    pub fn list_inner_area(&self) -> Rect {
        if self.list_area.width < 2 || self.list_area.height < 2 {
            return Rect::default();
        }

        Rect::new(
            self.list_area.x + 1,
            self.list_area.y + 1,
            self.list_area.width - 2,
            self.list_area.height - 2,
        )
    }

    /// The area the widget occupies, list included while open
    pub fn container_area(&self) -> Rect {
        if self.list_area.is_empty() {
            self.area
        } else {
            self.area.union(self.list_area)
        }
    }

    pub fn hit(&self, position: Position) -> Option<ComboboxTarget> {
        if rect_contains(&self.toggle_area(), position) {
            return Some(ComboboxTarget::Toggle);
        }

        if rect_contains(&self.clear_area(), position) {
            return Some(ComboboxTarget::Clear);
        }

        if rect_contains(&self.area, position) {
            return Some(ComboboxTarget::Input);
        }

        if !rect_contains(&self.list_area, position) {
            return None;
        }

        let inner = self.list_inner_area();
        if !rect_contains(&inner, position) {
            return Some(ComboboxTarget::List);
        }

        if self.placeholder_row {
            return Some(ComboboxTarget::Placeholder);
        }

        let row = usize::from(position.y - inner.y) + self.scroll_offset;

        match self.visible_indices().get(row) {
            Some(index) => Some(ComboboxTarget::Option(*index)),
            None => Some(ComboboxTarget::List),
        }
    }

    fn place_list(&mut self) {
        if !self.is_open() || self.area.is_empty() {
            self.list_area = Rect::default();
            self.sync_container();
            return;
        }

        let wanted = u16::try_from(self.list_rows() + 2).unwrap_or(u16::MAX);

        let below = self.bounds.bottom().saturating_sub(self.area.bottom());
        let above = self.area.y.saturating_sub(self.bounds.y);

        self.list_area = if below >= wanted || below >= above {
            Rect::new(self.area.x, self.area.bottom(), self.area.width, wanted.min(below))
        } else {
            let height = wanted.min(above);
            Rect::new(self.area.x, self.area.y - height, self.area.width, height)
        };

        self.sync_container();
    }

    fn sync_container(&self) {
        if let Some(subscription) = &self.subscription {
            subscription.update_area(self.container_area());
        }
    }

    // Helpers

    fn active_position(&self, visible: &[usize]) -> Option<usize> {
        self.active_index
            .and_then(|active| visible.iter().position(|index| *index == active))
    }

    fn set_active(&mut self, index: Option<usize>) {
        self.active_index = index;

        // Keep the active row inside the list window
        let visible = self.visible_indices();
        if let Some(position) = self.active_position(&visible) {
            let rows = usize::from(self.list_inner_area().height).max(1);

            if position < self.scroll_offset {
                self.scroll_offset = position;
            } else if position >= self.scroll_offset + rows {
                self.scroll_offset = position + 1 - rows;
            }
        }
    }

    fn update_has_value(&mut self) {
        self.has_value = !self.input_text.is_empty();
    }
}
