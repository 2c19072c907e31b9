use impl_helper::ImplHelper;
use ratatui::layout::Rect;
use regex::Regex;
use std::sync::LazyLock;

use crate::markup::TextKind;

pub const FILL_OUT_MESSAGE: &str = "Please fill out this field.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

/// Rows taken by a bordered text input
pub const TEXT_FIELD_HEIGHT: u16 = 3;
pub const CHECKBOX_HEIGHT: u16 = 1;

// The `type=email` grammar browsers validate against
static EMAIL: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.as_ref().is_ok_and(|email| email.is_match(value))
}

#[derive(Debug, Clone, Default, ImplHelper)]
pub struct TextFieldModel {
    #[helper(get)]
    name: String,

    #[helper(get)]
    label: String,

    #[helper(copy)]
    kind: TextKind,

    #[helper(copy, set)]
    required: bool,

    #[helper(get, set, upd)]
    value: String,

    #[helper(get, set)]
    missing_message: Option<String>,

    #[helper(copy, upd)]
    focused: bool,

    #[helper(copy, upd)]
    area: Rect,
}

impl TextFieldModel {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: TextKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn delete_char(&mut self) {
        self.value.pop();
    }

    /// Constraint validation: the message for the first failing constraint
    pub fn check_validity(&self) -> Option<String> {
        let value = self.value.trim();

        if self.required && value.is_empty() {
            return Some(
                self.missing_message
                    .clone()
                    .unwrap_or_else(|| FILL_OUT_MESSAGE.to_string()),
            );
        }

        if self.kind == TextKind::Email && !value.is_empty() && !is_valid_email(value) {
            return Some(INVALID_EMAIL_MESSAGE.to_string());
        }

        None
    }
}

#[derive(Debug, Clone, Default, ImplHelper)]
pub struct CheckboxModel {
    #[helper(get)]
    id: String,

    #[helper(get)]
    name: String,

    #[helper(get)]
    label: String,

    #[helper(copy, set)]
    required: bool,

    #[helper(copy, set, upd)]
    checked: bool,

    #[helper(copy, upd)]
    focused: bool,

    #[helper(copy, upd)]
    area: Rect,
}

impl CheckboxModel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn toggle(&mut self) {
        self.checked = !self.checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("jane.doe+news@mail.example.co.uk"));
        assert!(is_valid_email("root@localhost"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("jane doe@example.com"));
        assert!(!is_valid_email("jane@-example.com"));
    }

    #[test]
    fn required_text_field_rejects_blank_value() {
        let mut field = TextFieldModel::new("full_name", "Full name", TextKind::Text)
            .required_set(true)
            .value_set("   ".into());

        assert_eq!(field.check_validity().as_deref(), Some(FILL_OUT_MESSAGE));

        field.insert_char('J');
        assert_eq!(field.check_validity(), None);
    }

    #[test]
    fn custom_missing_message() {
        let field = TextFieldModel::new("mobile", "Mobile", TextKind::Tel)
            .required_set(true)
            .missing_message_set(Some("Please enter a mobile number".into()));

        assert_eq!(
            field.check_validity().as_deref(),
            Some("Please enter a mobile number")
        );
    }

    #[test]
    fn optional_email_must_still_be_valid() {
        let mut field = TextFieldModel::new("email", "Email", TextKind::Email);
        assert_eq!(field.check_validity(), None);

        field.value_update("not-an-email".into());
        assert_eq!(field.check_validity().as_deref(), Some(INVALID_EMAIL_MESSAGE));
    }

    #[test]
    fn checkbox_toggles() {
        let mut checkbox = CheckboxModel::new("consent-updates", "consent", "Keep me posted");

        checkbox.toggle();
        assert!(checkbox.checked());
        checkbox.toggle();
        assert!(!checkbox.checked());
    }
}
