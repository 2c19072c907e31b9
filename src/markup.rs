//! Serde description of the site: pages, the contact form and the combobox
//! containers it hosts, plus the separately loaded navigation.
//!
//! A combobox container mirrors the page markup it stands in for: a text input,
//! an option list and an optional hidden field. The input and the list are
//! optional here so that a container missing either can be reported with context
//! at initialization instead of being silently accepted by the parser.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wrap_context::{arg_context, raw_context};

pub const DEFAULT_HIDDEN_NAME: &str = "combobox_value";
pub const DEFAULT_ENDPOINT: &str = "https://httpbin.org/post";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMarkup {
    pub pages: IndexMap<String, PageMarkup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMarkup {
    pub title: String,

    #[serde(default)]
    pub body: Vec<String>,

    #[serde(default)]
    pub contact_form: Option<FormMarkup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormMarkup {
    pub id: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_submit_label")]
    pub submit_label: String,

    pub fields: Vec<FieldMarkup>,
}

fn default_submit_label() -> String {
    String::from("PROCEED")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepMarkup {
    #[default]
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    #[default]
    Text,
    Email,
    Tel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldMarkup {
    Text {
        name: String,
        label: String,
        #[serde(default)]
        kind: TextKind,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        step: StepMarkup,
        #[serde(default)]
        missing_message: Option<String>,
    },
    Combobox {
        label: String,
        #[serde(default)]
        step: StepMarkup,
        container: ComboboxMarkup,
    },
    Checkbox {
        id: String,
        name: String,
        label: String,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        step: StepMarkup,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboboxMarkup {
    #[serde(default)]
    pub data_name: Option<String>,

    #[serde(default)]
    pub input: Option<InputMarkup>,

    #[serde(default)]
    pub list: Option<ListMarkup>,

    #[serde(default)]
    pub hidden: Option<HiddenMarkup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputMarkup {
    #[serde(default)]
    pub placeholder: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMarkup {
    #[serde(default)]
    pub options: Vec<OptionMarkup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionMarkup {
    #[serde(default)]
    pub id: Option<String>,

    pub label: String,

    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiddenMarkup {
    pub name: String,

    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationMarkup {
    pub items: Vec<NavItemMarkup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NavItemMarkup {
    Link {
        label: String,
        page: String,
    },
    Dropdown {
        id: String,
        label: String,
        links: Vec<NavLinkMarkup>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavLinkMarkup {
    pub label: String,
    pub page: String,
}

impl SiteMarkup {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let source = arg_context!(std::fs::read_to_string(path))?;
        let site = raw_context!(serde_json::from_str::<SiteMarkup>(&source))?;
        anyhow::Ok(site)
    }

    pub fn page(&self, name: &str) -> anyhow::Result<&PageMarkup> {
        let page = arg_context!(self.pages.get(name))?;
        anyhow::Ok(page)
    }
}

impl NavigationMarkup {
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let source = arg_context!(tokio::fs::read_to_string(path).await)?;
        let navigation = raw_context!(serde_json::from_str::<NavigationMarkup>(&source))?;
        anyhow::Ok(navigation)
    }
}
