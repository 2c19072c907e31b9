pub mod app;
pub mod cli;
pub mod combobox_model;
pub mod combobox_view;
pub mod event;
pub mod field_model;
pub mod field_view;
pub mod form_model;
pub mod form_view;
pub mod handler;
pub mod logging;
pub mod markup;
pub mod navigation_model;
pub mod navigation_view;
pub mod outside_pointer;
pub mod page_model;
pub mod page_view;
pub mod preferences;
pub mod submit;
pub mod textline_model;
pub mod textline_view;
pub mod tui;
pub mod types;
pub mod utils;
