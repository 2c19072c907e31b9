use impl_helper::ImplHelper;
use std::time::Duration;
use wrap_context::liab;

use crate::navigation_model::LayoutMode;

pub const DEFAULT_MOBILE_BREAKPOINT: u16 = 100;
pub const DEFAULT_LIST_ROWS: usize = 6;
pub const DEFAULT_FORM_WIDTH: u16 = 60;
pub const DEFAULT_TICK_RATE_MS: u64 = 50;

pub const MIN_FORM_WIDTH: u16 = 20;
pub const MIN_TICK_RATE_MS: u64 = 10;

#[derive(Debug, Clone, ImplHelper)]
pub struct Preferences {
    #[helper(copy /* upd is custom */)]
    mobile_breakpoint: u16,

    #[helper(copy /* upd is custom */)]
    list_rows: usize,

    #[helper(copy /* upd is custom */)]
    form_width: u16,

    #[helper(copy /* upd is custom */)]
    tick_rate: Duration,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            list_rows: DEFAULT_LIST_ROWS,
            form_width: DEFAULT_FORM_WIDTH,
            tick_rate: Duration::from_millis(DEFAULT_TICK_RATE_MS),
        }
    }
}

impl Preferences {
    pub fn layout_mode(&self, term_width: u16) -> LayoutMode {
        if term_width < self.mobile_breakpoint {
            LayoutMode::Mobile
        } else {
            LayoutMode::Desktop
        }
    }

    /// The form keeps its width on wide terminals and shrinks on narrow ones
    pub fn apply_term_width(&self, term_width: u16) -> u16 {
        self.form_width.min(term_width)
    }

    pub fn mobile_breakpoint_update(&mut self, value: u16) -> anyhow::Result<&mut Self> {
        self.mobile_breakpoint = value;
        anyhow::Ok(self)
    }

    pub fn list_rows_update(&mut self, value: usize) -> anyhow::Result<&mut Self> {
        if value == 0 {
            liab!("Option list needs at least one row!");
        }

        self.list_rows = value;
        anyhow::Ok(self)
    }

    pub fn form_width_update(&mut self, value: u16) -> anyhow::Result<&mut Self> {
        if value < MIN_FORM_WIDTH {
            liab!("Form needs at least {} columns, got {}", MIN_FORM_WIDTH, value);
        }

        self.form_width = value;
        anyhow::Ok(self)
    }

    pub fn tick_rate_update(&mut self, value: Duration) -> anyhow::Result<&mut Self> {
        if value < Duration::from_millis(MIN_TICK_RATE_MS) {
            liab!("Tick rate below {} ms: {:?}", MIN_TICK_RATE_MS, value);
        }

        self.tick_rate = value;
        anyhow::Ok(self)
    }
}
