use std::time::Duration;

/// Terminal front-end settings. Form behaviour lives in [`FormConfig`](crate::form::FormConfig).
#[derive(Debug, Clone)]
pub struct UiOptions {
    pub tick_rate: Duration,
    pub confirm_exit: bool,
    pub show_help: bool,
    /// Steps applied per keypress when Shift is held on a number field.
    pub fast_step: i32,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            confirm_exit: true,
            show_help: true,
            fast_step: 10,
        }
    }
}

impl UiOptions {
    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn with_confirm_exit(mut self, confirm: bool) -> Self {
        self.confirm_exit = confirm;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_fast_step(mut self, steps: i32) -> Self {
        self.fast_step = steps.max(1);
        self
    }
}
